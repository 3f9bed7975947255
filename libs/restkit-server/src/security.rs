//! Platform security-context establishment.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::ServerError;
use crate::handler::{HandlerChainCustomizer, Phase, ServerHandler};
use crate::security_context::PlatformSecurityContext;

/// Installs the platform-issued security context from the authenticated
/// identity.
///
/// The deferred identity itself is seeded into the association by the
/// identity-association component at request start; this stage activates the
/// request scope, resolves the identity, and publishes the sentinel
/// [`PlatformSecurityContext`]. A resolution failure propagates to the
/// pipeline's error path.
#[derive(Default)]
pub struct SecurityContextSetupHandler;

#[async_trait]
impl ServerHandler for SecurityContextSetupHandler {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), ServerError> {
        ctx.require_request_scope();
        let identity = ctx
            .identity_association()?
            .deferred_identity()
            .resolve()
            .await?;

        debug!(
            request_id = %ctx.request_id(),
            anonymous = identity.is_anonymous(),
            "platform security context established"
        );
        ctx.set_security_context(Arc::new(PlatformSecurityContext::new(identity)));
        Ok(())
    }
}

/// Contributes the security-establishment stage at [`Phase::Security`].
#[derive(Default)]
pub struct SecuritySetupCustomizer;

impl HandlerChainCustomizer for SecuritySetupCustomizer {
    fn handlers(&self, phase: Phase) -> Vec<Arc<dyn ServerHandler>> {
        if phase == Phase::Security {
            vec![Arc::new(SecurityContextSetupHandler)]
        } else {
            Vec::new()
        }
    }
}
