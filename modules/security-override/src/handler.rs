//! Detects an application-replaced security context and reconciles the
//! platform identity with it.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use restkit_security::{
    AttributeMap, CredentialSet, IdentityError, Permission, PermissionDecision, Principal,
    SecurityIdentity,
};
use restkit_server::{
    HandlerChainCustomizer, Phase, PlatformSecurityContext, RequestContext, SecurityContext,
    ServerError, ServerHandler,
};

use crate::config::SecurityOverrideConfig;

/// Pipeline stage that keeps the platform identity consistent with an
/// application-replaced security context.
///
/// Detection is a pure inspection and mutates neither context: the fast
/// path (no context ever set) and the sentinel path (the platform's own
/// context is still active, recognized by concrete type) are no-ops. A
/// context whose reconciliation already ran for this request is skipped,
/// so re-running the stage without a new replacement is a no-op. A
/// *different* replacement installed later in the same request composes
/// over the already-reconciled identity.
#[derive(Default)]
pub struct SecurityOverrideHandler;

#[async_trait]
impl ServerHandler for SecurityOverrideHandler {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), ServerError> {
        let modified = {
            let Some(current) = ctx.security_context() else {
                // nothing to do
                return Ok(());
            };
            if is_platform_context(current.as_ref()) {
                // the platform's own context, it has not been replaced
                return Ok(());
            }
            if ctx
                .applied_security_context()
                .is_some_and(|applied| Arc::ptr_eq(applied, current))
            {
                // this replacement was already reconciled
                return Ok(());
            }
            Arc::clone(current)
        };
        update_identity(ctx, modified)
    }
}

fn is_platform_context(context: &dyn SecurityContext) -> bool {
    let any: &dyn Any = context;
    any.is::<PlatformSecurityContext>()
}

/// Transform the deferred identity so downstream consumers observe the
/// replacement context's principal and roles while the prior identity's
/// credentials and attributes are kept.
///
/// The transformation is composed onto the deferred value without waiting
/// for it; it runs when the prior identity resolves, and a failed
/// resolution propagates unchanged. The association slot is replaced
/// atomically, so later stages never observe a half-updated value.
fn update_identity(
    ctx: &mut RequestContext,
    modified: Arc<dyn SecurityContext>,
) -> Result<(), ServerError> {
    ctx.require_request_scope();
    let association = ctx.identity_association()?;
    let old_identity = association.deferred_identity();

    let context = Arc::clone(&modified);
    association.set_identity(old_identity.map_identity(move |old| {
        let reconciled: Arc<dyn SecurityIdentity> = Arc::new(ReconciledIdentity {
            context,
            credentials: old.credentials(),
            attributes: old.attributes(),
        });
        reconciled
    }));

    debug!(
        request_id = %ctx.request_id(),
        "security context replaced by application, identity updated"
    );
    ctx.set_applied_security_context(modified);
    Ok(())
}

/// Identity synthesized from a replacement security context plus the prior
/// identity's non-overridable state.
///
/// Principal and role membership delegate to the replacement context;
/// credentials and attributes are the prior identity's shared snapshots and
/// must be treated as read-only.
struct ReconciledIdentity {
    context: Arc<dyn SecurityContext>,
    credentials: Arc<CredentialSet>,
    attributes: Arc<AttributeMap>,
}

impl std::fmt::Debug for ReconciledIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciledIdentity")
            .field("credentials", &self.credentials)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SecurityIdentity for ReconciledIdentity {
    fn principal(&self) -> Option<&Principal> {
        self.context.user_principal()
    }

    fn is_anonymous(&self) -> bool {
        self.context.user_principal().is_none()
    }

    fn roles(&self) -> Result<&HashSet<String>, IdentityError> {
        // a membership predicate alone cannot produce the full set
        Err(IdentityError::UnsupportedCapability(
            "retrieving all roles is not supported when the security context has been replaced"
                .to_owned(),
        ))
    }

    fn has_role(&self, role: &str) -> bool {
        self.context.is_user_in_role(role)
    }

    fn credentials(&self) -> Arc<CredentialSet> {
        Arc::clone(&self.credentials)
    }

    fn attributes(&self) -> Arc<AttributeMap> {
        Arc::clone(&self.attributes)
    }

    async fn check_permission(&self, _permission: &Permission) -> PermissionDecision {
        // replacement contexts carry no permission-evaluation capability
        PermissionDecision::NoDecision
    }
}

/// Contributes the override stage at [`Phase::PreInvocation`]: after
/// security-context establishment, before resource invocation. Exactly one
/// handler instance per chain build.
pub struct SecurityOverrideCustomizer {
    config: SecurityOverrideConfig,
}

impl SecurityOverrideCustomizer {
    #[must_use]
    pub fn new(config: SecurityOverrideConfig) -> Self {
        Self { config }
    }
}

impl Default for SecurityOverrideCustomizer {
    fn default() -> Self {
        Self::new(SecurityOverrideConfig::default())
    }
}

impl HandlerChainCustomizer for SecurityOverrideCustomizer {
    fn handlers(&self, phase: Phase) -> Vec<Arc<dyn ServerHandler>> {
        if phase == Phase::PreInvocation && self.config.enabled {
            vec![Arc::new(SecurityOverrideHandler)]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use restkit_security::PlatformIdentity;
    use restkit_server::StaticSecurityContext;

    use super::*;

    #[test]
    fn platform_context_is_recognized_by_type() {
        let sentinel =
            PlatformSecurityContext::new(Arc::new(PlatformIdentity::anonymous()));
        assert!(is_platform_context(&sentinel));

        let replacement = StaticSecurityContext::anonymous();
        assert!(!is_platform_context(&replacement));
    }

    #[test]
    fn enabled_customizer_contributes_exactly_one_handler_at_pre_invocation() {
        let customizer = SecurityOverrideCustomizer::default();

        assert_eq!(customizer.handlers(Phase::PreInvocation).len(), 1);
        assert!(customizer.handlers(Phase::RequestInit).is_empty());
        assert!(customizer.handlers(Phase::Security).is_empty());
        assert!(customizer.handlers(Phase::Invocation).is_empty());
    }

    #[test]
    fn disabled_customizer_contributes_nothing() {
        let customizer =
            SecurityOverrideCustomizer::new(SecurityOverrideConfig { enabled: false });

        for phase in Phase::ALL {
            assert!(customizer.handlers(phase).is_empty());
        }
    }
}
