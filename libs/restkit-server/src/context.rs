//! The active request-processing context.

use std::sync::Arc;

use uuid::Uuid;

use restkit_security::CurrentIdentityAssociation;

use crate::error::ServerError;
use crate::security_context::SecurityContext;

/// Per-request state threaded through the handler chain.
///
/// One instance exists per request; handlers run sequentially within the
/// request's single logical thread of control and receive `&mut` access.
/// All of it is discarded at request end.
pub struct RequestContext {
    request_id: Uuid,
    security_context: Option<Arc<dyn SecurityContext>>,
    applied_security_context: Option<Arc<dyn SecurityContext>>,
    scope: Option<Arc<CurrentIdentityAssociation>>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            security_context: None,
            applied_security_context: None,
            scope: None,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Whether a security context has ever been set on this request.
    #[must_use]
    pub fn is_security_context_set(&self) -> bool {
        self.security_context.is_some()
    }

    /// Currently active security context, if any was set.
    #[must_use]
    pub fn security_context(&self) -> Option<&Arc<dyn SecurityContext>> {
        self.security_context.as_ref()
    }

    /// Install a security context. Application code uses this to replace the
    /// platform-issued one mid-request.
    pub fn set_security_context(&mut self, context: Arc<dyn SecurityContext>) {
        self.security_context = Some(context);
    }

    /// Activate request-scoped resolution. Idempotent.
    ///
    /// Activation creates the request's [`CurrentIdentityAssociation`] if it
    /// does not exist yet.
    pub fn require_request_scope(&mut self) {
        if self.scope.is_none() {
            self.scope = Some(Arc::new(CurrentIdentityAssociation::anonymous()));
        }
    }

    /// The request's identity association.
    ///
    /// # Errors
    ///
    /// [`ServerError::ScopeNotActive`] when the request scope has not been
    /// activated.
    pub fn identity_association(&self) -> Result<&Arc<CurrentIdentityAssociation>, ServerError> {
        self.scope.as_ref().ok_or(ServerError::ScopeNotActive)
    }

    /// Security context whose identity reconciliation already ran for this
    /// request, if any.
    #[must_use]
    pub fn applied_security_context(&self) -> Option<&Arc<dyn SecurityContext>> {
        self.applied_security_context.as_ref()
    }

    /// Record that identity reconciliation ran for the given context.
    pub fn set_applied_security_context(&mut self, context: Arc<dyn SecurityContext>) {
        self.applied_security_context = Some(context);
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
