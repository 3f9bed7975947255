//! The request-facing, application-overridable security context.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use restkit_security::{Principal, SecurityIdentity};

/// Request-facing view of "who is making this request", exposed to handler
/// code and replaceable by the application mid-request.
///
/// The `Any` supertrait lets the pipeline recognize the platform's own
/// implementation by concrete type; any other implementor counts as an
/// application override.
pub trait SecurityContext: Any + Send + Sync {
    /// Principal of the caller, `None` when unauthenticated.
    fn user_principal(&self) -> Option<&Principal>;

    /// Whether the caller holds the given role.
    fn is_user_in_role(&self, role: &str) -> bool;
}

/// The platform-issued security context, backed by the resolved identity.
///
/// This is the sentinel implementation: while it is the active context, the
/// application has not replaced the security context.
pub struct PlatformSecurityContext {
    identity: Arc<dyn SecurityIdentity>,
}

impl PlatformSecurityContext {
    #[must_use]
    pub fn new(identity: Arc<dyn SecurityIdentity>) -> Self {
        Self { identity }
    }
}

impl SecurityContext for PlatformSecurityContext {
    fn user_principal(&self) -> Option<&Principal> {
        self.identity.principal()
    }

    fn is_user_in_role(&self, role: &str) -> bool {
        self.identity.has_role(role)
    }
}

/// Fixed-content security context, the simplest override implementation for
/// application code and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSecurityContext {
    principal: Option<Principal>,
    roles: HashSet<String>,
}

impl StaticSecurityContext {
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            roles: HashSet::new(),
        }
    }

    /// Override without a principal; downstream treats the request as
    /// anonymous.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }
}

impl SecurityContext for StaticSecurityContext {
    fn user_principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    fn is_user_in_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
