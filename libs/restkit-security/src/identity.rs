//! The `SecurityIdentity` capability trait and the platform identity.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::credential::{Credential, CredentialSet};
use crate::error::IdentityError;
use crate::principal::Principal;

/// String-keyed, arbitrary-value attributes established during authentication.
pub type AttributeMap = HashMap<String, serde_json::Value>;

/// A permission to be checked against an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    name: String,
    actions: Vec<String>,
}

impl Permission {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_actions<I, S>(name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied,
    /// The identity carries no verdict for this permission.
    NoDecision,
}

/// Evaluates permissions for an identity.
///
/// Checkers are consulted in registration order; the first non-neutral
/// decision wins.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check(&self, permission: &Permission) -> PermissionDecision;
}

/// An authenticated principal together with its credentials, attributes and
/// role logic.
///
/// Identities are immutable once constructed; an update is expressed as a new
/// identity value, never in-place mutation.
#[async_trait]
pub trait SecurityIdentity: Send + Sync + fmt::Debug {
    /// Principal of the identity, `None` for anonymous identities.
    fn principal(&self) -> Option<&Principal>;

    fn is_anonymous(&self) -> bool;

    /// All roles held by the identity.
    ///
    /// # Errors
    ///
    /// [`IdentityError::UnsupportedCapability`] when the identity cannot
    /// enumerate roles (a membership predicate alone does not determine the
    /// full set).
    fn roles(&self) -> Result<&HashSet<String>, IdentityError>;

    /// Whether the identity holds the given role.
    fn has_role(&self, role: &str) -> bool;

    /// Credentials captured during authentication, shared by reference.
    fn credentials(&self) -> Arc<CredentialSet>;

    /// First credential whose concrete type matches `type_id`, if any.
    fn credential_by_type(&self, type_id: TypeId) -> Option<Arc<dyn Credential>> {
        self.credentials().by_type_id(type_id)
    }

    /// Attributes established during authentication, shared by reference.
    fn attributes(&self) -> Arc<AttributeMap>;

    /// Single attribute lookup.
    fn attribute(&self, name: &str) -> Option<serde_json::Value> {
        self.attributes().get(name).cloned()
    }

    /// Check a permission against the identity.
    async fn check_permission(&self, permission: &Permission) -> PermissionDecision;
}

impl dyn SecurityIdentity {
    /// Typed credential lookup: first credential of concrete type `T`.
    #[must_use]
    pub fn credential<T: Credential>(&self) -> Option<Arc<T>> {
        self.credential_by_type(TypeId::of::<T>())
            .and_then(|credential| {
                let any: Arc<dyn Any + Send + Sync> = credential;
                any.downcast::<T>().ok()
            })
    }
}

/// Identity produced by platform authentication.
pub struct PlatformIdentity {
    principal: Option<Principal>,
    roles: HashSet<String>,
    credentials: Arc<CredentialSet>,
    attributes: Arc<AttributeMap>,
    permission_checkers: Vec<Arc<dyn PermissionChecker>>,
}

impl PlatformIdentity {
    /// Create a new `PlatformIdentity` builder.
    #[must_use]
    pub fn builder() -> PlatformIdentityBuilder {
        PlatformIdentityBuilder::default()
    }

    /// The unauthenticated identity: no principal, no roles, no credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        PlatformIdentityBuilder::default().build()
    }
}

impl fmt::Debug for PlatformIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformIdentity")
            .field("principal", &self.principal)
            .field("roles", &self.roles)
            .field("credentials", &self.credentials)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SecurityIdentity for PlatformIdentity {
    fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    fn is_anonymous(&self) -> bool {
        self.principal.is_none()
    }

    fn roles(&self) -> Result<&HashSet<String>, IdentityError> {
        Ok(&self.roles)
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    fn credentials(&self) -> Arc<CredentialSet> {
        Arc::clone(&self.credentials)
    }

    fn attributes(&self) -> Arc<AttributeMap> {
        Arc::clone(&self.attributes)
    }

    async fn check_permission(&self, permission: &Permission) -> PermissionDecision {
        for checker in &self.permission_checkers {
            let decision = checker.check(permission).await;
            if decision != PermissionDecision::NoDecision {
                return decision;
            }
        }
        PermissionDecision::NoDecision
    }
}

#[derive(Default)]
pub struct PlatformIdentityBuilder {
    principal: Option<Principal>,
    roles: HashSet<String>,
    credentials: CredentialSet,
    attributes: AttributeMap,
    permission_checkers: Vec<Arc<dyn PermissionChecker>>,
}

impl PlatformIdentityBuilder {
    #[must_use]
    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn credential(mut self, credential: Arc<dyn Credential>) -> Self {
        self.credentials.push(credential);
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn permission_checker(mut self, checker: Arc<dyn PermissionChecker>) -> Self {
        self.permission_checkers.push(checker);
        self
    }

    #[must_use]
    pub fn build(self) -> PlatformIdentity {
        PlatformIdentity {
            principal: self.principal,
            roles: self.roles,
            credentials: Arc::new(self.credentials),
            attributes: Arc::new(self.attributes),
            permission_checkers: self.permission_checkers,
        }
    }
}
