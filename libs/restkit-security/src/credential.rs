//! Credentials attached to a security identity.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;

/// A typed credential carried by a [`SecurityIdentity`](crate::SecurityIdentity).
///
/// Credentials are opaque to the platform; consumers look them up by concrete
/// type via [`CredentialSet::of_type`].
pub trait Credential: Any + Send + Sync + fmt::Debug {}

/// Heterogeneous set of credentials, shared by reference between identities.
///
/// Lookup scans in insertion order and returns the first credential whose
/// concrete type matches the requested one.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    items: Vec<Arc<dyn Credential>>,
}

impl CredentialSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, credential: Arc<dyn Credential>) {
        self.items.push(credential);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Credential>> {
        self.items.iter()
    }

    /// First credential whose concrete type matches `type_id`, if any.
    #[must_use]
    pub fn by_type_id(&self, type_id: TypeId) -> Option<Arc<dyn Credential>> {
        self.items
            .iter()
            .find(|credential| {
                // upcast before asking for the type: `type_id` on the
                // unsized `dyn Credential` would name the trait object, not
                // the concrete credential
                let any: &dyn Any = credential.as_ref();
                any.type_id() == type_id
            })
            .map(Arc::clone)
    }

    /// Typed lookup: first credential of concrete type `T`, if any.
    #[must_use]
    pub fn of_type<T: Credential>(&self) -> Option<Arc<T>> {
        self.by_type_id(TypeId::of::<T>()).and_then(|credential| {
            let any: Arc<dyn Any + Send + Sync> = credential;
            any.downcast::<T>().ok()
        })
    }
}

/// Bearer-token credential captured during authentication.
///
/// The token is wrapped in [`SecretString`] so `Debug` redacts it.
#[derive(Debug, Clone)]
pub struct TokenCredential {
    token: SecretString,
    token_type: String,
}

impl TokenCredential {
    #[must_use]
    pub fn new(token: impl Into<SecretString>, token_type: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type: token_type.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Token scheme, e.g. `"bearer"`.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }
}

impl Credential for TokenCredential {}

/// Password credential captured during authentication.
#[derive(Debug, Clone)]
pub struct PasswordCredential {
    password: SecretString,
}

impl PasswordCredential {
    #[must_use]
    pub fn new(password: impl Into<SecretString>) -> Self {
        Self {
            password: password.into(),
        }
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

impl Credential for PasswordCredential {}
