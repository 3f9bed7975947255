#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Platform identity model for the RestKit server framework.
pub mod association;
pub mod credential;
pub mod deferred;
pub mod error;
pub mod identity;
pub mod principal;

pub use association::CurrentIdentityAssociation;
pub use credential::{Credential, CredentialSet, PasswordCredential, TokenCredential};
pub use deferred::{DeferredIdentity, IdentityResult};
pub use error::IdentityError;
pub use identity::{
    AttributeMap, Permission, PermissionChecker, PermissionDecision, PlatformIdentity,
    PlatformIdentityBuilder, SecurityIdentity,
};
pub use principal::Principal;
