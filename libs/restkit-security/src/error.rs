//! Error types for the platform identity model.

use thiserror::Error;

/// Errors produced while resolving or querying a security identity.
///
/// Cloneable so a shared deferred identity hands the same failure to every
/// consumer that resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The identity representation cannot perform the requested operation.
    #[error("unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// The authenticated identity could not be resolved.
    #[error("identity resolution failed: {0}")]
    ResolutionFailed(String),
}
