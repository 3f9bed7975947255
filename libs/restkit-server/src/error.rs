//! Error types for the request pipeline.

use restkit_security::IdentityError;
use thiserror::Error;

/// Errors surfaced by pipeline handlers.
///
/// Handler errors stop the chain and propagate to the pipeline's standard
/// error path; they are not retried.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Request-scoped resolution was used before the scope was activated.
    #[error("request scope is not active")]
    ScopeNotActive,

    /// Identity resolution or capability failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}
