//! Deferred (future-valued) identity resolution.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::IdentityError;
use crate::identity::SecurityIdentity;

/// Result of resolving a deferred identity.
pub type IdentityResult = Result<Arc<dyn SecurityIdentity>, IdentityError>;

/// A future resolving to exactly one [`SecurityIdentity`].
///
/// Cloning is cheap and every clone resolves to the same value; a failed
/// resolution hands the same [`IdentityError`] to every consumer. The value
/// held in request-scoped storage is replaced wholesale, never mutated in
/// place.
#[derive(Clone)]
pub struct DeferredIdentity {
    inner: Shared<BoxFuture<'static, IdentityResult>>,
}

impl DeferredIdentity {
    /// Deferred identity that is already resolved.
    #[must_use]
    pub fn resolved(identity: Arc<dyn SecurityIdentity>) -> Self {
        Self::from_future(std::future::ready(Ok(identity)))
    }

    /// Deferred identity that has already failed.
    #[must_use]
    pub fn failed(error: IdentityError) -> Self {
        Self::from_future(std::future::ready(Err(error)))
    }

    /// Wrap a pending resolution.
    #[must_use]
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = IdentityResult> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// Resolve the identity, waiting for it if necessary.
    ///
    /// # Errors
    ///
    /// Returns the resolution failure, identical for every consumer.
    pub async fn resolve(&self) -> IdentityResult {
        self.inner.clone().await
    }

    /// Compose a transformation over the successfully resolved identity.
    ///
    /// The transformation runs when (and on whatever task) the underlying
    /// resolution completes; a failed resolution propagates unchanged and
    /// the transformation never runs. The caller never blocks.
    #[must_use]
    pub fn map_identity<F>(&self, transform: F) -> Self
    where
        F: FnOnce(Arc<dyn SecurityIdentity>) -> Arc<dyn SecurityIdentity> + Send + 'static,
    {
        let upstream = self.inner.clone();
        Self::from_future(async move { upstream.await.map(transform) })
    }

    /// Whether two handles refer to the same underlying resolution.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::identity::PlatformIdentity;
    use crate::principal::Principal;

    use super::*;

    fn alice() -> Arc<dyn SecurityIdentity> {
        Arc::new(
            PlatformIdentity::builder()
                .principal(Principal::new("alice"))
                .build(),
        )
    }

    #[tokio::test]
    async fn resolved_yields_the_identity() {
        let deferred = DeferredIdentity::resolved(alice());

        let identity = deferred.resolve().await.unwrap();
        assert_eq!(identity.principal().map(Principal::name), Some("alice"));
    }

    #[tokio::test]
    async fn clones_share_the_same_resolution() {
        let deferred = DeferredIdentity::resolved(alice());
        let clone = deferred.clone();

        assert!(deferred.ptr_eq(&clone));

        let a = deferred.resolve().await.unwrap();
        let b = clone.resolve().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn map_identity_transforms_on_success() {
        let deferred = DeferredIdentity::resolved(alice());

        let mapped = deferred.map_identity(|_| {
            Arc::new(
                PlatformIdentity::builder()
                    .principal(Principal::new("bob"))
                    .build(),
            )
        });

        assert!(!mapped.ptr_eq(&deferred));
        let identity = mapped.resolve().await.unwrap();
        assert_eq!(identity.principal().map(Principal::name), Some("bob"));
    }

    #[tokio::test]
    async fn map_identity_propagates_failure_unchanged() {
        let error = IdentityError::ResolutionFailed("token expired".to_owned());
        let deferred = DeferredIdentity::failed(error.clone());

        let mapped = deferred.map_identity(|_identity| {
            // must never run on the failure path
            unreachable!("transform ran for a failed identity")
        });

        assert_eq!(mapped.resolve().await.unwrap_err(), error);
    }

    #[tokio::test]
    async fn map_identity_composes_over_a_pending_resolution() {
        let (tx, rx) = tokio::sync::oneshot::channel::<IdentityResult>();
        let deferred = DeferredIdentity::from_future(async move {
            rx.await
                .map_err(|_| IdentityError::ResolutionFailed("dropped".to_owned()))?
        });

        // Transformation is installed while the upstream is still pending.
        let mapped = deferred.map_identity(|old| {
            let name = old
                .principal()
                .map_or_else(|| "anonymous".to_owned(), |p| p.name().to_owned());
            Arc::new(
                PlatformIdentity::builder()
                    .principal(Principal::new(format!("seen:{name}")))
                    .build(),
            )
        });

        assert!(tx.send(Ok(alice())).is_ok());

        let identity = mapped.resolve().await.unwrap();
        assert_eq!(
            identity.principal().map(Principal::name),
            Some("seen:alice")
        );
    }
}
