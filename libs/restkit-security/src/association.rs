//! Request-scoped association between a request and its deferred identity.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::deferred::DeferredIdentity;
use crate::identity::PlatformIdentity;

/// Request-scoped holder of the current deferred identity.
///
/// Created once per request at request start and discarded with the rest of
/// the request-scoped state. The slot is replaced wholesale and atomically;
/// later pipeline stages never observe a half-updated association. Consumers
/// that already captured the previous deferred value keep resolving it.
pub struct CurrentIdentityAssociation {
    deferred: ArcSwap<DeferredIdentity>,
}

impl CurrentIdentityAssociation {
    #[must_use]
    pub fn new(initial: DeferredIdentity) -> Self {
        Self {
            deferred: ArcSwap::from_pointee(initial),
        }
    }

    /// Association resolving to the anonymous identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(DeferredIdentity::resolved(Arc::new(
            PlatformIdentity::anonymous(),
        )))
    }

    /// Current deferred identity (cheap handle clone).
    #[must_use]
    pub fn deferred_identity(&self) -> DeferredIdentity {
        (**self.deferred.load()).clone()
    }

    /// Replace the deferred identity wholesale.
    pub fn set_identity(&self, identity: DeferredIdentity) {
        self.deferred.store(Arc::new(identity));
    }
}

impl Default for CurrentIdentityAssociation {
    fn default() -> Self {
        Self::anonymous()
    }
}
