//! Handler chain: phases, handlers, customizers and chain assembly.
//!
//! The chain is assembled once per pipeline build and shared across
//! requests: for each [`Phase`] in execution order, every registered
//! [`HandlerChainCustomizer`] contributes its handlers in registration
//! order.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::ServerError;

/// A single stage of request processing.
#[async_trait]
pub trait ServerHandler: Send + Sync {
    /// Process the request.
    ///
    /// # Errors
    ///
    /// A handler error stops the chain and propagates to the pipeline's
    /// standard error path.
    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), ServerError>;
}

/// Fixed points of the request-processing pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Request-scoped state is created.
    RequestInit,
    /// The platform establishes the security context.
    Security,
    /// After security establishment, before resource invocation.
    PreInvocation,
    /// The resource method runs.
    Invocation,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [
        Phase::RequestInit,
        Phase::Security,
        Phase::PreInvocation,
        Phase::Invocation,
    ];
}

/// Contributes handlers to the chain at fixed phases.
pub trait HandlerChainCustomizer: Send + Sync {
    /// Handlers this customizer contributes at `phase`.
    fn handlers(&self, phase: Phase) -> Vec<Arc<dyn ServerHandler>>;
}

/// Ordered handler chain, built once and shared across requests.
pub struct HandlerChain {
    handlers: Vec<Arc<dyn ServerHandler>>,
}

impl HandlerChain {
    /// Create a new `HandlerChain` builder.
    #[must_use]
    pub fn builder() -> HandlerChainBuilder {
        HandlerChainBuilder::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler in chain order within the request's single logical
    /// thread of control.
    ///
    /// # Errors
    ///
    /// The first handler error stops the chain and is returned unchanged.
    pub async fn run(&self, ctx: &mut RequestContext) -> Result<(), ServerError> {
        for handler in &self.handlers {
            handler.handle(ctx).await?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct HandlerChainBuilder {
    customizers: Vec<Arc<dyn HandlerChainCustomizer>>,
}

impl HandlerChainBuilder {
    #[must_use]
    pub fn customizer(mut self, customizer: Arc<dyn HandlerChainCustomizer>) -> Self {
        self.customizers.push(customizer);
        self
    }

    /// Assemble the chain from the registered customizers.
    #[must_use]
    pub fn build(self) -> HandlerChain {
        let mut handlers: Vec<Arc<dyn ServerHandler>> = Vec::new();
        for phase in Phase::ALL {
            for customizer in &self.customizers {
                handlers.extend(customizer.handlers(phase));
            }
        }
        debug!(handler_count = handlers.len(), "handler chain assembled");
        HandlerChain { handlers }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Handler that records its tag into a shared trace.
    struct Recording {
        tag: &'static str,
        trace: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ServerHandler for Recording {
        async fn handle(&self, _ctx: &mut RequestContext) -> Result<(), ServerError> {
            self.trace.lock().unwrap().push(self.tag);
            Ok(())
        }
    }

    /// Customizer contributing one recording handler at a single phase.
    struct At {
        phase: Phase,
        tag: &'static str,
        trace: Arc<Mutex<Vec<&'static str>>>,
    }

    impl HandlerChainCustomizer for At {
        fn handlers(&self, phase: Phase) -> Vec<Arc<dyn ServerHandler>> {
            if phase == self.phase {
                vec![Arc::new(Recording {
                    tag: self.tag,
                    trace: Arc::clone(&self.trace),
                })]
            } else {
                Vec::new()
            }
        }
    }

    struct Failing;

    #[async_trait]
    impl ServerHandler for Failing {
        async fn handle(&self, _ctx: &mut RequestContext) -> Result<(), ServerError> {
            Err(ServerError::Internal("boom".to_owned()))
        }
    }

    #[tokio::test]
    async fn handlers_run_in_phase_order_regardless_of_registration_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let chain = HandlerChain::builder()
            .customizer(Arc::new(At {
                phase: Phase::PreInvocation,
                tag: "pre-invocation",
                trace: Arc::clone(&trace),
            }))
            .customizer(Arc::new(At {
                phase: Phase::Security,
                tag: "security",
                trace: Arc::clone(&trace),
            }))
            .customizer(Arc::new(At {
                phase: Phase::RequestInit,
                tag: "init",
                trace: Arc::clone(&trace),
            }))
            .build();

        assert_eq!(chain.len(), 3);

        let mut ctx = RequestContext::new();
        chain.run(&mut ctx).await.unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["init", "security", "pre-invocation"]
        );
    }

    #[tokio::test]
    async fn registration_order_breaks_ties_within_a_phase() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let chain = HandlerChain::builder()
            .customizer(Arc::new(At {
                phase: Phase::PreInvocation,
                tag: "first",
                trace: Arc::clone(&trace),
            }))
            .customizer(Arc::new(At {
                phase: Phase::PreInvocation,
                tag: "second",
                trace: Arc::clone(&trace),
            }))
            .build();

        let mut ctx = RequestContext::new();
        chain.run(&mut ctx).await.unwrap();

        assert_eq!(*trace.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn a_handler_error_stops_the_chain() {
        struct FailingAt;

        impl HandlerChainCustomizer for FailingAt {
            fn handlers(&self, phase: Phase) -> Vec<Arc<dyn ServerHandler>> {
                if phase == Phase::Security {
                    vec![Arc::new(Failing)]
                } else {
                    Vec::new()
                }
            }
        }

        let trace = Arc::new(Mutex::new(Vec::new()));
        let chain = HandlerChain::builder()
            .customizer(Arc::new(FailingAt))
            .customizer(Arc::new(At {
                phase: Phase::PreInvocation,
                tag: "never",
                trace: Arc::clone(&trace),
            }))
            .build();

        let mut ctx = RequestContext::new();
        let err = chain.run(&mut ctx).await.unwrap_err();

        assert!(matches!(err, ServerError::Internal(_)));
        assert!(trace.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_builder_yields_empty_chain() {
        let chain = HandlerChain::builder().build();
        assert!(chain.is_empty());
    }
}
