#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request pipeline for the RestKit server framework.
pub mod context;
pub mod error;
pub mod handler;
pub mod security;
pub mod security_context;

pub use context::RequestContext;
pub use error::ServerError;
pub use handler::{
    HandlerChain, HandlerChainBuilder, HandlerChainCustomizer, Phase, ServerHandler,
};
pub use security::{SecurityContextSetupHandler, SecuritySetupCustomizer};
pub use security_context::{PlatformSecurityContext, SecurityContext, StaticSecurityContext};
