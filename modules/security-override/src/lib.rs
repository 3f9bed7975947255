#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Security-context override reconciliation for the RestKit pipeline.
//!
//! When application code replaces the request's security context, the
//! platform's deferred identity is transformed to reflect the replacement
//! while keeping the original authentication's credentials and attributes.
pub mod config;
pub mod handler;

pub use config::SecurityOverrideConfig;
pub use handler::{SecurityOverrideCustomizer, SecurityOverrideHandler};
