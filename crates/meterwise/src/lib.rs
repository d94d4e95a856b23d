//! Top-level facade crate for meterwise.
//!
//! Re-exports the core types and the runtime library so users can depend on a
//! single crate.

pub mod core {
    pub use meterwise_core::*;
}

pub mod runtime {
    pub use meterwise_runtime::*;
}

pub use meterwise_core::{Category, MeterError, Result, Rule};
pub use meterwise_runtime::config::MetricsOptions;
pub use meterwise_runtime::MetricsEngine;
