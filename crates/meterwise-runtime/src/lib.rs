//! meterwise runtime library entry.
//!
//! Loads metrics configuration, builds the [`engine::MetricsEngine`] and
//! provides the pool, event bus and server socket adapters on top of the
//! core stores. Consumed by the demo binary (`main.rs`) and by integration
//! tests.

pub mod adapters;
pub mod config;
pub mod engine;

pub use engine::{MetricsEngine, MetricsEngineBuilder};
