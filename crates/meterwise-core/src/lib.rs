//! meterwise core: metric categories, label match rules, meter identities and
//! the lock-free accumulators behind them.
//!
//! This crate carries no runtime or config-file dependencies. The runtime
//! crate loads configuration, builds a [`meter::MeterContext`] and wires the
//! subsystem adapters on top of the stores defined here.
//!
//! # Recording paths do not fail
//! `unwrap`, `expect` and `panic!` are denied outside tests. Fallible setup
//! (rule compilation, category parsing) returns [`MeterError`]; recording
//! operations have no error path at all.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod category;
pub mod clock;
pub mod error;
pub mod matching;
pub mod meter;

pub use category::{Category, CategoryGate};
pub use clock::{Clock, SystemClock};
/// Shared result type.
pub use error::{MeterError, Result};
pub use matching::{LabelResolver, MatchType, Rule};
pub use meter::{
    Counter, Counters, Gauge, Gauges, Meter, MeterContext, MeterId, MeterKind, MeterStore,
    Registry, Summaries, Summary, Timer, Timers, Timing,
};

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::MockClock;
