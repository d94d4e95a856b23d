//! Accumulators, meter identities, stores and the in-process registry.
//!
//! Every accumulator kind is a cheap handle that is either live (backed by a
//! shared atomic cell) or the no-op variant handed out for disabled
//! categories. Call sites never branch on which one they hold.

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod id;
pub mod registry;
pub mod store;
pub mod summary;
pub mod timer;

use std::fmt;
use std::sync::Arc;

use crate::clock::Clock;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::HistogramSnapshot;
pub use id::MeterId;
pub use registry::Registry;
pub use store::{Counters, Gauges, MeterContext, MeterStore, Summaries, Timers};
pub use summary::Summary;
pub use timer::{Timer, Timing};

/// Accumulator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterKind {
    Counter,
    Gauge,
    Timer,
    Summary,
}

impl MeterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeterKind::Counter => "counter",
            MeterKind::Gauge => "gauge",
            MeterKind::Timer => "timer",
            MeterKind::Summary => "summary",
        }
    }
}

impl fmt::Display for MeterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any accumulator, as held by the registry.
#[derive(Debug, Clone)]
pub enum Meter {
    Counter(Counter),
    Gauge(Gauge),
    Timer(Timer),
    Summary(Summary),
}

impl Meter {
    pub fn kind(&self) -> MeterKind {
        match self {
            Meter::Counter(_) => MeterKind::Counter,
            Meter::Gauge(_) => MeterKind::Gauge,
            Meter::Timer(_) => MeterKind::Timer,
            Meter::Summary(_) => MeterKind::Summary,
        }
    }
}

/// Capability shared by all handle kinds so that [`MeterStore`] can create
/// and register them generically.
pub trait Instrument: Clone + Send + Sync + 'static {
    const KIND: MeterKind;

    /// The shared no-op handle.
    fn noop() -> Self;

    /// A fresh live accumulator.
    fn create(clock: &Arc<dyn Clock>) -> Self;

    /// Registry view of this handle (shares the same cell).
    fn to_meter(&self) -> Meter;
}
