use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::Clock;

use super::{Instrument, Meter, MeterKind};

/// Point-in-time value handle.
///
/// Integer deltas (`increment`, `decrement`, `add`) serve in-flight counts and
/// queue depths; `set` stores a pre-computed ratio. The value is an `f64`
/// kept as raw bits, and deltas are applied with a CAS loop so concurrent
/// updates are never lost.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    cell: Option<Arc<AtomicU64>>,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            cell: Some(Arc::new(AtomicU64::new(0f64.to_bits()))),
        }
    }

    pub const fn noop() -> Self {
        Self { cell: None }
    }

    /// Adds one and returns the new value.
    #[inline]
    pub fn increment(&self) -> f64 {
        self.add(1)
    }

    /// Subtracts one and returns the new value.
    #[inline]
    pub fn decrement(&self) -> f64 {
        self.add(-1)
    }

    /// Applies `delta` and returns the new value (0 for a no-op gauge).
    pub fn add(&self, delta: i64) -> f64 {
        let Some(cell) = &self.cell else {
            return 0.0;
        };
        let delta = delta as f64;
        let prev = cell
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + delta).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        f64::from_bits(prev) + delta
    }

    /// Overwrites the value. Non-finite values are dropped.
    pub fn set(&self, value: f64) {
        let Some(cell) = &self.cell else {
            return;
        };
        if !value.is_finite() {
            tracing::warn!(value, "ignoring non-finite gauge value");
            return;
        }
        cell.store(value.to_bits(), Ordering::Release);
    }

    pub fn value(&self) -> f64 {
        self.cell
            .as_ref()
            .map_or(0.0, |c| f64::from_bits(c.load(Ordering::Acquire)))
    }

    pub fn is_noop(&self) -> bool {
        self.cell.is_none()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.cell, &other.cell) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Instrument for Gauge {
    const KIND: MeterKind = MeterKind::Gauge;

    fn noop() -> Self {
        Gauge::noop()
    }

    fn create(_clock: &Arc<dyn Clock>) -> Self {
        Gauge::new()
    }

    fn to_meter(&self) -> Meter {
        Meter::Gauge(self.clone())
    }
}
