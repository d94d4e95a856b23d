use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::Clock;

use super::{Instrument, Meter, MeterKind};

/// Monotonic counter handle.
///
/// Cloning is cheap and clones share the same count. The no-op variant
/// (`Counter::noop()`, also `Default`) ignores every update.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    cell: Option<Arc<AtomicU64>>,
}

impl Counter {
    /// Live counter starting at zero, not attached to any store.
    pub fn new() -> Self {
        Self {
            cell: Some(Arc::new(AtomicU64::new(0))),
        }
    }

    pub const fn noop() -> Self {
        Self { cell: None }
    }

    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    #[inline]
    pub fn add(&self, n: u64) {
        if let Some(c) = &self.cell {
            c.fetch_add(n, Ordering::Relaxed);
        }
    }

    pub fn count(&self) -> u64 {
        self.cell.as_ref().map_or(0, |c| c.load(Ordering::Relaxed))
    }

    pub fn is_noop(&self) -> bool {
        self.cell.is_none()
    }

    /// True when both handles point at the same accumulator. All no-op
    /// handles are the same accumulator.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.cell, &other.cell) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Instrument for Counter {
    const KIND: MeterKind = MeterKind::Counter;

    fn noop() -> Self {
        Counter::noop()
    }

    fn create(_clock: &Arc<dyn Clock>) -> Self {
        Counter::new()
    }

    fn to_meter(&self) -> Meter {
        Meter::Counter(self.clone())
    }
}
