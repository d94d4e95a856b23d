use std::sync::Arc;

use crate::clock::Clock;

use super::histogram::{AtomicHistogram, HistogramSnapshot, SIZE_BUCKETS_BYTES};
use super::{Instrument, Meter, MeterKind};

/// Magnitude distribution handle, used for byte counts per message or read.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    cell: Option<Arc<AtomicHistogram>>,
}

impl Summary {
    pub fn new() -> Self {
        Self {
            cell: Some(Arc::new(AtomicHistogram::new(&SIZE_BUCKETS_BYTES))),
        }
    }

    pub const fn noop() -> Self {
        Self { cell: None }
    }

    #[inline]
    pub fn record(&self, magnitude: u64) {
        if let Some(h) = &self.cell {
            h.observe(magnitude);
        }
    }

    pub fn count(&self) -> u64 {
        self.cell.as_ref().map_or(0, |h| h.count())
    }

    pub fn sum(&self) -> u64 {
        self.cell.as_ref().map_or(0, |h| h.sum())
    }

    pub fn max(&self) -> u64 {
        self.cell.as_ref().map_or(0, |h| h.max())
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        self.cell
            .as_ref()
            .map(|h| h.snapshot())
            .unwrap_or_default()
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

impl Instrument for Summary {
    const KIND: MeterKind = MeterKind::Summary;

    fn noop() -> Self {
        Summary::noop()
    }

    fn create(_clock: &Arc<dyn Clock>) -> Self {
        Summary::new()
    }

    fn to_meter(&self) -> Meter {
        Meter::Summary(self.clone())
    }
}
