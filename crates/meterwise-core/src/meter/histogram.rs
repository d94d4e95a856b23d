//! Lock-free fixed-bucket histogram shared by timers and summaries.
//!
//! Buckets are cumulative (`le` semantics): an observation increments every
//! bucket whose bound is greater than or equal to it. Integer units only.

use std::sync::atomic::{AtomicU64, Ordering};

/// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s, 10s
pub const DURATION_BUCKETS_MICROS: [u64; 11] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 10_000_000,
];

/// 64B .. 1MiB in powers of four.
pub const SIZE_BUCKETS_BYTES: [u64; 8] = [
    64, 256, 1_024, 4_096, 16_384, 65_536, 262_144, 1_048_576,
];

#[derive(Debug)]
pub struct AtomicHistogram {
    bounds: &'static [u64],
    count: AtomicU64,
    sum: AtomicU64,
    max: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    pub fn new(bounds: &'static [u64]) -> Self {
        Self {
            bounds,
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            max: AtomicU64::new(0),
            buckets: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn observe(&self, value: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(value, Ordering::Relaxed);
        self.max.fetch_max(value, Ordering::Relaxed);

        for (i, &b) in self.bounds.iter().enumerate() {
            if value <= b {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Sum of observations. Wraps on overflow.
    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn max(&self) -> u64 {
        self.max.load(Ordering::Relaxed)
    }

    /// `(upper bound, cumulative count)` pairs, excluding `+Inf`.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        self.bounds
            .iter()
            .zip(self.buckets.iter())
            .map(|(&le, c)| (le, c.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count(),
            sum: self.sum(),
            max: self.max(),
            buckets: self.buckets(),
        }
    }
}

/// Point-in-time copy of a histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: u64,
    pub max: u64,
    pub buckets: Vec<(u64, u64)>,
}

impl HistogramSnapshot {
    /// Mean observation, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_buckets() {
        let h = AtomicHistogram::new(&SIZE_BUCKETS_BYTES);
        h.observe(10);
        h.observe(300);
        h.observe(5_000_000);

        let snap = h.snapshot();
        assert_eq!(snap.count, 3);
        assert_eq!(snap.sum, 5_000_310);
        assert_eq!(snap.max, 5_000_000);
        assert_eq!(snap.buckets[0], (64, 1));
        assert_eq!(snap.buckets[1], (256, 1));
        assert_eq!(snap.buckets[2], (1_024, 2));
        assert_eq!(snap.buckets.last(), Some(&(1_048_576, 2)));
    }

    #[test]
    fn bound_is_inclusive() {
        let h = AtomicHistogram::new(&DURATION_BUCKETS_MICROS);
        h.observe(100);
        assert_eq!(h.buckets()[0], (100, 1));
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(HistogramSnapshot::default().mean(), 0.0);
    }
}
