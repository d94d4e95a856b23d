use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;

use super::histogram::{AtomicHistogram, HistogramSnapshot, DURATION_BUCKETS_MICROS};
use super::{Instrument, Meter, MeterKind};

#[derive(Debug)]
struct TimerCell {
    hist: AtomicHistogram,
    clock: Arc<dyn Clock>,
}

/// Duration distribution handle (microsecond resolution).
///
/// `start()` hands out a [`Timing`] per unit of work; any number of timings
/// may be in flight on the same timer.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    cell: Option<Arc<TimerCell>>,
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            cell: Some(Arc::new(TimerCell {
                hist: AtomicHistogram::new(&DURATION_BUCKETS_MICROS),
                clock,
            })),
        }
    }

    pub const fn noop() -> Self {
        Self { cell: None }
    }

    /// Begin timing. A no-op timer returns a no-op token without reading the
    /// clock.
    pub fn start(&self) -> Timing {
        match &self.cell {
            Some(cell) => Timing {
                inner: Some((Arc::clone(cell), cell.clock.now())),
            },
            None => Timing::noop(),
        }
    }

    pub fn record(&self, elapsed: Duration) {
        if let Some(cell) = &self.cell {
            cell.record(elapsed);
        }
    }

    pub fn count(&self) -> u64 {
        self.cell.as_ref().map_or(0, |c| c.hist.count())
    }

    /// Total recorded time.
    pub fn total(&self) -> Duration {
        Duration::from_micros(self.cell.as_ref().map_or(0, |c| c.hist.sum()))
    }

    pub fn max(&self) -> Duration {
        Duration::from_micros(self.cell.as_ref().map_or(0, |c| c.hist.max()))
    }

    /// Histogram in microseconds.
    pub fn snapshot(&self) -> HistogramSnapshot {
        self.cell
            .as_ref()
            .map(|c| c.hist.snapshot())
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

impl TimerCell {
    fn record(&self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.hist.observe(micros);
    }
}

impl Instrument for Timer {
    const KIND: MeterKind = MeterKind::Timer;

    fn noop() -> Self {
        Timer::noop()
    }

    fn create(clock: &Arc<dyn Clock>) -> Self {
        Timer::new(Arc::clone(clock))
    }

    fn to_meter(&self) -> Meter {
        Meter::Timer(self.clone())
    }
}

/// Single-use token returned by [`Timer::start`].
///
/// `end` consumes the token, so a timing is recorded at most once. Dropping
/// it without calling `end` records nothing.
#[derive(Debug)]
#[must_use = "a timing records nothing unless `end` is called"]
pub struct Timing {
    inner: Option<(Arc<TimerCell>, Instant)>,
}

impl Timing {
    pub const fn noop() -> Self {
        Self { inner: None }
    }

    /// Record the time elapsed since `start` into the timer.
    pub fn end(self) {
        if let Some((cell, started)) = self.inner {
            let now = cell.clock.now();
            if now < started {
                tracing::warn!("clock went backwards while timing, recording zero");
            }
            cell.record(now.saturating_duration_since(started));
        }
    }

    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }
}
