//! Time source used by timers.
//!
//! `SystemClock` is monotonic and used in production. `MockClock` lets tests
//! drive time explicitly; it is available in test builds and with the
//! `test-helpers` feature:
//!
//! ```toml
//! [dev-dependencies]
//! meterwise-core = { path = "...", features = ["test-helpers"] }
//! ```

use std::fmt::Debug;
use std::time::Instant;

/// Port for obtaining the current instant.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// `Instant::now()` based clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-helpers"))]
mod mock {
    use std::sync::{Arc, Mutex, MutexGuard};
    use std::time::{Duration, Instant};

    use super::Clock;

    /// Manually driven clock. Clones share the same time.
    ///
    /// ```
    /// use meterwise_core::clock::{Clock, MockClock};
    /// use std::time::{Duration, Instant};
    ///
    /// let start = Instant::now();
    /// let clock = MockClock::new(start);
    /// clock.advance(Duration::from_millis(5));
    /// assert_eq!(clock.now(), start + Duration::from_millis(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MockClock {
        current: Arc<Mutex<Instant>>,
    }

    impl MockClock {
        pub fn new(start: Instant) -> Self {
            Self {
                current: Arc::new(Mutex::new(start)),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.lock() += by;
        }

        pub fn set(&self, instant: Instant) {
            *self.lock() = instant;
        }

        // Poisoning ignored: the guarded Instant is always valid.
        fn lock(&self) -> MutexGuard<'_, Instant> {
            self.current.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.now() > t1);
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let start = Instant::now();
        let clock = MockClock::new(start);
        let other = clock.clone();

        other.advance(Duration::from_secs(3));
        assert_eq!(clock.now(), start + Duration::from_secs(3));

        clock.set(start);
        assert_eq!(other.now(), start);
    }
}
