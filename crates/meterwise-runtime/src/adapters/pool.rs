//! Named pool instrumentation.
//!
//! A unit of work goes through `submitted -> (rejected | begin) -> end`.
//! Callers make exactly one terminal call per `submitted`.

use std::sync::Arc;

use meterwise_core::{Category, Counters, Gauge, Gauges, MeterContext, Timers, Timing};

const LABELS: [&str; 2] = ["pool.type", "pool.name"];

#[derive(Debug)]
struct PoolStores {
    queue_delay: Timers,
    queue_size: Gauges,
    usage: Timers,
    in_use: Gauges,
    ratio: Gauges,
    completed: Counters,
}

/// Stores shared by every pool; cheap to clone.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    stores: Arc<PoolStores>,
}

impl PoolMetrics {
    pub fn new(ctx: &MeterContext) -> Self {
        let c = Category::NamedPools;
        Self {
            stores: Arc::new(PoolStores {
                queue_delay: Timers::new(ctx, c, "pool.queue.delay", "Queue time for a resource", &LABELS),
                queue_size: Gauges::new(
                    ctx,
                    c,
                    "pool.queue.size",
                    "Number of elements waiting for a resource",
                    &LABELS,
                ),
                usage: Timers::new(ctx, c, "pool.usage", "Time using a resource", &LABELS),
                in_use: Gauges::new(ctx, c, "pool.in_use", "Number of resources used", &LABELS),
                ratio: Gauges::new(
                    ctx,
                    c,
                    "pool.ratio",
                    "Pool usage ratio, only present if the maximum pool size is known",
                    &LABELS,
                ),
                completed: Counters::new(
                    ctx,
                    c,
                    "pool.completed",
                    "Number of elements done with the resource",
                    &LABELS,
                ),
            }),
        }
    }

    /// Handle for one pool. `max_size <= 0` means the capacity is unknown and
    /// the ratio gauge is never set.
    pub fn for_instance(&self, pool_type: &str, pool_name: &str, max_size: i64) -> PoolInstance {
        PoolInstance {
            stores: Arc::clone(&self.stores),
            pool_type: pool_type.to_string(),
            pool_name: pool_name.to_string(),
            max_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolInstance {
    stores: Arc<PoolStores>,
    pool_type: String,
    pool_name: String,
    max_size: i64,
}

impl PoolInstance {
    fn labels(&self) -> [&str; 2] {
        [self.pool_type.as_str(), self.pool_name.as_str()]
    }

    /// Work queued: queue size +1 and queue delay starts.
    pub fn submitted(&self) -> Timing {
        let l = self.labels();
        self.stores.queue_size.get(&l).increment();
        self.stores.queue_delay.start(&l)
    }

    /// Work refused before it got a resource.
    pub fn rejected(&self, submitted: Timing) {
        self.stores.queue_size.get(&self.labels()).decrement();
        submitted.end();
    }

    /// Work got a resource: leaves the queue and starts using it.
    pub fn begin(&self, submitted: Timing) -> Timing {
        let l = self.labels();
        self.stores.queue_size.get(&l).decrement();
        submitted.end();
        let in_use = self.stores.in_use.get(&l);
        in_use.increment();
        self.check_ratio(&in_use);
        self.stores.usage.start(&l)
    }

    /// Work released its resource. Completion is counted whatever the outcome.
    pub fn end(&self, begun: Timing, succeeded: bool) {
        let l = self.labels();
        let in_use = self.stores.in_use.get(&l);
        in_use.decrement();
        self.check_ratio(&in_use);
        begun.end();
        self.stores.completed.get(&l).increment();
        tracing::trace!(pool = %self.pool_name, succeeded, "pool work ended");
    }

    /// Publish `in_use / max_size`. The value is re-read after each `set`
    /// and published again if it moved, so the last writer always leaves the
    /// ratio of the settled in-use count. Each extra pass needs another
    /// thread's update in between, so the loop ends once the pool goes quiet.
    fn check_ratio(&self, in_use: &Gauge) {
        if self.max_size <= 0 {
            return;
        }
        let ratio = self.stores.ratio.get(&self.labels());
        let max = self.max_size as f64;
        let mut current = in_use.value();
        loop {
            ratio.set(current / max);
            let now = in_use.value();
            if now == current {
                return;
            }
            current = now;
        }
    }

    pub fn pool_type(&self) -> &str {
        &self.pool_type
    }

    pub fn pool_name(&self) -> &str {
        &self.pool_name
    }

    pub fn max_size(&self) -> i64 {
        self.max_size
    }

    pub fn queue_size(&self) -> f64 {
        self.stores.queue_size.get(&self.labels()).value()
    }

    pub fn in_use(&self) -> f64 {
        self.stores.in_use.get(&self.labels()).value()
    }

    pub fn completed(&self) -> u64 {
        self.stores.completed.get(&self.labels()).count()
    }
}
