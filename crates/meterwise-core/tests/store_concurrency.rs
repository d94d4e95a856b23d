//! Concurrent first access and gating across stores sharing one registry.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use meterwise_core::{
    Category, CategoryGate, Clock, Counters, Gauges, LabelResolver, MeterContext, Registry, Rule,
    Timers,
};

/// Advances by a fixed step on every read.
#[derive(Debug)]
struct SteppingClock {
    base: Instant,
    step: Duration,
    reads: AtomicU64,
}

impl Clock for SteppingClock {
    fn now(&self) -> Instant {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        self.base + self.step * n as u32
    }
}

fn context(gate: CategoryGate) -> MeterContext {
    MeterContext::new(
        Arc::new(LabelResolver::new(&Rule::defaults()).unwrap()),
        gate,
        Arc::new(Registry::new()),
    )
}

#[test]
fn racing_threads_share_one_accumulator_per_identity() {
    const THREADS: usize = 32;
    let ctx = context(CategoryGate::new());
    let conns = Arc::new(Gauges::new(
        &ctx,
        Category::NetServer,
        "net.server.connections",
        "open connections",
        &["local", "remote"],
    ));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let conns = Arc::clone(&conns);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                // Every remote collapses to the default alias.
                let remote = format!("10.1.0.{i}:4000");
                barrier.wait();
                let g = conns.get(&["0.0.0.0:7000", remote.as_str()]);
                g.increment();
                g
            })
        })
        .collect();
    let gauges: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(gauges.iter().all(|g| g.ptr_eq(&gauges[0])));
    assert_eq!(gauges[0].value(), THREADS as f64);
    assert_eq!(conns.len(), 1);
    assert_eq!(ctx.registry.series_count(), 1);
}

#[test]
fn distinct_identities_are_registered_once_each() {
    let ctx = context(CategoryGate::new());
    let sent = Arc::new(Counters::new(
        &ctx,
        Category::EventBus,
        "eventbus.sent",
        "messages sent",
        &["address", "side"],
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sent = Arc::clone(&sent);
            thread::spawn(move || {
                for n in 0..100 {
                    let address = format!("addr-{}", n % 10);
                    sent.get(&[address.as_str(), "local"]).increment();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(sent.len(), 10);
    assert_eq!(ctx.registry.count_named("eventbus.sent"), 10);
    assert_eq!(sent.get(&["addr-3", "local"]).count(), 80);
}

#[test]
fn disabled_category_hands_out_one_shared_noop() {
    let mut gate = CategoryGate::new();
    gate.disable(Category::EventBus);
    let ctx = context(gate);

    let sent = Counters::new(&ctx, Category::EventBus, "eventbus.sent", "", &["address"]);
    let pool = Counters::new(&ctx, Category::NamedPools, "pool.completed", "", &["pool.type", "pool.name"]);

    let a = sent.get(&["orders"]);
    let b = sent.get(&["billing"]);
    a.add(5);
    assert!(a.is_noop());
    assert!(a.ptr_eq(&b));
    assert_eq!(b.count(), 0);
    assert!(sent.is_empty());

    pool.get(&["worker", "w"]).increment();
    assert_eq!(pool.len(), 1);
    assert_eq!(ctx.registry.series_count(), 1);
}

#[test]
fn timers_use_the_context_clock() {
    let clock = SteppingClock {
        base: Instant::now(),
        step: Duration::from_millis(7),
        reads: AtomicU64::new(0),
    };
    let ctx = context(CategoryGate::new()).with_clock(Arc::new(clock));
    let processing = Timers::new(
        &ctx,
        Category::EventBus,
        "eventbus.processing_time",
        "handler processing time",
        &["address"],
    );

    let t = processing.start(&["orders"]);
    t.end();

    let timer = processing.get(&["orders"]);
    assert_eq!(timer.count(), 1);
    assert_eq!(timer.total(), Duration::from_millis(7));
    assert!(ctx.registry.render().contains("eventbus_processing_time_micros_sum{address=\"orders\"} 7000"));
}

#[test]
fn visiting_series_while_recording_new_identities() {
    let ctx = context(CategoryGate::new());
    let sent = Counters::new(&ctx, Category::EventBus, "eventbus.sent", "", &["address"]);
    for n in 0..64 {
        let address = format!("seed-{n}");
        sent.get(&[address.as_str()]).increment();
    }

    let mut visited = 0;
    ctx.registry.for_each(|id, _| {
        visited += 1;
        let address = format!("new-{}", id.label_values()[0]);
        sent.get(&[address.as_str()]).increment();
    });

    assert_eq!(visited, 64);
    assert_eq!(sent.len(), 128);
    assert_eq!(ctx.registry.series_count(), 128);
}
