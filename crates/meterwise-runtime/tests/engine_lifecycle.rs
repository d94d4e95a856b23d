#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::thread;
use std::time::Duration;

use meterwise_core::{Category, Counters};
use meterwise_runtime::config::{self, MetricsOptions};
use meterwise_runtime::MetricsEngine;

#[test]
fn engines_are_isolated() {
    let a = MetricsEngine::new(MetricsOptions::default()).unwrap();
    let b = MetricsEngine::new(MetricsOptions::default()).unwrap();

    a.event_bus_metrics().message_sent("orders", false, true);
    assert_eq!(a.registry().series_count(), 1);
    assert!(b.registry().is_empty());
}

#[test]
fn engine_from_yaml_disables_listed_categories() {
    let cfg = config::load_from_str(
        "version: 1\nmetrics:\n  registry_name: test\n  disabled_categories: [EVENT_BUS]\n",
    )
    .unwrap();
    let engine = MetricsEngine::new(cfg.metrics).unwrap();
    assert_eq!(engine.registry_name(), "test");
    assert!(engine.gate().is_disabled(Category::EventBus));

    let bus = engine.event_bus_metrics();
    let mut h = bus.handler_registered("orders");
    for _ in 0..1_000 {
        bus.message_sent("orders", false, true);
        bus.begin_handle_message(&mut h, true);
        bus.end_handle_message(&mut h, None);
    }
    assert!(engine.registry().is_empty());

    engine.pool_metrics().for_instance("worker", "w", 1).submitted().end();
    assert_eq!(engine.registry().series_count(), 2);
}

#[test]
fn custom_stores_render_together() {
    let engine = MetricsEngine::new(MetricsOptions::default()).unwrap();
    let deploys = engine.counters(Category::Verticles, "verticles.deployed", "Deployed verticles", &["name"]);
    let queue = engine.gauges(Category::Verticles, "verticles.queue", "Queued deployments", &[]);
    let sizes = engine.summaries(Category::DatagramSocket, "datagram.bytes", "Datagram sizes", &["local"]);
    let deploy_time = engine.timers(Category::Verticles, "verticles.deploy_time", "Deployment time", &["name"]);
    let undeploys = Counters::new(
        engine.context(),
        Category::Verticles,
        "verticles.undeployed",
        "Undeployed verticles",
        &["name"],
    );

    deploys.get(&["api"]).add(3);
    queue.get(&[]).set(2.0);
    sizes.get(&["0.0.0.0:9999"]).record(80);
    deploy_time.get(&["api"]).record(Duration::from_millis(2));
    deploy_time.start(&["api"]).end();
    undeploys.get(&["api"]).increment();

    let text = engine.render();
    assert!(text.contains("# HELP verticles_deployed_total Deployed verticles"));
    assert!(text.contains("verticles_deployed_total{name=\"api\"} 3"));
    assert!(text.contains("verticles_queue{} 2"));
    assert!(text.contains("datagram_bytes_count{local=\"0.0.0.0:9999\"} 1"));
    assert!(text.contains("# TYPE verticles_deploy_time_micros histogram"));
    assert!(text.contains("verticles_deploy_time_micros_count{name=\"api\"} 2"));
    assert!(text.contains("verticles_undeployed_total{name=\"api\"} 1"));
    assert_eq!(engine.registry().series_count(), 5);
}

#[test]
fn shutdown_stops_exporting_but_handles_keep_working() {
    let engine = MetricsEngine::new(MetricsOptions::default()).unwrap();
    let sent = engine.counters(Category::EventBus, "custom.sent", "", &["address"]);
    let c = sent.get(&["a"]);
    c.increment();
    assert_eq!(engine.registry().series_count(), 1);

    engine.shutdown();
    c.increment();
    assert_eq!(c.count(), 2);
    assert!(engine.registry().is_empty());
    assert_eq!(engine.render(), "");
}

#[test]
fn identities_first_seen_after_shutdown_are_not_exported() {
    let engine = MetricsEngine::new(MetricsOptions::default()).unwrap();
    let sent = engine.counters(Category::EventBus, "custom.sent", "", &["address"]);
    sent.get(&["a"]).increment();

    engine.shutdown();
    sent.get(&["a"]).increment();
    sent.get(&["b"]).increment();
    engine.pool_metrics().for_instance("worker", "late", 4).submitted().end();

    assert_eq!(sent.get(&["b"]).count(), 1);
    assert!(engine.registry().is_closed());
    assert!(engine.registry().is_empty());
    assert_eq!(engine.render(), "");
}

#[test]
fn engine_handles_are_shareable_across_threads() {
    let engine = MetricsEngine::new(MetricsOptions::default()).unwrap();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            thread::spawn(move || {
                let pool = engine.pool_metrics().for_instance("worker", "shared", 8);
                for _ in 0..100 {
                    let t = pool.begin(pool.submitted());
                    pool.end(t, i % 2 == 0);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let pool = engine.pool_metrics().for_instance("worker", "shared", 8);
    assert_eq!(pool.completed(), 800);
    assert_eq!(pool.in_use(), 0.0);
    assert_eq!(pool.queue_size(), 0.0);
    assert_eq!(engine.registry().count_named("pool.completed"), 1);
}
