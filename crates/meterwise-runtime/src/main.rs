//! meterwise demo
//!
//! Builds an engine from `meterwise.yaml` (or the path given as the first
//! argument; defaults when the file is missing), drives a short simulated
//! workload through the adapters and prints the exposition text.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use meterwise_core::error::Result;
use meterwise_runtime::adapters::ReplyFailure;
use meterwise_runtime::{config, MetricsEngine};

const WORKERS: usize = 4;
const TASKS_PER_WORKER: usize = 25;

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "meterwise.yaml".to_string());
    let options = if Path::new(&path).exists() {
        config::load_from_file(&path)?.metrics
    } else {
        tracing::info!(%path, "config file not found, using defaults");
        config::MetricsOptions::default()
    };

    let engine = MetricsEngine::new(options)?;
    tracing::info!(registry = %engine.registry_name(), "meterwise demo starting");

    let mut tasks = Vec::with_capacity(WORKERS + 1);
    for worker in 0..WORKERS {
        tasks.push(tokio::spawn(pool_workload(engine.clone(), worker)));
    }
    tasks.push(tokio::spawn(bus_and_socket_workload(engine.clone())));
    for t in tasks {
        if let Err(e) = t.await {
            tracing::warn!(error = %e, "workload task failed");
        }
    }

    println!("{}", engine.render());
    engine.shutdown();
    Ok(())
}

async fn pool_workload(engine: MetricsEngine, worker: usize) {
    let pool = engine.pool_metrics().for_instance("worker", "demo-worker", WORKERS as i64);
    for n in 0..TASKS_PER_WORKER {
        let queued = pool.submitted();
        tokio::time::sleep(Duration::from_millis(1)).await;
        if (n + worker) % 10 == 0 {
            pool.rejected(queued);
            continue;
        }
        let running = pool.begin(queued);
        tokio::time::sleep(Duration::from_millis(2)).await;
        pool.end(running, true);
    }
}

async fn bus_and_socket_workload(engine: MetricsEngine) {
    let bus = engine.event_bus_metrics();
    let mut handler = bus.handler_registered("orders.new");
    for n in 0..20u64 {
        bus.message_sent("orders.new", false, true);
        bus.message_received("orders.new", false, true, 1);
        bus.begin_handle_message(&mut handler, true);
        tokio::time::sleep(Duration::from_millis(1)).await;
        let failure = (n % 7 == 0).then_some("ValidationError");
        bus.end_handle_message(&mut handler, failure);
        bus.message_written("orders.new", 128 + n * 16);
    }
    bus.reply_failure("orders.new", ReplyFailure::Timeout);
    bus.handler_unregistered(handler);

    let local = SocketAddr::from(([0, 0, 0, 0], 7000));
    let conns = engine.net_server_metrics().for_address(local);
    for port in 40_000..40_005u16 {
        let remote = conns.connected(SocketAddr::from(([10, 0, 0, 1], port)), None);
        conns.bytes_read(&remote, 512);
        conns.bytes_written(&remote, 2_048);
        tokio::time::sleep(Duration::from_millis(1)).await;
        conns.disconnected(&remote);
    }
}
