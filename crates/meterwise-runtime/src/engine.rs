//! The metrics engine: one explicitly constructed object per application.
//!
//! - Compiles the label rules once and derives the category gate.
//! - Owns the registry every store registers into.
//! - Hands out stores and subsystem adapters bound to that context.
//!
//! Engines share nothing, so several can live in one process (tests do).

use std::sync::Arc;

use meterwise_core::error::Result;
use meterwise_core::{
    Category, CategoryGate, Clock, Counters, Gauges, LabelResolver, MeterContext, Registry,
    Summaries, Timers,
};

use crate::adapters::{EventBusMetrics, NetServerMetrics, PoolMetrics};
use crate::config::MetricsOptions;

#[derive(Debug, Clone)]
pub struct MetricsEngine {
    inner: Arc<EngineInner>,
}

#[derive(Debug)]
struct EngineInner {
    registry_name: String,
    ctx: MeterContext,
    pool: PoolMetrics,
    event_bus: EventBusMetrics,
    net_server: NetServerMetrics,
    http_server: NetServerMetrics,
}

impl MetricsEngine {
    /// Build an engine. Fails when a rule pattern does not compile.
    pub fn new(options: MetricsOptions) -> Result<Self> {
        Self::builder().options(options).build()
    }

    pub fn builder() -> MetricsEngineBuilder {
        MetricsEngineBuilder::default()
    }

    /// Store factories. Each store consults the gate once, here. Two stores
    /// created under the same name share registry series with whichever
    /// registered first, so create each store once and keep it.
    pub fn counters(
        &self,
        category: Category,
        name: &str,
        description: &str,
        label_names: &[&'static str],
    ) -> Counters {
        Counters::new(&self.inner.ctx, category, name, description, label_names)
    }

    pub fn gauges(
        &self,
        category: Category,
        name: &str,
        description: &str,
        label_names: &[&'static str],
    ) -> Gauges {
        Gauges::new(&self.inner.ctx, category, name, description, label_names)
    }

    pub fn timers(
        &self,
        category: Category,
        name: &str,
        description: &str,
        label_names: &[&'static str],
    ) -> Timers {
        Timers::new(&self.inner.ctx, category, name, description, label_names)
    }

    pub fn summaries(
        &self,
        category: Category,
        name: &str,
        description: &str,
        label_names: &[&'static str],
    ) -> Summaries {
        Summaries::new(&self.inner.ctx, category, name, description, label_names)
    }

    /// Adapters are built with the engine; every call returns a handle to
    /// the same stores.
    pub fn pool_metrics(&self) -> PoolMetrics {
        self.inner.pool.clone()
    }

    pub fn event_bus_metrics(&self) -> EventBusMetrics {
        self.inner.event_bus.clone()
    }

    pub fn net_server_metrics(&self) -> NetServerMetrics {
        self.inner.net_server.clone()
    }

    pub fn http_server_metrics(&self) -> NetServerMetrics {
        self.inner.http_server.clone()
    }

    pub fn context(&self) -> &MeterContext {
        &self.inner.ctx
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.ctx.registry
    }

    pub fn resolver(&self) -> &LabelResolver {
        &self.inner.ctx.resolver
    }

    pub fn gate(&self) -> CategoryGate {
        self.inner.ctx.gate
    }

    pub fn registry_name(&self) -> &str {
        &self.inner.registry_name
    }

    /// Prometheus text exposition of every registered series.
    pub fn render(&self) -> String {
        self.registry().render()
    }

    /// Stop exporting. Handles still held by callers keep accepting updates,
    /// and identities first seen afterwards are never registered, so nothing
    /// recorded after shutdown is rendered.
    pub fn shutdown(&self) {
        tracing::info!(
            registry = %self.inner.registry_name,
            series = self.registry().series_count(),
            "metrics engine shutting down"
        );
        self.registry().close();
        self.registry().clear();
    }
}

#[derive(Debug, Default)]
pub struct MetricsEngineBuilder {
    options: MetricsOptions,
    clock: Option<Arc<dyn Clock>>,
}

impl MetricsEngineBuilder {
    pub fn options(mut self, options: MetricsOptions) -> Self {
        self.options = options;
        self
    }

    /// Time source for timers. Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<MetricsEngine> {
        let options = self.options;
        options.validate()?;

        let resolver = LabelResolver::new(&options.label_matches)?;
        let gate = if options.enabled {
            options.disabled_categories.iter().copied().collect()
        } else {
            CategoryGate::all_disabled()
        };

        let mut ctx = MeterContext::new(Arc::new(resolver), gate, Arc::new(Registry::new()));
        if let Some(clock) = self.clock {
            ctx = ctx.with_clock(clock);
        }

        tracing::info!(
            registry = %options.registry_name,
            enabled = options.enabled,
            rules = ctx.resolver.rule_count(),
            disabled = ?gate.disabled().collect::<Vec<_>>(),
            "metrics engine built"
        );

        Ok(MetricsEngine {
            inner: Arc::new(EngineInner {
                registry_name: options.registry_name,
                pool: PoolMetrics::new(&ctx),
                event_bus: EventBusMetrics::new(&ctx),
                net_server: NetServerMetrics::net(&ctx),
                http_server: NetServerMetrics::http(&ctx),
                ctx,
            }),
        })
    }
}
