//! Lazily populated meter stores.
//!
//! A store declares one metric's shape (category, name, description, label
//! names). `get` resolves raw label values through the [`LabelResolver`] and
//! returns the accumulator for the resulting identity, creating and
//! registering it on first use.

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::category::{Category, CategoryGate};
use crate::clock::{Clock, SystemClock};
use crate::matching::LabelResolver;

use super::{Counter, Gauge, Instrument, MeterId, Registry, Summary, Timer, Timing};

/// Everything a store needs from its engine, cheap to clone.
#[derive(Debug, Clone)]
pub struct MeterContext {
    pub resolver: Arc<LabelResolver>,
    pub gate: CategoryGate,
    pub registry: Arc<Registry>,
    pub clock: Arc<dyn Clock>,
}

impl MeterContext {
    pub fn new(resolver: Arc<LabelResolver>, gate: CategoryGate, registry: Arc<Registry>) -> Self {
        Self {
            resolver,
            gate,
            registry,
            clock: Arc::new(SystemClock::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for MeterContext {
    fn default() -> Self {
        Self::new(
            Arc::new(LabelResolver::empty()),
            CategoryGate::new(),
            Arc::new(Registry::new()),
        )
    }
}

pub type Counters = MeterStore<Counter>;
pub type Gauges = MeterStore<Gauge>;
pub type Timers = MeterStore<Timer>;
pub type Summaries = MeterStore<Summary>;

/// Concurrent map from resolved label values to one accumulator kind.
pub struct MeterStore<M: Instrument> {
    category: Category,
    name: Arc<str>,
    description: Arc<str>,
    label_names: Arc<[&'static str]>,
    /// Gate decision, taken once: the gate never changes after setup.
    disabled: bool,
    resolver: Arc<LabelResolver>,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    meters: DashMap<Vec<String>, M>,
}

impl<M: Instrument> MeterStore<M> {
    pub fn new(
        ctx: &MeterContext,
        category: Category,
        name: &str,
        description: &str,
        label_names: &[&'static str],
    ) -> Self {
        Self {
            category,
            name: Arc::from(name),
            description: Arc::from(description),
            label_names: Arc::from(label_names),
            disabled: ctx.gate.is_disabled(category),
            resolver: Arc::clone(&ctx.resolver),
            registry: Arc::clone(&ctx.registry),
            clock: Arc::clone(&ctx.clock),
            meters: DashMap::new(),
        }
    }

    /// Accumulator for `values`, given in declared label order.
    ///
    /// Returns the shared no-op handle when the category is disabled, without
    /// touching the resolver or the map.
    ///
    /// Every enabled call resolves the labels into an owned key, so even a
    /// hit allocates one `Vec<String>`. Callers on a hot path with fixed
    /// labels should keep the returned handle rather than call `get` again.
    ///
    /// # Panics
    ///
    /// If `values.len()` differs from the number of declared labels. That is
    /// a wiring bug in the caller.
    pub fn get(&self, values: &[&str]) -> M {
        assert_eq!(
            values.len(),
            self.label_names.len(),
            "metric `{}` declares labels {:?}",
            self.name,
            self.label_names
        );
        if self.disabled {
            return M::noop();
        }

        let key: Vec<String> = self
            .label_names
            .iter()
            .zip(values)
            .map(|(label, raw)| self.resolver.resolve(self.category, label, raw).to_owned())
            .collect();

        if let Some(m) = self.meters.get(&key) {
            return m.value().clone();
        }

        match self.meters.entry(key) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e) => {
                let meter = M::create(&self.clock);
                let id = MeterId::new(
                    self.category,
                    Arc::clone(&self.name),
                    Arc::clone(&self.label_names),
                    e.key().clone(),
                );
                self.registry
                    .register(id, Arc::clone(&self.description), meter.to_meter());
                e.insert(meter.clone());
                meter
            }
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn label_names(&self) -> &[&'static str] {
        &self.label_names
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Number of live identities created so far.
    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }
}

impl MeterStore<Timer> {
    /// Shorthand for `get(values).start()`.
    pub fn start(&self, values: &[&str]) -> Timing {
        self.get(values).start()
    }
}

impl<M: Instrument> fmt::Debug for MeterStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeterStore")
            .field("kind", &M::KIND)
            .field("category", &self.category)
            .field("name", &self.name)
            .field("label_names", &self.label_names)
            .field("disabled", &self.disabled)
            .field("len", &self.meters.len())
            .finish()
    }
}
