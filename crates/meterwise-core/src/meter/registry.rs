//! In-process aggregation backend.
//!
//! Stores register each accumulator once, under its resolved identity. The
//! registry can render everything in Prometheus text exposition format;
//! shipping that text anywhere is left to the embedding application.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::histogram::HistogramSnapshot;
use super::{Meter, MeterId};

#[derive(Debug, Clone)]
struct Registered {
    description: Arc<str>,
    meter: Meter,
}

#[derive(Debug, Default)]
pub struct Registry {
    series: DashMap<MeterId, Registered>,
    closed: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            series: DashMap::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Register `meter` under `id`. Returns false, keeping the existing
    /// series, when `id` is already taken or the registry is closed.
    pub fn register(&self, id: MeterId, description: Arc<str>, meter: Meter) -> bool {
        if self.is_closed() {
            tracing::debug!(%id, "registry closed, series not exported");
            return false;
        }
        match self.series.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(e) => {
                tracing::warn!(id = %e.key(), "series already registered, keeping the first one");
                false
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                tracing::debug!(id = %e.key(), kind = %meter.kind(), "series registered");
                e.insert(Registered { description, meter });
                true
            }
        }
    }

    pub fn get(&self, id: &MeterId) -> Option<Meter> {
        self.series.get(id).map(|r| r.value().meter.clone())
    }

    /// Look a series up by metric name and resolved label values.
    pub fn find(&self, name: &str, label_values: &[&str]) -> Option<Meter> {
        self.series
            .iter()
            .find(|r| {
                let id = r.key();
                id.name() == name
                    && id.label_values().len() == label_values.len()
                    && id.label_values().iter().zip(label_values).all(|(a, b)| a == b)
            })
            .map(|r| r.value().meter.clone())
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of series registered under metric `name`.
    pub fn count_named(&self, name: &str) -> usize {
        self.series.iter().filter(|r| r.key().name() == name).count()
    }

    /// Visit a snapshot of all series. `f` runs with no shard locked, so it
    /// may record into stores sharing this registry.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&MeterId, &Meter),
    {
        let entries: Vec<(MeterId, Meter)> = self
            .series
            .iter()
            .map(|r| (r.key().clone(), r.value().meter.clone()))
            .collect();
        for (id, meter) in &entries {
            f(id, meter);
        }
    }

    pub fn clear(&self) {
        self.series.clear();
    }

    /// Refuse all further registrations. Existing series stay until
    /// [`Registry::clear`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Render all series in Prometheus text exposition format, sorted by
    /// metric name then label values. Timers are histograms in microseconds.
    pub fn render(&self) -> String {
        let mut entries: Vec<(MeterId, Registered)> = self
            .series
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        entries.sort_by(|a, b| {
            (a.0.name(), a.0.label_values()).cmp(&(b.0.name(), b.0.label_values()))
        });

        let mut out = String::new();
        let mut last_name: Option<String> = None;
        for (id, reg) in &entries {
            let name = exposition_name(id.name(), &reg.meter);
            if last_name.as_deref() != Some(name.as_str()) {
                if !reg.description.is_empty() {
                    let _ = writeln!(out, "# HELP {} {}", name, reg.description);
                }
                let _ = writeln!(out, "# TYPE {} {}", name, exposition_type(&reg.meter));
                last_name = Some(name.clone());
            }
            let labels = label_str(id);
            match &reg.meter {
                Meter::Counter(c) => {
                    let _ = writeln!(out, "{}{{{}}} {}", name, labels, c.count());
                }
                Meter::Gauge(g) => {
                    let _ = writeln!(out, "{}{{{}}} {}", name, labels, g.value());
                }
                Meter::Timer(t) => render_histogram(&name, &labels, &t.snapshot(), &mut out),
                Meter::Summary(s) => render_histogram(&name, &labels, &s.snapshot(), &mut out),
            }
        }
        out
    }
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn exposition_name(name: &str, meter: &Meter) -> String {
    let base = sanitize(name);
    match meter {
        Meter::Counter(_) => format!("{base}_total"),
        Meter::Timer(_) => format!("{base}_micros"),
        Meter::Gauge(_) | Meter::Summary(_) => base,
    }
}

fn exposition_type(meter: &Meter) -> &'static str {
    match meter {
        Meter::Counter(_) => "counter",
        Meter::Gauge(_) => "gauge",
        Meter::Timer(_) | Meter::Summary(_) => "histogram",
    }
}

fn label_str(id: &MeterId) -> String {
    id.tags()
        .map(|(k, v)| format!("{}=\"{}\"", sanitize(k), escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn render_histogram(name: &str, labels: &str, hist: &HistogramSnapshot, out: &mut String) {
    let prefix = if labels.is_empty() {
        String::new()
    } else {
        format!("{labels},")
    };
    for (le, count) in &hist.buckets {
        let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
    }
    let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, hist.count);
    let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, hist.sum);
    let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, hist.count);
}
