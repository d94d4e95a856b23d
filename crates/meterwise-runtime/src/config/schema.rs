use std::collections::BTreeSet;

use serde::Deserialize;

use meterwise_core::error::{MeterError, Result};
use meterwise_core::{Category, LabelResolver, Rule};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    pub version: u32,

    #[serde(default)]
    pub metrics: MetricsOptions,
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeterError::UnsupportedVersion(self.version));
        }
        self.metrics.validate()
    }
}

/// Engine options. Also usable directly without a config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsOptions {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_registry_name")]
    pub registry_name: String,

    #[serde(default)]
    pub disabled_categories: BTreeSet<Category>,

    /// Absent in the file means the default rules; an explicit `[]` means none.
    #[serde(default = "Rule::defaults")]
    pub label_matches: Vec<Rule>,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            registry_name: default_registry_name(),
            disabled_categories: BTreeSet::new(),
            label_matches: Rule::defaults(),
        }
    }
}

impl MetricsOptions {
    /// Append a rule after the existing ones.
    pub fn add_label_match(&mut self, rule: Rule) -> &mut Self {
        self.label_matches.push(rule);
        self
    }

    /// Drop every rule, the defaults included.
    pub fn reset_label_matches(&mut self) -> &mut Self {
        self.label_matches.clear();
        self
    }

    pub fn disable_category(&mut self, category: Category) -> &mut Self {
        self.disabled_categories.insert(category);
        self
    }

    /// True when `category` is listed or metrics are off altogether.
    pub fn is_category_disabled(&self, category: Category) -> bool {
        !self.enabled || self.disabled_categories.contains(&category)
    }

    pub fn validate(&self) -> Result<()> {
        if self.registry_name.trim().is_empty() {
            return Err(MeterError::BadConfig(
                "metrics.registry_name must not be empty".into(),
            ));
        }
        if let Some(i) = self.label_matches.iter().position(|r| r.label().is_empty()) {
            return Err(MeterError::BadConfig(format!(
                "metrics.label_matches[{i}].label must not be empty"
            )));
        }
        // Compiled here only to reject malformed patterns.
        LabelResolver::new(&self.label_matches)?;
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
fn default_registry_name() -> String {
    "default".into()
}
