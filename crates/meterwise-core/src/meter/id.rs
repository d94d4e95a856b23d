use std::fmt;
use std::sync::Arc;

use crate::category::Category;

/// Identity of one time series: category, metric name, declared label names
/// and the resolved label values in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeterId {
    category: Category,
    name: Arc<str>,
    label_names: Arc<[&'static str]>,
    label_values: Vec<String>,
}

impl MeterId {
    /// Panics if `label_values` and `label_names` differ in length.
    pub fn new(
        category: Category,
        name: Arc<str>,
        label_names: Arc<[&'static str]>,
        label_values: Vec<String>,
    ) -> Self {
        assert_eq!(
            label_names.len(),
            label_values.len(),
            "metric `{name}` declares {} labels",
            label_names.len()
        );
        Self {
            category,
            name,
            label_names,
            label_values,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_names(&self) -> &[&'static str] {
        &self.label_names
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// `(label, value)` pairs in declared order.
    pub fn tags(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.label_names
            .iter()
            .copied()
            .zip(self.label_values.iter().map(String::as_str))
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, (k, v)) in self.tags().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}=\"{v}\"")?;
        }
        f.write_str("}")
    }
}
