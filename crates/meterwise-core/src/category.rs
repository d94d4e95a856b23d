//! Metric categories and the gate that switches them off.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MeterError;

/// One instrumented subsystem. Every metric belongs to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    HttpServer,
    HttpClient,
    NetServer,
    NetClient,
    DatagramSocket,
    EventBus,
    NamedPools,
    Verticles,
}

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 8;

    /// All categories in declaration order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::HttpServer,
        Category::HttpClient,
        Category::NetServer,
        Category::NetClient,
        Category::DatagramSocket,
        Category::EventBus,
        Category::NamedPools,
        Category::Verticles,
    ];

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        match self {
            Category::HttpServer => 0,
            Category::HttpClient => 1,
            Category::NetServer => 2,
            Category::NetClient => 3,
            Category::DatagramSocket => 4,
            Category::EventBus => 5,
            Category::NamedPools => 6,
            Category::Verticles => 7,
        }
    }

    /// Configuration name (e.g. `NET_SERVER`).
    pub fn as_str(self) -> &'static str {
        match self {
            Category::HttpServer => "HTTP_SERVER",
            Category::HttpClient => "HTTP_CLIENT",
            Category::NetServer => "NET_SERVER",
            Category::NetClient => "NET_CLIENT",
            Category::DatagramSocket => "DATAGRAM_SOCKET",
            Category::EventBus => "EVENT_BUS",
            Category::NamedPools => "NAMED_POOLS",
            Category::Verticles => "VERTICLES",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| MeterError::UnknownCategory(s.to_string()))
    }
}

/// Set of disabled categories.
///
/// Built during setup; `disable` takes `&mut self` so it cannot run
/// concurrently with lookups once the gate is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryGate {
    disabled: u16,
}

impl CategoryGate {
    /// Gate with every category enabled.
    pub const fn new() -> Self {
        Self { disabled: 0 }
    }

    /// Gate with every category disabled.
    pub const fn all_disabled() -> Self {
        Self {
            disabled: (1 << Category::COUNT) - 1,
        }
    }

    pub fn disable(&mut self, category: Category) -> &mut Self {
        self.disabled |= Self::bit(category);
        self
    }

    #[inline]
    pub fn is_disabled(&self, category: Category) -> bool {
        self.disabled & Self::bit(category) != 0
    }

    #[inline]
    pub fn is_enabled(&self, category: Category) -> bool {
        !self.is_disabled(category)
    }

    /// Disabled categories in declaration order.
    pub fn disabled(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.is_disabled(*c))
    }

    #[inline]
    const fn bit(category: Category) -> u16 {
        1 << category.index()
    }
}

impl FromIterator<Category> for CategoryGate {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut gate = CategoryGate::new();
        for c in iter {
            gate.disable(c);
        }
        gate
    }
}
