//! Label match rules as they appear in configuration.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{MeterError, Result};

/// Label carrying the remote peer of a server connection.
pub const REMOTE_LABEL: &str = "remote";

/// Alias substituted for remote addresses by the default rules.
pub const REMOTE_ALIAS: &str = "_";

/// How a rule compares its pattern against a raw label value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    /// Exact, case-sensitive equality.
    #[default]
    Equals,
    /// Regular expression that must match the whole value.
    Regex,
}

/// One `(domain, label, type, pattern, alias)` match rule.
///
/// Rules are immutable once built. Their order inside a `(domain, label)`
/// group is significant: the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    domain: Category,
    label: String,
    value: String,
    #[serde(rename = "type", default)]
    match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
}

impl Rule {
    pub fn new(
        domain: Category,
        label: impl Into<String>,
        match_type: MatchType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            label: label.into(),
            value: value.into(),
            match_type,
            alias: None,
        }
    }

    /// Exact-match rule.
    pub fn equals(domain: Category, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(domain, label, MatchType::Equals, value)
    }

    /// Full-string regex rule.
    pub fn regex(domain: Category, label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(domain, label, MatchType::Regex, pattern)
    }

    /// Replace matched values with `alias`.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Rules shipped out of the box: collapse the remote address of public
    /// facing servers into a single series.
    pub fn defaults() -> Vec<Rule> {
        vec![
            Rule::regex(Category::HttpServer, REMOTE_LABEL, ".*").with_alias(REMOTE_ALIAS),
            Rule::regex(Category::NetServer, REMOTE_LABEL, ".*").with_alias(REMOTE_ALIAS),
        ]
    }

    /// Parse a rule from its JSON description.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Rule::deserialize(value).map_err(|e| MeterError::BadConfig(format!("invalid rule: {e}")))
    }

    /// JSON description of this rule.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn domain(&self) -> Category {
        self.domain
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Pattern (EQUALS value or regex source).
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// Alias, if set and non-empty. An empty alias keeps the raw value.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_defaults_to_equals() {
        let rule: Rule = serde_json::from_str(
            r#"{"domain":"EVENT_BUS","label":"address","value":"orders"}"#,
        )
        .unwrap();
        assert_eq!(rule.match_type(), MatchType::Equals);
        assert_eq!(rule.alias(), None);
    }

    #[test]
    fn empty_alias_is_no_alias() {
        let rule = Rule::equals(Category::EventBus, "address", "a").with_alias("");
        assert_eq!(rule.alias(), None);
    }

    #[test]
    fn unknown_domain_is_rejected() {
        let json = serde_json::json!({"domain": "NOPE", "label": "x", "value": "y"});
        assert!(matches!(Rule::from_json(&json), Err(MeterError::BadConfig(_))));
    }

    #[test]
    fn defaults_target_server_remote_label() {
        let defaults = Rule::defaults();
        assert_eq!(defaults.len(), 2);
        for r in &defaults {
            assert_eq!(r.label(), REMOTE_LABEL);
            assert_eq!(r.match_type(), MatchType::Regex);
            assert_eq!(r.alias(), Some(REMOTE_ALIAS));
        }
        assert_eq!(defaults[0].domain(), Category::HttpServer);
        assert_eq!(defaults[1].domain(), Category::NetServer);
    }
}
