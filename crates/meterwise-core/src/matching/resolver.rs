//! Rule compilation and label value resolution.
//!
//! Rules are compiled once into per-`(category, label)` lists. Resolution is a
//! read-only walk over the list and returns a borrowed string, so it never
//! locks or allocates on the recording path.

use std::collections::HashMap;

use regex::Regex;

use crate::category::Category;
use crate::error::{MeterError, Result};

use super::rule::{MatchType, Rule};

#[derive(Debug, Clone)]
enum Matcher {
    Equals(String),
    /// Anchored at both ends at compile time.
    Regex(Regex),
}

/// A rule ready to be evaluated.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    matcher: Matcher,
    alias: Option<String>,
}

impl CompiledRule {
    /// Compile a rule. REGEX patterns must match the whole value, so they are
    /// wrapped as `^(?:pattern)$`.
    pub fn compile(rule: &Rule) -> Result<Self> {
        let matcher = match rule.match_type() {
            MatchType::Equals => Matcher::Equals(rule.value().to_string()),
            MatchType::Regex => {
                let anchored = format!("^(?:{})$", rule.value());
                let re = Regex::new(&anchored).map_err(|e| MeterError::InvalidPattern {
                    pattern: rule.value().to_string(),
                    reason: e.to_string(),
                })?;
                Matcher::Regex(re)
            }
        };
        Ok(Self {
            matcher,
            alias: rule.alias().map(str::to_string),
        })
    }

    #[inline]
    pub fn matches(&self, raw: &str) -> bool {
        match &self.matcher {
            Matcher::Equals(v) => v == raw,
            Matcher::Regex(re) => re.is_match(raw),
        }
    }

    /// Output for a value this rule matched.
    #[inline]
    pub fn output<'a>(&'a self, raw: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(raw)
    }
}

/// Ordered rule lists keyed by `(category, label)`.
///
/// Built once, then shared read-only across threads.
#[derive(Debug, Clone)]
pub struct LabelResolver {
    by_category: [HashMap<String, Vec<CompiledRule>>; Category::COUNT],
    rule_count: usize,
}

impl LabelResolver {
    /// Compile `rules`, preserving their order within each `(domain, label)`
    /// group. Fails on the first malformed pattern.
    pub fn new<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Result<Self> {
        let mut by_category: [HashMap<String, Vec<CompiledRule>>; Category::COUNT] =
            std::array::from_fn(|_| HashMap::new());
        let mut rule_count = 0;

        for rule in rules {
            let compiled = CompiledRule::compile(rule)?;
            by_category[rule.domain().index()]
                .entry(rule.label().to_string())
                .or_default()
                .push(compiled);
            rule_count += 1;
        }

        Ok(Self {
            by_category,
            rule_count,
        })
    }

    /// Resolver without rules: every value passes through.
    pub fn empty() -> Self {
        Self {
            by_category: std::array::from_fn(|_| HashMap::new()),
            rule_count: 0,
        }
    }

    /// Resolve `raw` for `(domain, label)`.
    ///
    /// Returns the output of the first matching rule, or `raw` when no rule
    /// is configured or none matches.
    pub fn resolve<'a>(&'a self, domain: Category, label: &str, raw: &'a str) -> &'a str {
        let Some(rules) = self.by_category[domain.index()].get(label) else {
            return raw;
        };
        rules
            .iter()
            .find(|r| r.matches(raw))
            .map_or(raw, |r| r.output(raw))
    }

    pub fn has_rules_for(&self, domain: Category, label: &str) -> bool {
        self.by_category[domain.index()].contains_key(label)
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }
}

impl Default for LabelResolver {
    fn default() -> Self {
        Self::empty()
    }
}
