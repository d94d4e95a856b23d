#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use meterwise_core::{Category, MeterError, Rule};
use meterwise_runtime::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  enabled: true
  disabled_categoriez: [EVENT_BUS] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, MeterError::BadConfig(_)), "{err}");
}

#[test]
fn unknown_field_inside_rule_fails() {
    let bad = r#"
version: 1
metrics:
  label_matches:
    - { domain: EVENT_BUS, label: address, value: a, aliaz: b }
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert!(cfg.metrics.enabled);
    assert_eq!(cfg.metrics.registry_name, "default");
    assert_eq!(cfg.metrics.label_matches, Rule::defaults());
}

#[test]
fn explicit_empty_rule_list_means_no_rules() {
    let cfg = config::load_from_str("version: 1\nmetrics:\n  label_matches: []\n").unwrap();
    assert!(cfg.metrics.label_matches.is_empty());
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
metrics:
  registry_name: edge
  disabled_categories: [EVENT_BUS, VERTICLES]
  label_matches:
    - domain: NET_SERVER
      label: remote
      type: REGEX
      value: "10\\..*"
      alias: internal
    - { domain: NAMED_POOLS, label: pool.name, value: vert.x-worker-thread }
"#;
    let cfg = config::load_from_str(ok).unwrap();
    let m = &cfg.metrics;
    assert_eq!(m.registry_name, "edge");
    assert!(m.is_category_disabled(Category::EventBus));
    assert!(m.is_category_disabled(Category::Verticles));
    assert!(!m.is_category_disabled(Category::NetServer));
    assert_eq!(m.label_matches.len(), 2);
    assert_eq!(
        m.label_matches[0],
        Rule::regex(Category::NetServer, "remote", r"10\..*").with_alias("internal")
    );
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").unwrap_err();
    assert!(matches!(err, MeterError::UnsupportedVersion(2)));
}

#[test]
fn unknown_category_is_rejected() {
    let bad = "version: 1\nmetrics:\n  disabled_categories: [EVENTBUS]\n";
    let err = config::load_from_str(bad).unwrap_err();
    assert!(err.is_config());
}

#[test]
fn empty_names_are_rejected() {
    let bad = "version: 1\nmetrics:\n  registry_name: \"  \"\n";
    assert!(matches!(config::load_from_str(bad), Err(MeterError::BadConfig(_))));

    let bad = r#"
version: 1
metrics:
  label_matches:
    - { domain: EVENT_BUS, label: "", value: a }
"#;
    assert!(matches!(config::load_from_str(bad), Err(MeterError::BadConfig(_))));
}

#[test]
fn malformed_regex_fails_at_load() {
    let bad = r#"
version: 1
metrics:
  label_matches:
    - { domain: EVENT_BUS, label: address, type: REGEX, value: "a(b" }
"#;
    match config::load_from_str(bad) {
        Err(MeterError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "a(b"),
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_error() {
    assert!(config::load_from_file("does/not/exist.yaml").is_err());
}
