//! Label resolution vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use meterwise_core::{LabelResolver, MeterError};

use vector_loader::{load, RejectVector, ResolveVector};

#[test]
fn resolve_vectors() {
    let files = [
        "resolve_defaults.json",
        "resolve_first_match.json",
        "resolve_regex_anchoring.json",
        "resolve_scoping.json",
    ];

    for f in files {
        let v: ResolveVector = load(f);
        let rules = v.rules();
        let resolver = LabelResolver::new(&rules).unwrap();
        for c in &v.cases {
            assert_eq!(
                resolver.resolve(c.domain, &c.label, &c.raw),
                c.expect,
                "{f}: {} ({} {} {:?})",
                v.description,
                c.domain,
                c.label,
                c.raw
            );
        }
    }
}

#[test]
fn reject_vectors() {
    let v: RejectVector = load("reject_bad_regex.json");
    match LabelResolver::new(&v.rules) {
        Err(MeterError::InvalidPattern { pattern, .. }) => {
            assert_eq!(pattern, v.expect_error, "{}", v.description)
        }
        other => panic!("{}: expected InvalidPattern, got {other:?}", v.description),
    }
}
