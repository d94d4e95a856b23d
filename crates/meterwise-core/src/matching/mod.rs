//! Label matching: configured rules and the resolver that applies them.
//!
//! Raw label values (addresses, pool names, remote sockets) are rewritten into
//! bounded aliases before they become part of a meter identity.

pub mod resolver;
pub mod rule;

pub use resolver::{CompiledRule, LabelResolver};
pub use rule::{MatchType, Rule, REMOTE_ALIAS, REMOTE_LABEL};
