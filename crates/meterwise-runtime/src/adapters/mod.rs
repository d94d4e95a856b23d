//! Subsystem adapters: translate pool, event bus and server socket events
//! into meter store operations.

pub mod event_bus;
pub mod net_server;
pub mod pool;

pub use event_bus::{EventBusMetrics, HandlerMetrics, ReplyFailure};
pub use net_server::{ConnectionMetrics, NetServerMetrics};
pub use pool::{PoolInstance, PoolMetrics};
