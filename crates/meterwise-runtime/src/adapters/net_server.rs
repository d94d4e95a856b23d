//! TCP server instrumentation, also used for HTTP servers under the `http`
//! prefix.

use std::net::SocketAddr;
use std::sync::Arc;

use meterwise_core::{Category, Counters, Gauges, MeterContext, Summaries};

const LOCAL: &str = "local";
const REMOTE: &str = "remote";
const CLASS: &str = "class";

/// `host:port` label value.
fn address_label(host: &str, port: u16) -> String {
    format!("{host}:{port}")
}

#[derive(Debug)]
struct NetServerStores {
    connections: Gauges,
    bytes_received: Summaries,
    bytes_sent: Summaries,
    errors: Counters,
}

#[derive(Debug, Clone)]
pub struct NetServerMetrics {
    stores: Arc<NetServerStores>,
}

impl NetServerMetrics {
    /// Stores named `<prefix>.server.*` in `category`.
    pub fn new(ctx: &MeterContext, category: Category, prefix: &str) -> Self {
        let pair = [LOCAL, REMOTE];
        Self {
            stores: Arc::new(NetServerStores {
                connections: Gauges::new(
                    ctx,
                    category,
                    &format!("{prefix}.server.connections"),
                    "Number of opened connections to the server",
                    &pair,
                ),
                bytes_received: Summaries::new(
                    ctx,
                    category,
                    &format!("{prefix}.server.bytes_received"),
                    "Number of bytes received by the server",
                    &pair,
                ),
                bytes_sent: Summaries::new(
                    ctx,
                    category,
                    &format!("{prefix}.server.bytes_sent"),
                    "Number of bytes sent by the server",
                    &pair,
                ),
                errors: Counters::new(
                    ctx,
                    category,
                    &format!("{prefix}.server.errors"),
                    "Number of errors",
                    &[LOCAL, REMOTE, CLASS],
                ),
            }),
        }
    }

    pub fn net(ctx: &MeterContext) -> Self {
        Self::new(ctx, Category::NetServer, "net")
    }

    pub fn http(ctx: &MeterContext) -> Self {
        Self::new(ctx, Category::HttpServer, "http")
    }

    /// Handle for a server listening on `local`.
    pub fn for_address(&self, local: SocketAddr) -> ConnectionMetrics {
        ConnectionMetrics {
            stores: Arc::clone(&self.stores),
            local: address_label(&local.ip().to_string(), local.port()),
        }
    }
}

/// Connection events for one listening address. Remote peers are identified
/// by the label string returned from [`ConnectionMetrics::connected`].
#[derive(Debug, Clone)]
pub struct ConnectionMetrics {
    stores: Arc<NetServerStores>,
    local: String,
}

impl ConnectionMetrics {
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Count a new connection. `remote_name` replaces the peer IP in the
    /// label when the host name is known. Returns the remote label to pass to
    /// the other calls for this connection.
    pub fn connected(&self, remote: SocketAddr, remote_name: Option<&str>) -> String {
        let host = match remote_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => remote.ip().to_string(),
        };
        let remote = address_label(&host, remote.port());
        self.stores
            .connections
            .get(&[self.local.as_str(), remote.as_str()])
            .increment();
        remote
    }

    pub fn disconnected(&self, remote: &str) {
        self.stores
            .connections
            .get(&[self.local.as_str(), remote])
            .decrement();
    }

    pub fn bytes_read(&self, remote: &str, bytes: u64) {
        self.stores
            .bytes_received
            .get(&[self.local.as_str(), remote])
            .record(bytes);
    }

    pub fn bytes_written(&self, remote: &str, bytes: u64) {
        self.stores
            .bytes_sent
            .get(&[self.local.as_str(), remote])
            .record(bytes);
    }

    /// `class` names the kind of error, e.g. `ConnectionReset`.
    pub fn exception_occurred(&self, remote: &str, class: &str) {
        self.stores
            .errors
            .get(&[self.local.as_str(), remote, class])
            .increment();
    }
}
