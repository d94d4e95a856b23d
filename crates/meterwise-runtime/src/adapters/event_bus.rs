//! Event bus instrumentation: handlers, message flow, processing time and
//! wire traffic per address.

use std::fmt;
use std::sync::Arc;

use meterwise_core::{Category, Counters, Gauges, MeterContext, Summaries, Timers, Timing};

const ADDRESS: &str = "address";
const SIDE: &str = "side";
const CLASS: &str = "class";
const FAILURE: &str = "failure";

fn side(local: bool) -> &'static str {
    if local {
        "local"
    } else {
        "remote"
    }
}

/// Why a reply never reached its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyFailure {
    Timeout,
    NoHandlers,
    RecipientFailure,
}

impl ReplyFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplyFailure::Timeout => "TIMEOUT",
            ReplyFailure::NoHandlers => "NO_HANDLERS",
            ReplyFailure::RecipientFailure => "RECIPIENT_FAILURE",
        }
    }
}

impl fmt::Display for ReplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-handler state: the address and the processing timing in flight.
#[derive(Debug)]
pub struct HandlerMetrics {
    address: String,
    processing: Option<Timing>,
}

impl HandlerMetrics {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_some()
    }
}

#[derive(Debug)]
struct EventBusStores {
    handlers: Gauges,
    pending: Gauges,
    published: Counters,
    sent: Counters,
    received: Counters,
    delivered: Counters,
    errors: Counters,
    reply_failures: Counters,
    processing_time: Timers,
    bytes_read: Summaries,
    bytes_written: Summaries,
}

#[derive(Debug, Clone)]
pub struct EventBusMetrics {
    stores: Arc<EventBusStores>,
}

impl EventBusMetrics {
    pub fn new(ctx: &MeterContext) -> Self {
        let c = Category::EventBus;
        let by_side = [ADDRESS, SIDE];
        Self {
            stores: Arc::new(EventBusStores {
                handlers: Gauges::new(ctx, c, "eventbus.handlers", "Number of event bus handlers in use", &[ADDRESS]),
                pending: Gauges::new(ctx, c, "eventbus.pending", "Number of messages not processed yet", &by_side),
                published: Counters::new(
                    ctx,
                    c,
                    "eventbus.published",
                    "Number of messages published (publish / subscribe)",
                    &by_side,
                ),
                sent: Counters::new(ctx, c, "eventbus.sent", "Number of messages sent (point-to-point)", &by_side),
                received: Counters::new(ctx, c, "eventbus.received", "Number of messages received", &by_side),
                delivered: Counters::new(
                    ctx,
                    c,
                    "eventbus.delivered",
                    "Number of messages delivered to handlers",
                    &by_side,
                ),
                errors: Counters::new(ctx, c, "eventbus.errors", "Number of errors", &[ADDRESS, CLASS]),
                reply_failures: Counters::new(
                    ctx,
                    c,
                    "eventbus.reply_failures",
                    "Number of message reply failures",
                    &[ADDRESS, FAILURE],
                ),
                processing_time: Timers::new(ctx, c, "eventbus.processing_time", "Processing time", &[ADDRESS]),
                bytes_read: Summaries::new(
                    ctx,
                    c,
                    "eventbus.bytes_read",
                    "Number of bytes received while reading messages from cluster peers",
                    &[ADDRESS],
                ),
                bytes_written: Summaries::new(
                    ctx,
                    c,
                    "eventbus.bytes_written",
                    "Number of bytes sent while sending messages to cluster peers",
                    &[ADDRESS],
                ),
            }),
        }
    }

    pub fn handler_registered(&self, address: &str) -> HandlerMetrics {
        self.stores.handlers.get(&[address]).increment();
        HandlerMetrics {
            address: address.to_string(),
            processing: None,
        }
    }

    pub fn handler_unregistered(&self, handler: HandlerMetrics) {
        self.stores.handlers.get(&[handler.address.as_str()]).decrement();
    }

    /// A delivered message is taken off the pending queue and handed to the
    /// handler. An unfinished timing from a previous message is discarded.
    pub fn begin_handle_message(&self, handler: &mut HandlerMetrics, local: bool) {
        let address = handler.address.as_str();
        self.stores.pending.get(&[address, side(local)]).decrement();
        handler.processing = Some(self.stores.processing_time.start(&[address]));
    }

    /// `failure` is the error class name when the handler failed. Ending a
    /// handler with no timing in flight records no processing time.
    pub fn end_handle_message(&self, handler: &mut HandlerMetrics, failure: Option<&str>) {
        if let Some(timing) = handler.processing.take() {
            timing.end();
        }
        if let Some(class) = failure {
            self.stores
                .errors
                .get(&[handler.address.as_str(), class])
                .increment();
        }
    }

    pub fn message_sent(&self, address: &str, publish: bool, local: bool) {
        let store = if publish {
            &self.stores.published
        } else {
            &self.stores.sent
        };
        store.get(&[address, side(local)]).increment();
    }

    pub fn message_received(&self, address: &str, _publish: bool, local: bool, handlers: usize) {
        let l = [address, side(local)];
        self.stores
            .pending
            .get(&l)
            .add(i64::try_from(handlers).unwrap_or(i64::MAX));
        self.stores.received.get(&l).increment();
        if handlers > 0 {
            self.stores.delivered.get(&l).increment();
        }
    }

    pub fn message_written(&self, address: &str, bytes: u64) {
        self.stores.bytes_written.get(&[address]).record(bytes);
    }

    pub fn message_read(&self, address: &str, bytes: u64) {
        self.stores.bytes_read.get(&[address]).record(bytes);
    }

    pub fn reply_failure(&self, address: &str, failure: ReplyFailure) {
        self.stores
            .reply_failures
            .get(&[address, failure.as_str()])
            .increment();
    }
}
