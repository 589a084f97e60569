//! Dispatch interface: routing decoded payloads to the subscriber.
//!
//! The subscriber is an external collaborator supplied at build time. It
//! receives one [`Message`] per decoded data payload and, separately,
//! [`ConnectionStatus`] transitions so the hosting application can observe
//! connecting/ok/failed without scraping logs.
//!
//! Subscriber panics are caught at this boundary and logged; they never
//! tear down the read loop, and subsequent frames keep flowing.

use std::panic::{catch_unwind, AssertUnwindSafe};

use bytes::Bytes;

/// A decoded application payload delivered to the subscriber.
#[derive(Debug, Clone)]
pub struct Message {
    /// Protocol version from the frame header.
    pub version: u16,
    /// Operation code from the frame header.
    pub operation: u32,
    /// Sequence number from the frame header.
    pub sequence: u32,
    /// Frame body, typically UTF-8 JSON text.
    pub body: Bytes,
}

impl Message {
    /// Body decoded as UTF-8 text, with invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Connection lifecycle events observable by the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A connect attempt is starting.
    Connecting,
    /// The socket is open; authentication in flight.
    Connected,
    /// The server acknowledged authentication.
    Authenticated,
    /// The connection closed; reconnection may follow.
    Closed,
    /// Reconnect attempts are exhausted; the client has given up.
    Exhausted,
}

/// External collaborator receiving decoded payloads and status changes.
pub trait Subscriber: Send + Sync + 'static {
    /// Called once per decoded data payload, in arrival order.
    fn notify(&self, message: Message);

    /// Called on connection status transitions. Default: ignore.
    fn status(&self, _status: ConnectionStatus) {}
}

/// Any plain `Fn(Message)` closure is a subscriber that ignores status.
impl<F> Subscriber for F
where
    F: Fn(Message) + Send + Sync + 'static,
{
    fn notify(&self, message: Message) {
        self(message)
    }
}

/// Subscriber that only logs; used when none is configured.
pub(crate) struct NullSubscriber;

impl Subscriber for NullSubscriber {
    fn notify(&self, message: Message) {
        tracing::debug!(
            op = message.operation,
            seq = message.sequence,
            "message dropped: no subscriber configured"
        );
    }
}

/// Deliver a payload, containing any subscriber panic.
pub(crate) fn deliver(subscriber: &dyn Subscriber, message: Message) {
    let op = message.operation;
    if catch_unwind(AssertUnwindSafe(|| subscriber.notify(message))).is_err() {
        tracing::error!(op, "subscriber panicked in notify");
    }
}

/// Report a status change, containing any subscriber panic.
pub(crate) fn report(subscriber: &dyn Subscriber, status: ConnectionStatus) {
    if catch_unwind(AssertUnwindSafe(|| subscriber.status(status))).is_err() {
        tracing::error!(?status, "subscriber panicked in status");
    }
}
