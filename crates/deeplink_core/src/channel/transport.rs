//! Inter-process channel seam.
//!
//! # Responsibility
//! - Abstract the message transport between front process and hub.
//!
//! # Invariants
//! - Messages from one sender are delivered in send order.
//! - `send` never waits for a reply.
//! - Listeners may be invoked from any thread the transport chooses.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Inbound message listener bound to one channel name.
pub type ChannelListener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Asynchronous, ordered, send-only/receive-only message channel.
pub trait IpcTransport: Send + Sync {
    /// Queues one outbound message on `channel`.
    fn send(&self, channel: &str, payload: Value) -> Result<(), TransportError>;

    /// Adds a listener for inbound messages on `channel`.
    fn subscribe(&self, channel: &str, listener: ChannelListener);
}

/// Transport-level send failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Disconnected,
    Encode(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "channel peer is disconnected"),
            Self::Encode(message) => write!(f, "failed to encode channel payload: {message}"),
        }
    }
}

impl Error for TransportError {}

impl From<serde_json::Error> for TransportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value.to_string())
    }
}
