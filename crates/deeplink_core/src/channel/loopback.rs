//! In-process loopback transport.
//!
//! Stands in for the real inter-process channel in tests and the CLI probe:
//! outbound messages land in an inspectable outbox, inbound messages are
//! injected with `emit` or through a pump thread.

use crate::channel::transport::{ChannelListener, IpcTransport, TransportError};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// One message recorded by `send`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub channel: String,
    pub payload: Value,
}

#[derive(Default)]
struct LoopbackState {
    outbox: Vec<SentMessage>,
    listeners: HashMap<String, Vec<ChannelListener>>,
    disconnected: bool,
}

/// Single-process transport with an outbox and per-channel listeners.
#[derive(Default)]
pub struct LoopbackTransport {
    state: Mutex<LoopbackState>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `send` fail with `TransportError::Disconnected`.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.lock().disconnected = disconnected;
    }

    /// Returns payloads sent on `channel`, oldest first.
    pub fn sent(&self, channel: &str) -> Vec<Value> {
        self.lock()
            .outbox
            .iter()
            .filter(|message| message.channel == channel)
            .map(|message| message.payload.clone())
            .collect()
    }

    /// Drains the whole outbox in send order.
    pub fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut self.lock().outbox)
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.lock().listeners.get(channel).map_or(0, Vec::len)
    }

    /// Delivers one inbound message to every listener of `channel`.
    ///
    /// Returns the number of listeners reached. The transport lock is released
    /// before listeners run.
    pub fn emit(&self, channel: &str, payload: &Value) -> usize {
        let listeners = self
            .lock()
            .listeners
            .get(channel)
            .cloned()
            .unwrap_or_default();
        if listeners.is_empty() {
            debug!(
                "event=inbound_dropped module=loopback status=ok channel={} reason=no_listener",
                channel
            );
        }
        for listener in &listeners {
            listener(payload);
        }
        listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IpcTransport for LoopbackTransport {
    fn send(&self, channel: &str, payload: Value) -> Result<(), TransportError> {
        let mut state = self.lock();
        if state.disconnected {
            return Err(TransportError::Disconnected);
        }
        state.outbox.push(SentMessage {
            channel: channel.to_string(),
            payload,
        });
        Ok(())
    }

    fn subscribe(&self, channel: &str, listener: ChannelListener) {
        self.lock()
            .listeners
            .entry(channel.to_string())
            .or_default()
            .push(listener);
    }
}

/// Starts the inbound message loop for `channel` on a dedicated thread.
///
/// Every value sent through the returned sender is emitted in order. The loop
/// ends once all senders are dropped; join the handle to wait for it.
pub fn spawn_inbound_pump(
    transport: Arc<LoopbackTransport>,
    channel: &str,
) -> (Sender<Value>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<Value>();
    let channel = channel.to_string();
    let handle = thread::spawn(move || {
        for payload in rx {
            transport.emit(&channel, &payload);
        }
        debug!(
            "event=inbound_pump_stopped module=loopback status=ok channel={}",
            channel
        );
    });
    (tx, handle)
}
