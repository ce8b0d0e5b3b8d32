//! Outbound registration channel client.
//!
//! # Responsibility
//! - Encode registration/deregistration intents and hand them to the transport.
//!
//! # Invariants
//! - One outbound message per call; no batching, no retry.
//! - Send failures are logged and swallowed, never surfaced to the registrant.

use crate::channel::transport::{IpcTransport, TransportError};
use crate::config::ChannelNames;
use crate::model::message::{DeregistrationIntent, RegistrationIntent};
use log::warn;
use serde::Serialize;
use std::sync::Arc;

/// Fire-and-forget sender for hub-bound intents.
#[derive(Clone)]
pub struct RegistrationClient {
    transport: Arc<dyn IpcTransport>,
    channels: ChannelNames,
}

impl RegistrationClient {
    pub fn new(transport: Arc<dyn IpcTransport>, channels: ChannelNames) -> Self {
        Self {
            transport,
            channels,
        }
    }

    pub fn send_registration(&self, intent: &RegistrationIntent) {
        self.send_logged(self.channels.register.as_str(), intent);
    }

    pub fn send_deregistration(&self, intent: &DeregistrationIntent) {
        self.send_logged(self.channels.deregister.as_str(), intent);
    }

    fn send_logged<T: Serialize>(&self, channel: &str, intent: &T) {
        if let Err(err) = self.try_send(channel, intent) {
            warn!(
                "event=intent_send_failed module=protocol_router status=warn channel={} error={}",
                channel, err
            );
        }
    }

    fn try_send<T: Serialize>(&self, channel: &str, intent: &T) -> Result<(), TransportError> {
        let payload = serde_json::to_value(intent)?;
        self.transport.send(channel, payload)
    }
}
