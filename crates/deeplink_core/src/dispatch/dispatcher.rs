//! Inbound notification dispatcher.
//!
//! # Responsibility
//! - Validate back-channel payloads and route them to exactly one handler.
//! - Log and drop malformed, unknown or stale notifications.
//!
//! # Invariants
//! - The registry lock is held only for the lookup, never while a handler runs.
//! - A notification for a removed extension is treated as never registered.
//! - Malformed payloads never reach a handler and never panic the dispatcher.
//!
//! A contained handler panic is logged here as `event=handler_panicked` with
//! the notification only. The panic message itself is recorded once by the
//! logging panic hook (`event=panic_captured`).

use crate::logging::sanitize_message;
use crate::model::handler_id::HandlerId;
use crate::model::message::{BackChannelNotification, ExtensionId, NotificationShapeError};
use crate::registry::handler_registry::{HandlerRegistry, RouteHandler};
use log::{debug, error, warn};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

const MAX_LOGGED_PAYLOAD_CHARS: usize = 512;

/// Result of handling one inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The registered handler ran to completion.
    Dispatched,
    /// The payload failed shape validation.
    Rejected(NotificationShapeError),
    /// No internal handler is registered under this id.
    UnknownInternal { handler_id: HandlerId },
    /// The extension has no partition, or the id is absent from it.
    UnknownExtension {
        extension_id: ExtensionId,
        handler_id: HandlerId,
    },
}

impl DispatchOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched)
    }
}

/// Routes back-channel notifications to registered handlers.
#[derive(Clone)]
pub struct NotificationDispatcher {
    registry: Arc<Mutex<HandlerRegistry>>,
    channel: String,
}

impl NotificationDispatcher {
    /// `channel` names the back channel in log records.
    pub fn new(registry: Arc<Mutex<HandlerRegistry>>, channel: impl Into<String>) -> Self {
        Self {
            registry,
            channel: channel.into(),
        }
    }

    /// Validates `raw` and invokes the matching handler with its params.
    ///
    /// A panicking handler unwinds through this call; use
    /// [`Self::on_notification_isolated`] from message loops.
    pub fn on_notification(&self, raw: &Value) -> DispatchOutcome {
        let notification = match BackChannelNotification::from_value(raw) {
            Ok(notification) => notification,
            Err(err) => {
                warn!(
                    "event=notification_invalid module=protocol_router status=warn channel={} error={} payload={}",
                    self.channel,
                    err,
                    payload_summary(raw)
                );
                return DispatchOutcome::Rejected(err);
            }
        };

        let Some(handler) = self.lookup(&notification) else {
            return self.report_unknown(notification, raw);
        };

        debug!(
            "event=handler_dispatch module=protocol_router status=ok handler_type={} handler_id={}",
            notification.handler_type(),
            notification.handler_id()
        );
        handler(notification.params());
        DispatchOutcome::Dispatched
    }

    /// Same as [`Self::on_notification`] but contains a handler panic.
    ///
    /// Returns `None` when the handler panicked; the failed notification is
    /// logged and the caller can move on to the next message.
    pub fn on_notification_isolated(&self, raw: &Value) -> Option<DispatchOutcome> {
        match catch_unwind(AssertUnwindSafe(|| self.on_notification(raw))) {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                error!(
                    "event=handler_panicked module=protocol_router status=error channel={} payload={}",
                    self.channel,
                    payload_summary(raw)
                );
                None
            }
        }
    }

    fn lookup(&self, notification: &BackChannelNotification) -> Option<RouteHandler> {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        match notification {
            BackChannelNotification::Internal { handler_id, .. } => {
                registry.get_internal(handler_id)
            }
            BackChannelNotification::Extension {
                extension_id,
                handler_id,
                ..
            } => registry.get_extension(extension_id, handler_id),
        }
    }

    fn report_unknown(
        &self,
        notification: BackChannelNotification,
        raw: &Value,
    ) -> DispatchOutcome {
        match notification {
            BackChannelNotification::Internal { handler_id, .. } => {
                error!(
                    "event=handler_unknown module=protocol_router status=error channel={} handler_id={} notification={}",
                    self.channel,
                    handler_id,
                    payload_summary(raw)
                );
                DispatchOutcome::UnknownInternal { handler_id }
            }
            BackChannelNotification::Extension {
                extension_id,
                handler_id,
                ..
            } => {
                error!(
                    "event=extension_handler_unknown module=protocol_router status=error channel={} extension_id={} handler_id={} notification={}",
                    self.channel,
                    extension_id,
                    handler_id,
                    payload_summary(raw)
                );
                DispatchOutcome::UnknownExtension {
                    extension_id,
                    handler_id,
                }
            }
        }
    }
}

fn payload_summary(raw: &Value) -> String {
    sanitize_message(&raw.to_string(), MAX_LOGGED_PAYLOAD_CHARS)
}
