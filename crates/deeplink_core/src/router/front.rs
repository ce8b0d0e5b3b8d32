//! Front-process protocol router.
//!
//! # Responsibility
//! - Mint correlation ids, store handlers and announce them to the hub.
//! - Own the single back-channel subscription that feeds the dispatcher.
//! - Tear down an extension's handlers when the extension unloads.
//!
//! # Invariants
//! - `init()` subscribes exactly once; notifications before it are lost.
//! - Registrations are accepted before `init()`.
//! - `remove_extension_handlers` has removed the local partition when it returns.
//! - Every registration creates a new id, even for a repeated path schema.

use crate::channel::client::RegistrationClient;
use crate::channel::transport::IpcTransport;
use crate::config::RouterConfig;
use crate::dispatch::dispatcher::NotificationDispatcher;
use crate::model::handler_id::HandlerId;
use crate::model::message::{DeregistrationIntent, RegistrationIntent, RouteParams};
use crate::model::path_schema::PathSchema;
use crate::registry::handler_registry::{HandlerRegistry, RouteHandler};
use log::{debug, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Registered handler totals, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerCounts {
    pub internal: usize,
    pub extension_partitions: usize,
}

/// Facade over registry, registration client and dispatcher.
pub struct ProtocolRouter {
    registry: Arc<Mutex<HandlerRegistry>>,
    client: RegistrationClient,
    dispatcher: NotificationDispatcher,
    transport: Arc<dyn IpcTransport>,
    config: RouterConfig,
    initialized: AtomicBool,
}

impl ProtocolRouter {
    /// Builds a router on the well-known channel names.
    pub fn new(transport: Arc<dyn IpcTransport>) -> Self {
        Self::with_config(transport, RouterConfig::default())
    }

    pub fn with_config(transport: Arc<dyn IpcTransport>, config: RouterConfig) -> Self {
        let registry = Arc::new(Mutex::new(HandlerRegistry::new()));
        let client = RegistrationClient::new(Arc::clone(&transport), config.channels.clone());
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&registry),
            config.channels.back_channel.clone(),
        );
        Self {
            registry,
            client,
            dispatcher,
            transport,
            config,
            initialized: AtomicBool::new(false),
        }
    }

    /// Subscribes the dispatcher to the back channel.
    ///
    /// Each inbound message is dispatched in isolation: a panicking handler is
    /// logged and the next message is still processed.
    ///
    /// # Errors
    /// - `RouterError::AlreadyInitialized` on every call after the first.
    pub fn init(&self) -> Result<(), RouterError> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RouterError::AlreadyInitialized);
        }

        let dispatcher = self.dispatcher.clone();
        self.transport.subscribe(
            self.config.channels.back_channel.as_str(),
            Arc::new(move |raw: &Value| {
                let _ = dispatcher.on_notification_isolated(raw);
            }),
        );
        info!(
            "event=router_init module=protocol_router status=ok back_channel={}",
            self.config.channels.back_channel
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Registers an application-owned handler for `path_schema`.
    ///
    /// Returns the minted correlation id.
    pub fn register_internal<F>(&self, path_schema: &str, handler: F) -> HandlerId
    where
        F: Fn(&RouteParams) + Send + Sync + 'static,
    {
        let handler_id = HandlerId::generate();
        let path_schema = inspect_path_schema(path_schema);
        let handler: RouteHandler = Arc::new(handler);

        self.lock_registry()
            .put_internal(handler_id.clone(), handler);

        info!(
            "event=handler_registered module=protocol_router status=ok handler_type=internal handler_id={} path_schema={}",
            handler_id, path_schema
        );
        self.client.send_registration(&RegistrationIntent::Internal {
            handler_id: handler_id.clone(),
            path_schema,
        });
        handler_id
    }

    /// Registers a handler owned by `extension_id` for `path_schema`.
    ///
    /// Returns the minted correlation id.
    pub fn register_for_extension<F>(
        &self,
        extension_id: &str,
        path_schema: &str,
        handler: F,
    ) -> HandlerId
    where
        F: Fn(&RouteParams) + Send + Sync + 'static,
    {
        let handler_id = HandlerId::generate();
        let path_schema = inspect_path_schema(path_schema);
        let handler: RouteHandler = Arc::new(handler);

        self.lock_registry()
            .put_extension(extension_id, handler_id.clone(), handler);

        info!(
            "event=handler_registered module=protocol_router status=ok handler_type=extension extension_id={} handler_id={} path_schema={}",
            extension_id, handler_id, path_schema
        );
        self.client.send_registration(&RegistrationIntent::Extension {
            extension_id: extension_id.to_string(),
            handler_id: handler_id.clone(),
            path_schema,
        });
        handler_id
    }

    /// Forgets every handler of `extension_id`, locally and at the hub.
    ///
    /// Unknown extension ids are a no-op apart from the outbound intent.
    pub fn remove_extension_handlers(&self, extension_id: &str) {
        self.client.send_deregistration(&DeregistrationIntent {
            extension_id: extension_id.to_string(),
        });
        let removed = self.lock_registry().remove_extension(extension_id);
        info!(
            "event=extension_handlers_removed module=protocol_router status=ok extension_id={} removed={}",
            extension_id, removed
        );
    }

    pub fn handler_counts(&self) -> HandlerCounts {
        let registry = self.lock_registry();
        HandlerCounts {
            internal: registry.internal_len(),
            extension_partitions: registry.extension_ids().len(),
        }
    }

    /// Number of live handlers owned by `extension_id`.
    pub fn extension_handler_count(&self, extension_id: &str) -> usize {
        self.lock_registry().extension_len(extension_id)
    }

    /// The dispatcher fed by the back-channel subscription.
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn lock_registry(&self) -> MutexGuard<'_, HandlerRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Normalizes the schema for the hub; a bad schema is logged but still sent.
fn inspect_path_schema(raw: &str) -> String {
    match PathSchema::parse(raw) {
        Ok(schema) => {
            if !schema.placeholders().is_empty() {
                debug!(
                    "event=path_schema_inspected module=protocol_router status=ok path_schema={} placeholders={}",
                    schema.as_str(),
                    schema.placeholders().join(",")
                );
            }
            schema.as_str().to_string()
        }
        Err(err) => {
            warn!(
                "event=path_schema_invalid module=protocol_router status=warn path_schema={:?} error={}",
                raw, err
            );
            raw.to_string()
        }
    }
}

/// Router lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    AlreadyInitialized,
}

impl Display for RouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "protocol router is already initialized"),
        }
    }
}

impl Error for RouterError {}
