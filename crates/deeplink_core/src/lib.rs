//! Front-process protocol router.
//! Routes custom-scheme URL invocations, matched by the hub process, back to
//! the application or extension handler that registered for them.

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod registry;
pub mod router;

pub use channel::client::RegistrationClient;
pub use channel::loopback::{spawn_inbound_pump, LoopbackTransport, SentMessage};
pub use channel::transport::{ChannelListener, IpcTransport, TransportError};
pub use config::{ChannelNames, RouterConfig, BACK_CHANNEL, DEREGISTER_CHANNEL, REGISTER_CHANNEL};
pub use dispatch::dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::handler_id::HandlerId;
pub use model::message::{
    BackChannelNotification, DeregistrationIntent, ExtensionId, HandlerType,
    NotificationShapeError, RegistrationIntent, RouteParams,
};
pub use model::path_schema::{PathSchema, PathSchemaError};
pub use registry::handler_registry::{HandlerRegistry, RouteHandler};
pub use router::front::{HandlerCounts, ProtocolRouter, RouterError};

/// Minimal health-check API for linkage probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
