//! Router configuration values.
//!
//! # Invariants
//! - Front and hub must agree on all three channel names.
//! - Every back-channel notification arrives on one shared channel name.

/// Default channel for outbound registration intents.
pub const REGISTER_CHANNEL: &str = "protocol-handler:register";
/// Default channel for outbound deregistration intents.
pub const DEREGISTER_CHANNEL: &str = "protocol-handler:deregister";
/// Default channel for inbound hub notifications.
pub const BACK_CHANNEL: &str = "protocol-handler:back-channel";

/// Well-known channel names shared with the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelNames {
    pub register: String,
    pub deregister: String,
    pub back_channel: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            register: REGISTER_CHANNEL.to_string(),
            deregister: DEREGISTER_CHANNEL.to_string(),
            back_channel: BACK_CHANNEL.to_string(),
        }
    }
}

impl ChannelNames {
    /// Builds names under a custom prefix, e.g. `{prefix}:register`.
    ///
    /// Lets several routers share one transport without crosstalk.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim().trim_end_matches(':');
        Self {
            register: format!("{prefix}:register"),
            deregister: format!("{prefix}:deregister"),
            back_channel: format!("{prefix}:back-channel"),
        }
    }
}

/// Front-process router configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterConfig {
    pub channels: ChannelNames,
}
