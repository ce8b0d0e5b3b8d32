//! Correlation identity for registered route handlers.
//!
//! # Responsibility
//! - Mint opaque ids that link one registration to its future notifications.
//! - Carry ids received from the hub without reinterpreting them.
//!
//! # Invariants
//! - Minted ids come from 128 bits of randomness (UUID v4) and are never reused.
//! - An id is never mutated after creation.
//! - Ids echoed back by the hub are arbitrary strings; only equality matters.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque correlation id shared between the front process and the hub.
///
/// Serialized as a bare JSON string (`handlerId` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(String);

impl HandlerId {
    /// Mints a fresh id for a new registration.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an id received over the channel.
    pub fn from_wire(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for HandlerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(value: &str) -> Self {
        Self::from_wire(value)
    }
}
