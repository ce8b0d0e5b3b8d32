//! Value types shared by registration and dispatch paths.
//!
//! # Responsibility
//! - Define correlation ids and the boundary message shapes.
//! - Keep wire validation next to the types it produces.
//!
//! # Invariants
//! - Every registered handler is identified by a freshly minted `HandlerId`.
//! - Inbound payloads become typed notifications only after shape validation.

pub mod handler_id;
pub mod message;
pub mod path_schema;
