//! Handler storage owned by the front process.

pub mod handler_registry;
