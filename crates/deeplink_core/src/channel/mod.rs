//! Inter-process channel contracts and implementations.
//!
//! # Responsibility
//! - Define the transport seam shared by outbound and inbound paths.
//! - Provide the fire-and-forget registration client.
//! - Provide an in-process loopback transport for probes and tests.

pub mod client;
pub mod loopback;
pub mod transport;
