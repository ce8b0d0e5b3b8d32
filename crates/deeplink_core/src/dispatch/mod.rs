//! Inbound path from the hub back channel to registered handlers.

pub mod dispatcher;
