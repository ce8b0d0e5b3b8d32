//! Front-process routing facade.

pub mod front;
