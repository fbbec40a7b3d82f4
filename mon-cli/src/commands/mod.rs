//! CLI command implementations.

pub mod events;
pub mod watch;
