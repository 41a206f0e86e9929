//! Background jobs that run as leaf services of the application tree.
pub mod heartbeat;

pub const HEARTBEAT_LOG_TARGET: &str = "HEARTBEAT";
