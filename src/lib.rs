//! Runs a tree of services with a graceful, time-bounded shutdown.
//!
//! The service composition itself lives in the [`boot_services`] package. This crate provides the leaf services,
//! the settings and the wiring used by the `boot` binary:
//!
//! - [`servers::http`]: an HTTP server answering health checks.
//! - [`jobs::heartbeat`]: a periodic job logging a tick.
//! - [`settings`]: layered settings loaded with `figment`.
//! - [`bootstrap`]: command line, tracing and the tree built from the settings.
pub mod bootstrap;
pub mod jobs;
pub mod servers;
pub mod settings;
