//! Setup for the main application.
//!
//! The [`config`] module reads the command line and the settings, the [`tracing`] module installs the subscriber
//! and the [`app`] module wires the configured services into one tree.
pub mod app;
pub mod config;
pub mod tracing;
