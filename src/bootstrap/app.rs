//! Wires the configured services into one tree.
//!
//! ```text
//! Sequential
//! ├── Heartbeat            (unless disabled)
//! └── Parallel
//!     ├── HttpServer
//!     └── ...
//! ```
//!
//! The heartbeat starts first and stops last, the HTTP servers start and stop together.
use std::sync::Arc;

use boot_services::{Application, Parallel, Sequential, Service};

use crate::jobs::heartbeat::Heartbeat;
use crate::servers::http::server::HttpServer;
use crate::settings::Settings;

/// Builds the service tree described by the settings.
#[must_use]
pub fn build(settings: &Settings) -> Sequential {
    let mut services: Vec<Arc<dyn Service>> = Vec::new();

    if let Some(interval) = settings.heartbeat.interval() {
        services.push(Arc::new(Heartbeat::new(interval)));
    }

    let http_servers = settings
        .http_servers
        .iter()
        .map(|config| Arc::new(HttpServer::new(config.bind_address)) as Arc<dyn Service>)
        .collect();

    services.push(Arc::new(Parallel::new(http_servers)));

    Sequential::new(services)
}

/// The application driving the tree of [`build`], stopping on `SIGINT` or `SIGTERM`.
#[must_use]
pub fn application(settings: &Settings) -> Application<Sequential> {
    Application::new(build(settings), settings.shutdown_timeout())
}
