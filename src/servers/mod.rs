//! Servers. Services that listen for requests from clients.
pub mod http;
pub mod logging;
