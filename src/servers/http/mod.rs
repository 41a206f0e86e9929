//! HTTP server.
//!
//! An [`HttpServer`](server::HttpServer) is a leaf [`Service`](boot_services::Service) serving a small JSON API with
//! [`axum`]:
//!
//! Endpoint | Response
//! ---|---
//! `GET /` | `{}`
//! `GET /health_check` | `{"status":"Ok"}`
//!
//! Every response carries the `x-request-id` header of its request, generated when the client did not send one.
pub mod error;
pub mod routes;
pub mod server;

pub const HTTP_SERVER_LOG_TARGET: &str = "HTTP SERVER";
