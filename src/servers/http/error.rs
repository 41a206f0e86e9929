use std::net::SocketAddr;

use thiserror::Error;

/// Error that can occur when starting or stopping the HTTP server.
#[derive(Debug, Error)]
pub enum Error {
    #[error("It should be able to bind to a socket on {bind_to}: {source}")]
    FailedToBindToSocket { bind_to: SocketAddr, source: std::io::Error },
    #[error("It should be able to put the socket in non-blocking mode: {0}")]
    FailedToSetNonBlocking(std::io::Error),
    #[error("It should be able to obtain the local address of the bound socket: {0}")]
    FailedToObtainLocalAddress(std::io::Error),
    #[error("It should not panic when running: {0}")]
    TaskUnexpectedlyPanicked(tokio::task::JoinError),
    #[error("It should serve until asked to stop: {0}")]
    TaskFailed(std::io::Error),
}
