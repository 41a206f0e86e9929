//! Termination Requests - Where the process learns that it should shut down.
//!
//! The [`Application`](crate::Application) driver never listens to signals itself. It asks a [`Termination`]
//! collaborator for a future that resolves on a termination request, so that the orchestration core holds no
//! process-wide state and can be exercised with synthetic requests.

use futures::future::BoxFuture;
use futures::FutureExt as _;

use crate::APPLICATION_LOG_TARGET;

/// A source of process termination requests.
#[cfg_attr(test, mockall::automock)]
pub trait Termination: Send + Sync {
    /// Returns a future that resolves once termination is requested.
    ///
    /// Listening starts when this function is called, not when the future is first polled.
    fn requested(&self) -> BoxFuture<'static, ()>;
}

/// Termination on `SIGINT` or `SIGTERM` (`Ctrl-C` on platforms without unix signals).
#[derive(Clone, Copy, Debug, Default)]
pub struct Signals;

/// No termination requests at all; only the caller's context ends the run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Never;

impl Termination for Never {
    fn requested(&self) -> BoxFuture<'static, ()> {
        futures::future::pending().boxed()
    }
}

#[cfg(unix)]
impl Termination for Signals {
    fn requested(&self) -> BoxFuture<'static, ()> {
        use tokio::signal::unix::{signal, SignalKind};

        let (interrupt, terminate) = match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(interrupt), Ok(terminate)) => (interrupt, terminate),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(target: APPLICATION_LOG_TARGET, %e, "failed to install signal handlers");
                return futures::future::pending().boxed();
            }
        };

        async move {
            let (mut interrupt, mut terminate) = (interrupt, terminate);

            tokio::select! {
                _ = interrupt.recv() => tracing::warn!(target: APPLICATION_LOG_TARGET, "received SIGINT, shutting down"),
                _ = terminate.recv() => tracing::warn!(target: APPLICATION_LOG_TARGET, "received SIGTERM, shutting down"),
            }
        }
        .boxed()
    }
}

#[cfg(not(unix))]
impl Termination for Signals {
    fn requested(&self) -> BoxFuture<'static, ()> {
        async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::warn!(target: APPLICATION_LOG_TARGET, "received Ctrl-C, shutting down"),
                Err(e) => {
                    tracing::error!(target: APPLICATION_LOG_TARGET, %e, "failed to listen for Ctrl-C");
                    futures::future::pending::<()>().await;
                }
            }
        }
        .boxed()
    }
}
