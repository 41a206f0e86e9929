//! Application - Runs one root service for the life of a process.
//!
//! The [`Application`] driver moves through the following phases:
//!
//! ```text
//! Idle -> Starting -> Running -> Stopping -> Terminated
//!             \                     ^
//!              `--- start failed ---'
//! ```
//!
//! - **Starting**: the root service is started with a context that is done when either the caller's context is
//!   done or a [termination request](crate::Termination) arrives.
//! - **Running**: the driver waits until that context is done. A failed start skips this phase.
//! - **Stopping**: termination requests are no longer listened to, and the root service is stopped with a fresh
//!   context bounded by the shutdown timeout.
//! - **Terminated**: the run returns the start error and the stop error combined.

use std::time::Duration;

use derive_more::Display;
use tokio::sync::watch;
use tracing::instrument;

use crate::context::Context;
use crate::error::{combine, Error};
use crate::service::Service;
use crate::termination::{Signals, Termination};
use crate::APPLICATION_LOG_TARGET;

/// The phase of an [`Application`] run.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    Running,
    Stopping,
    Terminated,
}

/// Drives a root [`Service`] from start to a bounded, graceful stop.
///
/// A run is a single blocking call, meant to be made once per process from its entry point.
pub struct Application<S> {
    service: S,
    shutdown_timeout: Duration,
    termination: Box<dyn Termination>,
    phase: watch::Sender<Phase>,
}

impl<S> Application<S>
where
    S: Service,
{
    /// An application for `service` that shuts down on `SIGINT` or `SIGTERM`.
    ///
    /// A shutdown timeout of a few seconds to a few tens of seconds is the intended range: too short truncates
    /// legitimate shutdown work, too long defeats bounding it.
    pub fn new(service: S, shutdown_timeout: Duration) -> Self {
        Self::with_termination(service, shutdown_timeout, Signals)
    }

    /// An application for `service` that listens to `termination` for shutdown requests.
    pub fn with_termination<T>(service: S, shutdown_timeout: Duration, termination: T) -> Self
    where
        T: Termination + 'static,
    {
        let (phase, _) = watch::channel(Phase::Idle);

        Self {
            service,
            shutdown_timeout,
            termination: Box::new(termination),
            phase,
        }
    }

    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Subscribes to the phase transitions of the next run.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Runs the root service until `ctx` is done or termination is requested, then stops it.
    ///
    /// # Errors
    ///
    /// Returns the start error, the stop error, or both combined. Each cause stays matchable
    /// with [`Error::is`].
    #[instrument(skip(self, ctx), fields(shutdown_timeout = ?self.shutdown_timeout))]
    pub async fn run(&self, ctx: &Context) -> Result<(), Error> {
        let run_ctx = ctx.child();

        let requested = self.termination.requested();
        let listener = tokio::spawn({
            let run_ctx = run_ctx.clone();
            async move {
                tokio::select! {
                    () = requested => run_ctx.cancel(),
                    () = run_ctx.done() => {}
                }
            }
        });

        self.transition(Phase::Starting);

        let started = self.service.start(&run_ctx).await;

        match &started {
            Ok(()) => {
                self.transition(Phase::Running);
                run_ctx.done().await;
            }
            Err(err) => {
                tracing::error!(target: APPLICATION_LOG_TARGET, %err, "failed to start, stopping what was started");
            }
        }

        listener.abort();

        self.transition(Phase::Stopping);

        let shutdown_ctx = Context::timeout(self.shutdown_timeout);
        let stopped = self.service.stop(&shutdown_ctx).await;

        if let Err(err) = &stopped {
            tracing::error!(target: APPLICATION_LOG_TARGET, %err, "failed to stop cleanly");
        }

        self.transition(Phase::Terminated);

        combine([started, stopped])
    }

    fn transition(&self, phase: Phase) {
        tracing::info!(target: APPLICATION_LOG_TARGET, %phase, "application phase");

        self.phase.send_replace(phase);
    }
}

impl<S> std::fmt::Debug for Application<S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("service", &self.service)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("phase", &*self.phase.borrow())
            .finish_non_exhaustive()
    }
}
