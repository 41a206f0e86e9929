//! Execution Context - A cancellable, time-boundable handle passed into every `start` and `stop` call.
//!
//! A [`Context`] carries no payload. It only answers one question: "should the holder stop what it is doing?"
//! It becomes *done* when it is cancelled (directly, or through any of its ancestors) or when its deadline passes.
//!
//! Contexts form a tree:
//!
//! - [`Context::new`] creates a root that is only done once cancelled.
//! - [`Context::timeout`] creates a root that is done after a fixed duration from "now", independent of any other context.
//! - [`Context::child`] and [`Context::with_timeout`] derive contexts that are done whenever their parent is done.
//!   Cancelling a derived context never cancels its parent.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// A cancellable execution context with an optional deadline.
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A root context, done only when [cancelled](Context::cancel).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A root context that is done once `duration` has elapsed from now.
    ///
    /// A duration too large for the clock leaves the context without a deadline.
    #[must_use]
    pub fn timeout(duration: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(duration),
        }
    }

    /// A derived context, done when either it or its parent is done.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// A derived context whose deadline is the earlier of the parent's deadline and `now + duration`.
    #[must_use]
    pub fn with_timeout(&self, duration: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(duration)) {
            (Some(parent), Some(deadline)) => Some(parent.min(deadline)),
            (parent, deadline) => parent.or(deadline),
        };

        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// The reason this context is done, or `None` while it is still live.
    ///
    /// An explicit cancellation takes precedence over an expired deadline.
    #[must_use]
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            return Some(Error::Cancelled);
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is done.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Races `future` against this context.
    ///
    /// # Errors
    ///
    /// Returns the context's cancellation error if the context is done first; `future` is dropped in that case.
    pub async fn run_until_done<F>(&self, future: F) -> Result<F::Output, Error>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;

            output = future => Ok(output),
            () = self.done() => Err(self.err().unwrap_or(Error::Cancelled)),
        }
    }
}
