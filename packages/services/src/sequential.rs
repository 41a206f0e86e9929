//! Sequential Service - Starts its children one at a time, in order, and stops them in reverse.
//!
//! The [`Sequential`] combinator has all-or-nothing semantics on start: if a child fails to start,
//! every child started so far is stopped again before the error is returned.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt as _;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::context::Context;
use crate::error::{combine, Error};
use crate::service::Service;
use crate::SERVICES_LOG_TARGET;

/// A [`Service`] that delegates to its children in list order.
///
/// - [`start`](Service::start) starts the children from first to last, skipping those already started. A child
///   whose start was attempted counts as started, even if it failed.
/// - [`stop`](Service::stop) stops the started children from last to first.
///
/// Children never overlap in time. Concurrent calls on the same instance are serialized.
pub struct Sequential {
    services: Vec<Arc<dyn Service>>,
    started: Mutex<Vec<bool>>,
}

impl Sequential {
    #[must_use]
    pub fn new(services: Vec<Arc<dyn Service>>) -> Self {
        let started = Mutex::new(vec![false; services.len()]);

        Self { services, started }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    #[instrument(skip(self, started, ctx), fields(children = self.services.len()))]
    async fn start_locked(&self, started: &mut [bool], ctx: &Context) -> Result<(), Error> {
        for (index, service) in self.services.iter().enumerate() {
            if started[index] {
                continue;
            }

            let result = match ctx.err() {
                Some(err) => Err(err),
                None => {
                    let result = service.start(ctx).await;

                    // a failed start may leave the child partly up, so it is stopped like a started one
                    started[index] = true;
                    result
                }
            };

            if let Err(err) = result {
                // a rollback under the same done context could only report the cancellation again
                if err.is_cancellation() && ctx.is_done() {
                    tracing::warn!(target: SERVICES_LOG_TARGET, index, %err, "context done while starting, leaving the rollback to the next stop");
                    return Err(err);
                }

                tracing::warn!(target: SERVICES_LOG_TARGET, index, %err, "child failed to start, rolling back");

                let rollback = self.stop_locked(started, ctx).await;

                return combine([Err(err), rollback]);
            }
        }

        Ok(())
    }

    #[instrument(skip(self, started, ctx), fields(children = self.services.len()))]
    async fn stop_locked(&self, started: &mut [bool], ctx: &Context) -> Result<(), Error> {
        let mut results = Vec::new();

        for (index, service) in self.services.iter().enumerate().rev() {
            if !started[index] {
                continue;
            }

            if let Some(err) = ctx.err() {
                results.push(Err(err));
                break;
            }

            let result = service.stop(ctx).await;
            started[index] = false;

            if let Err(err) = &result {
                tracing::warn!(target: SERVICES_LOG_TARGET, index, %err, "child failed to stop");
            }

            results.push(result);
        }

        combine(results)
    }
}

impl Service for Sequential {
    fn start<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            let mut started = ctx.run_until_done(self.started.lock()).await?;

            self.start_locked(&mut started, ctx).await
        }
        .boxed()
    }

    fn stop<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            let mut started = ctx.run_until_done(self.started.lock()).await?;

            self.stop_locked(&mut started, ctx).await
        }
        .boxed()
    }
}

impl std::fmt::Debug for Sequential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequential").field("services", &self.services.len()).finish()
    }
}
