//! Parallel Service - Starts and stops its children concurrently.
//!
//! Each child call runs in its own task on the runtime. The combinator waits for all of them, unless its
//! context is done first: in that case it returns a cancellation error straight away, and the children still
//! in flight are left to observe the cancellation on their own.
//!
//! Unlike [`Sequential`](crate::Sequential), a failed [`start`](Service::start) does not roll anything back;
//! the caller is expected to follow it with a [`stop`](Service::stop) of the whole tree.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt as _;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinSet};
use tracing::instrument;

use crate::context::Context;
use crate::error::{combine, Error};
use crate::service::Service;
use crate::SERVICES_LOG_TARGET;

#[derive(Clone, Copy, Debug)]
enum Call {
    Start,
    Stop,
}

/// A [`Service`] that delegates to all its children at the same time.
///
/// - [`start`](Service::start) starts every child not yet started. The first failure cancels the context
///   shared by the siblings, and is the error returned once every child call has finished.
///   Every child whose start was attempted counts as started, so a later stop reaches the failed ones too.
/// - [`stop`](Service::stop) stops every started child and combines all their errors.
///
/// Concurrent calls on the same instance are serialized.
pub struct Parallel {
    services: Vec<Arc<dyn Service>>,
    started: Mutex<Vec<bool>>,
}

impl Parallel {
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

    /// Spawns one task per child at `indices`, calling it with a clone of `ctx`.
    fn spawn(&self, call: Call, indices: &BTreeSet<usize>, ctx: &Context) -> JoinSet<(usize, Result<(), Error>)> {
        let mut tasks = JoinSet::new();

        for &index in indices.iter().rev() {
            let service = self.services[index].clone();
            let ctx = ctx.clone();

            tasks.spawn(async move {
                let call = async {
                    match call {
                        Call::Start => service.start(&ctx).await,
                        Call::Stop => service.stop(&ctx).await,
                    }
                };

                let result = AssertUnwindSafe(call)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Err(panicked(payload.as_ref())));

                (index, result)
            });
        }

        tasks
    }

    #[instrument(skip(self, started, ctx), fields(children = self.services.len()))]
    async fn start_locked(&self, started: &mut [bool], ctx: &Context) -> Result<(), Error> {
        let mut in_flight: BTreeSet<usize> = (0..self.services.len()).filter(|&index| !started[index]).collect();

        if in_flight.is_empty() {
            return Ok(());
        }

        let siblings = ctx.child();
        let mut tasks = self.spawn(Call::Start, &in_flight, &siblings);
        let mut first_err = None;

        let done = ctx.done();
        tokio::pin!(done);

        loop {
            tokio::select! {
                biased;

                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    let (index, result) = settle(joined);

                    // a failed start may leave the child partly up, so it is stopped like a started one
                    if let Some(index) = index {
                        in_flight.remove(&index);
                        started[index] = true;
                    }

                    if let Err(err) = result {
                        if first_err.is_none() {
                            tracing::warn!(target: SERVICES_LOG_TARGET, index, %err, "child failed to start, cancelling siblings");
                            siblings.cancel();
                            first_err = Some(err);
                        }
                    }
                }
                () = &mut done => {
                    tracing::warn!(target: SERVICES_LOG_TARGET, pending = in_flight.len(), "context done while children were starting");

                    // the children still in flight may come up after we leave
                    for index in in_flight {
                        started[index] = true;
                    }
                    tasks.detach_all();

                    return Err(ctx.err().unwrap_or(Error::Cancelled));
                }
            }
        }

        // children whose task was lost may have come up
        for index in in_flight {
            started[index] = true;
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[instrument(skip(self, started, ctx), fields(children = self.services.len()))]
    async fn stop_locked(&self, started: &mut [bool], ctx: &Context) -> Result<(), Error> {
        let mut in_flight: BTreeSet<usize> = (0..self.services.len()).filter(|&index| started[index]).collect();

        if in_flight.is_empty() {
            return Ok(());
        }

        let mut tasks = self.spawn(Call::Stop, &in_flight, ctx);
        let mut results = Vec::with_capacity(in_flight.len());

        for &index in &in_flight {
            started[index] = false;
        }

        let done = ctx.done();
        tokio::pin!(done);

        loop {
            tokio::select! {
                biased;

                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    let (index, result) = settle(joined);

                    if let Some(index) = index {
                        in_flight.remove(&index);
                    }

                    if let Err(err) = &result {
                        tracing::warn!(target: SERVICES_LOG_TARGET, index, %err, "child failed to stop");
                    }

                    results.push(result);
                }
                () = &mut done => {
                    tracing::warn!(target: SERVICES_LOG_TARGET, pending = in_flight.len(), "context done while children were stopping");

                    tasks.detach_all();
                    results.push(Err(ctx.err().unwrap_or(Error::Cancelled)));

                    break;
                }
            }
        }

        combine(results)
    }
}

impl Service for Parallel {
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

impl std::fmt::Debug for Parallel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parallel").field("services", &self.services.len()).finish()
    }
}

/// Unpacks a joined child task. The index is unknown only if the task itself was lost, for example on runtime
/// shutdown, since panics inside the child call are already caught.
fn settle(joined: Result<(usize, Result<(), Error>), JoinError>) -> (Option<usize>, Result<(), Error>) {
    match joined {
        Ok((index, result)) => (Some(index), result),
        Err(e) => {
            tracing::error!(target: SERVICES_LOG_TARGET, %e, "failed to join child task");
            (None, Err(Error::Panicked { message: e.to_string() }))
        }
    }
}

fn panicked(payload: &(dyn Any + Send)) -> Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    Error::Panicked { message }
}
