//! Heartbeat job.
//!
//! A [`Heartbeat`] is a [`Service`] that logs a tick every `interval` from a spawned task, until stopped.
//! It is mostly useful as a liveness trace in the logs of a long running process.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use boot_services::{Context, Error, Service};
use futures::future::BoxFuture;
use futures::FutureExt as _;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::jobs::HEARTBEAT_LOG_TARGET;

struct Running {
    halt: CancellationToken,
    task: JoinHandle<()>,
}

pub struct Heartbeat {
    interval: Duration,
    ticks: Arc<AtomicU64>,
    running: Mutex<Option<Running>>,
}

impl Heartbeat {
    /// # Panics
    ///
    /// It panics if `interval` is zero.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "the heartbeat interval should not be zero");

        Self {
            interval,
            ticks: Arc::default(),
            running: Mutex::default(),
        }
    }

    /// The number of ticks since the job was created.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    async fn tick(interval: Duration, ticks: Arc<AtomicU64>, halt: CancellationToken) {
        loop {
            // `sleep` saturates an interval too large for the clock
            tokio::select! {
                () = halt.cancelled() => {
                    tracing::info!(target: HEARTBEAT_LOG_TARGET, "Stopping heartbeat job..");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    let ticks = ticks.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::info!(target: HEARTBEAT_LOG_TARGET, ticks, "tick");
                }
            }
        }
    }
}

impl Service for Heartbeat {
    fn start<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            let mut running = ctx.run_until_done(self.running.lock()).await?;

            if running.is_some() {
                return Ok(());
            }

            let halt = CancellationToken::new();
            let task = tokio::spawn(Self::tick(self.interval, self.ticks.clone(), halt.clone()));

            tracing::info!(target: HEARTBEAT_LOG_TARGET, interval = ?self.interval, "Started heartbeat job");

            *running = Some(Running { halt, task });
            Ok(())
        }
        .boxed()
    }

    fn stop<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            let mut running = ctx.run_until_done(self.running.lock()).await?;

            let Some(mut stopping) = running.take() else {
                return Ok(());
            };

            stopping.halt.cancel();

            match ctx.run_until_done(&mut stopping.task).await? {
                Ok(()) => Ok(()),
                Err(e) => Err(Error::service(e)),
            }
        }
        .boxed()
    }
}

impl std::fmt::Debug for Heartbeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heartbeat")
            .field("interval", &self.interval)
            .field("ticks", &self.ticks())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use boot_services::{Context, Service};

    use super::Heartbeat;

    #[tokio::test(start_paused = true)]
    async fn it_should_tick_once_per_interval_until_stopped() {
        let heartbeat = Heartbeat::new(Duration::from_secs(1));
        let ctx = Context::new();

        heartbeat.start(&ctx).await.unwrap();
        heartbeat.start(&ctx).await.unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;

        heartbeat.stop(&ctx).await.unwrap();
        let ticks = heartbeat.ticks();

        assert_eq!(ticks, 3);

        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(heartbeat.ticks(), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn an_interval_beyond_the_clock_should_never_tick() {
        let heartbeat = Heartbeat::new(Duration::from_secs(u64::MAX));
        let ctx = Context::new();

        heartbeat.start(&ctx).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3600)).await;
        heartbeat.stop(&ctx).await.unwrap();

        assert_eq!(heartbeat.ticks(), 0);
    }

    #[tokio::test]
    async fn stopping_a_job_that_never_started_should_do_nothing() {
        let heartbeat = Heartbeat::new(Duration::from_secs(1));

        heartbeat.stop(&Context::new()).await.unwrap();

        assert_eq!(heartbeat.ticks(), 0);
    }

    #[tokio::test]
    async fn it_should_not_start_with_a_context_that_is_already_done() {
        let heartbeat = Heartbeat::new(Duration::from_secs(1));
        let ctx = Context::new();
        ctx.cancel();

        assert!(heartbeat.start(&ctx).await.unwrap_err().is_cancellation());

        heartbeat.stop(&Context::new()).await.unwrap();
    }

    #[test]
    #[should_panic(expected = "the heartbeat interval should not be zero")]
    fn it_should_refuse_a_zero_interval() {
        let _ = Heartbeat::new(Duration::ZERO);
    }
}
