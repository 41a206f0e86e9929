//! The HTTP server service.
use std::net::SocketAddr;

use axum_server::Handle;
use boot_services::{Context, Error as ServiceError, Service};
use futures::future::BoxFuture;
use futures::FutureExt as _;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::instrument;

use super::error::Error;
use super::routes::router;
use super::HTTP_SERVER_LOG_TARGET;
use crate::servers::logging::STARTED_ON;

#[derive(Debug)]
struct Running {
    local_addr: SocketAddr,
    handle: Handle,
    task: JoinHandle<std::io::Result<()>>,
}

/// Serves the routes of [`router`] on `bind_to` while started.
#[derive(Debug)]
pub struct HttpServer {
    bind_to: SocketAddr,
    running: Mutex<Option<Running>>,
}

impl HttpServer {
    #[must_use]
    pub fn new(bind_to: SocketAddr) -> Self {
        Self {
            bind_to,
            running: Mutex::default(),
        }
    }

    /// The configured address. Its port may be `0`.
    #[must_use]
    pub fn bind_to(&self) -> SocketAddr {
        self.bind_to
    }

    /// The address actually bound, while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|running| running.local_addr)
    }

    fn launch(&self) -> Result<Running, Error> {
        let socket = std::net::TcpListener::bind(self.bind_to).map_err(|source| Error::FailedToBindToSocket {
            bind_to: self.bind_to,
            source,
        })?;
        socket.set_nonblocking(true).map_err(Error::FailedToSetNonBlocking)?;
        let local_addr = socket.local_addr().map_err(Error::FailedToObtainLocalAddress)?;

        let handle = Handle::new();

        tracing::debug!(target: HTTP_SERVER_LOG_TARGET, %local_addr, "Starting service in a spawned task ...");

        let task = tokio::spawn(
            axum_server::from_tcp(socket)
                .handle(handle.clone())
                .serve(router().into_make_service_with_connect_info::<SocketAddr>()),
        );

        Ok(Running {
            local_addr,
            handle,
            task,
        })
    }

    #[instrument(skip(self, ctx, running), fields(bind_to = %self.bind_to))]
    async fn shutdown(&self, ctx: &Context, mut running: Running) -> Result<(), ServiceError> {
        let grace = ctx.deadline().map(|deadline| deadline.saturating_duration_since(Instant::now()));

        tracing::info!(target: HTTP_SERVER_LOG_TARGET, local_addr = %running.local_addr, "Shutting down http server ...");
        running.handle.graceful_shutdown(grace);

        let joined = match ctx.run_until_done(&mut running.task).await {
            Ok(joined) => joined,
            Err(err) => {
                tracing::warn!(target: HTTP_SERVER_LOG_TARGET, %err, "Giving up on the graceful shutdown");
                running.handle.shutdown();
                running.task.abort();
                return Err(err);
            }
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ServiceError::service(Error::TaskFailed(e))),
            Err(e) => Err(ServiceError::service(Error::TaskUnexpectedlyPanicked(e))),
        }
    }
}

impl Service for HttpServer {
    fn start<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), ServiceError>> {
        async move {
            let mut running = ctx.run_until_done(self.running.lock()).await?;

            if running.is_some() {
                return Ok(());
            }

            let started = self.launch().map_err(ServiceError::service)?;

            // important!
            tracing::info!(target: HTTP_SERVER_LOG_TARGET, "{STARTED_ON}: http://{}", started.local_addr);

            *running = Some(started);
            Ok(())
        }
        .boxed()
    }

    fn stop<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), ServiceError>> {
        async move {
            let mut running = ctx.run_until_done(self.running.lock()).await?;

            let Some(stopping) = running.take() else {
                return Ok(());
            };

            self.shutdown(ctx, stopping).await
        }
        .boxed()
    }
}
