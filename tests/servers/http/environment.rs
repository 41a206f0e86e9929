use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use boot::servers::http::server::HttpServer;
use boot_services::{Context, Error, Service};
use tracing::instrument;

pub struct Running {
    pub local_addr: SocketAddr,
}

pub struct Stopped;

pub struct Environment<S> {
    pub server: Arc<HttpServer>,
    pub state: S,
}

impl Environment<Stopped> {
    /// A server on a free port of the loopback interface.
    pub fn new() -> Self {
        Self::on(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
    }

    pub fn on(bind_to: SocketAddr) -> Self {
        Self {
            server: Arc::new(HttpServer::new(bind_to)),
            state: Stopped,
        }
    }

    #[instrument(skip(self))]
    pub async fn start(self) -> Environment<Running> {
        self.server.start(&Context::new()).await.expect("it should start the http server");

        let local_addr = self.server.local_addr().await.expect("it should be bound once started");

        tracing::info!(%local_addr, "started");

        Environment {
            server: self.server,
            state: Running { local_addr },
        }
    }
}

impl Environment<Running> {
    pub async fn new() -> Self {
        Environment::<Stopped>::new().start().await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{path}", self.state.local_addr)
    }

    pub async fn stop(self) -> Result<Environment<Stopped>, Error> {
        self.server.stop(&Context::timeout(std::time::Duration::from_secs(10))).await?;

        Ok(Environment {
            server: self.server,
            state: Stopped,
        })
    }
}
