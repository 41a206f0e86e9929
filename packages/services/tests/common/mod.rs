#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use boot_services::{Context, Error, Service};
use futures::future::BoxFuture;
use futures::FutureExt as _;

/// A shared, ordered log of the calls that reached the recorders.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    fn record(&self, entry: String) {
        self.entries.lock().expect("it should lock the journal").push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("it should lock the journal").clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|recorded| *recorded == entry).count()
    }
}

/// How a recorder behaves while starting or stopping.
#[derive(Clone, Copy, Debug)]
pub enum Behaviour {
    Immediate,
    /// Takes this long, unless the context is done first.
    Slow(Duration),
    /// Takes this long, ignoring the context.
    Stubborn(Duration),
    /// Never finishes until the context is done.
    UntilCancelled,
    Panic,
}

/// A fake service that honors the service rules and writes every effective call to a [`Journal`].
#[derive(Debug)]
pub struct Recorder {
    name: &'static str,
    journal: Journal,
    started: tokio::sync::Mutex<bool>,
    on_start: Behaviour,
    on_stop: Behaviour,
    start_error: Option<Error>,
    stop_error: Option<Error>,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            started: tokio::sync::Mutex::new(false),
            on_start: Behaviour::Immediate,
            on_stop: Behaviour::Immediate,
            start_error: None,
            stop_error: None,
        }
    }

    pub fn on_start(mut self, behaviour: Behaviour) -> Self {
        self.on_start = behaviour;
        self
    }

    pub fn on_stop(mut self, behaviour: Behaviour) -> Self {
        self.on_stop = behaviour;
        self
    }

    pub fn failing_start(mut self, err: &Error) -> Self {
        self.start_error = Some(err.clone());
        self
    }

    pub fn failing_stop(mut self, err: &Error) -> Self {
        self.stop_error = Some(err.clone());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn is_started(&self) -> bool {
        *self.started.lock().await
    }

    async fn behave(&self, behaviour: Behaviour, ctx: &Context) -> Result<(), Error> {
        match behaviour {
            Behaviour::Immediate => Ok(()),
            Behaviour::Slow(duration) => ctx.run_until_done(tokio::time::sleep(duration)).await,
            Behaviour::Stubborn(duration) => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
            Behaviour::UntilCancelled => {
                ctx.done().await;
                Err(ctx.err().unwrap_or(Error::Cancelled))
            }
            Behaviour::Panic => panic!("{} panicked", self.name),
        }
    }
}

impl Service for Recorder {
    fn start<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            let mut started = ctx.run_until_done(self.started.lock()).await?;

            if *started {
                return Ok(());
            }

            self.journal.record(format!("{}.start()", self.name));

            self.behave(self.on_start, ctx).await?;

            if let Some(err) = &self.start_error {
                return Err(err.clone());
            }

            *started = true;
            Ok(())
        }
        .boxed()
    }

    fn stop<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            let mut started = ctx.run_until_done(self.started.lock()).await?;

            if !*started {
                return Ok(());
            }

            self.journal.record(format!("{}.stop()", self.name));
            *started = false;

            self.behave(self.on_stop, ctx).await?;

            match &self.stop_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
        .boxed()
    }
}

/// Erases the recorders into the children list of a combinator.
pub fn children<const N: usize>(recorders: [&Arc<Recorder>; N]) -> Vec<Arc<dyn Service>> {
    recorders
        .into_iter()
        .map(|recorder| Arc::clone(recorder) as Arc<dyn Service>)
        .collect()
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Failure {
    #[error("broken")]
    Broken,
    #[error("stuck")]
    Stuck,
}
