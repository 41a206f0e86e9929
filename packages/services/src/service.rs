//! Service Trait - A service that can be started and stopped.
//!
//! This module defines the [`Service`] trait, which should be implemented by any service
//! that wishes to be managed by this service management library, including the combinators
//! [`Sequential`](crate::Sequential) and [`Parallel`](crate::Parallel) themselves.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::Error;

/// The `Service` trait defines the core functionality for a service that can be started and stopped.
///
/// Every implementation must uphold the following rules:
///
/// - Calling [`start`](Service::start) on a started service does nothing and succeeds.
/// - Calling [`stop`](Service::stop) on a stopped, or never started, service does nothing and succeeds.
/// - After [`stop`](Service::stop) returns, the service is treated as stopped, even if it returned an error.
/// - The [`Context`] must not be kept after the call returns. If it is done when the call begins, or becomes
///   done during the call, the call returns promptly with the context's cancellation error.
/// - Concurrent calls on the same instance must not corrupt its state.
pub trait Service: Send + Sync {
    /// Starts the service.
    ///
    /// # Errors
    ///
    /// This function will return an error if the service could not be started, or if the context is done.
    fn start<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>>;

    /// Stops the service.
    ///
    /// # Errors
    ///
    /// This function will return an error if the service did not stop cleanly, or if the context is done.
    fn stop<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>>;
}

impl<S> Service for Arc<S>
where
    S: Service + ?Sized,
{
    fn start<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        (**self).start(ctx)
    }

    fn stop<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        (**self).stop(ctx)
    }
}

impl<S> Service for Box<S>
where
    S: Service + ?Sized,
{
    fn start<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        (**self).start(ctx)
    }

    fn stop<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), Error>> {
        (**self).stop(ctx)
    }
}
