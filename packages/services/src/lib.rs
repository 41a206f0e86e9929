//! Services Management Package
//!
//! This package provides the core functionality for composing services into trees and running such a tree
//! as a process, with a graceful, time-bounded shutdown.
//!
//! The package is organized into several modules:
//!
//! - The [`service`] module: Defines the [`Service`] trait, which should be implemented by every service that wishes to be managed by this library.
//! - The [`context`] module: Defines the [`Context`] passed to every call, a cancellable handle with an optional deadline.
//! - The [`error`] module: Defines the [`Error`] type and [`combine`], which aggregate failures without losing any cause.
//! - The [`sequential`] and [`parallel`] modules: Define the [`Sequential`] and [`Parallel`] combinators. Both are services themselves, so they nest freely.
//! - The [`application`] module: Defines the [`Application`] driver, the single entry point of a process.
//! - The [`termination`] module: Defines the [`Termination`] requests the driver listens to, such as [`Signals`].
//!
//! A typical tree and its run:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use boot_services::{Application, Context, Parallel, Sequential};
//!
//! let tree = Sequential::new(vec![
//!     Arc::new(database),
//!     Arc::new(Parallel::new(vec![Arc::new(http), Arc::new(grpc)])),
//! ]);
//!
//! Application::new(tree, Duration::from_secs(10)).run(&Context::new()).await?;
//! ```

pub mod application;
pub mod context;
pub mod error;
pub mod parallel;
pub mod sequential;
pub mod service;
pub mod termination;

pub use application::{Application, Phase};
pub use context::Context;
pub use error::{combine, Error};
pub use parallel::Parallel;
pub use sequential::Sequential;
pub use service::Service;
pub use termination::{Never, Signals, Termination};

pub const SERVICES_LOG_TARGET: &str = "SERVICES";
pub const APPLICATION_LOG_TARGET: &str = "APPLICATION";
