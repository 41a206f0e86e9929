//! Service Errors - Failure causes reported by services, combinators and the application driver.
//!
//! Every failure is one of three kinds:
//!
//! - A *child failure*: a leaf or nested composite reported an error, carried as [`Error::Service`] with its
//!   original identity preserved.
//! - A *cancellation failure*: the governing [`Context`](crate::Context) became done first, carried as
//!   [`Error::Cancelled`] or [`Error::DeadlineExceeded`].
//! - An *aggregate failure*: several of the above, carried as [`Error::Multiple`]. Aggregates are always flat and
//!   never discard a cause.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

type BoxedCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Clone, Debug, Error)]
pub enum Error {
    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Service(BoxedCause),

    #[error("service task panicked: {message}")]
    Panicked { message: String },

    #[error("{}", Joined(.0))]
    Multiple(Vec<Error>),
}

struct Joined<'a>(&'a [Error]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, err) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// A plain message used as a service failure cause.
#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

impl Error {
    /// Wraps an arbitrary error as a service failure cause.
    ///
    /// Clones of the returned value share the same cause and match each other with [`Error::is`].
    pub fn service<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Service(Arc::new(err))
    }

    /// A service failure cause made of a plain message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::service(Message(message.to_string()))
    }

    /// Combines two errors into one, flattening aggregates and keeping every cause in order.
    #[must_use]
    pub fn append(self, other: Error) -> Error {
        let mut causes = self.into_causes();
        causes.extend(other.into_causes());
        Self::Multiple(causes)
    }

    /// The flat list of leaf causes.
    #[must_use]
    pub fn causes(&self) -> Vec<&Error> {
        match self {
            Self::Multiple(errors) => errors.iter().flat_map(Error::causes).collect(),
            leaf => vec![leaf],
        }
    }

    /// Whether `target` is one of the causes of this error.
    ///
    /// Service causes match by identity (the same wrapped value). Panics carry no identity, so two panics match
    /// whenever their messages are equal. Every other leaf matches by kind.
    #[must_use]
    pub fn is(&self, target: &Error) -> bool {
        let targets = target.causes();

        self.causes()
            .into_iter()
            .any(|cause| targets.iter().any(|target| cause.same_leaf(target)))
    }

    /// Finds the first service cause of type `E`.
    #[must_use]
    pub fn find<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.causes().into_iter().find_map(|cause| match cause {
            Self::Service(err) => err.downcast_ref::<E>(),
            _ => None,
        })
    }

    /// Whether any cause is a cancellation or an expired deadline.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        self.causes()
            .into_iter()
            .any(|cause| matches!(cause, Self::Cancelled | Self::DeadlineExceeded))
    }

    fn same_leaf(&self, other: &Error) -> bool {
        match (self, other) {
            (Self::Service(lhs), Self::Service(rhs)) => Arc::ptr_eq(lhs, rhs),
            (Self::Cancelled, Self::Cancelled) | (Self::DeadlineExceeded, Self::DeadlineExceeded) => true,
            (Self::Panicked { message: lhs }, Self::Panicked { message: rhs }) => lhs == rhs,
            _ => false,
        }
    }

    fn into_causes(self) -> Vec<Error> {
        match self {
            Self::Multiple(errors) => errors.into_iter().flat_map(Error::into_causes).collect(),
            leaf => vec![leaf],
        }
    }

    fn from_causes(mut causes: Vec<Error>) -> Option<Error> {
        match causes.len() {
            0 => None,
            1 => causes.pop(),
            _ => Some(Self::Multiple(causes)),
        }
    }
}

/// Combines the outcome of several calls into one, keeping every error.
///
/// # Errors
///
/// Returns an error if any of the `results` is an error; several errors are returned as one flat
/// [`Error::Multiple`] in the order they were given.
pub fn combine<I>(results: I) -> Result<(), Error>
where
    I: IntoIterator<Item = Result<(), Error>>,
{
    let causes = results
        .into_iter()
        .filter_map(Result::err)
        .flat_map(Error::into_causes)
        .collect();

    match Error::from_causes(causes) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
