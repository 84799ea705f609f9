//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Handlers are shared between the tasks of a multi-threaded runtime, so
/// they are required to be [`Sync`] and to return [`Send`] futures.
pub trait Handler<Args = ()>: Sync {
    /// Type of successful [`Handler`] result.
    type Ok: Send;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> + Send;
}
