use async_trait::async_trait;
use std::future::Future;

use crate::error::OperationError;

pub mod file_read;

pub use file_read::FileRead;

/// An unreliable unit of work driven by the executor.
///
/// Each call receives the same target. Implementations report a usable value,
/// [`OperationError::NotReady`] when they ran but produced nothing yet, or a
/// transient/fatal failure.
#[async_trait]
pub trait Operation<T: Sync, V: Send>: Send + Sync {
    async fn invoke(&self, target: &T) -> Result<V, OperationError>;
}

/// Adapts an async closure into an [`Operation`].
pub struct FnOperation<F> {
    f: F,
}

/// Wraps `f` so it can be handed to an executor. The target is cloned into
/// every call.
pub fn operation_fn<F>(f: F) -> FnOperation<F> {
    FnOperation { f }
}

#[async_trait]
impl<T, V, F, Fut> Operation<T, V> for FnOperation<F>
where
    T: Clone + Send + Sync + 'static,
    V: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, OperationError>> + Send + 'static,
{
    async fn invoke(&self, target: &T) -> Result<V, OperationError> {
        (self.f)(target.clone()).await
    }
}
