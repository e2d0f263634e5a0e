use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};

/// Runs `operation` until it completes or `cancel` fires.
///
/// On cancellation the operation future is dropped, which aborts any
/// in-flight request or body read.
pub async fn cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("operation cancelled");
            Err(Error::Cancelled)
        }
        result = operation => result,
    }
}
