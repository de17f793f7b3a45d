//! HTTP handlers

pub mod health;
pub mod telemetry;
pub mod protection;
pub mod command;
pub mod logs;

use crate::{AppError, AppResult};

/// Run engine work that rewrites durable files off the async workers.
///
/// The request still waits for the write to finish.
pub(crate) async fn blocking<F, R>(f: F) -> AppResult<R>
where
    F: FnOnce() -> AppResult<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalError(format!("Task failed: {}", e)))?
}
