//! The parse operation a worker runs, and how it may fail.

use std::any::Any;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::input::ParseResult;

/// Why an operation produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Superseded by newer input; never published.
    #[error("operation cancelled")]
    Cancelled,
    /// Recoverable failure while parsing or building.
    #[error("parse failed: {0}")]
    Failed(String),
    /// A collaborator the operation needs is missing.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl OperationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Return `Err(Cancelled)` once the token has been signalled.
#[inline]
pub fn check_cancelled(cancel: &CancellationToken) -> Result<(), OperationError> {
    if cancel.is_cancelled() {
        Err(OperationError::Cancelled)
    } else {
        Ok(())
    }
}

/// One stage's parse function.
///
/// `run` must poll `cancel` periodically and return
/// [`OperationError::Cancelled`] when it fires. Any other error (or a panic)
/// makes the worker publish `fallback(input)` instead.
pub trait ParseOperation<I, O>: Send + Sync + 'static {
    fn run(
        &self,
        input: &I,
        previous: Option<&ParseResult<I, O>>,
        cancel: &CancellationToken,
    ) -> Result<O, OperationError>;

    /// The explicit empty result published when `run` fails.
    fn fallback(&self, input: &I) -> O;
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
