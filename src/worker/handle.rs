//! Awaitable handle for a published result.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::input::ParseResult;

/// Resolves to the first published result whose version is at least the
/// requested one, or `None` when the worker is disposed first.
///
/// Await it from async code, or call [`ResultHandle::wait`] from a plain
/// thread.
#[derive(Debug)]
pub struct ResultHandle<I, O> {
    state: HandleState<I, O>,
}

#[derive(Debug)]
enum HandleState<I, O> {
    Ready(Option<Arc<ParseResult<I, O>>>),
    Waiting(oneshot::Receiver<Arc<ParseResult<I, O>>>),
}

impl<I, O> ResultHandle<I, O> {
    pub(super) fn ready(result: Option<Arc<ParseResult<I, O>>>) -> Self {
        Self {
            state: HandleState::Ready(result),
        }
    }

    pub(super) fn waiting(receiver: oneshot::Receiver<Arc<ParseResult<I, O>>>) -> Self {
        Self {
            state: HandleState::Waiting(receiver),
        }
    }

    /// True when the result was already available at creation time.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, HandleState::Ready(_))
    }

    /// Block the current thread until the handle resolves.
    ///
    /// Panics if called from inside an async runtime; await the handle there.
    pub fn wait(self) -> Option<Arc<ParseResult<I, O>>> {
        match self.state {
            HandleState::Ready(result) => result,
            HandleState::Waiting(receiver) => receiver.blocking_recv().ok(),
        }
    }
}

impl<I, O> Future for ResultHandle<I, O> {
    type Output = Option<Arc<ParseResult<I, O>>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            HandleState::Ready(result) => Poll::Ready(result.take()),
            HandleState::Waiting(receiver) => Pin::new(receiver).poll(cx).map(Result::ok),
        }
    }
}
