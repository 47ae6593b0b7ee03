//! The versioned worker: at most one operation in flight, newest input wins.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::ThreadPool;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use super::handle::ResultHandle;
use super::input::{ParseResult, VersionedInput};
use super::operation::{OperationError, ParseOperation, panic_message};
use super::subscribers::{Subscribers, SubscriptionId};
use crate::base::{DocumentId, DocumentVersion};

/// Counters describing what a worker has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Operations handed to the thread pool
    pub started: u64,
    /// Operations that returned (published, cancelled or failed)
    pub finished: u64,
    /// Results published, fallbacks included
    pub published: u64,
    /// Failed or panicked operations replaced by the fallback result
    pub fallbacks: u64,
}

/// Runs one stage's [`ParseOperation`] for one document.
///
/// Cloning is cheap; clones share the same state.
pub struct Worker<I, O> {
    shared: Arc<Shared<I, O>>,
}

impl<I, O> Clone for Worker<I, O> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<I, O> {
    document: DocumentId,
    stage: &'static str,
    operation: Arc<dyn ParseOperation<I, O>>,
    pool: Arc<ThreadPool>,
    state: Mutex<WorkerState<I, O>>,
    subscribers: Subscribers<I, O>,
}

struct WorkerState<I, O> {
    last_published: Option<Arc<ParseResult<I, O>>>,
    in_flight: Option<InFlight>,
    pending: Option<I>,
    waiters: Vec<Waiter<I, O>>,
    disposed: bool,
    stats: WorkerStats,
}

struct InFlight {
    version: DocumentVersion,
    cancel: CancellationToken,
}

struct Waiter<I, O> {
    version: DocumentVersion,
    sender: oneshot::Sender<Arc<ParseResult<I, O>>>,
}

/// An operation the caller must hand to the pool once the state lock is
/// released.
type Launch<I> = (I, CancellationToken);

impl<I, O> Worker<I, O>
where
    I: VersionedInput,
    O: Send + Sync + 'static,
{
    pub fn new(
        document: DocumentId,
        stage: &'static str,
        operation: Arc<dyn ParseOperation<I, O>>,
        pool: Arc<ThreadPool>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                document,
                stage,
                operation,
                pool,
                state: Mutex::new(WorkerState {
                    last_published: None,
                    in_flight: None,
                    pending: None,
                    waiters: Vec::new(),
                    disposed: false,
                    stats: WorkerStats::default(),
                }),
                subscribers: Subscribers::new(),
            }),
        }
    }

    pub fn document(&self) -> DocumentId {
        self.shared.document
    }

    pub fn stage(&self) -> &'static str {
        self.shared.stage
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Offer new input. Starts an operation when idle; otherwise keeps the
    /// input as pending (if it is the newest seen) and cancels the running
    /// operation.
    pub fn submit(&self, input: I) {
        let launch = {
            let mut state = self.shared.state.lock();
            self.shared.schedule(&mut state, input)
        };
        if let Some(launch) = launch {
            Shared::spawn(&self.shared, launch);
        }
    }

    /// Handle resolving to the result for `input` or a newer one. Submits
    /// `input` unless a result at least that new is already published.
    pub fn get_or_process(&self, input: I) -> ResultHandle<I, O> {
        let version = input.version();
        let (handle, launch) = {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return ResultHandle::ready(None);
            }
            if let Some(last) = state.last_published.as_ref().filter(|r| r.version() >= version)
            {
                return ResultHandle::ready(Some(Arc::clone(last)));
            }
            let handle = state.register_waiter(version);
            (handle, self.shared.schedule(&mut state, input))
        };
        if let Some(launch) = launch {
            Shared::spawn(&self.shared, launch);
        }
        handle
    }

    /// Handle resolving to the result for the newest input this worker has
    /// seen (pending, in flight or published), without submitting anything.
    /// Before any input arrives it resolves with the first published result.
    pub fn current_or_in_flight(&self) -> ResultHandle<I, O> {
        let mut state = self.shared.state.lock();
        if state.disposed {
            return ResultHandle::ready(None);
        }
        match state.latest_version() {
            Some(version) => state.wait_for(version),
            None => state.register_waiter(DocumentVersion::INITIAL),
        }
    }

    /// Handle resolving once a result at least as new as `version` exists.
    pub fn wait_for(&self, version: DocumentVersion) -> ResultHandle<I, O> {
        let mut state = self.shared.state.lock();
        if state.disposed {
            return ResultHandle::ready(None);
        }
        state.wait_for(version)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The most recently published result, if any. Never blocks on work.
    pub fn last_output(&self) -> Option<Arc<ParseResult<I, O>>> {
        self.shared.state.lock().last_published.clone()
    }

    /// Newest version known to this worker.
    pub fn latest_version(&self) -> Option<DocumentVersion> {
        self.shared.state.lock().latest_version()
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().in_flight.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.state.lock().disposed
    }

    pub fn stats(&self) -> WorkerStats {
        self.shared.state.lock().stats
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register `callback` for every published result. If a result exists
    /// already it is delivered immediately on the calling thread.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<ParseResult<I, O>>) + Send + Sync + 'static,
    {
        let subscriber = self.shared.subscribers.add(Box::new(callback));
        let (current, disposed) = {
            let state = self.shared.state.lock();
            (state.last_published.clone(), state.disposed)
        };
        if disposed {
            self.shared.subscribers.remove(subscriber.id());
            return subscriber.id();
        }
        if let Some(result) = current {
            subscriber.deliver(&result);
        }
        subscriber.id()
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.remove(id)
    }

    /// Cancel in-flight work, drop pending input and waiters, and clear all
    /// subscriptions. Later submissions are ignored.
    pub fn dispose(&self) {
        let waiters = {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            if let Some(in_flight) = &state.in_flight {
                in_flight.cancel.cancel();
            }
            state.pending = None;
            std::mem::take(&mut state.waiters)
        };
        drop(waiters);
        self.shared.subscribers.clear();
        debug!(
            document = %self.shared.document,
            stage = self.shared.stage,
            "worker disposed"
        );
    }
}

impl<I, O> WorkerState<I, O>
where
    I: VersionedInput,
{
    fn latest_version(&self) -> Option<DocumentVersion> {
        let pending = self.pending.as_ref().map(VersionedInput::version);
        let in_flight = self.in_flight.as_ref().map(|f| f.version);
        let published = self.last_published.as_ref().map(|r| r.version());
        [pending, in_flight, published].into_iter().flatten().max()
    }

    fn wait_for(&mut self, version: DocumentVersion) -> ResultHandle<I, O> {
        match self.last_published.as_ref().filter(|r| r.version() >= version) {
            Some(last) => ResultHandle::ready(Some(Arc::clone(last))),
            None => self.register_waiter(version),
        }
    }

    fn register_waiter(&mut self, version: DocumentVersion) -> ResultHandle<I, O> {
        let (sender, receiver) = oneshot::channel();
        self.waiters.push(Waiter { version, sender });
        ResultHandle::waiting(receiver)
    }

    /// Resolve every waiter the new result satisfies.
    fn resolve_waiters(&mut self, result: &Arc<ParseResult<I, O>>) {
        let version = result.version();
        let waiters = std::mem::take(&mut self.waiters);
        for waiter in waiters {
            if waiter.version <= version {
                // A dropped receiver just means nobody is listening anymore.
                let _ = waiter.sender.send(Arc::clone(result));
            } else {
                self.waiters.push(waiter);
            }
        }
    }

    fn launch(&mut self, input: I) -> Launch<I> {
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            version: input.version(),
            cancel: cancel.clone(),
        });
        self.stats.started += 1;
        (input, cancel)
    }
}

impl<I, O> Shared<I, O>
where
    I: VersionedInput,
    O: Send + Sync + 'static,
{
    /// Decide what to do with `input`; returns an operation to start, if any.
    fn schedule(&self, state: &mut WorkerState<I, O>, input: I) -> Option<Launch<I>> {
        let version = input.version();
        if state.disposed {
            trace!(document = %self.document, stage = self.stage, %version, "submit after dispose ignored");
            return None;
        }

        let Some(running) = &state.in_flight else {
            if state.last_published.as_ref().is_some_and(|r| r.version() >= version) {
                trace!(document = %self.document, stage = self.stage, %version, "input already published");
                return None;
            }
            return Some(state.launch(input));
        };

        if version <= running.version {
            trace!(document = %self.document, stage = self.stage, %version, "input coalesced into running operation");
            return None;
        }
        if state.pending.as_ref().is_some_and(|p| p.version() > version) {
            trace!(document = %self.document, stage = self.stage, %version, "stale input dropped");
            return None;
        }

        running.cancel.cancel();
        if let Some(replaced) = state.pending.replace(input) {
            trace!(
                document = %self.document,
                stage = self.stage,
                replaced = %replaced.version(),
                %version,
                "pending input replaced"
            );
        }
        None
    }

    fn spawn(shared: &Arc<Self>, (input, cancel): Launch<I>) {
        let shared = Arc::clone(shared);
        let pool = Arc::clone(&shared.pool);
        pool.spawn(move || shared.run(input, cancel));
    }

    /// Body of one pool task: execute, publish, notify, then start the
    /// follow-up operation if one was pending.
    fn run(self: Arc<Self>, input: I, cancel: CancellationToken) {
        let version = input.version();
        trace!(document = %self.document, stage = self.stage, %version, "operation started");

        let previous = self.state.lock().last_published.clone();
        let output = self.execute(&input, previous.as_deref(), &cancel);
        let (published, follow_up) = self.complete(input, output);

        if let Some(result) = published {
            let delivered = self.subscribers.notify(&result);
            trace!(document = %self.document, stage = self.stage, %version, delivered, "result published");
        }
        if let Some(launch) = follow_up {
            Self::spawn(&self, launch);
        }
    }

    /// Run the operation, mapping failures and panics to the fallback.
    /// `None` means the operation was cancelled.
    fn execute(
        &self,
        input: &I,
        previous: Option<&ParseResult<I, O>>,
        cancel: &CancellationToken,
    ) -> Option<O> {
        let version = input.version();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.operation.run(input, previous, cancel)
        }));
        match outcome {
            Ok(Ok(output)) => Some(output),
            Ok(Err(OperationError::Cancelled)) => {
                trace!(document = %self.document, stage = self.stage, %version, "operation cancelled");
                None
            }
            Ok(Err(err)) => {
                warn!(
                    document = %self.document,
                    stage = self.stage,
                    %version,
                    error = %err,
                    "operation failed, publishing fallback"
                );
                self.state.lock().stats.fallbacks += 1;
                Some(self.operation.fallback(input))
            }
            Err(payload) => {
                error!(
                    document = %self.document,
                    stage = self.stage,
                    %version,
                    panic = panic_message(payload.as_ref()),
                    "operation panicked, publishing fallback"
                );
                self.state.lock().stats.fallbacks += 1;
                Some(self.operation.fallback(input))
            }
        }
    }

    /// Record completion. Returns the result to announce and the next
    /// operation to start.
    fn complete(
        &self,
        input: I,
        output: Option<O>,
    ) -> (Option<Arc<ParseResult<I, O>>>, Option<Launch<I>>) {
        let version = input.version();
        let mut state = self.state.lock();
        state.in_flight = None;
        state.stats.finished += 1;
        if state.disposed {
            return (None, None);
        }

        let published = output.and_then(|output| {
            if state.last_published.as_ref().is_some_and(|last| last.version() > version) {
                trace!(document = %self.document, stage = self.stage, %version, "older result discarded");
                return None;
            }
            let result = Arc::new(ParseResult {
                output,
                source: input,
            });
            state.last_published = Some(Arc::clone(&result));
            state.stats.published += 1;
            state.resolve_waiters(&result);
            Some(result)
        });

        let follow_up = match state.pending.take() {
            Some(next) if next.version() >= version => Some(state.launch(next)),
            Some(stale) => {
                trace!(document = %self.document, stage = self.stage, version = %stale.version(), "stale pending input dropped");
                None
            }
            None => None,
        };

        (published, follow_up)
    }
}
