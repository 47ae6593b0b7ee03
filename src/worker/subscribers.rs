//! Subscriber registry with per-subscriber monotonic delivery.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::error;

use super::input::{ParseResult, VersionedInput};
use super::operation::panic_message;
use crate::base::DocumentVersion;

/// Identifies one subscription on one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

pub(super) type Callback<I, O> = dyn Fn(&Arc<ParseResult<I, O>>) + Send + Sync;

pub(super) struct Subscriber<I, O> {
    id: SubscriptionId,
    callback: Box<Callback<I, O>>,
    /// Held while the callback runs, so deliveries to one subscriber never
    /// interleave or go backwards.
    last_delivered: Mutex<Option<DocumentVersion>>,
}

impl<I: VersionedInput, O> Subscriber<I, O> {
    /// Deliver `result` unless something at least as new was delivered already.
    ///
    /// A panicking callback is logged and swallowed; it must not unwind into
    /// the worker that is publishing.
    pub(super) fn deliver(&self, result: &Arc<ParseResult<I, O>>) -> bool {
        let mut last = self.last_delivered.lock();
        let version = result.version();
        if last.is_some_and(|delivered| delivered >= version) {
            return false;
        }
        *last = Some(version);
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(result))) {
            error!(
                subscription = %self.id,
                %version,
                panic = panic_message(payload.as_ref()),
                "subscriber panicked"
            );
        }
        true
    }
}

pub(super) struct Subscribers<I, O> {
    next_id: AtomicU64,
    list: Mutex<Vec<Arc<Subscriber<I, O>>>>,
}

impl<I: VersionedInput, O> Subscribers<I, O> {
    pub(super) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            list: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn add(&self, callback: Box<Callback<I, O>>) -> Arc<Subscriber<I, O>> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let subscriber = Arc::new(Subscriber {
            id,
            callback,
            last_delivered: Mutex::new(None),
        });
        self.list.lock().push(Arc::clone(&subscriber));
        subscriber
    }

    pub(super) fn remove(&self, id: SubscriptionId) -> bool {
        let mut list = self.list.lock();
        let before = list.len();
        list.retain(|s| s.id != id);
        list.len() != before
    }

    pub(super) fn clear(&self) {
        self.list.lock().clear();
    }

    pub(super) fn len(&self) -> usize {
        self.list.lock().len()
    }

    /// Deliver to every current subscriber. The list is snapshotted so
    /// callbacks may subscribe or unsubscribe without deadlocking.
    pub(super) fn notify(&self, result: &Arc<ParseResult<I, O>>) -> usize {
        let snapshot: Vec<_> = self.list.lock().clone();
        snapshot.iter().filter(|s| s.deliver(result)).count()
    }
}

impl<I, O> Subscriber<I, O> {
    pub(super) fn id(&self) -> SubscriptionId {
        self.id
    }
}
