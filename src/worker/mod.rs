//! Versioned parser workers.
//!
//! A [`Worker`] owns the parse operations of one document for one stage. It
//! runs at most one operation at a time on a shared rayon pool, keeps only the
//! newest pending input, and publishes every completed result to waiters and
//! subscribers in version order.
//!
//! ## State machine
//!
//! ```text
//!            submit (idle)
//!   Idle ─────────────────────▶ Running
//!    ▲                            │  submit (running): replace pending,
//!    │ complete, no pending       │  cancel in-flight token
//!    └────────────────────────────┤
//!                                 │ complete, pending ≥ completed
//!                                 └──────▶ Running (pending input)
//! ```
//!
//! Cancellation is a signal into the running operation, not a state: the
//! worker stays Running until the cancelled operation actually returns.

mod handle;
mod input;
mod operation;
mod subscribers;
mod versioned;

pub use handle::ResultHandle;
pub use input::{ParseResult, VersionedInput, compare_inputs};
pub use operation::{OperationError, ParseOperation, check_cancelled};
pub(crate) use operation::panic_message;
pub use subscribers::SubscriptionId;
pub use versioned::{Worker, WorkerStats};
