//! # Store Messages
//!
//! The store actor does not know the shape of the requests it serves. Each
//! message carries a boxed job that runs against the actor's state; the job owns
//! the oneshot sender for its own reply, so results of any type flow back to the
//! caller without a per-operation message variant.

use crate::framework::FrameworkError;
use std::fmt;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// A read-only job. Runs against a shared borrow of the state.
pub type ReadJob<S> = Box<dyn FnOnce(&S) + Send>;

/// A transactional job. Runs with exclusive access and reports how it ended.
pub type TxJob<S> = Box<dyn FnOnce(&mut S) -> TxOutcome + Send>;

/// How a transaction finished, as seen by the actor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    RolledBack,
    /// The request context was already cancelled or expired when its turn came.
    Aborted,
}

pub enum StoreRequest<S> {
    Read { op: &'static str, job: ReadJob<S> },
    Transaction { op: &'static str, job: TxJob<S> },
}

impl<S> StoreRequest<S> {
    pub fn op(&self) -> &'static str {
        match self {
            StoreRequest::Read { op, .. } | StoreRequest::Transaction { op, .. } => op,
        }
    }
}

impl<S> fmt::Debug for StoreRequest<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRequest::Read { op, .. } => f.debug_struct("Read").field("op", op).finish(),
            StoreRequest::Transaction { op, .. } => {
                f.debug_struct("Transaction").field("op", op).finish()
            }
        }
    }
}
