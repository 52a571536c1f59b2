//! # Request Context
//!
//! Every storage call carries a [`RequestContext`]: a cancellation token plus an
//! optional deadline. The client checks it before a request is queued and the
//! store checks it again right before a transaction begins, so a request that was
//! abandoned while waiting in the mailbox never writes anything.

use crate::framework::FrameworkError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// A context with no deadline that is only cancelled explicitly.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Derives a context that is cancelled together with `self` but can also be
    /// cancelled on its own. The deadline is inherited.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails with `Cancelled` or `DeadlineExceeded` once the request should stop.
    pub fn check(&self) -> Result<(), FrameworkError> {
        if self.token.is_cancelled() {
            return Err(FrameworkError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(FrameworkError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
