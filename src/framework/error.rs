//! # Framework Errors
//!
//! Errors raised by the store plumbing itself, independent of any business rule.
//! Component errors (`ProductError`, `OrderError`) wrap these so callers can tell
//! an infrastructure failure apart from a rejected request.

/// Errors that can occur while talking to the store actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Request cancelled")]
    Cancelled,
    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}
