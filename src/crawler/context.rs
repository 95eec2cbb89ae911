//! Cancellation and deadline scope for a scrape
//!
//! A [`ScrapeContext`] pairs a cancellation token with an optional deadline.
//! Derived contexts are cancelled together with their parent and never
//! outlive its deadline.

use crate::ScrapeError;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The context's deadline passed
    DeadlineExceeded,

    /// The context (or one of its parents) was cancelled explicitly
    Requested,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
            CancelReason::Requested => write!(f, "cancelled by caller"),
        }
    }
}

/// Cancellation token plus optional deadline, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct ScrapeContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ScrapeContext {
    /// A context that is never cancelled and has no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an externally owned cancellation token
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derives a child context that expires `timeout` from now
    ///
    /// A timeout too large to represent as an instant adds no deadline of
    /// its own; the child keeps the parent's deadline, if any.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => Self {
                token: self.token.child_token(),
                deadline: self.deadline,
            },
        }
    }

    /// Derives a child context that expires at `deadline`, or at the
    /// parent's deadline if that comes first
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };

        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancels this context and every context derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once the token is cancelled or the deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline_passed()
    }

    /// Resolves when the token is cancelled or the deadline passes
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Explains why the context stopped
    ///
    /// An elapsed deadline takes precedence over explicit cancellation.
    pub fn cancel_reason(&self) -> CancelReason {
        if self.deadline_passed() {
            CancelReason::DeadlineExceeded
        } else {
            CancelReason::Requested
        }
    }

    /// The error reported by operations that observed cancellation
    pub fn cancelled_error(&self) -> ScrapeError {
        ScrapeError::Cancelled {
            reason: self.cancel_reason(),
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }
}
