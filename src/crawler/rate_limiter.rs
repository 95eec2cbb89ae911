//! Token-bucket rate limiter shared by every task of one scrape
//!
//! The bucket holds at most one token and refills continuously at the
//! configured rate, so over any one-second window at most `rate + 1`
//! acquisitions succeed. Waiters reserve their slot on arrival and are
//! granted in that order.

use crate::crawler::context::{CancelReason, ScrapeContext};
use crate::ScrapeError;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Longest spacing between tokens, keeps instant arithmetic in range
const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Aggregate request-rate gate
///
/// Construct one per scrape invocation and share it by `Arc` across tasks.
/// With burst capacity 1 the bucket state reduces to the instant at which
/// the next token becomes available.
#[derive(Debug)]
pub struct RateLimiter {
    next_free: Mutex<Instant>,
    interval: Duration,
    rate: f64,
}

impl RateLimiter {
    /// Creates a limiter admitting `requests_per_second` on average
    ///
    /// The bucket starts full, so the first acquisition never waits.
    /// `requests_per_second` must be positive and finite; configuration
    /// validation guarantees this for limiters built by the orchestrator.
    pub fn new(requests_per_second: f64) -> Self {
        debug_assert!(requests_per_second.is_finite() && requests_per_second > 0.0);

        let interval = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .unwrap_or(MAX_INTERVAL)
            .min(MAX_INTERVAL);

        Self {
            next_free: Mutex::new(Instant::now()),
            interval,
            rate: requests_per_second,
        }
    }

    /// Requests per second this limiter admits
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Waits for a token
    ///
    /// The caller's slot is reserved immediately, so concurrent waiters are
    /// served in arrival order. When the slot lies beyond the context's
    /// deadline the call fails at once and reserves nothing. A waiter
    /// cancelled before its slot hands the slot back if nobody queued
    /// behind it.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Cancelled` if `ctx` is cancelled before a token
    /// is granted, including when it was already cancelled on entry.
    pub async fn acquire(&self, ctx: &ScrapeContext) -> Result<(), ScrapeError> {
        if ctx.is_cancelled() {
            return Err(ctx.cancelled_error());
        }

        let slot = match self.reserve(Instant::now(), ctx.deadline()) {
            Some(slot) => slot,
            None => {
                tracing::trace!("Rate limiter slot falls after the deadline");
                return Err(ScrapeError::Cancelled {
                    reason: CancelReason::DeadlineExceeded,
                });
            }
        };

        if slot <= Instant::now() {
            return Ok(());
        }

        tracing::trace!(
            "Rate limiter reserved slot in {:?}",
            slot.saturating_duration_since(Instant::now())
        );

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                self.release(slot);
                Err(ctx.cancelled_error())
            }
            _ = tokio::time::sleep_until(slot) => Ok(()),
        }
    }

    /// Reserves the next free slot, or returns `None` without reserving
    /// when that slot would fall after `deadline`
    fn reserve(&self, now: Instant, deadline: Option<Instant>) -> Option<Instant> {
        let mut next_free = self.next_free.lock().unwrap_or_else(PoisonError::into_inner);

        // An idle limiter never banks more than one token
        let slot = (*next_free).max(now);

        if deadline.is_some_and(|deadline| slot > deadline) {
            return None;
        }

        *next_free = slot + self.interval;
        Some(slot)
    }

    /// Returns an unused slot if it is still the latest reservation
    fn release(&self, slot: Instant) {
        let mut next_free = self.next_free.lock().unwrap_or_else(PoisonError::into_inner);

        if *next_free == slot + self.interval {
            *next_free = slot;
        }
    }
}
