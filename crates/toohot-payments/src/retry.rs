//! # Bounded Retry for Provider Reads
//!
//! ```text
//! attempt 0 ──✗──► wait 1000ms ──► attempt 1 ──✗──► wait 2000ms ──►
//! attempt 2 ──✗──► wait 3000ms ──► attempt 3 ──✗──► give up
//! ```
//!
//! Only transient failures (see [`crate::PaymentError::is_retryable`]) are repeated.
//! A declined card or an unknown intent id fails on the first attempt.

use std::time::Duration;

use backoff::backoff::Backoff;
use tracing::debug;

use crate::error::PaymentResult;
use crate::gateway::PaymentGateway;
use crate::intent::PaymentIntent;

/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base unit of the linear schedule.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Waits `base * (attempt + 1)` between attempts, at most `max_retries` times.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base: Duration,
    max_retries: u32,
    attempt: u32,
}

impl LinearBackoff {
    pub fn new(base: Duration, max_retries: u32) -> Self {
        LinearBackoff {
            base,
            max_retries,
            attempt: 0,
        }
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES)
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        let delay = self.base * (self.attempt + 1);
        self.attempt += 1;
        Some(delay)
    }
}

/// Retrieves an intent, repeating transient failures on `backoff`'s schedule.
pub async fn retrieve_with_retry<G>(
    gateway: &G,
    intent_id: &str,
    backoff: LinearBackoff,
) -> PaymentResult<PaymentIntent>
where
    G: PaymentGateway + ?Sized,
{
    backoff::future::retry(backoff, move || async move {
        gateway.retrieve_intent(intent_id).await.map_err(|err| {
            if err.is_retryable() {
                debug!(intent_id = %intent_id, error = %err, "Transient provider error, retrying");
                backoff::Error::transient(err)
            } else {
                backoff::Error::permanent(err)
            }
        })
    })
    .await
}
