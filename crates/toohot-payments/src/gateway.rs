//! # Payment Gateway Port
//!
//! Services hold an `Arc<dyn PaymentGateway>` so the HTTP client can be
//! swapped for [`InMemoryGateway`](crate::memory::InMemoryGateway) in tests.

use async_trait::async_trait;

use crate::error::PaymentResult;
use crate::intent::{CreateIntentRequest, PaymentIntent};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a new intent. Not idempotent; callers must not retry blindly.
    async fn create_intent(&self, request: &CreateIntentRequest) -> PaymentResult<PaymentIntent>;

    /// Fetches an intent by id. Safe to repeat.
    async fn retrieve_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent>;
}
