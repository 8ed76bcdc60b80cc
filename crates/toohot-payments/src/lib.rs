//! # toohot-payments: Payment Provider Client
//!
//! The storefront charges cards through a Stripe-compatible payment
//! provider. This crate is the only code that knows how to talk to it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  storefront-api services::payments                                     │
//! │       │                                                                 │
//! │       │  Arc<dyn PaymentGateway>                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 toohot-payments (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────┐          ┌──────────────────┐           │   │
//! │  │   │  StripeGateway   │          │ InMemoryGateway  │           │   │
//! │  │   │  reqwest + form  │          │  tests / local   │           │   │
//! │  │   └────────┬─────────┘          └──────────────────┘           │   │
//! │  │            │ retrieve_with_retry (3 retries, linear backoff)   │   │
//! │  └────────────┼────────────────────────────────────────────────────┘   │
//! │               ▼                                                         │
//! │  POST /v1/payment_intents      GET /v1/payment_intents/{id}            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Retry Policy
//! Creating an intent is never retried: a timeout may have created one on
//! the provider's side. Retrieving an intent is idempotent and goes through
//! [`retry::retrieve_with_retry`].

pub mod error;
pub mod gateway;
pub mod intent;
pub mod memory;
pub mod retry;
pub mod stripe;

pub use error::{PaymentError, PaymentResult};
pub use gateway::PaymentGateway;
pub use intent::{is_valid_intent_id, CreateIntentRequest, LastPaymentError, PaymentIntent};
pub use memory::InMemoryGateway;
pub use retry::{retrieve_with_retry, LinearBackoff};
pub use stripe::{StripeConfig, StripeGateway};

/// Currency every order is charged in.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Intent statuses under which an existing intent can still be paid.
pub const REUSABLE_INTENT_STATUSES: [&str; 2] = ["requires_payment_method", "requires_confirmation"];
