//! # Payment Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Payment Error Categories                              │
//! │                                                                         │
//! │  Retryable (transient)           Permanent                              │
//! │  ─────────────────────           ─────────                              │
//! │  Timeout                         Provider 4xx (card declined, bad id)  │
//! │  Network                         NotFound                               │
//! │  Provider 429 / 5xx              InvalidResponse                        │
//! │                                  InvalidConfig                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for payment operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The provider answered with an error body.
    #[error("{message}")]
    Provider {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The provider has no intent with this id.
    #[error("Payment intent not found: {id}")]
    NotFound { id: String },

    /// The call did not complete within its deadline.
    #[error("Payment provider timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Connection-level failure before a response arrived.
    #[error("Payment provider unreachable: {0}")]
    Network(String),

    /// The provider answered with something we could not parse.
    #[error("Invalid response from payment provider: {0}")]
    InvalidResponse(String),

    #[error("Payment provider misconfigured: {0}")]
    InvalidConfig(String),
}

impl PaymentError {
    /// Returns true if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Timeout { .. } | PaymentError::Network(_) => true,
            PaymentError::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PaymentError::InvalidResponse(err.to_string())
        } else {
            PaymentError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for PaymentError {
    fn from(err: url::ParseError) -> Self {
        PaymentError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(status: u16) -> PaymentError {
        PaymentError::Provider {
            status,
            code: None,
            message: "boom".into(),
        }
    }

    #[test]
    fn test_is_retryable() {
        assert!(PaymentError::Timeout { seconds: 10 }.is_retryable());
        assert!(PaymentError::Network("reset".into()).is_retryable());
        assert!(provider(503).is_retryable());
        assert!(provider(429).is_retryable());

        assert!(!provider(402).is_retryable());
        assert!(!PaymentError::NotFound { id: "pi_1".into() }.is_retryable());
        assert!(!PaymentError::InvalidConfig("no key".into()).is_retryable());
    }

    #[test]
    fn test_provider_message_is_preserved() {
        let err = PaymentError::Provider {
            status: 402,
            code: Some("card_declined".into()),
            message: "Your card was declined.".into(),
        };
        assert_eq!(err.to_string(), "Your card was declined.");
    }
}
