//! # Service Error Type
//!
//! Every service returns [`ServiceResult`]; handlers turn the error into an
//! HTTP response through [`ApiError`].
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ─┐                                                     │
//! │  CoreError ───────┤                                                     │
//! │  DbError ─────────┼──► ServiceError ──► ApiError ──► (status, JSON)    │
//! │  PaymentError ────┤                        ▲                            │
//! │  ConfigError ─────┘                        │                            │
//! │                                   environment decides                   │
//! │                                   whether details are shown             │
//! │                                                                         │
//! │  { "error": "Order not found", "details": "ord-123" }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Variant           | HTTP |
//! |-------------------|------|
//! | `Validation`      | 400  |
//! | `NotFound`        | 404  |
//! | `InvalidState`    | 400  |
//! | `Conflict`        | 409  |
//! | `PaymentProvider` | 402  |
//! | `Persistence`     | 500  |
//! | `Config`          | 500  |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use toohot_core::{CoreError, ValidationError};
use toohot_db::DbError;
use toohot_payments::PaymentError;

use crate::config::{ConfigError, Environment};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Client-correctable input error.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    /// Not permitted while the order is in its current status.
    #[error("{0}")]
    InvalidState(String),

    /// Lost a version compare-and-swap.
    #[error("{0}")]
    Conflict(String),

    /// The payment provider refused or failed. `message` is the provider's own.
    #[error("Payment processing error")]
    PaymentProvider { message: String },

    #[error("Database operation failed")]
    Persistence(String),

    #[error("Server configuration error")]
    Config(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        ServiceError::InvalidState(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::PaymentProvider { .. } => StatusCode::PAYMENT_REQUIRED,
            ServiceError::Persistence(_) | ServiceError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Extra context for the response body.
    ///
    /// Provider messages are always shown; everything else only outside
    /// production.
    fn details(&self, environment: Environment) -> Option<String> {
        match self {
            ServiceError::PaymentProvider { message } => Some(message.clone()),
            _ if environment.is_production() => None,
            ServiceError::NotFound { id, .. } => Some(id.clone()),
            ServiceError::Persistence(message) | ServiceError::Config(message) => {
                Some(message.clone())
            }
            _ => None,
        }
    }

    /// Binds the error to the environment that decides its details.
    pub fn into_api(self, environment: Environment) -> ApiError {
        ApiError {
            error: self,
            environment,
        }
    }
}

// =============================================================================
// Conversions From Lower Layers
// =============================================================================

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::InvalidTransition { .. } => ServiceError::InvalidState(err.to_string()),
            CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::InvalidPrice { .. } => ServiceError::Validation(err.to_string()),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::VersionConflict { .. } => ServiceError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ServiceError::Validation("Invalid reference".to_string())
            }
            other => {
                error!(error = %other, "Database operation failed");
                ServiceError::Persistence(other.to_string())
            }
        }
    }
}

impl From<PaymentError> for ServiceError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotFound { id } => ServiceError::not_found("Payment intent", id),
            PaymentError::InvalidConfig(message) => ServiceError::Config(message),
            other => ServiceError::PaymentProvider {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

// =============================================================================
// HTTP Response
// =============================================================================

/// JSON body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A [`ServiceError`] ready to be rendered.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    pub environment: Environment,
}

impl ApiError {
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.error.to_string(),
            details: self.error.details(self.environment),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.error.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::invalid_state("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::not_found("Order", "1").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ServiceError::PaymentProvider { message: "declined".into() }.status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ServiceError::Persistence("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_hidden_in_production() {
        let err = ServiceError::Persistence("database is locked".into());
        let body = err.into_api(Environment::Production).body();
        assert_eq!(body.error, "Database operation failed");
        assert!(body.details.is_none());

        let err = ServiceError::Persistence("database is locked".into());
        let body = err.into_api(Environment::Development).body();
        assert_eq!(body.details.as_deref(), Some("database is locked"));
    }

    #[test]
    fn test_provider_message_always_shown() {
        let err: ServiceError = PaymentError::Provider {
            status: 402,
            code: Some("card_declined".into()),
            message: "Your card was declined.".into(),
        }
        .into();
        let body = err.into_api(Environment::Production).body();

        assert_eq!(body.error, "Payment processing error");
        assert_eq!(body.details.as_deref(), Some("Your card was declined."));
    }

    #[test]
    fn test_db_errors_map_to_taxonomy() {
        let err: ServiceError = DbError::version_conflict("Order", "o1", 3).into();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err: ServiceError = DbError::not_found("Order", "o1").into();
        assert_eq!(err.to_string(), "Order not found");

        let err: ServiceError = DbError::QueryFailed("syntax".into()).into();
        assert!(matches!(err, ServiceError::Persistence(_)));
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err: ServiceError = ValidationError::required("Customer email").into();
        assert_eq!(err.to_string(), "Customer email is required");
    }
}
