//! # HTTP Routes
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Router                                                               │
//! │                                                                       │
//! │  /api/menu ...............  menu::*      ──► MenuService              │
//! │  /api/orders ...............  orders::*    ──► OrderService           │
//! │  /api/payment ..............  payment::*   ──► PaymentService         │
//! │  /api/admin/orders .........  admin::*     ──► AdminService           │
//! │  /api/config/public ........  public_config                          │
//! │  /health ...................  health_handler                         │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers stay thin: extract, call one service method, wrap the result
//! in its response DTO. Failures leave as [`ApiError`], rendered with the
//! detail level of the configured environment.

pub mod admin;
pub mod menu;
pub mod orders;
pub mod payment;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::warn;

use crate::dto::PublicConfigResponse;
use crate::error::{ApiError, ServiceError};
use crate::AppState;

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/menu", get(menu::list_menu))
        .route("/api/menu/categories", get(menu::list_categories))
        .route("/api/orders", get(orders::list_by_email))
        .route("/api/orders/create", post(orders::create_order))
        .route("/api/orders/by-number/{order_number}", get(orders::get_by_number))
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/payment/create-intent", post(payment::create_intent))
        .route("/api/payment/confirm", post(payment::confirm_payment))
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/{order_id}/status", patch(admin::update_status))
        .route("/api/admin/orders/{order_id}/history", get(admin::order_history))
        .route("/api/config/public", get(public_config))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Maps service failures into responses for this deployment.
pub(crate) fn reject(state: &AppState) -> impl Fn(ServiceError) -> ApiError {
    let environment = state.environment();
    move |error| error.into_api(environment)
}

/// Unwraps a JSON body, turning a malformed one into a validation error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ServiceError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

/// Keys the browser needs to render checkout.
pub async fn public_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PublicConfigResponse>, ApiError> {
    let publishable_key = state
        .config
        .publishable_key()
        .map_err(ServiceError::from)
        .map_err(reject(&state))?;

    Ok(Json(PublicConfigResponse {
        publishable_key: publishable_key.to_string(),
        analytics_id: state.config.analytics_id.clone(),
    }))
}

/// Liveness check.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, fixture_with};
    use crate::StorefrontConfig;

    #[tokio::test]
    async fn test_public_config_requires_publishable_key() {
        let fx = fixture().await;
        let err = public_config(State(fx.state.clone())).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let mut config = StorefrontConfig::default();
        config.stripe_publishable_key = Some("pk_test_123".to_string());
        config.analytics_id = Some("G-TEST".to_string());
        let fx = fixture_with(config).await;

        let Json(body) = public_config(State(fx.state.clone())).await.unwrap();
        assert_eq!(body.publishable_key, "pk_test_123");
        assert_eq!(body.analytics_id.as_deref(), Some("G-TEST"));
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let fx = fixture().await;
        let response = health_handler(State(fx.state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_builds() {
        let fx = fixture().await;
        let _router = build_router(fx.state.clone());
    }
}
