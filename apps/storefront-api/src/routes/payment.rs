use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreatePaymentIntentRequest,
    CreatePaymentIntentResponse, PaymentIntentSummary,
};
use crate::error::ApiError;
use crate::routes::{json_body, reject};
use crate::services::PaymentService;
use crate::AppState;

/// `POST /api/payment/create-intent`
pub async fn create_intent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePaymentIntentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentIntentResponse>, ApiError> {
    let request = json_body(payload).map_err(reject(&state))?;
    let intent = PaymentService::new(state.clone())
        .create_intent(&request.order_id)
        .await
        .map_err(reject(&state))?;

    Ok(Json(CreatePaymentIntentResponse {
        success: true,
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
    }))
}

/// `POST /api/payment/confirm`
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> Result<Json<ConfirmPaymentResponse>, ApiError> {
    let request = json_body(payload).map_err(reject(&state))?;
    let (details, intent) = PaymentService::new(state.clone())
        .confirm(&request.payment_intent_id)
        .await
        .map_err(reject(&state))?;

    Ok(Json(ConfirmPaymentResponse {
        success: true,
        payment_intent: PaymentIntentSummary::from(&intent),
        order: details.into(),
    }))
}
