use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};

use crate::dto::{CreateOrderRequest, EmailQuery, OrderDto, OrderResponse, OrdersResponse};
use crate::error::ApiError;
use crate::routes::{json_body, reject};
use crate::services::OrderService;
use crate::AppState;

/// `POST /api/orders/create`
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let request = json_body(payload).map_err(reject(&state))?;
    let details = OrderService::new(state.clone())
        .create(request)
        .await
        .map_err(reject(&state))?;

    Ok(Json(OrderResponse {
        success: true,
        order: details.into(),
    }))
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let details = OrderService::new(state.clone())
        .get(&id)
        .await
        .map_err(reject(&state))?;

    Ok(Json(OrderResponse {
        success: true,
        order: details.into(),
    }))
}

/// `GET /api/orders/by-number/{orderNumber}`
pub async fn get_by_number(
    State(state): State<Arc<AppState>>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let details = OrderService::new(state.clone())
        .get_by_number(&order_number)
        .await
        .map_err(reject(&state))?;

    Ok(Json(OrderResponse {
        success: true,
        order: details.into(),
    }))
}

/// `GET /api/orders?email=`
pub async fn list_by_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = OrderService::new(state.clone())
        .list_by_email(query.email.as_deref())
        .await
        .map_err(reject(&state))?;

    Ok(Json(OrdersResponse {
        success: true,
        orders: orders.into_iter().map(OrderDto::from).collect(),
    }))
}
