//! Kitchen dashboard endpoints.
//!
//! There is no authentication layer here; deployments put these paths
//! behind the restaurant's own access control.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};

use crate::dto::{
    AdminOrderResponse, HistoryResponse, OrderDto, OrdersResponse, PageQuery,
    StatusHistoryDto, UpdateStatusRequest,
};
use crate::error::ApiError;
use crate::routes::{json_body, reject};
use crate::services::AdminService;
use crate::AppState;

/// `PATCH /api/admin/orders/{orderId}/status`
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<AdminOrderResponse>, ApiError> {
    let request = json_body(payload).map_err(reject(&state))?;
    let details = AdminService::new(state.clone())
        .update_status(&order_id, request)
        .await
        .map_err(reject(&state))?;

    Ok(Json(AdminOrderResponse {
        order: details.into(),
    }))
}

/// `GET /api/admin/orders?limit=&offset=`
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = AdminService::new(state.clone())
        .list_orders(page.limit, page.offset)
        .await
        .map_err(reject(&state))?;

    Ok(Json(OrdersResponse {
        success: true,
        orders: orders.into_iter().map(OrderDto::from).collect(),
    }))
}

/// `GET /api/admin/orders/{orderId}/history`
pub async fn order_history(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = AdminService::new(state.clone())
        .history(&order_id)
        .await
        .map_err(reject(&state))?;

    Ok(Json(HistoryResponse {
        success: true,
        history: history.into_iter().map(StatusHistoryDto::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::orders::create_order;
    use crate::test_support::{dish, fixture, order_request, seed, Fixture};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use toohot_core::OrderStatus;

    async fn new_order(fx: &Fixture) -> OrderDto {
        seed(&fx.state, &[dish("dumplings", 1000, true)]).await;
        let Json(created) = create_order(
            State(fx.state.clone()),
            Ok(Json(order_request(&[("dumplings", 1)]))),
        )
        .await
        .unwrap();
        created.order
    }

    fn status_body(status: &str, notes: Option<&str>, expected_version: Option<i64>) -> UpdateStatusRequest {
        UpdateStatusRequest {
            status: status.to_string(),
            notes: notes.map(str::to_string),
            expected_version,
        }
    }

    #[tokio::test]
    async fn test_update_status_and_history() {
        let fx = fixture().await;
        let order = new_order(&fx).await;

        let Json(updated) = update_status(
            State(fx.state.clone()),
            Path(order.id.clone()),
            Ok(Json(status_body("paid", Some("cash at counter"), Some(order.version)))),
        )
        .await
        .unwrap();
        assert_eq!(updated.order.status, OrderStatus::Paid);
        assert_eq!(updated.order.version, order.version + 1);

        let Json(history) = order_history(State(fx.state.clone()), Path(order.id.clone()))
            .await
            .unwrap();
        assert_eq!(history.history.len(), 1);
        assert_eq!(history.history[0].notes.as_deref(), Some("cash at counter"));
    }

    #[tokio::test]
    async fn test_stale_version_is_conflict() {
        let fx = fixture().await;
        let order = new_order(&fx).await;

        update_status(
            State(fx.state.clone()),
            Path(order.id.clone()),
            Ok(Json(status_body("paid", None, Some(order.version)))),
        )
        .await
        .unwrap();

        let err = update_status(
            State(fx.state.clone()),
            Path(order.id.clone()),
            Ok(Json(status_body("preparing", None, Some(order.version)))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_status_is_bad_request() {
        let fx = fixture().await;
        let order = new_order(&fx).await;

        let err = update_status(
            State(fx.state.clone()),
            Path(order.id),
            Ok(Json(status_body("delivered", None, None))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_of_missing_order_is_not_found() {
        let fx = fixture().await;
        let err = order_history(State(fx.state.clone()), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_orders_rejects_oversized_page() {
        let fx = fixture().await;
        new_order(&fx).await;

        let Json(body) = list_orders(State(fx.state.clone()), Query(PageQuery::default()))
            .await
            .unwrap();
        assert_eq!(body.orders.len(), 1);

        let err = list_orders(
            State(fx.state.clone()),
            Query(PageQuery {
                limit: Some(500),
                offset: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
