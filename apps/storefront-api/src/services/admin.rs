//! Kitchen-side order management: status changes, order list, audit log.

use std::sync::Arc;

use toohot_core::validation::{validate_notes, validate_pagination, validate_required};
use toohot_core::{is_valid_transition, CoreError, OrderDetails, OrderStatus, StatusHistoryEntry};
use toohot_db::OrderPatch;
use tracing::{info, warn};

use crate::dto::UpdateStatusRequest;
use crate::error::{ServiceError, ServiceResult};
use crate::AppState;

pub struct AdminService {
    state: Arc<AppState>,
}

impl AdminService {
    pub fn new(state: Arc<AppState>) -> Self {
        AdminService { state }
    }

    /// Moves an order to a new status.
    ///
    /// Transitions outside the lifecycle table are rejected only when
    /// `enforce_status_transitions` is on; otherwise they are logged and
    /// applied. A non-blank note is recorded in the status history.
    pub async fn update_status(
        &self,
        order_id: &str,
        request: UpdateStatusRequest,
    ) -> ServiceResult<OrderDetails> {
        let order_id = validate_required("order id", order_id)?;
        let status: OrderStatus = validate_required("status", &request.status)?.parse()?;
        let notes = validate_notes("notes", request.notes.as_deref())?;

        let orders = self.state.db.orders();
        let order = orders
            .get_by_id(&order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id.as_str()))?;

        if !is_valid_transition(order.status, status) {
            if self.state.config.enforce_status_transitions {
                return Err(CoreError::InvalidTransition {
                    from: order.status.to_string(),
                    to: status.to_string(),
                }
                .into());
            }
            warn!(
                order_id = %order.id,
                from = %order.status,
                to = %status,
                "Applying status change outside the lifecycle table"
            );
        }

        let expected = request.expected_version.unwrap_or(order.version);
        orders
            .update_with_version(&order.id, expected, OrderPatch::default().status(status))
            .await?;

        if let Some(notes) = notes.as_deref() {
            if let Err(e) = self.state.db.history().append(&order.id, status, Some(notes)).await {
                warn!(order_id = %order.id, error = %e, "Failed to record status history");
            }
        }

        info!(order_id = %order.id, from = %order.status, to = %status, "Order status updated");

        orders
            .get_details(&order.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order.id.as_str()))
    }

    /// All orders, newest first.
    pub async fn list_orders(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ServiceResult<Vec<OrderDetails>> {
        let (limit, offset) = validate_pagination(limit, offset)?;
        Ok(self.state.db.orders().list(limit, offset).await?)
    }

    /// Status history of one order, newest first.
    pub async fn history(&self, order_id: &str) -> ServiceResult<Vec<StatusHistoryEntry>> {
        let order_id = validate_required("order id", order_id)?;
        if self.state.db.orders().get_by_id(&order_id).await?.is_none() {
            return Err(ServiceError::not_found("Order", order_id));
        }
        Ok(self.state.db.history().list_for_order(&order_id).await?)
    }
}
