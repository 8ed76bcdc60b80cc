//! # Payment Intent Bridge and Confirmation
//!
//! ```text
//!  create_intent(order_id)                    confirm(intent_id)
//!  ───────────────────────                    ──────────────────
//!  order pending? ──✗──► InvalidState         retrieve intent (retry)
//!       │                                          │
//!  existing intent reusable? ──✓──► reuse     metadata.orderId ──✗──► Validation
//!       │ (retrieval errors fall through)          │
//!  create intent (never retried)              reconcile_payment(status)
//!       │                                          │
//!  CAS: intent id + payment pending           CAS loop, 3 attempts ──✗──► Conflict
//! ```

use std::future::Future;
use std::sync::Arc;

use toohot_core::validation::validate_required;
use toohot_core::{reconcile_payment, Order, OrderDetails, OrderStatus, PaymentStatus};
use toohot_db::{DbError, DbResult, OrderPatch};
use toohot_payments::{
    is_valid_intent_id, retrieve_with_retry, CreateIntentRequest, LinearBackoff, PaymentIntent,
};
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::AppState;

/// Compare-and-swap attempts when applying a confirmation.
pub const MAX_CONFIRM_ATTEMPTS: usize = 3;

pub struct PaymentService {
    state: Arc<AppState>,
    backoff: LinearBackoff,
}

impl PaymentService {
    pub fn new(state: Arc<AppState>) -> Self {
        PaymentService {
            state,
            backoff: LinearBackoff::default(),
        }
    }

    /// Replaces the retry schedule for provider reads.
    pub fn with_backoff(mut self, backoff: LinearBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns a payable intent for a pending order, reusing the order's
    /// current intent when the provider still accepts payment on it.
    pub async fn create_intent(&self, order_id: &str) -> ServiceResult<PaymentIntent> {
        let order_id = validate_required("order id", order_id)?;
        let order = self.load_order(&order_id).await?;

        if order.status != OrderStatus::Pending {
            return Err(ServiceError::invalid_state(
                "Order is not available for payment",
            ));
        }

        let gateway = self.state.gateway()?;

        if let Some(existing_id) = order.stripe_payment_intent_id.as_deref() {
            match retrieve_with_retry(gateway, existing_id, self.backoff.clone()).await {
                Ok(intent) if intent.is_reusable() => {
                    debug!(order_id = %order.id, intent_id = %intent.id, "Reusing payment intent");
                    return Ok(intent);
                }
                Ok(intent) => {
                    debug!(
                        order_id = %order.id,
                        intent_id = %intent.id,
                        status = %intent.status,
                        "Existing payment intent not reusable"
                    );
                }
                Err(e) => {
                    warn!(
                        order_id = %order.id,
                        intent_id = %existing_id,
                        error = %e,
                        "Existing payment intent could not be retrieved, creating a new one"
                    );
                }
            }
        }

        let request = CreateIntentRequest::for_order(
            &order.id,
            &order.order_number,
            &order.customer_email,
            order.total_cents,
        );
        let intent = gateway.create_intent(&request).await?;

        let linked = self
            .state
            .db
            .orders()
            .update_with_version(
                &order.id,
                order.version,
                OrderPatch::default()
                    .payment_intent(&intent.id)
                    .payment_status(PaymentStatus::Pending),
            )
            .await;
        if let Err(e) = linked {
            warn!(
                order_id = %order.id,
                intent_id = %intent.id,
                error = %e,
                "Payment intent created but not linked to its order; intent is orphaned"
            );
            return Err(e.into());
        }

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            intent_id = %intent.id,
            amount = intent.amount,
            "Payment intent created"
        );

        Ok(intent)
    }

    /// Applies the provider's view of a payment to its order.
    pub async fn confirm(&self, intent_id: &str) -> ServiceResult<(OrderDetails, PaymentIntent)> {
        let intent_id = validate_required("payment intent id", intent_id)?;
        if !is_valid_intent_id(&intent_id) {
            return Err(ServiceError::validation("Invalid payment intent id"));
        }
        let gateway = self.state.gateway()?;

        let intent = retrieve_with_retry(gateway, &intent_id, self.backoff.clone()).await?;
        let order_id = intent
            .order_id()
            .ok_or_else(|| ServiceError::validation("Order ID not found in payment intent"))?
            .to_string();

        let outcome = reconcile_payment(&intent.status, intent.has_payment_error());
        let orders = &self.state.db.orders();
        let order_id = order_id.as_str();
        let paid_intent = intent.id.as_str();

        let updated = write_with_retry(
            order_id,
            move || self.load_order(order_id),
            move |order: Order| {
                if order.status == OrderStatus::Cancelled
                    && outcome.order_status == OrderStatus::Paid
                {
                    warn!(
                        order_id = %order.id,
                        intent_id = %paid_intent,
                        "Payment succeeded on a cancelled order; marking it paid"
                    );
                }

                let patch = OrderPatch::default()
                    .status(outcome.order_status)
                    .payment_status(outcome.payment_status)
                    .payment_intent(paid_intent);

                async move {
                    orders
                        .update_with_version(&order.id, order.version, patch)
                        .await
                }
            },
        )
        .await?;

        info!(
            order_id = %updated.id,
            intent_status = %intent.status,
            status = %updated.status,
            payment_status = %updated.payment_status,
            "Payment confirmed"
        );

        let items = orders.get_items(&updated.id).await?;
        Ok((
            OrderDetails {
                order: updated,
                items,
            },
            intent,
        ))
    }

    async fn load_order(&self, order_id: &str) -> ServiceResult<Order> {
        self.state
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))
    }
}

/// Reads an order and writes it back until the compare-and-swap lands.
///
/// Each attempt calls `load` for a fresh copy, then `write` with it. A
/// version conflict starts the next attempt; after
/// [`MAX_CONFIRM_ATTEMPTS`] the result is [`ServiceError::Conflict`].
async fn write_with_retry<L, LFut, W, WFut>(
    order_id: &str,
    mut load: L,
    mut write: W,
) -> ServiceResult<Order>
where
    L: FnMut() -> LFut,
    LFut: Future<Output = ServiceResult<Order>>,
    W: FnMut(Order) -> WFut,
    WFut: Future<Output = DbResult<Order>>,
{
    for attempt in 1..=MAX_CONFIRM_ATTEMPTS {
        let order = load().await?;
        match write(order).await {
            Ok(updated) => return Ok(updated),
            Err(DbError::VersionConflict { .. }) => {
                debug!(order_id = %order_id, attempt, "Order changed during confirmation, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::conflict(format!(
        "Order {order_id} kept changing during payment confirmation"
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use toohot_db::Database;
    use toohot_payments::intent::METADATA_ORDER_ID;
    use toohot_payments::{InMemoryGateway, PaymentResult};

    use super::*;
    use crate::services::OrderService;
    use crate::test_support::{dish, fixture, order_request, seed, Fixture};
    use toohot_payments::{PaymentError, PaymentGateway};

    async fn pending_order(fx: &Fixture) -> OrderDetails {
        seed(&fx.state, &[dish("dumplings", 1000, true)]).await;
        OrderService::new(fx.state.clone())
            .create(order_request(&[("dumplings", 2)]))
            .await
            .unwrap()
    }

    fn service(fx: &Fixture) -> PaymentService {
        PaymentService::new(fx.state.clone()).with_backoff(LinearBackoff::new(Duration::ZERO, 3))
    }

    #[tokio::test]
    async fn test_create_intent_twice_reuses_intent() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let service = service(&fx);

        let first = service.create_intent(&order.order.id).await.unwrap();
        let second = service.create_intent(&order.order.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.client_secret, second.client_secret);
        assert_eq!(fx.gateway.create_calls(), 1);
        assert_eq!(first.amount, order.order.total_cents);
        assert_eq!(first.order_id(), Some(order.order.id.as_str()));

        let stored = fx.state.db.orders().get_by_id(&order.order.id).await.unwrap().unwrap();
        assert_eq!(stored.stripe_payment_intent_id.as_deref(), Some(first.id.as_str()));
        assert_eq!(stored.payment_status, PaymentStatus::Pending);
        assert_eq!(stored.version, order.order.version + 1);
    }

    #[tokio::test]
    async fn test_unusable_intent_is_replaced() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let service = service(&fx);

        let first = service.create_intent(&order.order.id).await.unwrap();
        fx.gateway.set_status(&first.id, "requires_action");
        let second = service.create_intent(&order.order.id).await.unwrap();
        assert_ne!(first.id, second.id);

        fx.gateway
            .fail_next_retrieve(PaymentError::NotFound { id: second.id.clone() });
        let third = service.create_intent(&order.order.id).await.unwrap();
        assert_ne!(second.id, third.id);
        assert_eq!(fx.gateway.create_calls(), 3);
    }

    #[tokio::test]
    async fn test_intent_on_paid_order_is_invalid_state() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        fx.state
            .db
            .orders()
            .update_with_version(
                &order.order.id,
                order.order.version,
                OrderPatch::default().status(OrderStatus::Paid),
            )
            .await
            .unwrap();

        let err = service(&fx).create_intent(&order.order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(err.to_string(), "Order is not available for payment");
        assert_eq!(fx.gateway.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let fx = fixture().await;
        let err = service(&fx).create_intent("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_message() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        fx.gateway.fail_next_create(PaymentError::Provider {
            status: 402,
            code: Some("card_declined".into()),
            message: "Your card was declined.".into(),
        });

        let err = service(&fx).create_intent(&order.order.id).await.unwrap_err();
        match err {
            ServiceError::PaymentProvider { message } => {
                assert_eq!(message, "Your card was declined.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_confirm_succeeded_marks_paid() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let service = service(&fx);
        let intent = service.create_intent(&order.order.id).await.unwrap();
        fx.gateway.set_status(&intent.id, "succeeded");

        let (details, confirmed) = service.confirm(&intent.id).await.unwrap();

        assert_eq!(details.order.status, OrderStatus::Paid);
        assert_eq!(details.order.payment_status, PaymentStatus::Succeeded);
        assert_eq!(details.items.len(), 1);
        assert_eq!(confirmed.status, "succeeded");
        assert_eq!(confirmed.currency, "usd");
    }

    #[tokio::test]
    async fn test_confirm_succeeded_overrides_cancelled() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let service = service(&fx);
        let intent = service.create_intent(&order.order.id).await.unwrap();

        let current = fx.state.db.orders().get_by_id(&order.order.id).await.unwrap().unwrap();
        fx.state
            .db
            .orders()
            .update_with_version(
                &current.id,
                current.version,
                OrderPatch::default().status(OrderStatus::Cancelled),
            )
            .await
            .unwrap();
        fx.gateway.set_status(&intent.id, "succeeded");

        let (details, _) = service.confirm(&intent.id).await.unwrap();
        assert_eq!(details.order.status, OrderStatus::Paid);
        assert_eq!(details.order.payment_status, PaymentStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_confirm_declined_card_keeps_order_pending() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let service = service(&fx);
        let intent = service.create_intent(&order.order.id).await.unwrap();
        assert_eq!(intent.status, "requires_payment_method");
        fx.gateway
            .set_payment_error(&intent.id, "card_declined", "Your card was declined.");

        let (details, _) = service.confirm(&intent.id).await.unwrap();
        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.order.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_failed_payment_marks_payment_failed() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let service = service(&fx);
        let intent = service.create_intent(&order.order.id).await.unwrap();
        fx.gateway.set_status(&intent.id, "payment_failed");
        fx.gateway
            .set_payment_error(&intent.id, "card_declined", "Your card was declined.");

        let (details, _) = service.confirm(&intent.id).await.unwrap();
        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.order.payment_status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_confirm_without_order_metadata() {
        let fx = fixture().await;
        let intent = fx
            .gateway
            .create_intent(&CreateIntentRequest {
                amount: 500,
                currency: "usd".into(),
                description: "stray".into(),
                receipt_email: None,
                metadata: Default::default(),
            })
            .await
            .unwrap();

        let err = service(&fx).confirm(&intent.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Order ID not found in payment intent");
    }

    #[tokio::test]
    async fn test_confirm_retries_transient_reads() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let service = service(&fx);
        let intent = service.create_intent(&order.order.id).await.unwrap();
        fx.gateway.set_status(&intent.id, "succeeded");
        fx.gateway
            .fail_next_retrieve(PaymentError::Network("connection reset".into()));

        let (details, _) = service.confirm(&intent.id).await.unwrap();
        assert_eq!(details.order.status, OrderStatus::Paid);
        assert_eq!(fx.gateway.retrieve_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_gateway_is_config_error() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let state = Arc::new(AppState::new(
            fx.state.db.clone(),
            None,
            fx.state.config.clone(),
        ));

        let err = PaymentService::new(state)
            .create_intent(&order.order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[tokio::test]
    async fn test_malformed_intent_id_never_reaches_provider() {
        let fx = fixture().await;

        for id in ["../customers/cus_123?expand[]=sources", "pi_1/../../charges", "ch_123"] {
            let err = service(&fx).confirm(id).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{id}");
        }
        assert_eq!(fx.gateway.retrieve_calls(), 0);
    }

    /// Bumps the order's version after reading it, the first `bumps` times.
    async fn racing_write(
        fx: &Fixture,
        order: &OrderDetails,
        bumps: usize,
    ) -> (ServiceResult<Order>, usize) {
        let orders = &fx.state.db.orders();
        let id = order.order.id.as_str();
        let loads = &AtomicUsize::new(0);

        let result = write_with_retry(
            id,
            move || async move {
                let current = orders
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Order", id))?;
                if loads.fetch_add(1, Ordering::SeqCst) < bumps {
                    orders
                        .update_with_version(id, current.version, OrderPatch::default())
                        .await?;
                }
                Ok::<Order, ServiceError>(current)
            },
            move |current: Order| async move {
                orders
                    .update_with_version(
                        &current.id,
                        current.version,
                        OrderPatch::default().status(OrderStatus::Paid),
                    )
                    .await
            },
        )
        .await;

        (result, loads.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_confirm_write_rereads_after_version_conflict() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;

        let (result, loads) = racing_write(&fx, &order, 1).await;
        let updated = result.unwrap();

        assert_eq!(loads, 2);
        assert_eq!(updated.status, OrderStatus::Paid);
        // one competing write, then ours
        assert_eq!(updated.version, order.order.version + 2);
    }

    #[tokio::test]
    async fn test_confirm_write_gives_up_after_three_conflicts() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;

        let (result, loads) = racing_write(&fx, &order, usize::MAX).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert_eq!(loads, MAX_CONFIRM_ATTEMPTS);
        let stored = fx.state.db.orders().get_by_id(&order.order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.version, order.order.version + MAX_CONFIRM_ATTEMPTS as i64);
    }

    /// Creates intents like the in-memory gateway, but edits the order first
    /// so the service's link write loses.
    struct ConcurrentEditGateway {
        inner: Arc<InMemoryGateway>,
        db: Database,
    }

    #[async_trait]
    impl PaymentGateway for ConcurrentEditGateway {
        async fn create_intent(
            &self,
            request: &CreateIntentRequest,
        ) -> PaymentResult<PaymentIntent> {
            if let Some(order_id) = request.metadata.get(METADATA_ORDER_ID) {
                let orders = self.db.orders();
                let current = orders.get_by_id(order_id).await.unwrap().unwrap();
                orders
                    .update_with_version(order_id, current.version, OrderPatch::default())
                    .await
                    .unwrap();
            }
            self.inner.create_intent(request).await
        }

        async fn retrieve_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
            self.inner.retrieve_intent(intent_id).await
        }
    }

    #[tokio::test]
    async fn test_lost_link_write_is_conflict() {
        let fx = fixture().await;
        let order = pending_order(&fx).await;
        let inner = Arc::new(InMemoryGateway::new());
        let gateway: Arc<dyn PaymentGateway> = Arc::new(ConcurrentEditGateway {
            inner: inner.clone(),
            db: fx.state.db.clone(),
        });
        let state = Arc::new(AppState::new(
            fx.state.db.clone(),
            Some(gateway),
            fx.state.config.clone(),
        ));

        let err = PaymentService::new(state)
            .create_intent(&order.order.id)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(inner.intent_count(), 1);
        let stored = fx.state.db.orders().get_by_id(&order.order.id).await.unwrap().unwrap();
        assert!(stored.stripe_payment_intent_id.is_none());
    }
}
