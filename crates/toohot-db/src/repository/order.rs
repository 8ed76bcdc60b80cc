//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     ├── bump order_number_sequences[YYMMDD]  → TH-YYMMDD-NNN           │
//! │     ├── INSERT orders      { status: pending, version: 1 }             │
//! │     └── INSERT order_items (snapshots)                                 │
//! │         Any failure rolls back all three.                              │
//! │                                                                         │
//! │  2. LINK PAYMENT INTENT                                                │
//! │     └── update_with_version(id, v, { intent_id, payment: pending })    │
//! │                                                                         │
//! │  3. CONFIRM PAYMENT / STAFF STATUS CHANGES                             │
//! │     └── update_with_version(id, v, { status, payment_status })         │
//! │                                                                         │
//! │  Every header update: SET ..., version = version + 1                   │
//! │                       WHERE id = ? AND version = ?                     │
//! │  0 rows affected on an existing id → DbError::VersionConflict          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use toohot_core::{
    CustomerInfo, Order, OrderDetails, OrderItem, OrderStatus, OrderTotals, PaymentStatus,
};

const ORDER_COLUMNS: &str = r#"
    id, order_number, status, subtotal_cents, tax_cents, total_cents,
    customer_email, customer_first_name, customer_last_name, customer_phone,
    pickup_time, pickup_notes, payment_status, stripe_payment_intent_id,
    payment_method, version, created_at, updated_at
"#;

const ORDER_ITEM_COLUMNS: &str = r#"
    id, order_id, menu_item_id, menu_item_name_en, menu_item_name_zh,
    menu_item_description_en, menu_item_description_zh, quantity,
    unit_price_cents, total_price_cents, special_instructions, created_at
"#;

// =============================================================================
// Inputs
// =============================================================================

/// A priced order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: CustomerInfo,
    pub totals: OrderTotals,
    pub pickup_time: Option<DateTime<Utc>>,
    pub pickup_notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// A priced line with its catalog snapshot.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_item_id: String,
    pub name_en: String,
    pub name_zh: String,
    pub description_en: Option<String>,
    pub description_zh: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub special_instructions: Option<String>,
}

/// Header fields to change in a versioned update. `None` leaves a column as is.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub stripe_payment_intent_id: Option<String>,
    pub payment_method: Option<String>,
}

impl OrderPatch {
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    pub fn payment_intent(mut self, intent_id: impl Into<String>) -> Self {
        self.stripe_payment_intent_id = Some(intent_id.into());
        self
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order with its items and a fresh order number.
    pub async fn create(&self, new_order: NewOrder, prefix: &str) -> DbResult<OrderDetails> {
        self.create_at(new_order, prefix, Utc::now()).await
    }

    /// Same as [`create`](Self::create) with an explicit clock reading.
    ///
    /// The order number's day is the UTC date of `now`.
    pub async fn create_at(
        &self,
        new_order: NewOrder,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> DbResult<OrderDetails> {
        let mut tx = self.pool.begin().await?;

        let sequence = next_sequence(&mut tx, now.date_naive()).await?;
        let order_number = format_order_number(prefix, now.date_naive(), sequence);
        let order_id = Uuid::new_v4().to_string();

        debug!(id = %order_id, order_number = %order_number, "Creating order");

        let order = Order {
            id: order_id.clone(),
            order_number,
            status: OrderStatus::Pending,
            subtotal_cents: new_order.totals.subtotal.cents(),
            tax_cents: new_order.totals.tax.cents(),
            total_cents: new_order.totals.total.cents(),
            customer_email: new_order.customer.email,
            customer_first_name: new_order.customer.first_name,
            customer_last_name: new_order.customer.last_name,
            customer_phone: new_order.customer.phone,
            pickup_time: new_order.pickup_time,
            pickup_notes: new_order.pickup_notes,
            payment_status: PaymentStatus::Pending,
            stripe_payment_intent_id: None,
            payment_method: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, status, subtotal_cents, tax_cents, total_cents,
                customer_email, customer_first_name, customer_last_name, customer_phone,
                pickup_time, pickup_notes, payment_status, stripe_payment_intent_id,
                payment_method, version, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(&order.customer_email)
        .bind(&order.customer_first_name)
        .bind(&order.customer_last_name)
        .bind(&order.customer_phone)
        .bind(order.pickup_time)
        .bind(&order.pickup_notes)
        .bind(order.payment_status)
        .bind(&order.stripe_payment_intent_id)
        .bind(&order.payment_method)
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for line in new_order.items {
            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                menu_item_id: line.menu_item_id,
                menu_item_name_en: line.name_en,
                menu_item_name_zh: line.name_zh,
                menu_item_description_en: line.description_en,
                menu_item_description_zh: line.description_zh,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                total_price_cents: line.unit_price_cents * line.quantity,
                special_instructions: line.special_instructions,
                created_at: now,
            };
            insert_item(&mut tx, &item).await?;
            items.push(item);
        }

        tx.commit().await?;

        Ok(OrderDetails { order, items })
    }

    /// Gets an order header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order: Option<Order> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order header by its human-readable number.
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1");
        let order: Option<Order> = sqlx::query_as(&sql)
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at, rowid"
        );
        let items: Vec<OrderItem> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets an order with its items.
    pub async fn get_details(&self, id: &str) -> DbResult<Option<OrderDetails>> {
        match self.get_by_id(id).await? {
            Some(order) => self.with_items(order).await.map(Some),
            None => Ok(None),
        }
    }

    /// Gets an order with its items by order number.
    pub async fn get_details_by_number(&self, order_number: &str) -> DbResult<Option<OrderDetails>> {
        match self.get_by_number(order_number).await? {
            Some(order) => self.with_items(order).await.map(Some),
            None => Ok(None),
        }
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_by_email(&self, email: &str) -> DbResult<Vec<OrderDetails>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_email = ?1 ORDER BY created_at DESC, rowid DESC"
        );
        let orders: Vec<Order> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(orders).await
    }

    /// Lists all orders, newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<OrderDetails>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
        );
        let orders: Vec<Order> = sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(orders).await
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Applies `patch` if the order is still at `expected_version`.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The updated header, at `expected_version + 1`
    /// * `Err(DbError::NotFound)` - No such order
    /// * `Err(DbError::VersionConflict)` - Someone else updated it first
    pub async fn update_with_version(
        &self,
        id: &str,
        expected_version: i64,
        patch: OrderPatch,
    ) -> DbResult<Order> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = COALESCE(?1, status),
                payment_status = COALESCE(?2, payment_status),
                stripe_payment_intent_id = COALESCE(?3, stripe_payment_intent_id),
                payment_method = COALESCE(?4, payment_method),
                updated_at = ?5,
                version = version + 1
            WHERE id = ?6 AND version = ?7
            "#,
        )
        .bind(patch.status)
        .bind(patch.payment_status)
        .bind(&patch.stripe_payment_intent_id)
        .bind(&patch.payment_method)
        .bind(now)
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await? {
                None => Err(DbError::not_found("Order", id)),
                Some(_) => Err(DbError::version_conflict("Order", id, expected_version)),
            };
        }

        debug!(id = %id, version = expected_version + 1, "Order updated");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    async fn with_items(&self, order: Order) -> DbResult<OrderDetails> {
        let items = self.get_items(&order.id).await?;
        Ok(OrderDetails { order, items })
    }

    async fn attach_items(&self, orders: Vec<Order>) -> DbResult<Vec<OrderDetails>> {
        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            details.push(self.with_items(order).await?);
        }
        Ok(details)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Bumps and returns the counter for `day`, starting at 1.
async fn next_sequence(tx: &mut Transaction<'_, Sqlite>, day: NaiveDate) -> DbResult<i64> {
    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_number_sequences (day, last_value) VALUES (?1, 1)
        ON CONFLICT (day) DO UPDATE SET last_value = last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(day.format("%y%m%d").to_string())
    .fetch_one(&mut **tx)
    .await?;

    Ok(value)
}

async fn insert_item(tx: &mut Transaction<'_, Sqlite>, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, menu_item_id, menu_item_name_en, menu_item_name_zh,
            menu_item_description_en, menu_item_description_zh, quantity,
            unit_price_cents, total_price_cents, special_instructions, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9, ?10, ?11, ?12
        )
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.menu_item_id)
    .bind(&item.menu_item_name_en)
    .bind(&item.menu_item_name_zh)
    .bind(&item.menu_item_description_en)
    .bind(&item.menu_item_description_zh)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.total_price_cents)
    .bind(&item.special_instructions)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Formats an order number: `{prefix}-{YYMMDD}-{NNN}`.
///
/// ## Example
/// `TH-240615-003`
pub fn format_order_number(prefix: &str, day: NaiveDate, sequence: i64) -> String {
    format!("{}-{}-{:03}", prefix, day.format("%y%m%d"), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use toohot_core::{Money, TaxRate};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_order(email: &str) -> NewOrder {
        let lines = vec![NewOrderItem {
            menu_item_id: "dish-1".to_string(),
            name_en: "Dan Dan Noodles".to_string(),
            name_zh: "担担面".to_string(),
            description_en: None,
            description_zh: None,
            quantity: 2,
            unit_price_cents: 1000,
            special_instructions: Some("extra chili".to_string()),
        }];
        NewOrder {
            customer: CustomerInfo {
                email: email.to_string(),
                first_name: "Mei".to_string(),
                last_name: "Chen".to_string(),
                phone: None,
            },
            totals: OrderTotals::from_lines([(Money::from_cents(1000), 2)], TaxRate::from_bps(825)),
            pickup_time: None,
            pickup_notes: None,
            items: lines,
        }
    }

    #[test]
    fn test_format_order_number() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(format_order_number("TH", day, 3), "TH-240615-003");
        assert_eq!(format_order_number("TH", day, 1234), "TH-240615-1234");
    }

    #[tokio::test]
    async fn test_create_persists_header_and_items() {
        let db = db().await;
        let created = db.orders().create(new_order("mei@example.com"), "TH").await.unwrap();

        assert_eq!(created.order.status, OrderStatus::Pending);
        assert_eq!(created.order.payment_status, PaymentStatus::Pending);
        assert_eq!(created.order.version, 1);
        assert_eq!(created.order.subtotal_cents, 2000);
        assert_eq!(created.order.tax_cents, 165);
        assert_eq!(created.order.total_cents, 2165);

        let loaded = db.orders().get_details(&created.order.id).await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].total_price_cents, 2000);
        assert_eq!(loaded.items[0].menu_item_name_zh, "担担面");
        assert_eq!(loaded.items[0].special_instructions.as_deref(), Some("extra chili"));
    }

    #[tokio::test]
    async fn test_same_day_orders_get_consecutive_numbers() {
        let db = db().await;
        let day_one = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2024, 6, 16, 9, 0, 0).unwrap();

        let first = db.orders().create_at(new_order("a@example.com"), "TH", day_one).await.unwrap();
        let second = db.orders().create_at(new_order("b@example.com"), "TH", day_one).await.unwrap();
        let next_day = db.orders().create_at(new_order("c@example.com"), "TH", day_two).await.unwrap();

        assert_eq!(first.order.order_number, "TH-240615-001");
        assert_eq!(second.order.order_number, "TH-240615-002");
        assert_eq!(next_day.order.order_number, "TH-240616-001");
    }

    #[tokio::test]
    async fn test_lookup_by_number_and_email() {
        let db = db().await;
        let first = db.orders().create(new_order("mei@example.com"), "TH").await.unwrap();
        let second = db.orders().create(new_order("mei@example.com"), "TH").await.unwrap();
        db.orders().create(new_order("other@example.com"), "TH").await.unwrap();

        let by_number = db
            .orders()
            .get_details_by_number(&first.order.order_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.order.id, first.order.id);

        let mine = db.orders().list_by_email("mei@example.com").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].order.id, second.order.id);

        let page = db.orders().list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(db.orders().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_with_version_bumps_version() {
        let db = db().await;
        let created = db.orders().create(new_order("mei@example.com"), "TH").await.unwrap();

        let updated = db
            .orders()
            .update_with_version(
                &created.order.id,
                1,
                OrderPatch::default()
                    .payment_intent("pi_123")
                    .payment_status(PaymentStatus::Pending),
            )
            .await
            .unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.stripe_payment_intent_id.as_deref(), Some("pi_123"));
        assert_eq!(updated.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() {
        let db = db().await;
        let created = db.orders().create(new_order("mei@example.com"), "TH").await.unwrap();
        let id = created.order.id.clone();

        db.orders()
            .update_with_version(&id, 1, OrderPatch::default().status(OrderStatus::Paid))
            .await
            .unwrap();

        let err = db
            .orders()
            .update_with_version(&id, 1, OrderPatch::default().status(OrderStatus::Cancelled))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::VersionConflict { expected: 1, .. }));

        let current = db.orders().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(current.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_update_unknown_order_is_not_found() {
        let db = db().await;
        let err = db
            .orders()
            .update_with_version("missing", 1, OrderPatch::default().status(OrderStatus::Paid))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
