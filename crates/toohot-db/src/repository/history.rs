//! # Status History Repository
//!
//! Append-only audit log of staff status changes. Rows are only written
//! when staff attach a note; there is no update or delete.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use toohot_core::{OrderStatus, StatusHistoryEntry};

/// Repository for the `order_status_history` table.
#[derive(Debug, Clone)]
pub struct StatusHistoryRepository {
    pool: SqlitePool,
}

impl StatusHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatusHistoryRepository { pool }
    }

    /// Appends one entry.
    pub async fn append(
        &self,
        order_id: &str,
        status: OrderStatus,
        notes: Option<&str>,
    ) -> DbResult<StatusHistoryEntry> {
        let entry = StatusHistoryEntry {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            status,
            notes: notes.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(order_id = %order_id, status = %status, "Appending status history");

        sqlx::query(
            r#"
            INSERT INTO order_status_history (id, order_id, status, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.order_id)
        .bind(entry.status)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Lists an order's history, newest first.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<StatusHistoryEntry>> {
        let entries: Vec<StatusHistoryEntry> = sqlx::query_as(
            r#"
            SELECT id, order_id, status, notes, created_at
            FROM order_status_history
            WHERE order_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::order::{NewOrder, NewOrderItem};
    use crate::{Database, DbConfig};
    use toohot_core::{CustomerInfo, Money, OrderTotals, TaxRate};

    async fn db_with_order() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db
            .orders()
            .create(
                NewOrder {
                    customer: CustomerInfo {
                        email: "wei@example.com".to_string(),
                        first_name: "Wei".to_string(),
                        last_name: "Zhang".to_string(),
                        phone: Some("617-555-0100".to_string()),
                    },
                    totals: OrderTotals::compute(Money::from_cents(1200), TaxRate::default()),
                    pickup_time: None,
                    pickup_notes: None,
                    items: vec![NewOrderItem {
                        menu_item_id: "dish-1".to_string(),
                        name_en: "Mapo Tofu".to_string(),
                        name_zh: "麻婆豆腐".to_string(),
                        description_en: None,
                        description_zh: None,
                        quantity: 1,
                        unit_price_cents: 1200,
                        special_instructions: None,
                    }],
                },
                "TH",
            )
            .await
            .unwrap();
        (db, created.order.id)
    }

    #[tokio::test]
    async fn test_append_and_list_newest_first() {
        let (db, order_id) = db_with_order().await;

        db.history()
            .append(&order_id, OrderStatus::Preparing, Some("started"))
            .await
            .unwrap();
        db.history()
            .append(&order_id, OrderStatus::Ready, Some("on the counter"))
            .await
            .unwrap();

        let entries = db.history().list_for_order(&order_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, OrderStatus::Ready);
        assert_eq!(entries[0].notes.as_deref(), Some("on the counter"));
    }

    #[tokio::test]
    async fn test_append_for_unknown_order_fails_foreign_key() {
        let (db, _) = db_with_order().await;
        let err = db
            .history()
            .append("missing", OrderStatus::Ready, Some("note"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
