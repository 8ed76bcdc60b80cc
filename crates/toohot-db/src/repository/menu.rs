//! # Menu Repository
//!
//! Read access to the catalog. The storefront never edits menu rows; the
//! only write here is [`MenuRepository::insert`], used by the seed binary
//! and by tests.
//!
//! ## Listing Order
//! ```text
//! SELECT ... FROM menu_items
//! WHERE is_available = 1
//! ORDER BY category, name_en
//!
//!   appetizers │ Cucumber Salad
//!   appetizers │ Dan Dan Wontons
//!   noodles    │ Chongqing Noodles
//!   noodles    │ Dan Dan Noodles
//!   ...
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use toohot_core::MenuItem;

const MENU_COLUMNS: &str = r#"
    id, name_en, name_zh, description_en, description_zh,
    price_cents, category, is_vegetarian, is_vegan, is_popular,
    spice_level, allergens, is_available, image_url, prep_time_minutes,
    created_at, updated_at
"#;

/// A `menu_items` row as stored. Allergens are a JSON array in TEXT.
#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: String,
    name_en: String,
    name_zh: String,
    description_en: Option<String>,
    description_zh: Option<String>,
    price_cents: i64,
    category: String,
    is_vegetarian: bool,
    is_vegan: bool,
    is_popular: bool,
    spice_level: i64,
    allergens: String,
    is_available: bool,
    image_url: Option<String>,
    prep_time_minutes: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = DbError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let allergens: Vec<String> =
            serde_json::from_str(&row.allergens).map_err(|e| DbError::Decode {
                column: "allergens".to_string(),
                message: e.to_string(),
            })?;

        let spice_level = u8::try_from(row.spice_level).map_err(|e| DbError::Decode {
            column: "spice_level".to_string(),
            message: e.to_string(),
        })?;

        Ok(MenuItem {
            id: row.id,
            name_en: row.name_en,
            name_zh: row.name_zh,
            description_en: row.description_en,
            description_zh: row.description_zh,
            price_cents: row.price_cents,
            category: row.category,
            is_vegetarian: row.is_vegetarian,
            is_vegan: row.is_vegan,
            is_popular: row.is_popular,
            spice_level,
            allergens,
            is_available: row.is_available,
            image_url: row.image_url,
            prep_time_minutes: row.prep_time_minutes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_items(rows: Vec<MenuItemRow>) -> DbResult<Vec<MenuItem>> {
    rows.into_iter().map(MenuItem::try_from).collect()
}

/// Repository for menu catalog reads.
///
/// ## Usage
/// ```rust,ignore
/// let menu = db.menu().list_available().await?;
/// let priced = db.menu().get_by_ids(&ids).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Lists every orderable item, grouped by category then English name.
    pub async fn list_available(&self) -> DbResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {MENU_COLUMNS} FROM menu_items WHERE is_available = 1 ORDER BY category, name_en"
        );
        let rows: Vec<MenuItemRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Loaded available menu items");
        into_items(rows)
    }

    /// Gets a menu item by ID, available or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id = ?1");
        let row: Option<MenuItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MenuItem::try_from).transpose()
    }

    /// Loads the rows for a set of ids in one query.
    ///
    /// Unknown ids are simply absent from the result; unavailable items are
    /// returned so the caller can tell "gone" from "sold out".
    pub async fn get_by_ids(&self, ids: &[String]) -> DbResult<Vec<MenuItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<MenuItemRow> = query.build_query_as().fetch_all(&self.pool).await?;

        debug!(requested = ids.len(), found = rows.len(), "Loaded menu items by id");
        into_items(rows)
    }

    /// Distinct categories of available items, in listing order.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT category
            FROM menu_items
            WHERE is_available = 1
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Inserts a catalog row.
    pub async fn insert(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name_en, "Inserting menu item");

        let allergens = serde_json::to_string(&item.allergens).map_err(|e| DbError::Decode {
            column: "allergens".to_string(),
            message: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, name_en, name_zh, description_en, description_zh,
                price_cents, category, is_vegetarian, is_vegan, is_popular,
                spice_level, allergens, is_available, image_url, prep_time_minutes,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15,
                ?16, ?17
            )
            "#,
        )
        .bind(&item.id)
        .bind(&item.name_en)
        .bind(&item.name_zh)
        .bind(&item.description_en)
        .bind(&item.description_zh)
        .bind(item.price_cents)
        .bind(&item.category)
        .bind(item.is_vegetarian)
        .bind(item.is_vegan)
        .bind(item.is_popular)
        .bind(i64::from(item.spice_level))
        .bind(allergens)
        .bind(item.is_available)
        .bind(&item.image_url)
        .bind(item.prep_time_minutes)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts all catalog rows, available or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new menu item ID.
pub fn generate_menu_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
