//! # TooHot Storefront API
//!
//! JSON-over-HTTP backend for online ordering at the restaurant.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront API Services                           │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  MenuService   │  │  OrderService  │  │  PaymentService            ││
//! │  │                │  │                │  │                            ││
//! │  │ • list         │  │ • create       │  │ • create_intent            ││
//! │  │ • categories   │  │ • get / number │  │ • confirm                  ││
//! │  │                │  │ • by email     │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐                                                    │
//! │  │  AdminService  │                                                    │
//! │  │                │                                                    │
//! │  │ • update_status│                                                    │
//! │  │ • list, history│                                                    │
//! │  └────────────────┘                                                    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────┐│  │
//! │  │  │  SQLite      │  │ PaymentGateway   │  │  StorefrontConfig    ││  │
//! │  │  │  (toohot-db) │  │ (toohot-payments)│  │  toml + env          ││  │
//! │  │  └──────────────┘  └──────────────────┘  └──────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;

use toohot_db::Database;
use toohot_payments::PaymentGateway;

pub use config::{ConfigError, Environment, StorefrontConfig};
pub use error::{ApiError, ServiceError, ServiceResult};
pub use routes::build_router;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    /// `None` when no secret key is configured; payment routes then fail
    /// with a configuration error.
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub config: StorefrontConfig,
}

impl AppState {
    pub fn new(
        db: Database,
        gateway: Option<Arc<dyn PaymentGateway>>,
        config: StorefrontConfig,
    ) -> Self {
        AppState {
            db,
            gateway,
            config,
        }
    }

    /// The payment gateway, or a configuration error if keys are missing.
    pub fn gateway(&self) -> ServiceResult<&dyn PaymentGateway> {
        match &self.gateway {
            Some(gateway) => Ok(gateway.as_ref()),
            None => {
                self.config.payment_secret_key()?;
                Err(ServiceError::Config(
                    "payment gateway not initialized".to_string(),
                ))
            }
        }
    }

    pub fn environment(&self) -> Environment {
        self.config.environment
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the service and route tests.

    use std::sync::Arc;

    use chrono::Utc;
    use toohot_core::{CheckoutLine, MenuItem};
    use toohot_db::{Database, DbConfig};
    use toohot_payments::{InMemoryGateway, PaymentGateway};

    use crate::dto::{CreateOrderRequest, CustomerRequest};
    use crate::{AppState, StorefrontConfig};

    pub struct Fixture {
        pub state: Arc<AppState>,
        pub gateway: Arc<InMemoryGateway>,
    }

    pub async fn fixture() -> Fixture {
        fixture_with(StorefrontConfig::default()).await
    }

    pub async fn fixture_with(config: StorefrontConfig) -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gateway = Arc::new(InMemoryGateway::new());
        let dyn_gateway: Arc<dyn PaymentGateway> = gateway.clone();
        let state = Arc::new(AppState::new(db, Some(dyn_gateway), config));
        Fixture { state, gateway }
    }

    pub fn dish(id: &str, price_cents: i64, available: bool) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: id.to_string(),
            name_en: format!("Dish {id}"),
            name_zh: format!("菜 {id}"),
            description_en: None,
            description_zh: None,
            price_cents,
            category: "Mains".to_string(),
            is_vegetarian: false,
            is_vegan: false,
            is_popular: false,
            spice_level: 2,
            allergens: Vec::new(),
            is_available: available,
            image_url: None,
            prep_time_minutes: Some(15),
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn seed(state: &AppState, items: &[MenuItem]) {
        for item in items {
            state.db.menu().insert(item).await.unwrap();
        }
    }

    pub fn order_request(lines: &[(&str, i64)]) -> CreateOrderRequest {
        CreateOrderRequest {
            customer: CustomerRequest {
                email: "mei@example.com".to_string(),
                first_name: "Mei".to_string(),
                last_name: "Chen".to_string(),
                phone: Some("617-555-0100".to_string()),
            },
            cart_items: lines
                .iter()
                .map(|(id, qty)| CheckoutLine {
                    menu_item_id: id.to_string(),
                    quantity: *qty,
                    special_instructions: None,
                })
                .collect(),
            pickup_time: None,
            pickup_notes: None,
        }
    }
}
