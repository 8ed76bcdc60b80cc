//! # Order Creation and Lookup
//!
//! ```text
//! CreateOrderRequest
//!       │
//!       ▼
//! validate customer, lines ──✗──► ServiceError::Validation (nothing written)
//!       │
//!       ▼
//! load catalog rows by id ──✗──► unknown / unavailable item
//!       │
//!       ▼
//! price from catalog rows (client prices are never trusted)
//!       │
//!       ▼
//! one transaction: sequence bump + header + items
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use toohot_core::validation::{
    validate_email, validate_name, validate_notes, validate_phone, validate_quantity,
    validate_required,
};
use toohot_core::{
    CustomerInfo, MenuItem, Money, OrderDetails, OrderTotals, ValidationError, MAX_CART_ITEMS,
};
use toohot_db::{NewOrder, NewOrderItem};
use tracing::{debug, info};

use crate::dto::CreateOrderRequest;
use crate::error::{ServiceError, ServiceResult};
use crate::AppState;

pub struct OrderService {
    state: Arc<AppState>,
}

impl OrderService {
    pub fn new(state: Arc<AppState>) -> Self {
        OrderService { state }
    }

    /// Validates, prices and persists a new order.
    pub async fn create(&self, request: CreateOrderRequest) -> ServiceResult<OrderDetails> {
        let customer = validate_customer(&request)?;
        let pickup_notes = validate_notes("pickup notes", request.pickup_notes.as_deref())?;

        if request.cart_items.is_empty() {
            return Err(ServiceError::validation("Cart is empty"));
        }
        if request.cart_items.len() > MAX_CART_ITEMS {
            return Err(ServiceError::validation(format!(
                "Cart cannot have more than {MAX_CART_ITEMS} items"
            )));
        }

        let mut ids: Vec<String> = Vec::with_capacity(request.cart_items.len());
        for line in &request.cart_items {
            let id = validate_required("menu item id", &line.menu_item_id)?;
            validate_quantity(line.quantity)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let catalog: HashMap<String, MenuItem> = self
            .state
            .db
            .menu()
            .get_by_ids(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();

        let mut items = Vec::with_capacity(request.cart_items.len());
        for line in &request.cart_items {
            let id = line.menu_item_id.trim();
            let menu_item = catalog
                .get(id)
                .filter(|item| item.is_available)
                .ok_or_else(|| ValidationError::UnknownMenuItem { id: id.to_string() })?;

            items.push(NewOrderItem {
                menu_item_id: menu_item.id.clone(),
                name_en: menu_item.name_en.clone(),
                name_zh: menu_item.name_zh.clone(),
                description_en: menu_item.description_en.clone(),
                description_zh: menu_item.description_zh.clone(),
                quantity: line.quantity,
                unit_price_cents: menu_item.price_cents,
                special_instructions: validate_notes(
                    "special instructions",
                    line.special_instructions.as_deref(),
                )?,
            });
        }

        let totals = OrderTotals::from_lines(
            items
                .iter()
                .map(|item| (Money::from_cents(item.unit_price_cents), item.quantity)),
            self.state.config.tax_rate(),
        );

        debug!(
            lines = items.len(),
            subtotal = totals.subtotal.cents(),
            tax = totals.tax.cents(),
            "Order priced"
        );

        let details = self
            .state
            .db
            .orders()
            .create(
                NewOrder {
                    customer,
                    totals,
                    pickup_time: request.pickup_time,
                    pickup_notes,
                    items,
                },
                &self.state.config.order_prefix,
            )
            .await?;

        info!(
            order_id = %details.order.id,
            order_number = %details.order.order_number,
            total = %details.order.total(),
            "Order created"
        );

        Ok(details)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<OrderDetails> {
        let id = validate_required("order id", id)?;
        self.state
            .db
            .orders()
            .get_details(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))
    }

    pub async fn get_by_number(&self, order_number: &str) -> ServiceResult<OrderDetails> {
        let number = validate_required("order number", order_number)?;
        self.state
            .db
            .orders()
            .get_details_by_number(&number)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", number))
    }

    /// A customer's orders, newest first.
    pub async fn list_by_email(&self, email: Option<&str>) -> ServiceResult<Vec<OrderDetails>> {
        let email = validate_email(email.unwrap_or_default())?;
        Ok(self.state.db.orders().list_by_email(&email).await?)
    }
}

fn validate_customer(request: &CreateOrderRequest) -> ServiceResult<CustomerInfo> {
    let customer = &request.customer;
    Ok(CustomerInfo {
        email: validate_email(&customer.email)?,
        first_name: validate_name("first name", &customer.first_name)?,
        last_name: validate_name("last name", &customer.last_name)?,
        phone: validate_phone(customer.phone.as_deref())?,
    })
}
