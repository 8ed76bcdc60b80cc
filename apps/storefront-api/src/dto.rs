//! # Request and Response Bodies
//!
//! Wire shapes of the JSON API. Every field is camelCase; domain types from
//! `toohot-core` are converted here so the storage layout never leaks out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use toohot_core::{
    CheckoutLine, CustomerInfo, LocalizedDescription, LocalizedText, MenuItem, Order,
    OrderDetails, OrderItem, OrderStatus, PaymentStatus, StatusHistoryEntry,
};
use toohot_payments::PaymentIntent;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// `POST /api/orders/create`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer: CustomerRequest,
    #[serde(default)]
    pub cart_items: Vec<CheckoutLine>,
    #[serde(default)]
    pub pickup_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pickup_notes: Option<String>,
}

/// `POST /api/payment/create-intent`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    #[serde(default)]
    pub order_id: String,
}

/// `POST /api/payment/confirm`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub payment_intent_id: String,
}

/// `PATCH /api/admin/orders/{orderId}/status`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// Menu
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDto {
    pub id: String,
    pub name: LocalizedText,
    pub description: LocalizedDescription,
    /// Display price, e.g. `"$15.99"`.
    pub price: String,
    pub price_cents: i64,
    pub category: String,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_popular: bool,
    pub spice_level: u8,
    pub allergens: Vec<String>,
    pub is_available: bool,
    pub image_url: Option<String>,
    pub prep_time_minutes: Option<i64>,
}

impl From<MenuItem> for MenuItemDto {
    fn from(item: MenuItem) -> Self {
        MenuItemDto {
            name: item.name(),
            description: item.description(),
            price: item.display_price(),
            id: item.id,
            price_cents: item.price_cents,
            category: item.category,
            is_vegetarian: item.is_vegetarian,
            is_vegan: item.is_vegan,
            is_popular: item.is_popular,
            spice_level: item.spice_level,
            allergens: item.allergens,
            is_available: item.is_available,
            image_url: item.image_url,
            prep_time_minutes: item.prep_time_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub success: bool,
    pub items: Vec<MenuItemDto>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<String>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl From<CustomerInfo> for CustomerDto {
    fn from(c: CustomerInfo) -> Self {
        CustomerDto {
            email: c.email,
            first_name: c.first_name,
            last_name: c.last_name,
            phone: c.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: String,
    pub menu_item_id: String,
    pub name: LocalizedText,
    pub description: LocalizedDescription,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub special_instructions: Option<String>,
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        OrderItemDto {
            id: item.id,
            menu_item_id: item.menu_item_id,
            name: LocalizedText {
                en: item.menu_item_name_en,
                zh: item.menu_item_name_zh,
            },
            description: LocalizedDescription {
                en: item.menu_item_description_en,
                zh: item.menu_item_description_zh,
            },
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            total_price_cents: item.total_price_cents,
            special_instructions: item.special_instructions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub customer: CustomerDto,
    pub pickup_time: Option<DateTime<Utc>>,
    pub pickup_notes: Option<String>,
    pub payment_intent_id: Option<String>,
    /// Pass back as `expectedVersion` on the next admin update.
    pub version: i64,
    pub items: Vec<OrderItemDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderDto {
    fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        OrderDto {
            customer: order.customer().into(),
            id: order.id,
            order_number: order.order_number,
            status: order.status,
            payment_status: order.payment_status,
            subtotal_cents: order.subtotal_cents,
            tax_cents: order.tax_cents,
            total_cents: order.total_cents,
            pickup_time: order.pickup_time,
            pickup_notes: order.pickup_notes,
            payment_intent_id: order.stripe_payment_intent_id,
            version: order.version,
            items: items.into_iter().map(OrderItemDto::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl From<OrderDetails> for OrderDto {
    fn from(details: OrderDetails) -> Self {
        OrderDto::from_parts(details.order, details.items)
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: OrderDto,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderDto>,
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub success: bool,
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentSummary {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
}

impl From<&PaymentIntent> for PaymentIntentSummary {
    fn from(intent: &PaymentIntent) -> Self {
        PaymentIntentSummary {
            id: intent.id.clone(),
            status: intent.status.clone(),
            amount: intent.amount,
            currency: intent.currency.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub order: OrderDto,
    pub payment_intent: PaymentIntentSummary,
}

// =============================================================================
// Admin
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AdminOrderResponse {
    pub order: OrderDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryDto {
    pub id: String,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StatusHistoryEntry> for StatusHistoryDto {
    fn from(entry: StatusHistoryEntry) -> Self {
        StatusHistoryDto {
            id: entry.id,
            status: entry.status,
            notes: entry.notes,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<StatusHistoryDto>,
}

// =============================================================================
// Config
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigResponse {
    pub publishable_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_id: Option<String>,
}
