//! # Cart Aggregator
//!
//! The customer's basket before checkout, plus the port it persists through.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Session Operations                              │
//! │                                                                         │
//! │  Customer Action          CartSession method      Cart State Change     │
//! │  ───────────────          ──────────────────      ─────────────────     │
//! │                                                                         │
//! │  Click "Add" ────────────► add_item() ──────────► merge by id or push  │
//! │                                                                         │
//! │  Change Quantity ────────► update_quantity() ───► qty = n (≤0 removes) │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ───────► items.retain(..)     │
//! │                                                                         │
//! │  Place Order ────────────► checkout_lines() ────► (read only)          │
//! │  Payment succeeded ──────► complete_checkout() ─► items.clear()        │
//! │                                                                         │
//! │  Every mutation ends with store.save({"version": N, "items": [...]})   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Freezing
//! A cart line keeps the price it was added at. The server re-prices every
//! line from the catalog at order creation, so a stale cart can only show a
//! stale number, never charge one.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::OrderTotals;
use crate::types::{LocalizedDescription, LocalizedText, MenuItem, TaxRate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Version tag written into every persisted cart payload.
///
/// Bump it whenever [`CartItem`]'s shape changes; older payloads are dropped
/// on load instead of being guessed at.
pub const CART_SCHEMA_VERSION: u32 = 2;

// =============================================================================
// Cart Item
// =============================================================================

/// The slice of a menu item the cart keeps around for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMenuItem {
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedDescription,
    pub category: String,
    /// Price as the menu card shows it, e.g. `"$15.99"`.
    #[serde(default)]
    pub price: String,
    /// Used when no display price is present.
    #[serde(default)]
    pub price_cents: Option<i64>,
}

impl CartMenuItem {
    /// Unit price in cents, taken from the displayed price when there is one.
    pub fn unit_price(&self) -> CoreResult<Money> {
        if !self.price.trim().is_empty() {
            return Money::parse_display_price(&self.price);
        }
        match self.price_cents {
            Some(cents) if cents >= 0 => Ok(Money::from_cents(cents)),
            _ => Err(CoreError::InvalidPrice {
                value: self.price.clone(),
            }),
        }
    }
}

impl From<&MenuItem> for CartMenuItem {
    fn from(item: &MenuItem) -> Self {
        CartMenuItem {
            id: item.id.clone(),
            name: item.name(),
            description: item.description(),
            category: item.category.clone(),
            price: item.display_price(),
            price_cents: Some(item.price_cents),
        }
    }
}

/// A line in the cart.
///
/// `id` is the menu item id, so there is at most one line per dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub menu_item: CartMenuItem,
    pub quantity: i64,
    /// Frozen when the line was created.
    pub unit_price_cents: i64,
    /// Always `unit_price_cents × quantity`.
    pub total_price_cents: i64,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl CartItem {
    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total_price_cents = Money::from_cents(self.unit_price_cents)
            .multiply_quantity(quantity)
            .cents();
    }
}

/// One line of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub menu_item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// Cart totals summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by menu item id (adding the same dish merges)
/// - Every line has quantity ≥ 1 (setting 0 or less removes it)
/// - At most [`MAX_CART_ITEMS`] lines, each at most [`MAX_ITEM_QUANTITY`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Adds a dish, or increases its quantity if it is already in the cart.
    pub fn add_item(&mut self, menu_item: &CartMenuItem, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.id == menu_item.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.set_quantity(new_qty);
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let unit_price = menu_item.unit_price()?;
        let mut item = CartItem {
            id: menu_item.id.clone(),
            menu_item: menu_item.clone(),
            quantity: 0,
            unit_price_cents: unit_price.cents(),
            total_price_cents: 0,
            special_instructions: None,
        };
        item.set_quantity(quantity);
        self.items.push(item);
        Ok(())
    }

    /// Sets a line's quantity. Zero or less removes the line.
    ///
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_item(item_id);
            return Ok(());
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            item.set_quantity(quantity);
        }
        Ok(())
    }

    /// Attaches kitchen notes to a line ("no cilantro").
    pub fn set_special_instructions(&mut self, item_id: &str, notes: Option<String>) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            item.special_instructions = notes.filter(|n| !n.trim().is_empty());
        }
    }

    /// Removes a line. Returns false when it was not in the cart.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != initial_len
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of dishes (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .map(|i| Money::from_cents(i.total_price_cents))
            .sum()
    }

    pub fn tax(&self, rate: TaxRate) -> Money {
        self.subtotal().calculate_tax(rate)
    }

    pub fn grand_total(&self, rate: TaxRate) -> Money {
        OrderTotals::compute(self.subtotal(), rate).total
    }

    pub fn totals(&self, rate: TaxRate) -> CartTotals {
        let totals = OrderTotals::compute(self.subtotal(), rate);
        CartTotals {
            item_count: self.item_count(),
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
        }
    }

    /// Projects the cart into the lines sent to order creation.
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items
            .iter()
            .map(|i| CheckoutLine {
                menu_item_id: i.id.clone(),
                quantity: i.quantity,
                special_instructions: i.special_instructions.clone(),
            })
            .collect()
    }
}

// =============================================================================
// Persistence Port
// =============================================================================

/// Where a cart session keeps its serialized payload between visits.
pub trait CartStore {
    fn load(&self) -> Option<String>;
    fn save(&self, payload: &str);
    fn clear(&self);
}

/// In-memory [`CartStore`]. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a payload already stored.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        MemoryCartStore {
            slot: Arc::new(Mutex::new(Some(payload.into()))),
        }
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, payload: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload.to_string());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Serialize)]
struct StoredCartRef<'a> {
    version: u32,
    items: &'a [CartItem],
}

#[derive(Deserialize)]
struct StoredCart {
    version: u32,
    items: Vec<CartItem>,
}

// =============================================================================
// Cart Session
// =============================================================================

/// A cart bound to its store. Every mutation is persisted immediately.
#[derive(Debug)]
pub struct CartSession<S: CartStore> {
    cart: Cart,
    store: S,
}

impl<S: CartStore> CartSession<S> {
    /// Restores the cart from the store.
    ///
    /// A payload with a different schema version, or one that does not
    /// parse, is discarded and removed from the store.
    pub fn restore(store: S) -> Self {
        let cart = match store.load() {
            None => Cart::new(),
            Some(payload) => match serde_json::from_str::<StoredCart>(&payload) {
                Ok(stored) if stored.version == CART_SCHEMA_VERSION => Cart {
                    items: stored.items,
                },
                _ => {
                    store.clear();
                    Cart::new()
                }
            },
        };
        CartSession { cart, store }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add_item(&mut self, menu_item: &CartMenuItem, quantity: i64) -> CoreResult<()> {
        self.cart.add_item(menu_item, quantity)?;
        self.persist();
        Ok(())
    }

    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        self.cart.update_quantity(item_id, quantity)?;
        self.persist();
        Ok(())
    }

    pub fn set_special_instructions(&mut self, item_id: &str, notes: Option<String>) {
        self.cart.set_special_instructions(item_id, notes);
        self.persist();
    }

    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let removed = self.cart.remove_item(item_id);
        self.persist();
        removed
    }

    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    /// Empties the cart once the order is paid.
    pub fn complete_checkout(&mut self) {
        self.clear();
    }

    fn persist(&self) {
        let stored = StoredCartRef {
            version: CART_SCHEMA_VERSION,
            items: &self.cart.items,
        };
        if let Ok(payload) = serde_json::to_string(&stored) {
            self.store.save(&payload);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
