//! # toohot-core: Pure Business Logic for the TooHot Storefront
//!
//! This crate holds the ordering rules of the storefront as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TooHot Storefront Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (browser)                         │   │
//! │  │     Menu ──► Cart ──► Checkout ──► Card Element ──► Receipt    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront-api (axum)                        │   │
//! │  │    /api/menu, /api/orders/create, /api/payment/*, /api/admin/* │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ toohot-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  status   │  │   │
//! │  │   │ MenuItem  │  │   Money   │  │   Cart    │  │ table of  │  │   │
//! │  │   │  Order    │  │ TaxRate   │  │ CartStore │  │transitions│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           toohot-db (SQLite)   +   toohot-payments (Stripe)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, Order, OrderItem, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Subtotal / tax / total for a set of order lines
//! - [`cart`] - Cart reducer and the `CartStore` persistence port
//! - [`status`] - Order transition table and payment reconciliation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use toohot_core::money::Money;
//! use toohot_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(333);
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(625)); // 6.25%
//!
//! assert_eq!(tax.cents(), 21);
//! assert_eq!((subtotal + tax).cents(), 354);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{
    Cart, CartItem, CartMenuItem, CartSession, CartStore, CartTotals, CheckoutLine,
    MemoryCartStore, CART_SCHEMA_VERSION,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::OrderTotals;
pub use status::{is_valid_transition, reconcile_payment, Reconciliation};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Combined sales tax applied to every order, in basis points.
///
/// 6.25% state sales tax plus 0.75% local meals tax.
pub const DEFAULT_TAX_RATE_BPS: u32 = 700;

/// Prefix of human-readable order numbers (`TH-240615-003`).
pub const DEFAULT_ORDER_NUMBER_PREFIX: &str = "TH";

/// Maximum distinct entries allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single menu item in a cart or order line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest spice level a menu item can carry.
pub const MAX_SPICE_LEVEL: u8 = 5;
