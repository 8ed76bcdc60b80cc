//! # Order Pricing
//!
//! Subtotal, tax and total for a set of priced lines.
//!
//! ```text
//! line_total = unit_price × quantity
//! subtotal   = Σ line_total
//! tax        = round_half_up(subtotal × rate_bps / 10000)
//! total      = subtotal + tax
//! ```
//!
//! The cart and the order creation service both price through here, so the
//! number the customer sees before checkout is the number that gets charged.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::TaxRate;

/// Totals of an order or cart, all in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Applies tax to an already summed subtotal.
    pub fn compute(subtotal: Money, rate: TaxRate) -> Self {
        let tax = subtotal.calculate_tax(rate);
        OrderTotals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Prices `(unit_price, quantity)` pairs.
    ///
    /// ```rust
    /// use toohot_core::money::Money;
    /// use toohot_core::pricing::OrderTotals;
    /// use toohot_core::types::TaxRate;
    ///
    /// let totals = OrderTotals::from_lines([(Money::from_cents(1000), 2)], TaxRate::from_bps(825));
    /// assert_eq!(totals.subtotal.cents(), 2000);
    /// assert_eq!(totals.tax.cents(), 165);
    /// assert_eq!(totals.total.cents(), 2165);
    /// ```
    pub fn from_lines<I>(lines: I, rate: TaxRate) -> Self
    where
        I: IntoIterator<Item = (Money, i64)>,
    {
        let subtotal = lines
            .into_iter()
            .map(|(unit, qty)| unit.multiply_quantity(qty))
            .sum();
        Self::compute(subtotal, rate)
    }
}
