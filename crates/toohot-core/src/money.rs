//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Menu shows "$15.99". In floating point:                                │
//! │    15.99 * 100 = 1598.9999999999998  ❌                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "$15.99" is parsed digit by digit → 1599 cents                      │
//! │    Line totals, subtotal, tax and total never touch a float            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use toohot_core::money::Money;
//!
//! let price = Money::parse_display_price("$15.99").unwrap();
//! assert_eq!(price.cents(), 1599);
//!
//! let line_total = price.multiply_quantity(2);
//! assert_eq!(line_total.cents(), 3198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  MenuItem.price_cents ──► CartItem.unit_price ──► CartItem.total_price │
/// │                                                                         │
/// │  Order.subtotal ──► calculate_tax(700 bps) ──► Order.total             │
/// │                                       │                                 │
/// │                                       └──► PaymentIntent.amount        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Parses a price as displayed on the menu into cents.
    ///
    /// Accepts an optional leading `$`, thousands separators and up to any
    /// number of fractional digits. Fractions beyond the cent are rounded
    /// half up, so `"$2.005"` becomes 201 cents.
    ///
    /// ## Example
    /// ```rust
    /// use toohot_core::money::Money;
    ///
    /// assert_eq!(Money::parse_display_price("$15.99").unwrap().cents(), 1599);
    /// assert_eq!(Money::parse_display_price("8").unwrap().cents(), 800);
    /// assert_eq!(Money::parse_display_price("$1,020.5").unwrap().cents(), 102050);
    /// assert!(Money::parse_display_price("market price").is_err());
    /// ```
    pub fn parse_display_price(display: &str) -> CoreResult<Money> {
        let invalid = || CoreError::InvalidPrice {
            value: display.to_string(),
        };

        let cleaned: String = display
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let digits: Vec<i64> = fraction
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(i64::from)
            .collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).map(|d| *d >= 5).unwrap_or(false);

        let cents = dollars
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(invalid)?;

        Ok(Money(cents))
    }

    /// Calculates tax, rounding to the nearest cent (half up).
    ///
    /// ## Implementation
    /// Integer math: `(amount * rate + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use toohot_core::money::Money;
    /// use toohot_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 165);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large subtotals from overflowing
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as dollars, e.g. `$15.99`. Localized display is the frontend's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1599);
        assert_eq!(money.cents(), 1599);
        assert_eq!(money.dollars(), 15);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1599)), "$15.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_parse_display_price() {
        assert_eq!(Money::parse_display_price("$15.99").unwrap().cents(), 1599);
        assert_eq!(Money::parse_display_price(" $8 ").unwrap().cents(), 800);
        assert_eq!(Money::parse_display_price("12.5").unwrap().cents(), 1250);
        assert_eq!(Money::parse_display_price("$.75").unwrap().cents(), 75);
        assert_eq!(Money::parse_display_price("$1,020.00").unwrap().cents(), 102000);
        assert_eq!(Money::parse_display_price("$2.005").unwrap().cents(), 201);
        assert_eq!(Money::parse_display_price("$2.004").unwrap().cents(), 200);
    }

    #[test]
    fn test_parse_display_price_rejects_garbage() {
        assert!(Money::parse_display_price("").is_err());
        assert!(Money::parse_display_price("$").is_err());
        assert!(Money::parse_display_price("-$3.00").is_err());
        assert!(Money::parse_display_price("$3.0.0").is_err());
        assert!(Money::parse_display_price("market price").is_err());
    }

    #[test]
    fn test_tax_rounds_at_cent_boundary() {
        // 333 × 6.25% = 20.8125 → 21
        let subtotal = Money::from_cents(333);
        let tax = subtotal.calculate_tax(TaxRate::from_bps(625));
        assert_eq!(tax.cents(), 21);
        assert_eq!((subtotal + tax).cents(), 354);

        // 333 × 7.00% = 23.31 → 23
        let tax = subtotal.calculate_tax(TaxRate::from_bps(700));
        assert_eq!(tax.cents(), 23);
        assert_eq!((subtotal + tax).cents(), 356);
    }

    #[test]
    fn test_tax_half_cent_rounds_up() {
        // 1000 × 8.25% = 82.5 → 83
        let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_sum_and_arithmetic() {
        let total: Money = [Money::from_cents(1000), Money::from_cents(599)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 1599);
        assert_eq!((total - Money::from_cents(99)).cents(), 1500);
        assert_eq!((Money::from_cents(250) * 4).cents(), 1000);
    }
}
