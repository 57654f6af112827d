//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A sale total that drifts from the sum of its lines by a fraction of   │
//! │  a cent breaks reconciliation between sales and the stock ledger.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount is an i64 of the smallest currency unit.               │
//! │    Rounding happens once, per line, and is explicit.                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ironmonger_core::money::Money;
//! use ironmonger_core::quantity::Quantity;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price.times(Quantity::from_units(3));
//! assert_eq!(line.cents(), 3297);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::quantity::{Quantity, MILLI_PER_UNIT};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for losses in profit reports
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.selling_price ──┬──► SaleItem.unit_price ──► SaleItem.line_total│
/// │  Product.promo_price ────┘         (frozen at sale time)                │
/// │                                                                         │
/// │  Σ line totals ──► Sale.total (computed once, never recomputed)        │
/// │                                                                         │
/// │  PurchaseOrderItem.unit_cost × quantity ──► PurchaseOrder.total_cost   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use ironmonger_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a (possibly fractional) quantity.
    ///
    /// The exact product is `cents × milli / 1000`; the result is rounded
    /// half away from zero to the nearest cent. For whole quantities no
    /// rounding ever happens.
    ///
    /// ## Example
    /// ```rust
    /// use ironmonger_core::money::Money;
    /// use ironmonger_core::quantity::Quantity;
    ///
    /// // 2.5 m of cable at 3.99 per metre = 9.975 → 9.98
    /// let line = Money::from_cents(399).times(Quantity::from_milli(2_500));
    /// assert_eq!(line.cents(), 998);
    /// ```
    ///
    /// Saturates at the `i64` bounds; ledger planning uses
    /// [`checked_times`](Money::checked_times) instead.
    pub fn times(&self, quantity: Quantity) -> Money {
        let exact = self.0 as i128 * quantity.milli() as i128;
        let rounded = round_div(exact, MILLI_PER_UNIT as i128);
        Money::from_cents(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Like [`times`](Money::times), but `None` when the line total does
    /// not fit in an `i64` count of cents.
    pub fn checked_times(&self, quantity: Quantity) -> Option<Money> {
        let exact = self.0 as i128 * quantity.milli() as i128;
        i64::try_from(round_div(exact, MILLI_PER_UNIT as i128))
            .ok()
            .map(Money::from_cents)
    }

    /// `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Sums `amounts`, `None` as soon as the running total overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Applies a markup coefficient and rounds to a whole major unit.
    ///
    /// ## Example
    /// ```rust
    /// use ironmonger_core::money::{MarkupRate, Money};
    ///
    /// // 12.40 × 1.5 = 18.60 → 19.00
    /// let price = Money::from_cents(1240).apply_markup(MarkupRate::from_bps(15_000));
    /// assert_eq!(price.cents(), 1900);
    /// ```
    pub fn apply_markup(&self, rate: MarkupRate) -> Money {
        let exact = self.0 as i128 * rate.bps() as i128;
        // Round to whole major units: divide by bps scale × 100 cents, then back up.
        let major = round_div(exact, 10_000 * 100);
        Money::from_cents(major as i64 * 100)
    }
}

/// Integer division rounding half away from zero.
fn round_div(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Markup Rate
// =============================================================================

/// Markup coefficient in basis points: 10000 = ×1.0, 15000 = ×1.5.
///
/// Used to suggest a selling price from a purchase price when a product is
/// created or repriced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarkupRate(u32);

impl MarkupRate {
    /// Creates a markup rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        MarkupRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// A coefficient of ×1.0 (no markup).
    #[inline]
    pub const fn identity() -> Self {
        MarkupRate(10_000)
    }

    /// Whether this rate actually raises the price.
    #[inline]
    pub const fn raises_price(&self) -> bool {
        self.0 > 10_000
    }
}

impl Default for MarkupRate {
    fn default() -> Self {
        MarkupRate::identity()
    }
}

/// Suggests a selling price for a purchase price and markup.
///
/// Returns `None` when the purchase price is not positive or the markup
/// does not raise the price, leaving the selling price to manual entry.
pub fn suggest_selling_price(purchase_price: Money, rate: MarkupRate) -> Option<Money> {
    if !purchase_price.is_positive() || !rate.raises_price() {
        return None;
    }
    Some(purchase_price.apply_markup(rate))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows two decimals without a currency symbol; the currency label
/// is a store setting and belongs to presentation.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a whole count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
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
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
        assert_eq!(Money::from_major(100).cents(), 10_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_cents(100), Money::from_cents(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 350);
    }

    #[test]
    fn test_times_whole_quantity_is_exact() {
        let unit = Money::from_major(100);
        assert_eq!(unit.times(Quantity::from_units(3)).cents(), 30_000);
    }

    #[test]
    fn test_times_fractional_quantity_rounds_half_away_from_zero() {
        // 0.5 × 0.01 = 0.005 → 0.01
        assert_eq!(Money::from_cents(1).times(Quantity::from_milli(500)).cents(), 1);
        // negative margins round symmetrically
        assert_eq!(Money::from_cents(-1).times(Quantity::from_milli(500)).cents(), -1);
        // 1.25 kg at 2.00 = 2.50
        assert_eq!(Money::from_cents(200).times(Quantity::from_milli(1_250)).cents(), 250);
    }

    #[test]
    fn test_markup_rounds_to_whole_units() {
        let price = Money::from_cents(1000).apply_markup(MarkupRate::from_bps(13_000));
        assert_eq!(price.cents(), 1300);

        let price = Money::from_cents(333).apply_markup(MarkupRate::from_bps(15_000));
        // 4.995 → 5.00
        assert_eq!(price.cents(), 500);
    }

    #[test]
    fn test_suggest_selling_price() {
        let rate = MarkupRate::from_bps(12_500);
        assert_eq!(
            suggest_selling_price(Money::from_major(80), rate),
            Some(Money::from_major(100))
        );
        assert_eq!(suggest_selling_price(Money::zero(), rate), None);
        assert_eq!(
            suggest_selling_price(Money::from_major(80), MarkupRate::identity()),
            None
        );
    }

    #[test]
    fn test_checked_times_overflow() {
        let price = Money::from_cents(i64::MAX / 2 + 10);

        assert_eq!(price.checked_times(Quantity::from_units(2)), None);
        assert_eq!(price.times(Quantity::from_units(2)), Money::from_cents(i64::MAX));
        assert_eq!(
            price.checked_times(Quantity::from_units(1)),
            Some(price)
        );
        assert_eq!(
            Money::from_cents(399).checked_times(Quantity::from_milli(2_500)),
            Some(Money::from_cents(998))
        );
    }

    #[test]
    fn test_checked_sum() {
        let big = Money::from_cents(i64::MAX - 1);
        assert_eq!(big.checked_add(Money::from_cents(1)), Some(Money::from_cents(i64::MAX)));
        assert_eq!(big.checked_add(Money::from_cents(2)), None);

        assert_eq!(Money::checked_sum([big, Money::from_cents(5)]), None);
        assert_eq!(
            Money::checked_sum([Money::from_cents(100), Money::from_cents(250)]),
            Some(Money::from_cents(350))
        );
        assert_eq!(Money::checked_sum([]), Some(Money::zero()));
    }
}
