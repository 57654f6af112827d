//! # Quantity Module
//!
//! Stock and line quantities in thousandths of a unit.
//!
//! A hardware store sells whole items (hammers), but also metres of cable
//! and kilos of nails. Quantities are therefore real numbers, stored as an
//! integer count of thousandths so that stock arithmetic is exact:
//!
//! ```text
//! 1 hammer        → Quantity(1000)
//! 2.5 m of cable  → Quantity(2500)
//! 0.125 kg nails  → Quantity(125)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

/// Number of stored steps in one unit.
pub const MILLI_PER_UNIT: i64 = 1000;

/// A quantity of product, in thousandths of the product's unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    /// Creates a quantity from whole units, `None` when the count of
    /// thousandths would overflow.
    #[inline]
    pub const fn checked_from_units(units: i64) -> Option<Self> {
        match units.checked_mul(MILLI_PER_UNIT) {
            Some(milli) => Some(Quantity(milli)),
            None => None,
        }
    }

    /// Creates a quantity from thousandths of a unit.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Returns the raw count of thousandths.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Whether the quantity is a whole number of units.
    #[inline]
    pub const fn is_whole(&self) -> bool {
        self.0 % MILLI_PER_UNIT == 0
    }
}

/// Shows whole quantities without decimals, fractional ones with the
/// significant thousandths only: `3`, `2.5`, `0.125`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MILLI_PER_UNIT as u64;
        let frac = abs % MILLI_PER_UNIT as u64;
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:03}", frac);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}
