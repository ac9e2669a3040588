//! # Money and Weight
//!
//! Provides the `Money` and `Weight` types used by every pricing rule.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a jewellery shop:                                                   │
//! │    ₹2260.00 / 4 units = ₹565.00 — the customer is owed EXACTLY that    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    226000 paise / 4 = 56500 paise, no drift, no surprise refunds       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Weight follows the same rule: integer milligrams, so a 10.500 g bangle
//! is 10500 mg and `weight × rate` stays in integer arithmetic end to end.
//!
//! ## Usage
//! ```rust
//! use sona_core::money::{Money, Weight};
//!
//! let rate = Money::from_paise(9_500);        // ₹95.00 per gram
//! let weight = Weight::from_milligrams(10_000); // 10 g
//!
//! let metal_value = weight.price_at(rate);
//! assert_eq!(metal_value.paise(), 95_000);     // ₹950.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in paise (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and exchange
///   differences before the sign is resolved
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use sona_core::money::Money;
    ///
    /// let price = Money::from_paise(226_000); // Represents ₹2260.00
    /// assert_eq!(price.paise(), 226_000);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise (smallest currency unit).
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (paise) portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## Implementation
    /// Integer math with rounding: `(amount × bps + 5000) / 10000`.
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use sona_core::money::Money;
    /// use sona_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_paise(226_000); // ₹2260.00
    /// let gst = TaxRate::from_bps(300);          // 3%
    ///
    /// let tax = subtotal.calculate_tax(gst);
    /// assert_eq!(tax.paise(), 6_780);            // ₹67.80
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_paise = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_paise(tax_paise as i64)
    }

    /// Returns the given percentage (in basis points) of this amount.
    ///
    /// Used to derive percentage discounts: 10% of making charges is
    /// `making_charges.percent_of(1000)`.
    ///
    /// ## Example
    /// ```rust
    /// use sona_core::money::Money;
    ///
    /// let making = Money::from_paise(40_000); // ₹400.00
    /// assert_eq!(making.percent_of(1000).paise(), 4_000); // 10% = ₹40.00
    /// ```
    pub fn percent_of(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_paise(part as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Allocates a proportional share of this amount: `self × part / whole`.
    ///
    /// This is the canonical partial-return rule: the value of `part`
    /// returned units out of `whole` sold units is an exact fraction of
    /// what was actually charged, including any discount — NOT a
    /// recomputation from unit prices.
    ///
    /// ## Rounding
    /// Round half up through an i128 intermediate. Exact whenever
    /// `self × part` divides evenly by `whole`; `part == whole` always
    /// returns `self` unchanged.
    ///
    /// ## Example
    /// ```rust
    /// use sona_core::money::Money;
    ///
    /// let charged = Money::from_paise(226_000); // ₹2260.00 for 4 units
    /// assert_eq!(charged.allocate(1, 4).paise(), 56_500); // ₹565.00
    /// assert_eq!(charged.allocate(4, 4), charged);
    /// ```
    pub fn allocate(&self, part: i64, whole: i64) -> Money {
        debug_assert!(whole > 0, "allocation whole must be positive");
        if whole <= 0 {
            return Money::zero();
        }
        let scaled = (self.0 as i128 * part as i128 + whole as i128 / 2) / whole as i128;
        Money::from_paise(scaled as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs. UI formatting (grouping, locale) is the
/// frontend's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Weight Type
// =============================================================================

/// Metal weight in milligrams.
///
/// Jewellery weights carry three decimal places on the scale (10.500 g),
/// so milligrams are the smallest unit the system ever needs. Same
/// integer-only rule as `Money`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Weight(i64);

impl Weight {
    /// Creates a weight from milligrams.
    #[inline]
    pub const fn from_milligrams(mg: i64) -> Self {
        Weight(mg)
    }

    /// Creates a weight from whole grams.
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Weight(grams * 1000)
    }

    /// Returns the weight in milligrams.
    #[inline]
    pub const fn milligrams(&self) -> i64 {
        self.0
    }

    /// Returns the weight in grams (display only — lossy for fractions).
    #[inline]
    pub fn grams(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Zero weight.
    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    /// Checks if the weight is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Prices this weight at a per-gram rate.
    ///
    /// `weight_mg × rate_paise_per_gram / 1000`, rounded half up through
    /// i128. Exact for any whole-milligram weight at a whole-paise rate
    /// that multiplies to a multiple of 1000.
    ///
    /// ## Example
    /// ```rust
    /// use sona_core::money::{Money, Weight};
    ///
    /// let w = Weight::from_milligrams(10_500); // 10.5 g
    /// let rate = Money::from_paise(9_500);     // ₹95/g
    /// assert_eq!(w.price_at(rate).paise(), 99_750); // ₹997.50
    /// ```
    pub fn price_at(&self, rate_per_gram: Money) -> Money {
        let paise = (self.0 as i128 * rate_per_gram.paise() as i128 + 500) / 1000;
        Money::from_paise(paise as i64)
    }
}

/// Display shows grams with milligram precision: "10.500 g".
impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:03} g", sign, (self.0 / 1000).abs(), (self.0 % 1000).abs())
    }
}

impl Add for Weight {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Weight(self.0 + other.0)
    }
}

impl Sub for Weight {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Weight(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(226_000);
        assert_eq!(money.paise(), 226_000);
        assert_eq!(money.rupees(), 2260);
        assert_eq!(money.paise_part(), 0);
    }

    #[test]
    fn test_from_rupees() {
        assert_eq!(Money::from_rupees(95).paise(), 9_500);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(109_950)), "₹1099.50");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        let result: Money = a * 3;
        assert_eq!(result.paise(), 3000);
    }

    #[test]
    fn test_gst_calculation() {
        // ₹2260.00 at 3% = ₹67.80
        let amount = Money::from_paise(226_000);
        let rate = TaxRate::from_bps(300);
        assert_eq!(amount.calculate_tax(rate).paise(), 6_780);
    }

    #[test]
    fn test_tax_rounding() {
        // ₹10.01 at 3% = 30.03 paise → 30 paise
        let amount = Money::from_paise(1001);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(300)).paise(), 30);
        // ₹10.17 at 3% = 30.51 paise → 31 paise (round half up)
        let amount = Money::from_paise(1017);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(300)).paise(), 31);
    }

    #[test]
    fn test_percent_of() {
        let making = Money::from_paise(40_000);
        assert_eq!(making.percent_of(1000).paise(), 4_000); // 10%
        assert_eq!(making.percent_of(0).paise(), 0);
        assert_eq!(making.percent_of(10000).paise(), 40_000); // 100%
    }

    #[test]
    fn test_allocate_partial_return() {
        // Spec scenario: 1 of 4 units of a ₹2260.00 line
        let charged = Money::from_paise(226_000);
        assert_eq!(charged.allocate(1, 4).paise(), 56_500);
        assert_eq!(charged.allocate(2, 4).paise(), 113_000);
        assert_eq!(charged.allocate(3, 4).paise(), 169_500);
    }

    #[test]
    fn test_allocate_full_is_exact() {
        // part == whole must reproduce the original exactly, even for
        // amounts that do not divide evenly
        let charged = Money::from_paise(999);
        assert_eq!(charged.allocate(3, 3), charged);
        assert_eq!(charged.allocate(7, 7), charged);
    }

    #[test]
    fn test_allocate_rounds_half_up() {
        // 1001 × 1 / 2 = 500.5 → 501
        assert_eq!(Money::from_paise(1001).allocate(1, 2).paise(), 501);
    }

    #[test]
    fn test_weight_price_at() {
        let w = Weight::from_grams(10);
        let rate = Money::from_rupees(95);
        assert_eq!(w.price_at(rate).paise(), 95_000);

        let w = Weight::from_milligrams(10_500);
        assert_eq!(w.price_at(rate).paise(), 99_750);
    }

    #[test]
    fn test_weight_display() {
        assert_eq!(format!("{}", Weight::from_milligrams(10_500)), "10.500 g");
        assert_eq!(format!("{}", Weight::from_grams(2)), "2.000 g");
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let refund = Money::from_paise(-550);
        assert!(refund.is_negative());
        assert_eq!(refund.abs().paise(), 550);
    }
}
