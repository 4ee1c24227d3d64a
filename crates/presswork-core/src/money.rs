//! # Money Module
//!
//! Provides the `Money` and `Percent` types for handling monetary values and
//! percentage math safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many bookkeeping systems:                                           │
//! │    $100.00 / 3 = $33.33 (×3 = $99.99)  → Lost $0.01!                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    10000 cents / 3 = 3333 cents (×3 = 9999 cents)                      │
//! │    We KNOW we lost 1 cent, and absorb it explicitly                    │
//! │    (see installments::generate_plan for the absorption rule)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use presswork_core::money::{Money, Percent};
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Percentage application rounds half-up to the cent
//! let thirty = Percent::from_bps(3000); // 30.00%
//! assert_eq!(thirty.of(Money::from_cents(10_000)).cents(), 3000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for balances and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// OrderItem.unit_price ──► OrderItem.total ──► Order.total
///                                                  │
/// OrderPayment.amount ──► Order.paid ──────────────┴──► Order.balance
///
/// Expense.total / MaterialPurchase.total follow the same shape.
/// EVERY monetary value in the system flows through this type.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use presswork_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
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
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn whole(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99, absolute value).
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use presswork_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides money into `n` parts, rounding half-up to the cent.
    ///
    /// The result is the PER-PART amount. Multiplying it back by `n` may
    /// differ from the original by rounding drift; callers that need an
    /// exact sum must absorb the residual explicitly
    /// (see `installments::generate_plan`).
    ///
    /// ## Example
    /// ```rust
    /// use presswork_core::money::Money;
    ///
    /// let balance = Money::from_cents(10_000); // $100.00
    /// assert_eq!(balance.divide_round(3).cents(), 3333); // $33.33
    /// ```
    ///
    /// ## Panics
    /// Panics if `n == 0`. Callers validate the count first
    /// (`validation::validate_installment_count`).
    pub fn divide_round(&self, n: i64) -> Money {
        // Half-up division via doubling: (2a + n) / 2n, computed in i128
        // to avoid overflow on large amounts.
        let cents = (self.0 as i128 * 2 + n as i128) / (2 * n as i128);
        Money(cents as i64)
    }

    /// Saturating subtraction clamped at zero.
    ///
    /// Used for "remaining balance" displays where a negative value
    /// (overpayment) should read as zero owed.
    #[inline]
    pub fn saturating_sub_zero(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }
}

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Client-facing formatting handles
/// currency symbols and localization elsewhere.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.whole().abs(), self.cents_part())
    }
}

/// Default money is zero.
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values.
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Percent Type
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 3000 bps = 30.00% (a typical default profit margin)
///
/// Allocation rules, profit margins and labor shares are all expressed in
/// basis points so that two-decimal percentages stay exact integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percent from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percent from a percentage value (for convenience).
    ///
    /// ## Example
    /// ```rust
    /// use presswork_core::money::Percent;
    ///
    /// assert_eq!(Percent::from_percentage(25.5).bps(), 2550);
    /// ```
    pub fn from_percentage(pct: f64) -> Self {
        Percent((pct * 100.0).round() as u32)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// One hundred percent.
    #[inline]
    pub const fn hundred() -> Self {
        Percent(10_000)
    }

    /// Checks if the percent is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Applies this percentage to a monetary amount, rounding half-up
    /// to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000` in `i128` to prevent
    /// overflow on large amounts. The +5000 provides half-up rounding
    /// (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use presswork_core::money::{Money, Percent};
    ///
    /// let amount = Money::from_cents(1000); // $10.00
    /// let rate = Percent::from_bps(825);    // 8.25%
    ///
    /// // $10.00 × 8.25% = $0.825 → rounds to $0.83 (83 cents)
    /// assert_eq!(rate.of(amount).cents(), 83);
    /// ```
    pub fn of(&self, amount: Money) -> Money {
        let cents = (amount.cents() as i128 * self.0 as i128 + 5000) / 10_000;
        Money::from_cents(cents as i64)
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
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
        assert_eq!(money.whole(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 399]
            .iter()
            .map(|c| Money::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 749);
    }

    #[test]
    fn test_divide_round_half_up() {
        // 10000 / 3 = 3333.33.. → 3333
        assert_eq!(Money::from_cents(10_000).divide_round(3).cents(), 3333);
        // 10001 / 2 = 5000.5 → 5001
        assert_eq!(Money::from_cents(10_001).divide_round(2).cents(), 5001);
        // 100 / 6 = 16.66.. → 17
        assert_eq!(Money::from_cents(100).divide_round(6).cents(), 17);
    }

    #[test]
    fn test_saturating_sub_zero() {
        let total = Money::from_cents(1000);
        let overpaid = Money::from_cents(1500);
        assert_eq!(total.saturating_sub_zero(overpaid).cents(), 0);
        assert_eq!(total.saturating_sub_zero(Money::from_cents(400)).cents(), 600);
    }

    #[test]
    fn test_percent_of_basic() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        let rate = Percent::from_bps(1000);
        assert_eq!(rate.of(amount).cents(), 100);
    }

    #[test]
    fn test_percent_of_with_rounding() {
        // $10.00 at 8.25% = $0.825 → $0.83 (half-up)
        let amount = Money::from_cents(1000);
        let rate = Percent::from_bps(825);
        assert_eq!(rate.of(amount).cents(), 83);
    }

    #[test]
    fn test_percent_from_percentage() {
        assert_eq!(Percent::from_percentage(8.25).bps(), 825);
        assert_eq!(Percent::from_percentage(100.0).bps(), 10_000);
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(format!("{}", Percent::from_bps(2550)), "25.50%");
        assert_eq!(format!("{}", Percent::from_bps(10_000)), "100.00%");
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    /// Verify that $100.00 / 3 × 3 loses exactly one cent.
    /// This documents the intentional precision loss that the installment
    /// plan generator absorbs into the final installment.
    #[test]
    fn test_division_precision_loss_documented() {
        let hundred = Money::from_cents(10_000);
        let one_third = hundred.divide_round(3); // 3333 cents
        let reconstructed: Money = one_third * 3; // 9999 cents

        assert_eq!(reconstructed.cents(), 9999);
        let lost = hundred - reconstructed;
        assert_eq!(lost.cents(), 1);
    }
}
