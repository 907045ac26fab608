//! # Money Module
//!
//! Order total calculation.
//!
//! ## Why Not Plain f64?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │    19.99 × 3 × 0.85 = 50.974499999999999  → rounds to 50.97 ❌          │
//! │                                                                         │
//! │  OUR SOLUTION: Decimal accumulation, one rounding at the end           │
//! │    prices arrive as f64 (JSON numbers)                                 │
//! │    → converted to Decimal                                              │
//! │    → every line computed and summed exactly                            │
//! │    → the SUM is rounded once to 2 places                               │
//! │    → handed back as f64 for the JSON response                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Beyond Decimal Range
//! `Decimal` tops out near 7.9e28. An amount that doesn't fit (a huge price,
//! or a product or sum that would overflow) continues in f64 instead of
//! panicking or collapsing to zero. f64 results saturate at `±f64::MAX`.
//!
//! ## Rounding
//! Round half away from zero ("half-up" for the non-negative totals this
//! system produces): 0.125 → 0.13, 0.135 → 0.14.
//!
//! ## Usage
//! ```rust
//! use ventas_core::money::Money;
//!
//! let unit = Money::from_f64(19.99);
//! let line = unit.apply_percentage_discount(15.0).multiply_quantity(3);
//! assert_eq!(line.rounded().to_f64(), 50.97);
//! ```

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use crate::types::OrdenItem;

/// Decimal places kept in every surfaced monetary value.
pub const MONEY_SCALE: u32 = 2;

const F64_EXACT_CENTS: f64 = 9_007_199_254_740_992.0 / 100.0;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount, exact while it fits in a `Decimal`.
///
/// ## Where Money is Used
/// ```text
/// OrdenItem.precio_unit ──► discounted unit ──► × cantidad ──► line
///                                                               │
///                           Σ lines ──► rounded() ──► Orden.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Money(Amount);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Amount {
    Exact(Decimal),
    Approx(f64),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Exact(Decimal::ZERO)
    }
}

impl Amount {
    fn approx(value: f64) -> Self {
        if value.is_nan() {
            Amount::Approx(0.0)
        } else {
            Amount::Approx(value.clamp(f64::MIN, f64::MAX))
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Amount::Exact(d) => d.to_f64().unwrap_or(0.0),
            Amount::Approx(x) => x,
        }
    }
}

impl Money {
    /// Converts a JSON number into money.
    ///
    /// NaN and ±∞ carry no amount and become zero. Finite values beyond
    /// `Decimal` range are kept as f64.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Money::zero();
        }
        match Decimal::from_f64(value) {
            Some(d) => Money(Amount::Exact(d)),
            None => Money(Amount::approx(value)),
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(Amount::Exact(Decimal::ZERO))
    }

    /// Whether the amount is still exact decimal arithmetic.
    pub fn is_exact(&self) -> bool {
        matches!(self.0, Amount::Exact(_))
    }

    /// Multiplies by a quantity.
    ///
    /// ```rust
    /// use ventas_core::money::Money;
    ///
    /// let line = Money::from_f64(2.99).multiply_quantity(3);
    /// assert_eq!(line.to_f64(), 8.97);
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        let product = match self.0 {
            Amount::Exact(d) => d.checked_mul(Decimal::from(qty)).map(Amount::Exact),
            Amount::Approx(_) => None,
        };
        Money(product.unwrap_or_else(|| Amount::approx(self.to_f64() * qty as f64)))
    }

    /// Applies a percentage discount (`10.0` = 10% off).
    ///
    /// No bounds are enforced here; a negative percentage raises the price
    /// and anything above 100 yields a negative amount. Bounds belong to the
    /// validation layer. A non-finite percentage leaves the price unchanged.
    ///
    /// ```rust
    /// use ventas_core::money::Money;
    ///
    /// let discounted = Money::from_f64(100.0).apply_percentage_discount(10.0);
    /// assert_eq!(discounted.to_f64(), 90.0);
    /// ```
    pub fn apply_percentage_discount(&self, pct: f64) -> Self {
        if !pct.is_finite() {
            return *self;
        }
        let exact = match (self.0, Decimal::from_f64(pct)) {
            (Amount::Exact(d), Some(pct)) => Decimal::ONE_HUNDRED
                .checked_sub(pct)
                .and_then(|kept| d.checked_mul(kept))
                .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                .map(Amount::Exact),
            _ => None,
        };
        Money(exact.unwrap_or_else(|| Amount::approx(self.to_f64() * (1.0 - pct / 100.0))))
    }

    /// Rounds to [`MONEY_SCALE`] places, half away from zero.
    pub fn rounded(&self) -> Self {
        match self.0 {
            Amount::Exact(d) => Money(Amount::Exact(
                d.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
            )),
            // Past 2^53 cents f64 has no fractional digits left to round
            Amount::Approx(x) if x.abs() < F64_EXACT_CENTS => {
                Money(Amount::approx((x * 100.0).round() / 100.0))
            }
            Amount::Approx(_) => *self,
        }
    }

    /// Returns the value as a JSON-friendly f64. Always finite.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }
}

/// Rounds a raw f64 to two places with the same strategy totals use.
///
/// Used for aggregates coming back from the store (average order value).
///
/// ```rust
/// use ventas_core::money::round_money;
///
/// assert_eq!(round_money(10.005), 10.01);
/// assert_eq!(round_money(33.333333), 33.33);
/// ```
pub fn round_money(value: f64) -> f64 {
    Money::from_f64(value).rounded().to_f64()
}

// =============================================================================
// Total Calculator
// =============================================================================

/// Computes an order's total from its line items.
///
/// ## Algorithm
/// ```text
/// for each item:
///     unit = precio_unit
///     if descuento_pct present and non-zero:
///         unit = precio_unit × (1 − descuento_pct / 100)
///     line = unit × cantidad
/// total = round(Σ line, 2)
/// ```
///
/// An empty slice yields `0.0`. Out-of-range values are accepted as-is.
///
/// ```rust
/// use ventas_core::money::calculate_total;
/// use ventas_core::types::OrdenItem;
///
/// assert_eq!(calculate_total(&[]), 0.0);
/// ```
pub fn calculate_total(items: &[OrdenItem]) -> f64 {
    items
        .iter()
        .map(OrdenItem::line_total)
        .sum::<Money>()
        .rounded()
        .to_f64()
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rounded().0 {
            Amount::Exact(d) => write!(f, "{d:.2}"),
            Amount::Approx(x) => write!(f, "{x:.2}"),
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let exact = match (self.0, other.0) {
            (Amount::Exact(a), Amount::Exact(b)) => a.checked_add(b).map(Amount::Exact),
            _ => None,
        };
        Money(exact.unwrap_or_else(|| Amount::approx(self.to_f64() + other.to_f64())))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
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

    fn item(cantidad: i64, precio_unit: f64, descuento_pct: Option<f64>) -> OrdenItem {
        OrdenItem::new("p", cantidad, precio_unit, descuento_pct)
    }

    #[test]
    fn test_reference_order_totals_23() {
        let items = vec![item(2, 10.0, Some(10.0)), item(1, 5.0, None)];
        assert_eq!(calculate_total(&items), 23.0);
    }

    #[test]
    fn test_empty_items_total_zero() {
        assert_eq!(calculate_total(&[]), 0.0);
    }

    #[test]
    fn test_zero_discount_is_full_price() {
        let items = vec![item(3, 4.5, Some(0.0))];
        assert_eq!(calculate_total(&items), 13.5);
    }

    #[test]
    fn test_full_discount_is_free() {
        let items = vec![item(7, 12.34, Some(100.0))];
        assert_eq!(calculate_total(&items), 0.0);
    }

    #[test]
    fn test_sum_is_rounded_once() {
        // Each line is 0.333..., rounding per line would give 0.99
        let items = vec![
            item(1, 1.0, Some(66.6666)),
            item(1, 1.0, Some(66.6666)),
            item(1, 1.0, Some(66.6666)),
        ];
        assert_eq!(calculate_total(&items), 1.0);
    }

    #[test]
    fn test_float_artifacts_do_not_leak() {
        let items = vec![item(1, 0.1, None), item(1, 0.2, None)];
        assert_eq!(calculate_total(&items), 0.3);

        // 19.99 × 3 × 0.85 = 50.9745 exactly → 50.97
        let items = vec![item(3, 19.99, Some(15.0))];
        assert_eq!(calculate_total(&items), 50.97);
    }

    #[test]
    fn test_midpoint_rounds_up() {
        // 0.125 exactly
        let items = vec![item(1, 0.125, None)];
        assert_eq!(calculate_total(&items), 0.13);
    }

    #[test]
    fn test_out_of_range_values_are_accepted() {
        // Negative discount raises the price; no error at this level
        let items = vec![item(1, 10.0, Some(-10.0))];
        assert_eq!(calculate_total(&items), 11.0);
    }

    #[test]
    fn test_matches_reference_formula() {
        let cases: &[(i64, f64, Option<f64>)] = &[
            (1, 9.99, None),
            (4, 2.5, Some(25.0)),
            (10, 0.99, Some(10.0)),
            (2, 1500.0, Some(12.5)),
        ];
        let items: Vec<OrdenItem> = cases.iter().map(|&(q, p, d)| item(q, p, d)).collect();

        let expected: f64 = cases
            .iter()
            .map(|&(q, p, d)| p * q as f64 * (1.0 - d.unwrap_or(0.0) / 100.0))
            .sum();
        let expected = (expected * 100.0).round() / 100.0;

        assert_eq!(calculate_total(&items), expected);
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Money::from_f64(5.0).to_string(), "5.00");
        assert_eq!(Money::from_f64(1.005).to_string(), "1.01");
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(0.0), 0.0);
        assert_eq!(round_money(12.345), 12.35);
        assert_eq!(round_money(f64::NAN), 0.0);
    }

    #[test]
    fn test_overflowing_line_does_not_panic() {
        // 1e10 × 1e20 overflows Decimal's multiplication
        let items = vec![item(10_000_000_000, 1e20, None)];
        let total = calculate_total(&items);

        assert!(total.is_finite());
        assert!((total - 1e30).abs() / 1e30 < 1e-9);
    }

    #[test]
    fn test_price_beyond_decimal_range_is_not_zeroed() {
        let items = vec![item(1, 1e29, None)];
        assert_eq!(calculate_total(&items), 1e29);

        let discounted = vec![item(2, 1e29, Some(50.0))];
        assert_eq!(calculate_total(&discounted), 1e29);
    }

    #[test]
    fn test_overflowing_sum_falls_back() {
        // Each line fits in Decimal, their sum does not
        let items = vec![item(1, 7e28, None), item(1, 7e28, None)];
        let total = calculate_total(&items);
        assert!((total - 1.4e29).abs() / 1.4e29 < 1e-9);

        let exact = Money::from_f64(7e28);
        assert!(exact.is_exact());
        assert!(!(exact + exact).is_exact());
    }

    #[test]
    fn test_fallback_saturates_instead_of_infinity() {
        let items = vec![item(i64::MAX, f64::MAX, None)];
        assert_eq!(calculate_total(&items), f64::MAX);
    }

    #[test]
    fn test_non_finite_discount_keeps_price() {
        let items = vec![item(2, 10.0, Some(f64::NAN))];
        assert_eq!(calculate_total(&items), 20.0);
    }
}
