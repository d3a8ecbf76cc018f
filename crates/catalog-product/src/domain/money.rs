//! Exact monetary values.

use std::fmt;

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedMul, Zero};

use super::errors::ProductError;

/// An immutable rational amount. Arithmetic is exact; nothing is ever
/// rounded through floating point. Values are kept in lowest terms, so
/// equality and ordering are exact rational comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Ratio<i64>);

/// Largest numerator or denominator (in lowest terms) accepted by
/// `Money::new`. Scaling either by 100 still fits in an `i64`, so any
/// percentage can be applied to a constructed amount.
pub const MAX_COMPONENT: i64 = i64::MAX / 100;

impl Money {
    /// Creates a positive amount `numerator / denominator`.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::InvalidPrice` if `denominator` is zero, the
    /// value is not strictly positive, or either term in lowest terms
    /// exceeds `MAX_COMPONENT`.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, ProductError> {
        // i64::MIN cannot be negated during sign normalisation.
        if denominator == 0 || numerator == i64::MIN || denominator == i64::MIN {
            return Err(ProductError::InvalidPrice);
        }
        let value = Ratio::new(numerator, denominator);
        if value <= Ratio::zero()
            || *value.numer() > MAX_COMPONENT
            || *value.denom() > MAX_COMPONENT
        {
            return Err(ProductError::InvalidPrice);
        }
        Ok(Self(value))
    }

    /// Numerator in lowest terms.
    #[must_use]
    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }

    /// Denominator in lowest terms (always positive).
    #[must_use]
    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }

    /// Returns `self * (100 - percentage) / 100`, e.g. 20% off 100 is 80.
    /// A 100% discount yields zero.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::DiscountOutOfRange` if `percentage` is outside
    /// `[0, 100]`. Amounts built by `Money::new` never fail otherwise; only
    /// the result of earlier arithmetic can yield `ProductError::InvalidPrice`
    /// when it no longer fits.
    pub fn apply_percentage(&self, percentage: i64) -> Result<Self, ProductError> {
        if !(0..=100).contains(&percentage) {
            return Err(ProductError::DiscountOutOfRange);
        }
        let factor = Ratio::new(100 - percentage, 100);
        self.0
            .checked_mul(&factor)
            .map(Self)
            .ok_or(ProductError::InvalidPrice)
    }

    /// Exact sum of two amounts.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::InvalidPrice` if the sum does not fit.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ProductError> {
        self.0
            .checked_add(&other.0)
            .map(Self)
            .ok_or(ProductError::InvalidPrice)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator(), self.denominator())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_new_rejects_zero_denominator() {
        assert_eq!(Money::new(100, 0), Err(ProductError::InvalidPrice));
    }

    #[test]
    fn test_new_rejects_zero_and_negative_values() {
        assert_eq!(Money::new(0, 100), Err(ProductError::InvalidPrice));
        assert_eq!(Money::new(-1999, 100), Err(ProductError::InvalidPrice));
        assert_eq!(Money::new(1999, -100), Err(ProductError::InvalidPrice));
    }

    #[test]
    fn test_new_accepts_double_negative_as_positive() {
        let money = Money::new(-1999, -100).unwrap();

        assert_eq!(money, Money::new(1999, 100).unwrap());
    }

    #[test]
    fn test_values_are_kept_in_lowest_terms() {
        let money = Money::new(10000, 100).unwrap();

        assert_eq!(money.numerator(), 100);
        assert_eq!(money.denominator(), 1);
        assert_eq!(money.to_string(), "100/1");
    }

    #[test]
    fn test_apply_twenty_percent_to_one_hundred() {
        let base = Money::new(10000, 100).unwrap();

        let discounted = base.apply_percentage(20).unwrap();

        assert_eq!(discounted, Money::new(800_000, 10000).unwrap());
        assert_eq!(discounted, Money::new(80, 1).unwrap());
    }

    #[test]
    fn test_apply_percentage_is_exact_for_odd_prices() {
        let base = Money::new(1999, 100).unwrap();

        let discounted = base.apply_percentage(20).unwrap();

        assert_eq!(discounted, Money::new(15992, 10000).unwrap());
    }

    #[test]
    fn test_apply_percentage_bounds() {
        let base = Money::new(1999, 100).unwrap();

        assert_eq!(base.apply_percentage(0).unwrap(), base);
        assert_eq!(base.apply_percentage(100).unwrap().numerator(), 0);
        assert_eq!(
            base.apply_percentage(-1),
            Err(ProductError::DiscountOutOfRange)
        );
        assert_eq!(
            base.apply_percentage(101),
            Err(ProductError::DiscountOutOfRange)
        );
    }

    #[test]
    fn test_add_is_exact() {
        let a = Money::new(1, 3).unwrap();
        let b = Money::new(1, 6).unwrap();

        assert_eq!(a.checked_add(&b).unwrap(), Money::new(1, 2).unwrap());
    }

    #[test]
    fn test_add_overflow_is_invalid_price() {
        let large = Money::new(MAX_COMPONENT, 1).unwrap();
        let tiny = Money::new(1, MAX_COMPONENT - 1).unwrap();

        assert_eq!(large.checked_add(&tiny), Err(ProductError::InvalidPrice));
    }

    #[test]
    fn test_new_rejects_terms_too_large_to_discount() {
        assert_eq!(Money::new(i64::MAX, 1), Err(ProductError::InvalidPrice));
        assert_eq!(Money::new(1, i64::MAX), Err(ProductError::InvalidPrice));
        assert_eq!(
            Money::new(MAX_COMPONENT + 1, 1),
            Err(ProductError::InvalidPrice)
        );
        // Reduction happens before the bound is checked.
        assert_eq!(
            Money::new(MAX_COMPONENT * 100, 100).unwrap(),
            Money::new(MAX_COMPONENT, 1).unwrap()
        );
    }

    #[test]
    fn test_largest_price_can_still_be_discounted() {
        // Arrange
        let largest = Money::new(MAX_COMPONENT, 1).unwrap();
        let smallest = Money::new(1, MAX_COMPONENT).unwrap();

        // Act
        let discounted = largest.apply_percentage(1).unwrap();
        let tiny = smallest.apply_percentage(99).unwrap();

        // Assert
        assert_eq!(
            i128::from(discounted.numerator()) * 100,
            i128::from(MAX_COMPONENT) * 99 * i128::from(discounted.denominator())
        );
        assert!(discounted < largest);
        assert!(tiny < smallest);
    }

    #[test]
    fn test_ordering_is_exact() {
        let third = Money::new(1, 3).unwrap();
        let almost_third = Money::new(333_333, 1_000_000).unwrap();

        assert!(almost_third < third);
        assert_ne!(almost_third, third);
    }

    proptest! {
        #[test]
        fn prop_apply_percentage_matches_rational_formula(
            num in 1_i64..10_000_000,
            den in 1_i64..10_000_000,
            pct in 0_i64..=100,
        ) {
            let base = Money::new(num, den).unwrap();

            let discounted = base.apply_percentage(pct).unwrap();

            // num*(100-pct) / (den*100) == discounted, compared by cross multiplication.
            let lhs = i128::from(num) * i128::from(100 - pct) * i128::from(discounted.denominator());
            let rhs = i128::from(discounted.numerator()) * i128::from(den) * 100;
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn prop_any_constructed_amount_can_be_discounted(
            num in 1_i64..=MAX_COMPONENT,
            den in 1_i64..=MAX_COMPONENT,
            pct in 0_i64..=100,
        ) {
            let base = Money::new(num, den).unwrap();

            prop_assert!(base.apply_percentage(pct).is_ok());
        }

        #[test]
        fn prop_out_of_range_percentages_are_rejected(pct in prop_oneof![i64::MIN..0, 101_i64..i64::MAX]) {
            let base = Money::new(1999, 100).unwrap();

            prop_assert_eq!(base.apply_percentage(pct), Err(ProductError::DiscountOutOfRange));
        }
    }
}
