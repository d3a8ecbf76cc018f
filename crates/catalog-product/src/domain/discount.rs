//! Percentage discount with an inclusive validity window.

use chrono::{DateTime, Utc};

use super::errors::ProductError;

/// Immutable discount value object. Queries take the instant to evaluate as
/// an argument; a discount never reads the clock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discount {
    percentage: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl Discount {
    /// Creates a discount of `percentage` valid from `start_date` to
    /// `end_date`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::DiscountOutOfRange` if `percentage` is outside
    /// `[0, 100]`, or `ProductError::InvalidDateRange` if `end_date` precedes
    /// `start_date`.
    pub fn new(
        percentage: i64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        if !(0..=100).contains(&percentage) {
            return Err(ProductError::DiscountOutOfRange);
        }
        if end_date < start_date {
            return Err(ProductError::InvalidDateRange);
        }
        Ok(Self {
            percentage,
            start_date,
            end_date,
        })
    }

    #[must_use]
    pub fn percentage(&self) -> i64 {
        self.percentage
    }

    #[must_use]
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Whether the discount is in effect at `t` (`start <= t <= end`).
    #[must_use]
    pub fn is_active_at(&self, t: DateTime<Utc>) -> bool {
        self.start_date <= t && t <= self.end_date
    }

    /// Whether the discount may be applied at `now`: it may start in the
    /// future or have started already, but must not have ended.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.end_date
    }
}
