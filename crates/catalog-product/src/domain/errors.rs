//! Domain errors for the Product context.

use thiserror::Error;

/// Business-rule and validation failures raised by the product aggregate and
/// its value objects. All of them are deterministic functions of the input
/// and the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProductError {
    /// Name is empty.
    #[error("name cannot be empty")]
    InvalidName,

    /// Category is empty.
    #[error("category cannot be empty")]
    InvalidCategory,

    /// Price has a zero denominator, is not positive, or overflowed.
    #[error("price must be positive")]
    InvalidPrice,

    /// Percentage outside `[0, 100]`.
    #[error("discount must be between 0 and 100")]
    DiscountOutOfRange,

    /// Discount end date precedes its start date.
    #[error("end date must be after start date")]
    InvalidDateRange,

    /// The product is archived; only a repeated archive is accepted.
    #[error("product is archived")]
    ProductIsArchived,

    /// Activation requested for an already active product.
    #[error("product is already active")]
    ProductAlreadyActive,

    /// The operation requires an active product.
    #[error("product is not active")]
    ProductNotActive,

    /// The discount window has already ended.
    #[error("discount period is invalid")]
    InvalidDiscountPeriod,

    /// Removal requested but no discount is set.
    #[error("no active discount to remove")]
    NoActiveDiscount,
}

impl ProductError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_name",
            Self::InvalidCategory => "invalid_category",
            Self::InvalidPrice => "invalid_price",
            Self::DiscountOutOfRange => "discount_out_of_range",
            Self::InvalidDateRange => "invalid_date_range",
            Self::ProductIsArchived => "product_is_archived",
            Self::ProductAlreadyActive => "product_already_active",
            Self::ProductNotActive => "product_not_active",
            Self::InvalidDiscountPeriod => "invalid_discount_period",
            Self::NoActiveDiscount => "no_active_discount",
        }
    }

    /// Returns `true` for input validation failures, `false` for state
    /// conflicts.
    #[must_use]
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::InvalidName
                | Self::InvalidCategory
                | Self::InvalidPrice
                | Self::DiscountOutOfRange
                | Self::InvalidDateRange
                | Self::InvalidDiscountPeriod
        )
    }
}
