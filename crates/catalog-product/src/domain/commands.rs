//! Commands for the Product context.

use catalog_core::command::Command;

/// Command to create a new product.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    /// Product name.
    pub name: String,
    /// Free-form description; may be empty.
    pub description: String,
    /// Product category.
    pub category: String,
    /// Base price numerator.
    pub base_price_numerator: i64,
    /// Base price denominator.
    pub base_price_denominator: i64,
}

impl Command for CreateProduct {
    fn command_type(&self) -> &'static str {
        "product.create"
    }
}

/// Command to change a product's name, description and category.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    /// The product identifier.
    pub product_id: String,
    /// New name.
    pub name: String,
    /// New description.
    pub description: String,
    /// New category.
    pub category: String,
}

impl Command for UpdateProduct {
    fn command_type(&self) -> &'static str {
        "product.update"
    }
}

/// Command to activate an inactive product.
#[derive(Debug, Clone)]
pub struct ActivateProduct {
    /// The product identifier.
    pub product_id: String,
}

impl Command for ActivateProduct {
    fn command_type(&self) -> &'static str {
        "product.activate"
    }
}

/// Command to deactivate a product.
#[derive(Debug, Clone)]
pub struct DeactivateProduct {
    /// The product identifier.
    pub product_id: String,
}

impl Command for DeactivateProduct {
    fn command_type(&self) -> &'static str {
        "product.deactivate"
    }
}

/// Command to apply a percentage discount over a time window.
#[derive(Debug, Clone)]
pub struct ApplyDiscount {
    /// The product identifier.
    pub product_id: String,
    /// Discount percentage in `[0, 100]`.
    pub percentage: i64,
    /// Window start, epoch seconds.
    pub start_date: i64,
    /// Window end, epoch seconds.
    pub end_date: i64,
}

impl Command for ApplyDiscount {
    fn command_type(&self) -> &'static str {
        "product.apply_discount"
    }
}

/// Command to remove a product's discount.
#[derive(Debug, Clone)]
pub struct RemoveDiscount {
    /// The product identifier.
    pub product_id: String,
}

impl Command for RemoveDiscount {
    fn command_type(&self) -> &'static str {
        "product.remove_discount"
    }
}

/// Command to archive a product.
#[derive(Debug, Clone)]
pub struct ArchiveProduct {
    /// The product identifier.
    pub product_id: String,
}

impl Command for ArchiveProduct {
    fn command_type(&self) -> &'static str {
        "product.archive"
    }
}
