//! Dirty-field tracking for the product aggregate.

use std::collections::HashMap;

/// Persisted product fields whose changes are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    Name,
    Description,
    Category,
    BasePrice,
    Discount,
    Status,
    CreatedAt,
    UpdatedAt,
    ArchivedAt,
}

impl Field {
    /// Every tracked field.
    pub const ALL: [Self; 10] = [
        Self::Id,
        Self::Name,
        Self::Description,
        Self::Category,
        Self::BasePrice,
        Self::Discount,
        Self::Status,
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::ArchivedAt,
    ];

    /// Field-name token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::Category => "category",
            Self::BasePrice => "base_price",
            Self::Discount => "discount",
            Self::Status => "status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::ArchivedAt => "archived_at",
        }
    }
}

/// Field → dirty flag. Entries are only removed by `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    dirty: HashMap<Field, bool>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, field: Field) {
        self.dirty.insert(field, true);
    }

    #[must_use]
    pub fn is_dirty(&self, field: Field) -> bool {
        self.dirty.get(&field).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn clear(&mut self) {
        self.dirty.clear();
    }

    /// Dirty fields in declaration order.
    #[must_use]
    pub fn dirty_fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self
            .dirty
            .iter()
            .filter(|(_, dirty)| **dirty)
            .map(|(field, _)| *field)
            .collect();
        fields.sort_unstable();
        fields
    }
}
