//! Identifier generation abstraction for determinism.
//!
//! Product ids and outbox event ids are drawn from an injected generator so
//! that tests can predict them.

use uuid::Uuid;

/// Source of globally unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier, never returned before by this generator.
    fn next_id(&self) -> Uuid;
}

/// Production generator producing time-ordered UUID v7 values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}
