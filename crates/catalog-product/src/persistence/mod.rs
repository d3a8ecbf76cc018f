//! Mapping between products, outbox records and stored rows.

pub mod outbox_repository;
pub mod product_repository;
pub mod tables;

pub use outbox_repository::OutboxRepository;
pub use product_repository::ProductRepository;
