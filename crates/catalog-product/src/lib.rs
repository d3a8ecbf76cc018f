//! Product catalog: Product bounded context.
//!
//! Responsible for the product aggregate (status lifecycle, discounts,
//! exact pricing), the use cases that change it, and the mapping between
//! products and stored rows. Every state change is written together with its
//! outbox records in one atomic commit.

pub mod application;
pub mod domain;
pub mod persistence;
