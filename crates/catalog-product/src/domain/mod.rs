//! Domain model for the Product context.

pub mod aggregates;
pub mod change_tracker;
pub mod commands;
pub mod discount;
pub mod errors;
pub mod events;
pub mod money;
