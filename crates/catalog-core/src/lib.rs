//! Catalog core: storage-neutral building blocks.
//!
//! Defines the clock and id abstractions, the domain event envelope, and the
//! commit-plan pipeline (mutations, plans, committers, row readers) that every
//! bounded context writes through. It contains no database code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod commit_plan;
pub mod committer;
pub mod error;
pub mod event;
pub mod id;
pub mod mutation;
pub mod outbox;
pub mod row_reader;
