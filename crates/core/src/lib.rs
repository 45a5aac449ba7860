//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and lifecycle logic live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry ledger entries, validation, numbering, balances
//! - `workflow` - Entry lifecycle state machine, reversal engine, bulk orchestration
//! - `store` - Storage seam consumed by the services, with an in-memory implementation

pub mod ledger;
pub mod store;
pub mod workflow;
