//! Core business logic for the retainer ledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `retainer` - Retainer balance accounting: entry effects, validation,
//!   slug generation, and the post-commit change notifier

pub mod retainer;
