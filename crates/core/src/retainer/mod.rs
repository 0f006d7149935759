//! Retainer balance accounting logic.
//!
//! This module implements the core of the hours retainer:
//! - Entry kinds and client lifecycle types
//! - Accumulator effects of appends and reversals
//! - Input validation for ledger mutations
//! - Public slug generation
//! - The post-commit change notifier

pub mod balance;
pub mod notify;
pub mod slug;
pub mod types;
pub mod validation;

pub use balance::{Accumulator, BalanceDelta, forward_effect, remaining_balance, reverse_effect};
pub use notify::{ChangeNotifier, LedgerEvent, LedgerEventType};
pub use slug::{SLUG_RETRY_LIMIT, generate_slug, slugify};
pub use types::{ClientPatch, ClientStatus, EntryKind, NewClient, NewWorkEntry, RefillRequest};
pub use validation::{
    ValidationError, validate_description, validate_hours, validate_name,
};
