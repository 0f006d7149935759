//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every mutating operation owns a single database
//! transaction that performs ownership verification, accumulator
//! adjustment, and log-row insert/delete together.

pub mod client;
pub mod guard;
pub mod ledger;

pub use client::{
    ClientError, ClientFilter, ClientRepository, ClientSnapshot, ClientSort, SortOrder,
};
pub use guard::is_owner;
pub use ledger::{Appended, LedgerError, LedgerRepository, Refilled, Reversed};
