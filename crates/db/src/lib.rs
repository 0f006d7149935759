//! Database layer with `SeaORM` entities and the retainer ledger repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for clients and their work log entries
//! - Repository abstractions for the balance ledger and client listing
//! - Database migrations
//!
//! Repositories are explicitly constructed with a [`DatabaseConnection`]
//! and a change notifier; there is no process-wide database handle.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{ClientRepository, LedgerRepository};

use retainer_core::retainer::ChangeNotifier;
use retainer_shared::config::{AppConfig, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection from application configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);
    Database::connect(options).await
}

/// Builds the repository pair from application configuration.
///
/// Both repositories share one pooled connection and one notifier, so
/// a single `subscribe()` observes every committed change.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn build_repositories(
    config: &AppConfig,
) -> Result<(ClientRepository, LedgerRepository), DbErr> {
    let db = connect_with(&config.database).await?;
    let notifier = ChangeNotifier::with_capacity(config.notifier.channel_capacity);

    Ok((
        ClientRepository::new(db.clone(), notifier.clone()),
        LedgerRepository::new(db, notifier),
    ))
}
