//! Ledger repository: the balance-mutating operations.
//!
//! Every mutation here follows the same protocol: open a transaction,
//! lock the client row `FOR UPDATE`, verify ownership against the locked
//! row, insert or delete the ledger row, apply the accumulator delta as
//! a store-side relative update, commit, then publish a change event.
//! Failure at any step before commit rolls the whole mutation back, so
//! accumulators and ledger rows can never diverge.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use retainer_core::retainer::{
    Accumulator, BalanceDelta, ChangeNotifier, ClientStatus, EntryKind, LedgerEvent,
    LedgerEventType, NewWorkEntry, RefillRequest, ValidationError, forward_effect, reverse_effect,
    validate_description, validate_hours,
};
use retainer_shared::error::AppError;
use retainer_shared::types::{ClientId, EntryId, OwnerId};

use crate::entities::{clients, work_log_entries};
use crate::repositories::guard::is_owner;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Caller is not the owning account.
    #[error("Caller does not own client {0}")]
    Unauthorized(Uuid),

    /// Work logging is blocked by the client's status.
    #[error("Client {client} is {status:?}; work can only be logged against an active client")]
    ClientNotActive {
        /// The client whose status blocked the append.
        client: Uuid,
        /// The blocking status.
        status: ClientStatus,
    },

    /// Invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ClientNotFound(_) | LedgerError::EntryNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            LedgerError::Unauthorized(_) => Self::Unauthorized(err.to_string()),
            LedgerError::ClientNotActive { .. } => Self::Forbidden(err.to_string()),
            LedgerError::Validation(_) => Self::Validation(err.to_string()),
            LedgerError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// Result of appending a WORK entry.
#[derive(Debug, Clone)]
pub struct Appended {
    /// The client with post-commit accumulators.
    pub client: clients::Model,
    /// The inserted ledger row.
    pub entry: work_log_entries::Model,
}

/// Result of a refill.
#[derive(Debug, Clone)]
pub struct Refilled {
    /// The client with post-commit accumulators.
    pub client: clients::Model,
    /// The REFILL audit row, when one was requested.
    pub entry: Option<work_log_entries::Model>,
}

/// Result of reversing an entry.
#[derive(Debug, Clone)]
pub struct Reversed {
    /// The client with post-commit accumulators.
    pub client: clients::Model,
    /// The ledger row that was removed.
    pub entry: work_log_entries::Model,
}

/// Repository for balance-mutating ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    notifier: ChangeNotifier,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, notifier: ChangeNotifier) -> Self {
        Self { db, notifier }
    }

    /// Appends a WORK entry and consumes hours from the balance.
    ///
    /// Only ACTIVE clients accept work; the status is checked against the
    /// locked row, never a stale snapshot. The balance is allowed to go
    /// negative, which dashboards surface as overconsumption.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the client is missing, the
    /// caller is not the owner, the client is not active, or a query
    /// fails.
    pub async fn append_work_entry(
        &self,
        caller: OwnerId,
        client_id: ClientId,
        input: NewWorkEntry,
    ) -> Result<Appended, LedgerError> {
        validate_hours(input.hours)?;
        validate_description(&input.description)?;

        let txn = self.db.begin().await?;

        let client = lock_client(&txn, client_id.into_inner()).await?;
        if !is_owner(caller, &client) {
            return Err(LedgerError::Unauthorized(client.id));
        }

        let status: ClientStatus = client.status.clone().into();
        if !status.allows_work_logging() {
            return Err(LedgerError::ClientNotActive {
                client: client.id,
                status,
            });
        }

        let now = Utc::now();
        let entry = work_log_entries::ActiveModel {
            id: Set(EntryId::new().into_inner()),
            client_id: Set(client.id),
            entry_type: Set(EntryKind::Work.into()),
            hours: Set(input.hours),
            description: Set(input.description),
            entry_date: Set(input.date.unwrap_or(now).into()),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        apply_delta(&txn, client.id, forward_effect(EntryKind::Work, input.hours)).await?;

        let client = reload_client(&txn, client.id).await?;
        txn.commit().await?;

        info!(client_id = %client.id, entry_id = %entry.id, hours = %entry.hours, "logged work");
        self.notifier.publish(LedgerEvent::new(
            client.slug.clone(),
            LedgerEventType::AddLog,
            json!({ "entry": entry, "remaining_hours": client.remaining_balance() }),
        ));

        Ok(Appended { client, entry })
    }

    /// Tops up the balance, optionally recording a REFILL audit entry.
    ///
    /// Refills are accepted in any status; a paused client resumes by
    /// being refilled and re-activated. When `new_rate` matches the
    /// stored rate the rate write is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the client is missing, the
    /// caller is not the owner, or a query fails.
    pub async fn refill(
        &self,
        caller: OwnerId,
        client_id: ClientId,
        request: RefillRequest,
    ) -> Result<Refilled, LedgerError> {
        validate_hours(request.hours)?;

        let txn = self.db.begin().await?;

        let client = lock_client(&txn, client_id.into_inner()).await?;
        if !is_owner(caller, &client) {
            return Err(LedgerError::Unauthorized(client.id));
        }

        apply_delta(
            &txn,
            client.id,
            forward_effect(EntryKind::Refill, request.hours),
        )
        .await?;

        if let Some(rate) = request.new_rate
            && client.hourly_rate != Some(rate)
        {
            clients::Entity::update_many()
                .col_expr(clients::Column::HourlyRate, Expr::value(rate))
                .filter(clients::Column::Id.eq(client.id))
                .exec(&txn)
                .await?;
        }

        let entry = if request.create_log {
            let now = Utc::now();
            Some(
                work_log_entries::ActiveModel {
                    id: Set(EntryId::new().into_inner()),
                    client_id: Set(client.id),
                    entry_type: Set(EntryKind::Refill.into()),
                    hours: Set(request.hours),
                    description: Set(format!("Refill: added {} hours", request.hours)),
                    entry_date: Set(now.into()),
                    created_at: Set(now.into()),
                }
                .insert(&txn)
                .await?,
            )
        } else {
            None
        };

        let client = reload_client(&txn, client.id).await?;
        txn.commit().await?;

        info!(client_id = %client.id, hours = %request.hours, "refilled balance");
        self.notifier.publish(LedgerEvent::new(
            client.slug.clone(),
            LedgerEventType::Refill,
            json!({ "client": client, "entry": entry }),
        ));

        Ok(Refilled { client, entry })
    }

    /// Reverses (deletes) a ledger entry, undoing its balance effect.
    ///
    /// Reversal applies the exact inverse of the original append: a
    /// reversed WORK entry returns hours to the balance, a reversed
    /// REFILL retracts them. Status never blocks a reversal.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry or its client is missing, the
    /// caller does not own the client, or a query fails.
    pub async fn reverse_entry(
        &self,
        caller: OwnerId,
        entry_id: EntryId,
    ) -> Result<Reversed, LedgerError> {
        let txn = self.db.begin().await?;

        // Postgres refuses FOR UPDATE on the outer side of a join, so the
        // entry is fetched with its client first and the client row is
        // then re-read under lock.
        let (entry, client) = work_log_entries::Entity::find_by_id(entry_id.into_inner())
            .find_also_related(clients::Entity)
            .one(&txn)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry_id.into_inner()))?;
        let client = client.ok_or(LedgerError::ClientNotFound(entry.client_id))?;

        let client = lock_client(&txn, client.id).await?;
        if !is_owner(caller, &client) {
            return Err(LedgerError::Unauthorized(client.id));
        }

        let kind: EntryKind = entry.entry_type.clone().into();

        // A concurrent reversal may have removed the entry between the
        // unlocked read and acquiring the client lock; bail out instead
        // of retracting the hours a second time.
        let deleted = work_log_entries::Entity::delete_by_id(entry.id)
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(LedgerError::EntryNotFound(entry.id));
        }

        apply_delta(&txn, client.id, reverse_effect(kind, entry.hours)).await?;

        let client = reload_client(&txn, client.id).await?;
        txn.commit().await?;

        info!(client_id = %client.id, entry_id = %entry.id, ?kind, "reversed entry");
        self.notifier.publish(LedgerEvent::new(
            client.slug.clone(),
            LedgerEventType::DeleteLog,
            json!({ "entry_id": entry.id, "remaining_hours": client.remaining_balance() }),
        ));

        Ok(Reversed { client, entry })
    }
}

/// Fetches a client row under `FOR UPDATE` inside the transaction.
async fn lock_client(
    txn: &DatabaseTransaction,
    client_id: Uuid,
) -> Result<clients::Model, LedgerError> {
    clients::Entity::find_by_id(client_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(LedgerError::ClientNotFound(client_id))
}

/// Re-reads the client inside the transaction after its accumulators
/// were adjusted store-side.
async fn reload_client(
    txn: &DatabaseTransaction,
    client_id: Uuid,
) -> Result<clients::Model, LedgerError> {
    clients::Entity::find_by_id(client_id)
        .one(txn)
        .await?
        .ok_or(LedgerError::ClientNotFound(client_id))
}

/// Applies a relative accumulator adjustment as a single store-side
/// `column = column + delta` update.
///
/// The adjustment is never computed read-modify-write in application
/// memory, so concurrent transactions compose additively.
async fn apply_delta(
    txn: &DatabaseTransaction,
    client_id: Uuid,
    delta: BalanceDelta,
) -> Result<(), DbErr> {
    let column = match delta.accumulator {
        Accumulator::TotalHours => clients::Column::TotalHours,
        Accumulator::HoursLogged => clients::Column::HoursLogged,
    };

    clients::Entity::update_many()
        .col_expr(column, Expr::col(column).add(delta.delta))
        .filter(clients::Column::Id.eq(client_id))
        .exec(txn)
        .await?;

    Ok(())
}
