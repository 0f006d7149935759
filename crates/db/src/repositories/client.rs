//! Client repository: creation, metadata, listing, and snapshots.
//!
//! Balance-mutating ledger operations live in
//! [`crate::repositories::ledger`]; this repository never touches the
//! accumulators except to seed them at creation.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use retainer_core::retainer::{
    ChangeNotifier, ClientPatch, ClientStatus, LedgerEvent, LedgerEventType, NewClient,
    SLUG_RETRY_LIMIT, ValidationError, generate_slug, validate_hours, validate_name,
};
use retainer_shared::error::AppError;
use retainer_shared::types::{ClientId, OwnerId, PageRequest, PageResponse};

use crate::entities::{clients, work_log_entries};
use crate::repositories::guard::is_owner;

/// Number of recent entries returned with an admin snapshot.
const SNAPSHOT_ENTRY_LIMIT: u64 = 100;

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client not found (or not visible to the caller).
    #[error("Client not found: {0}")]
    NotFound(Uuid),

    /// No client has this public slug.
    #[error("Client not found: {0}")]
    SlugNotFound(String),

    /// Caller is not the owning account.
    #[error("Caller does not own client {0}")]
    Unauthorized(Uuid),

    /// Invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Slug generation kept colliding.
    #[error("Could not find a free slug after {attempts} attempts")]
    SlugConflict {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(_) | ClientError::SlugNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ClientError::Unauthorized(_) => Self::Unauthorized(err.to_string()),
            ClientError::Validation(_) => Self::Validation(err.to_string()),
            ClientError::SlugConflict { .. } => Self::Conflict(err.to_string()),
            ClientError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// Filter options for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Free-text match on name or email.
    pub search: Option<String>,
    /// Filter by lifecycle status.
    pub status: Option<ClientStatus>,
    /// Sort key.
    pub sort: ClientSort,
    /// Sort direction.
    pub order: SortOrder,
}

/// Sort key for client listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientSort {
    /// Sort by creation time.
    #[default]
    CreatedAt,
    /// Sort by display name.
    Name,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Descending (newest / z-a first).
    #[default]
    Desc,
    /// Ascending.
    Asc,
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Self::Asc,
            SortOrder::Desc => Self::Desc,
        }
    }
}

/// A client together with its most recent ledger entries.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    /// The client row.
    pub client: clients::Model,
    /// Ledger entries, newest first.
    pub entries: Vec<work_log_entries::Model>,
}

/// Client repository for CRUD and listing operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
    notifier: ChangeNotifier,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, notifier: ChangeNotifier) -> Self {
        Self { db, notifier }
    }

    /// Creates a new retainer client owned by `owner`.
    ///
    /// The slug is generated from the name plus a random suffix and
    /// retried on uniqueness collision up to `SLUG_RETRY_LIMIT` times;
    /// only after exhaustion does creation fail with a conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the slug retries are
    /// exhausted, or the insert fails.
    pub async fn create(
        &self,
        owner: OwnerId,
        input: NewClient,
    ) -> Result<clients::Model, ClientError> {
        validate_name(&input.name)?;
        validate_hours(input.initial_hours)?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let slug = generate_slug(&input.name);
            let now = Utc::now().into();

            let client = clients::ActiveModel {
                id: Set(ClientId::new().into_inner()),
                owner_id: Set(owner.into_inner()),
                slug: Set(slug.clone()),
                name: Set(input.name.clone()),
                email: Set(input.email.clone()),
                currency: Set(input.currency.clone()),
                hourly_rate: Set(input.hourly_rate),
                total_hours: Set(input.initial_hours),
                hours_logged: Set(rust_decimal::Decimal::ZERO),
                refill_link: Set(input.refill_link.clone()),
                status: Set(ClientStatus::Active.into()),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match client.insert(&self.db).await {
                Ok(created) => {
                    info!(client_id = %created.id, %slug, "created client");
                    return Ok(created);
                }
                Err(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
                        && attempts < SLUG_RETRY_LIMIT =>
                {
                    warn!(%slug, attempts, "slug collision, retrying");
                }
                Err(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    return Err(ClientError::SlugConflict { attempts });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Fetches a client owned by `owner`.
    ///
    /// Absent and not-owned collapse into `NotFound` so a read never
    /// reveals whether someone else's client id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing or the query fails.
    pub async fn find_owned(
        &self,
        owner: OwnerId,
        client_id: ClientId,
    ) -> Result<clients::Model, ClientError> {
        clients::Entity::find_by_id(client_id.into_inner())
            .filter(clients::Column::OwnerId.eq(owner.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(ClientError::NotFound(client_id.into_inner()))
    }

    /// Admin snapshot: the client plus its most recent entries.
    ///
    /// Read-only and untransacted; the result may be stale by the time
    /// it reaches the caller and must never gate a later write.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing or a query fails.
    pub async fn snapshot(
        &self,
        owner: OwnerId,
        client_id: ClientId,
    ) -> Result<ClientSnapshot, ClientError> {
        let client = self.find_owned(owner, client_id).await?;

        let entries = work_log_entries::Entity::find()
            .filter(work_log_entries::Column::ClientId.eq(client.id))
            .order_by(work_log_entries::Column::EntryDate, Order::Desc)
            .limit(SNAPSHOT_ENTRY_LIMIT)
            .all(&self.db)
            .await?;

        Ok(ClientSnapshot { client, entries })
    }

    /// Public snapshot by slug, backing the read-only client dashboard.
    ///
    /// Field redaction (hiding owner-only data) is the caller's job;
    /// this returns the full rows.
    ///
    /// # Errors
    ///
    /// Returns an error if no client has this slug or a query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<ClientSnapshot, ClientError> {
        let client = clients::Entity::find()
            .filter(clients::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| ClientError::SlugNotFound(slug.to_string()))?;

        let entries = work_log_entries::Entity::find()
            .filter(work_log_entries::Column::ClientId.eq(client.id))
            .order_by(work_log_entries::Column::EntryDate, Order::Desc)
            .all(&self.db)
            .await?;

        Ok(ClientSnapshot { client, entries })
    }

    /// Updates client metadata. Never touches balances or status.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing, the caller is not the
    /// owner, or the update fails.
    pub async fn update_details(
        &self,
        owner: OwnerId,
        client_id: ClientId,
        patch: ClientPatch,
    ) -> Result<clients::Model, ClientError> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }

        let txn = self.db.begin().await?;

        let client = clients::Entity::find_by_id(client_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ClientError::NotFound(client_id.into_inner()))?;

        if !is_owner(owner, &client) {
            return Err(ClientError::Unauthorized(client_id.into_inner()));
        }

        // An empty patch writes nothing and stays silent.
        if patch.is_empty() {
            return Ok(client);
        }

        let slug = client.slug.clone();
        let mut active: clients::ActiveModel = client.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(email) = patch.email {
            active.email = Set(Some(email));
        }
        if let Some(currency) = patch.currency {
            active.currency = Set(Some(currency));
        }
        if let Some(rate) = patch.hourly_rate {
            active.hourly_rate = Set(Some(rate));
        }
        if let Some(refill_link) = patch.refill_link {
            active.refill_link = Set(refill_link);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        self.notifier.publish(LedgerEvent::new(
            slug,
            LedgerEventType::DetailsUpdate,
            json!({ "client": updated }),
        ));

        Ok(updated)
    }

    /// Ownership-checked write of `status` alone.
    ///
    /// Transitions are unconstrained; the only downstream effect is that
    /// non-ACTIVE statuses block future work logging.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing, the caller is not the
    /// owner, or the update fails.
    pub async fn update_status(
        &self,
        owner: OwnerId,
        client_id: ClientId,
        status: ClientStatus,
    ) -> Result<clients::Model, ClientError> {
        let txn = self.db.begin().await?;

        let client = clients::Entity::find_by_id(client_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ClientError::NotFound(client_id.into_inner()))?;

        if !is_owner(owner, &client) {
            return Err(ClientError::Unauthorized(client_id.into_inner()));
        }

        let slug = client.slug.clone();
        let mut active: clients::ActiveModel = client.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        self.notifier.publish(LedgerEvent::new(
            slug,
            LedgerEventType::StatusUpdate,
            json!({ "status": status }),
        ));

        Ok(updated)
    }

    /// Deletes a client; the cascade removes its ledger entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing, the caller is not the
    /// owner, or the delete fails.
    pub async fn delete(&self, owner: OwnerId, client_id: ClientId) -> Result<(), ClientError> {
        let txn = self.db.begin().await?;

        let client = clients::Entity::find_by_id(client_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ClientError::NotFound(client_id.into_inner()))?;

        if !is_owner(owner, &client) {
            return Err(ClientError::Unauthorized(client_id.into_inner()));
        }

        let slug = client.slug.clone();

        clients::Entity::delete_by_id(client.id).exec(&txn).await?;
        txn.commit().await?;

        info!(client_id = %client_id, "deleted client");
        self.notifier.publish(LedgerEvent::new(
            slug,
            LedgerEventType::ProjectDeleted,
            json!({ "client_id": client_id }),
        ));

        Ok(())
    }

    /// Lists an owner's clients with filtering, sorting, and pagination.
    ///
    /// Reads only committed rows; not transactional.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list(
        &self,
        owner: OwnerId,
        filter: ClientFilter,
        page: PageRequest,
    ) -> Result<PageResponse<clients::Model>, ClientError> {
        let page = page.clamped();

        let mut query = clients::Entity::find()
            .filter(clients::Column::OwnerId.eq(owner.into_inner()));

        if let Some(status) = filter.status {
            let status: crate::entities::sea_orm_active_enums::ClientStatus = status.into();
            query = query.filter(clients::Column::Status.eq(status));
        }

        if let Some(search) = filter.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            let pattern = format!("%{search}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col((clients::Entity, clients::Column::Name)).ilike(pattern.as_str()))
                    .add(Expr::col((clients::Entity, clients::Column::Email)).ilike(pattern.as_str())),
            );
        }

        let column = match filter.sort {
            ClientSort::CreatedAt => clients::Column::CreatedAt,
            ClientSort::Name => clients::Column::Name,
        };
        let query = query.order_by(column, filter.order.into());

        let paginator = query.paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(u64::from(page.page - 1)).await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}
