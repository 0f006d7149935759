//! `SeaORM` Entity for the work log entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::WorkLogType;

/// An append-mostly ledger row.
///
/// Rows are created by append, destroyed by reversal, never mutated in
/// place. `hours` is always a positive magnitude; the balance effect
/// sign comes from `entry_type` alone.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "work_log_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub entry_type: WorkLogType,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub hours: Decimal,
    pub description: String,
    /// When the work happened (caller-supplied, defaults to creation time).
    pub entry_date: DateTimeWithTimeZone,
    /// Server-assigned creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
