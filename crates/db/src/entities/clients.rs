//! `SeaORM` Entity for the clients table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ClientStatus;

/// A retainer client row.
///
/// `total_hours` and `hours_logged` are the two balance accumulators;
/// the remaining balance is always derived as their difference and is
/// deliberately not a column.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Account that administers this client; immutable after creation.
    pub owner_id: Uuid,
    /// Public, URL-safe lookup key; unique and immutable.
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub email: Option<String>,
    pub currency: Option<String>,
    /// Informational only; never participates in balance math.
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub hourly_rate: Option<Decimal>,
    /// Cumulative contracted hours ever purchased.
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_hours: Decimal,
    /// Cumulative hours consumed by WORK entries.
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub hours_logged: Decimal,
    /// Where the client can purchase more hours.
    pub refill_link: Option<String>,
    pub status: ClientStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::work_log_entries::Entity")]
    WorkLogEntries,
}

impl Related<super::work_log_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkLogEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Derived remaining retainer balance.
    #[must_use]
    pub fn remaining_balance(&self) -> Decimal {
        retainer_core::retainer::remaining_balance(self.total_hours, self.hours_logged)
    }
}
