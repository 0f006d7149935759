//! `SeaORM` active enums mapping the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client lifecycle status (`client_status` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "client_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    /// Work may be logged.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Suspended; refills still allowed.
    #[sea_orm(string_value = "PAUSED")]
    Paused,
    /// Retired; kept for history.
    #[sea_orm(string_value = "ARCHIVED")]
    Archived,
}

/// Work log entry kind (`work_log_type` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "work_log_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkLogType {
    /// Hours consumed by logged work.
    #[sea_orm(string_value = "WORK")]
    Work,
    /// Hours purchased in a top-up.
    #[sea_orm(string_value = "REFILL")]
    Refill,
}

impl From<retainer_core::retainer::ClientStatus> for ClientStatus {
    fn from(status: retainer_core::retainer::ClientStatus) -> Self {
        match status {
            retainer_core::retainer::ClientStatus::Active => Self::Active,
            retainer_core::retainer::ClientStatus::Paused => Self::Paused,
            retainer_core::retainer::ClientStatus::Archived => Self::Archived,
        }
    }
}

impl From<ClientStatus> for retainer_core::retainer::ClientStatus {
    fn from(status: ClientStatus) -> Self {
        match status {
            ClientStatus::Active => Self::Active,
            ClientStatus::Paused => Self::Paused,
            ClientStatus::Archived => Self::Archived,
        }
    }
}

impl From<retainer_core::retainer::EntryKind> for WorkLogType {
    fn from(kind: retainer_core::retainer::EntryKind) -> Self {
        match kind {
            retainer_core::retainer::EntryKind::Work => Self::Work,
            retainer_core::retainer::EntryKind::Refill => Self::Refill,
        }
    }
}

impl From<WorkLogType> for retainer_core::retainer::EntryKind {
    fn from(kind: WorkLogType) -> Self {
        match kind {
            WorkLogType::Work => Self::Work,
            WorkLogType::Refill => Self::Refill,
        }
    }
}
