//! `SeaORM` entity definitions.

pub mod clients;
pub mod sea_orm_active_enums;
pub mod work_log_entries;
