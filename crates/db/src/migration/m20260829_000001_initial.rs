//! Initial database migration.
//!
//! Creates the enum types, the clients and work log entries tables,
//! their indexes and constraints, and the `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TABLES
        // ============================================================
        db.execute_unprepared(CLIENTS_SQL).await?;
        db.execute_unprepared(WORK_LOG_ENTRIES_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS
        // ============================================================
        db.execute_unprepared(UPDATED_AT_TRIGGER_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r"
            DROP TABLE IF EXISTS work_log_entries;
            DROP TABLE IF EXISTS clients;
            DROP FUNCTION IF EXISTS set_updated_at();
            DROP TYPE IF EXISTS work_log_type;
            DROP TYPE IF EXISTS client_status;
            ",
        )
        .await?;

        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE client_status AS ENUM ('ACTIVE', 'PAUSED', 'ARCHIVED');
CREATE TYPE work_log_type AS ENUM ('WORK', 'REFILL');
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    slug VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    currency CHAR(3),
    hourly_rate NUMERIC(12, 2),
    total_hours NUMERIC(12, 2) NOT NULL DEFAULT 0,
    hours_logged NUMERIC(12, 2) NOT NULL DEFAULT 0,
    refill_link TEXT,
    status client_status NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_clients_slug UNIQUE (slug),
    CONSTRAINT ck_clients_total_hours_non_negative CHECK (total_hours >= 0)
);

CREATE INDEX idx_clients_owner ON clients (owner_id);
CREATE INDEX idx_clients_owner_created ON clients (owner_id, created_at DESC);
";

const WORK_LOG_ENTRIES_SQL: &str = r"
CREATE TABLE work_log_entries (
    id UUID PRIMARY KEY,
    client_id UUID NOT NULL REFERENCES clients (id) ON DELETE CASCADE,
    entry_type work_log_type NOT NULL,
    hours NUMERIC(12, 2) NOT NULL,
    description TEXT NOT NULL,
    entry_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT ck_work_log_entries_hours_positive CHECK (hours > 0)
);

CREATE INDEX idx_work_log_entries_client_date
    ON work_log_entries (client_id, entry_date DESC);
";

const UPDATED_AT_TRIGGER_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER clients_set_updated_at
    BEFORE UPDATE ON clients
    FOR EACH ROW
    EXECUTE FUNCTION set_updated_at();
";
