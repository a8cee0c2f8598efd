//! Initial database migration.
//!
//! Creates the shop, cash register, movement and export tables with their
//! enums, constraints and indexes.

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
        // PART 2: SHOPS & ASSIGNMENTS
        // ============================================================
        db.execute_unprepared(SHOPS_SQL).await?;

        // ============================================================
        // PART 3: REGISTERS & MOVEMENTS
        // ============================================================
        db.execute_unprepared(CASH_REGISTERS_SQL).await?;
        db.execute_unprepared(CASH_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 4: EXPORT CACHE
        // ============================================================
        db.execute_unprepared(EXPORTS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE cash_register_status AS ENUM ('OPEN', 'CLOSED');

CREATE TYPE closing_type AS ENUM ('MANUAL', 'AUTOMATIC');

CREATE TYPE cash_movement_type AS ENUM (
    'OPENING',
    'SALE',
    'INCOME',
    'DEPOSIT',
    'PURCHASE',
    'RETURN',
    'EXPENSE',
    'WITHDRAWAL',
    'ADJUSTMENT'
);

CREATE TYPE movement_origin_kind AS ENUM ('SALE', 'PURCHASE', 'RETURN', 'INCOME', 'EXPENSE');

CREATE TYPE export_format AS ENUM ('PDF', 'EXCEL');
";

const SHOPS_SQL: &str = r"
CREATE TABLE shops (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL,
    owner_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'CLP',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_shops_owner ON shops(project_id, owner_id);

-- Employee assignments
CREATE TABLE shop_employees (
    shop_id UUID NOT NULL REFERENCES shops(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (shop_id, user_id)
);

CREATE INDEX idx_shop_employees_user ON shop_employees(user_id);
";

const CASH_REGISTERS_SQL: &str = r"
CREATE TABLE cash_registers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    shop_id UUID NOT NULL REFERENCES shops(id) ON DELETE RESTRICT,
    employee_id UUID NOT NULL,
    status cash_register_status NOT NULL DEFAULT 'OPEN',
    opening_amount NUMERIC(19, 4) NOT NULL,
    closing_amount NUMERIC(19, 4),
    actual_amount NUMERIC(19, 4),
    difference NUMERIC(19, 4),
    opened_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    opened_by UUID NOT NULL,
    opened_by_name VARCHAR(255),
    closed_at TIMESTAMPTZ,
    closed_by UUID,
    closing_notes TEXT,
    closing_type closing_type,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_opening_non_negative CHECK (opening_amount >= 0),
    CONSTRAINT chk_actual_non_negative CHECK (actual_amount IS NULL OR actual_amount >= 0),
    CONSTRAINT chk_closed_complete CHECK (
        status = 'OPEN'
        OR (closed_at IS NOT NULL
            AND closing_amount IS NOT NULL
            AND actual_amount IS NOT NULL
            AND difference IS NOT NULL)
    )
);

-- At most one open register per shop
CREATE UNIQUE INDEX uq_cash_registers_open_shop ON cash_registers(shop_id) WHERE status = 'OPEN';

-- History listing
CREATE INDEX idx_cash_registers_shop_opened ON cash_registers(shop_id, opened_at DESC);

-- Report windows
CREATE INDEX idx_cash_registers_closed ON cash_registers(shop_id, closed_at DESC) WHERE status = 'CLOSED';
";

const CASH_MOVEMENTS_SQL: &str = r"
CREATE TABLE cash_movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cash_register_id UUID NOT NULL REFERENCES cash_registers(id) ON DELETE CASCADE,
    shop_id UUID NOT NULL REFERENCES shops(id) ON DELETE RESTRICT,
    movement_type cash_movement_type NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    user_id UUID NOT NULL,
    origin_kind movement_origin_kind,
    origin_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
    CONSTRAINT chk_amount_non_negative CHECK (amount >= 0),
    CONSTRAINT chk_origin_pair CHECK ((origin_kind IS NULL) = (origin_id IS NULL))
);

CREATE INDEX idx_cash_movements_register ON cash_movements(cash_register_id, created_at, id);
";

const EXPORTS_SQL: &str = r"
CREATE TABLE cash_register_exports (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cash_register_id UUID NOT NULL REFERENCES cash_registers(id) ON DELETE CASCADE,
    format export_format NOT NULL,
    url TEXT NOT NULL,
    content_type VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    expires_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_expires_after_created CHECK (expires_at > created_at)
);

-- Cache lookup
CREATE INDEX idx_exports_pair ON cash_register_exports(cash_register_id, format, created_at DESC);

-- Purge sweep
CREATE INDEX idx_exports_expires ON cash_register_exports(expires_at);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_shops_updated_at
    BEFORE UPDATE ON shops
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_cash_registers_updated_at
    BEFORE UPDATE ON cash_registers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

-- Closed registers are immutable
CREATE OR REPLACE FUNCTION reject_closed_register_update()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'CLOSED' THEN
        RAISE EXCEPTION 'cash register % is closed', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_cash_registers_closed_immutable
    BEFORE UPDATE ON cash_registers
    FOR EACH ROW EXECUTE FUNCTION reject_closed_register_update();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS cash_register_exports CASCADE;
DROP TABLE IF EXISTS cash_movements CASCADE;
DROP TABLE IF EXISTS cash_registers CASCADE;
DROP TABLE IF EXISTS shop_employees CASCADE;
DROP TABLE IF EXISTS shops CASCADE;

DROP FUNCTION IF EXISTS reject_closed_register_update() CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;

DROP TYPE IF EXISTS export_format;
DROP TYPE IF EXISTS movement_origin_kind;
DROP TYPE IF EXISTS cash_movement_type;
DROP TYPE IF EXISTS closing_type;
DROP TYPE IF EXISTS cash_register_status;
";
