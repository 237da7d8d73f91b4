//! v001: the append-only `audit_records` table.
//!
//! The unique `(entity_type, entity_id, version)` index is what makes
//! version assignment safe across connections; triggers reject any UPDATE
//! or DELETE of an existing record.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS audit_records (
    id           TEXT PRIMARY KEY,
    entity_type  TEXT NOT NULL,
    entity_id    TEXT NOT NULL,
    action       TEXT NOT NULL CHECK (action IN ('create', 'update', 'delete')),
    changes      TEXT NOT NULL DEFAULT '{}',
    version      INTEGER NOT NULL CHECK (version >= 1),
    actor_label  TEXT,
    actor_type   TEXT,
    actor_id     TEXT,
    comment      TEXT,
    created_at   TEXT NOT NULL,
    CHECK (actor_label IS NULL OR actor_type IS NULL),
    CHECK ((actor_type IS NULL) = (actor_id IS NULL))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_audit_entity_version
    ON audit_records(entity_type, entity_id, version);
CREATE INDEX IF NOT EXISTS idx_audit_created_at ON audit_records(created_at);
CREATE INDEX IF NOT EXISTS idx_audit_actor ON audit_records(actor_type, actor_id);

CREATE TRIGGER IF NOT EXISTS audit_records_no_update
BEFORE UPDATE ON audit_records
BEGIN
    SELECT RAISE(ABORT, 'audit records are append-only');
END;

CREATE TRIGGER IF NOT EXISTS audit_records_no_delete
BEFORE DELETE ON audit_records
BEGIN
    SELECT RAISE(ABORT, 'audit records are append-only');
END;
";
