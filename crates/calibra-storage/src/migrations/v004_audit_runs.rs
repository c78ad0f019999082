//! V004: audit_runs — append-only log of audit job executions.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS audit_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    items_recalculated INTEGER,
    items_failed INTEGER,
    items_skipped INTEGER,
    competencies_recalculated INTEGER,
    traits_recalculated INTEGER,
    status_changes INTEGER,
    calibrated INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'running',
    error TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_audit_runs_time
    ON audit_runs(started_at DESC);
"#;
