//! V001: item_statistics — one row per assessment item.
//! The `version` column backs the optimistic-concurrency write path.

pub const MIGRATION_SQL: &str = r#"
-- Per-item statistics record. Metrics are NULL until the item clears the
-- 50-response gate. Rows are never deleted; retired items keep their
-- history.
CREATE TABLE IF NOT EXISTS item_statistics (
    item_id TEXT PRIMARY KEY,
    competency_id TEXT NOT NULL,
    response_count INTEGER NOT NULL DEFAULT 0,
    difficulty_index REAL,
    discrimination_index REAL,
    previous_discrimination_index REAL,
    distractor_efficiency TEXT,
    validity_status TEXT NOT NULL DEFAULT 'probation',
    difficulty_flag TEXT NOT NULL DEFAULT 'none',
    discrimination_flag TEXT NOT NULL DEFAULT 'none',
    irt_discrimination REAL,
    irt_difficulty REAL,
    irt_guessing REAL,
    last_calculated_at INTEGER,
    version INTEGER NOT NULL DEFAULT 0,
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE INDEX IF NOT EXISTS idx_item_statistics_competency
    ON item_statistics(competency_id);
CREATE INDEX IF NOT EXISTS idx_item_statistics_status
    ON item_statistics(validity_status);
"#;
