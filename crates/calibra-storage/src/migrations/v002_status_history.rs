//! V002: status_history — append-only audit trail of validity
//! transitions. No update or delete path exists in the query layer.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS status_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id TEXT NOT NULL,
    from_status TEXT NOT NULL,
    to_status TEXT NOT NULL,
    changed_at INTEGER NOT NULL,
    reason TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_status_history_item
    ON status_history(item_id, changed_at);
"#;
