//! V003: reliability snapshots per competency and per Big Five trait.
//! `alpha_if_deleted` and `contributing_competencies` are JSON columns.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS competency_reliability (
    competency_id TEXT PRIMARY KEY,
    cronbach_alpha REAL,
    sample_size INTEGER NOT NULL DEFAULT 0,
    item_count INTEGER NOT NULL DEFAULT 0,
    reliability_status TEXT NOT NULL DEFAULT 'insufficient_data',
    alpha_if_deleted TEXT,
    last_calculated_at INTEGER NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS trait_reliability (
    trait_name TEXT PRIMARY KEY,
    cronbach_alpha REAL,
    sample_size INTEGER NOT NULL DEFAULT 0,
    total_items INTEGER NOT NULL DEFAULT 0,
    reliability_status TEXT NOT NULL DEFAULT 'insufficient_data',
    alpha_if_deleted TEXT,
    contributing_competencies TEXT,
    last_calculated_at INTEGER NOT NULL
) STRICT;
"#;
