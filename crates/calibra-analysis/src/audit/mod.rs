//! Batch audit: periodic (and manually triggered) recalculation across
//! all items, competencies, and traits.

pub mod job;
pub mod summary;

pub use job::{override_status, recalculate_item, run_audit, AuditContext, ItemOutcome};
pub use summary::AuditSummary;
