//! Human-readable and JSON projections of inventories, plans and run summaries.

pub mod format;
pub mod health;
pub mod json;
pub mod text;

pub use health::{
    Finding, FindingLevel, StorageRow, UsageSeverity, assess_health, efficiency_score, storage_rows,
};
pub use json::{DocumentKind, read_document, write_document};
