//! Core domain logic for the student roster.
//! This crate is the single source of truth for roster invariants: record
//! shape, persistence, search and the aggregation reports.

pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, init_logging_with_echo, logging_status};
pub use model::student::{
    coerce_number, Student, StudentFields, StudentId, StudentValidationError, Subject,
};
pub use model::RosterDocument;
pub use report::aggregation::{
    average_of, decorate, rank_list, roster_summary, subject_averages, top, RankedStudent,
    RosterSummary, SubjectAverage, TOP_N_DEFAULT,
};
pub use repo::document_store::{
    open_store, DocumentStore, MemoryDocumentStore, ReadFailurePolicy, StoreError, StoreKind,
    StoreResult,
};
pub use repo::json_store::JsonFileStore;
pub use repo::sqlite_store::SqliteDocumentStore;
pub use search::filter::{search, StudentQuery};
pub use service::roster_service::{RosterError, RosterResult, RosterService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
