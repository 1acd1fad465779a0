// crates/safenet-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Record Store
// Description: Append-only SQLite storage for SafeNet form submissions.
// Purpose: Persist quiz results and contact messages in one local file.
// Dependencies: rusqlite, serde, thiserror, time, tracing
// ============================================================================

//! ## Overview
//! This crate owns the single SafeNet database file. It defines the
//! `quiz_results` and `contacts` tables, creates them idempotently, and
//! appends rows through request-scoped [`RecordSession`] values that open
//! their connection lazily and close it when dropped. Stored rows are never
//! updated, deleted, or read back by the server.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod records;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use records::DEFAULT_NAME;
pub use records::NewContactMessage;
pub use records::NewQuizResult;
pub use records::RecordId;
pub use store::RecordSession;
pub use store::SqliteRecordStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
