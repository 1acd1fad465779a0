// crates/safenet-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Record Store
// Description: Schema setup, request-scoped sessions, and row inserts.
// Purpose: Append quiz results and contact messages to one SQLite file.
// Dependencies: rusqlite, serde, thiserror, time, tracing
// ============================================================================

//! ## Overview
//! [`SqliteRecordStore`] is a cheap, cloneable handle over a validated
//! [`SqliteStoreConfig`]. It never holds a connection itself. Callers acquire
//! a [`RecordSession`] per request; the session opens its connection on first
//! use, reuses it for every operation in that request, and closes it when
//! dropped, on success and error paths alike.
//!
//! Every insert is a single autocommitted statement, so a row is durable
//! before the insert returns. Schema creation relies on
//! `CREATE TABLE IF NOT EXISTS` under an immediate transaction and adds no
//! locking of its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;
use tracing::warn;

use crate::records::NewContactMessage;
use crate::records::NewQuizResult;
use crate::records::RecordId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Table definitions for both record kinds.
const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS quiz_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        score INTEGER,
        max_score INTEGER,
        details TEXT,
        created_at TIMESTAMP NOT NULL
    );
    CREATE TABLE IF NOT EXISTS contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        email TEXT,
        message TEXT,
        created_at TIMESTAMP NOT NULL
    );";

/// Insert statement for quiz results.
const INSERT_QUIZ_RESULT_SQL: &str = "INSERT INTO quiz_results (name, score, max_score, details, \
                                      created_at) VALUES (?1, ?2, ?3, ?4, ?5)";

/// Insert statement for contact messages.
const INSERT_CONTACT_SQL: &str =
    "INSERT INTO contacts (name, email, message, created_at) VALUES (?1, ?2, ?3, ?4)";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (rollback journal).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` record store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding submitted field values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Invalid store configuration.
    #[error("sqlite store invalid config: {0}")]
    Invalid(String),
    /// System clock could not produce a UTC timestamp.
    #[error("sqlite store clock error: {0}")]
    Clock(String),
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Handle over the SafeNet database file.
///
/// # Invariants
/// - The configured path has passed [`validate_store_path`].
/// - No connection is held between sessions.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    /// Validated store configuration shared with every session.
    config: Arc<SqliteStoreConfig>,
}

impl SqliteRecordStore {
    /// Validates the store path and prepares its parent directory.
    ///
    /// The database file itself is created by the first connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is unusable.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Returns the database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Acquires a request-scoped session. No connection is opened yet.
    #[must_use]
    pub fn session(&self) -> RecordSession {
        RecordSession {
            config: Arc::clone(&self.config),
            connection: None,
        }
    }

    /// Runs `scope` with a fresh session and releases it afterwards.
    ///
    /// The session is dropped on every exit path, including errors returned
    /// by `scope` and unwinding panics, which closes its connection.
    ///
    /// # Errors
    ///
    /// Returns whatever error `scope` returns.
    pub fn with_session<T, E, F>(&self, scope: F) -> Result<T, E>
    where
        F: FnOnce(&mut RecordSession) -> Result<T, E>,
    {
        let mut session = self.session();
        scope(&mut session)
    }

    /// Creates both tables if they do not exist, using a short-lived session.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the file cannot be opened or written.
    pub fn ensure_schema(&self) -> Result<(), SqliteStoreError> {
        self.with_session(RecordSession::ensure_schema)
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// One request's view of the store.
///
/// # Invariants
/// - At most one connection is opened per session.
/// - The connection is closed when the session is dropped.
pub struct RecordSession {
    /// Store configuration used to open the connection.
    config: Arc<SqliteStoreConfig>,
    /// Lazily opened connection.
    connection: Option<Connection>,
}

impl RecordSession {
    /// Returns true once the session has opened its connection.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Creates both tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the schema statements fail.
    pub fn ensure_schema(&mut self) -> Result<(), SqliteStoreError> {
        let connection = self.connection()?;
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.execute_batch(SCHEMA_SQL).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
    }

    /// Appends a quiz result stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails.
    pub fn insert_quiz_result(
        &mut self,
        record: &NewQuizResult,
    ) -> Result<RecordId, SqliteStoreError> {
        let created_at = utc_timestamp()?;
        let connection = self.connection()?;
        connection
            .execute(
                INSERT_QUIZ_RESULT_SQL,
                params![record.name, record.score, record.max_score, record.details, created_at],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let id = RecordId::from_raw(connection.last_insert_rowid());
        debug!(table = "quiz_results", %id, "record inserted");
        Ok(id)
    }

    /// Appends a contact message stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails.
    pub fn insert_contact_message(
        &mut self,
        record: &NewContactMessage,
    ) -> Result<RecordId, SqliteStoreError> {
        let created_at = utc_timestamp()?;
        let connection = self.connection()?;
        connection
            .execute(
                INSERT_CONTACT_SQL,
                params![record.name, record.email, record.message, created_at],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let id = RecordId::from_raw(connection.last_insert_rowid());
        debug!(table = "contacts", %id, "record inserted");
        Ok(id)
    }

    /// Returns the session connection, opening it on first use.
    fn connection(&mut self) -> Result<&mut Connection, SqliteStoreError> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => {
                let connection = open_connection(&self.config)?;
                debug!(path = %self.config.path.display(), "sqlite session opened");
                connection
            }
        };
        Ok(self.connection.insert(connection))
    }
}

impl Drop for RecordSession {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        match connection.close() {
            Ok(()) => debug!(path = %self.config.path.display(), "sqlite session closed"),
            Err((_, err)) => {
                warn!(path = %self.config.path.display(), error = %err, "sqlite session close failed");
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas. The busy timeout goes first so the journal mode
/// switch waits on concurrent openers instead of failing.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current UTC time as RFC 3339 text.
fn utc_timestamp() -> Result<String, SqliteStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| SqliteStoreError::Clock(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
