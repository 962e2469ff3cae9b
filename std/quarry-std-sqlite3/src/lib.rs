//!
//! quarry SQLite Module
//!
//! Exposes SQLite connections and prepared statements to the host through
//! opaque string tokens. Native handles never leave this crate.
//!
//! Architecture:
//! - `Session` owns a `ConnectionRegistry` and a `StatementRegistry`, both
//!   keyed by v4 UUID tokens. One session per host session; nothing global.
//! - Closing a connection cascades: every statement prepared on it is
//!   finalized first, so a statement never outlives its connection.
//! - Query results are lazy `RowSequence`s that step the native cursor one
//!   row ahead. A statement without result columns yields a single
//!   `{"Affected Rows": n}` record.
//! - Errors are `SqliteError` values with stable codes, converted into the
//!   host's `ModuleError` under `MODULE_URI`.
//!
//! Functions (see `SqliteModule`):
//! - Connection: connect, is-connected, disconnect (close), commit, rollback
//! - One-shot: execute-query (execute), execute-update
//! - Prepared: prepare-statement, set-value, set-boolean, set-numeric,
//!   set-string, set-null, clear-params, close-prepared,
//!   execute-query-prepared (execute-prepared), execute-update-prepared
//! - Introspection: metadata
//!

pub mod bind;
pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod module;
pub mod options;
pub mod prepare;
pub mod registry;
pub mod rows;
pub mod session;

pub use bind::Param;
pub use config::{ConfigError, SqliteConfig};
pub use error::{HandleKind, Result, SqliteError};
pub use metadata::{MetadataSequence, MetadataState};
pub use module::SqliteModule;
pub use options::ConnectOptions;
pub use registry::{ConnectionRegistry, MEMORY_LOCATION, StatementRegistry, Token};
pub use rows::{AFFECTED_ROWS, RowSequence, RowState};
pub use session::Session;

/// Namespace of every error this module raises
pub const MODULE_URI: &str = "urn:quarry:modules:sqlite";
