//!
//! SQLite Module Errors
//!
//! Closed set of error kinds raised by the module. Each kind has a stable
//! code (the local name the host sees under the module namespace) and a
//! fixed message. Engine failures carry the native extended result code and
//! the native message verbatim.
//!

use std::ffi::CStr;

use quarry_std_core::ModuleError;
use rusqlite::ffi;
use thiserror::Error;

use crate::MODULE_URI;

pub type Result<T> = std::result::Result<T, SqliteError>;

/// Which registry a token was looked up in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleKind {
    Connection,
    Statement,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SqliteError {
    #[error("Database file does not exist or it is not possible to open it")]
    CantOpenDatabase,

    #[error("{}", invalid_handle_message(*kind))]
    InvalidHandle { kind: HandleKind },

    #[error("Statement passed is not a valid SQL statement; {0}")]
    InvalidSqlStatement(String),

    #[error("Parameter position passed is not valid: {position}")]
    InvalidPlaceholderPosition { position: i64 },

    #[error("Parameter passed is not a valid value: {0}")]
    InvalidValue(String),

    #[error("Unknown connection option - {0}")]
    UnknownOption(String),

    #[error("Metadata not found (SQLite built without column metadata support)")]
    MetadataUnavailable,

    #[error("Only in-memory databases are allowed (file access is disabled): {location}")]
    DiskAccessDisabled { location: String },

    #[error("{message}")]
    Engine { code: i32, message: String },
}

fn invalid_handle_message(kind: HandleKind) -> &'static str {
    match kind {
        HandleKind::Connection => "Connection ID passed is not valid",
        HandleKind::Statement => "Prepared statement passed is not valid",
    }
}

impl SqliteError {
    pub fn invalid_connection() -> Self {
        SqliteError::InvalidHandle {
            kind: HandleKind::Connection,
        }
    }

    pub fn invalid_statement() -> Self {
        SqliteError::InvalidHandle {
            kind: HandleKind::Statement,
        }
    }

    /// Local name of the error under the module namespace
    pub fn code(&self) -> &'static str {
        match self {
            SqliteError::CantOpenDatabase => "CANT-OPEN-DB",
            SqliteError::InvalidHandle { .. } => "INVALID-HANDLE",
            SqliteError::InvalidSqlStatement(_) => "INVALID-SQL-STATEMENT",
            SqliteError::InvalidPlaceholderPosition { .. } => "INVALID-PLACEHOLDER-POSITION",
            SqliteError::InvalidValue(_) => "INVALID-VALUE",
            SqliteError::UnknownOption(_) => "UNKNOWN-OPTION",
            SqliteError::MetadataUnavailable => "UNAVAILABLE-METADATA",
            SqliteError::DiskAccessDisabled { .. } => "COMPILED-WITHOUT-DISK-ACCESS",
            SqliteError::Engine { .. } => "INTERNAL-SQLITE-PROBLEM",
        }
    }

    /// Native extended result code, for engine errors
    pub fn native_code(&self) -> Option<i32> {
        match self {
            SqliteError::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Engine error built from the connection's most recent failure
    ///
    /// # Safety
    /// `db` must be a live connection handle.
    pub(crate) unsafe fn from_handle(db: *mut ffi::sqlite3) -> Self {
        SqliteError::Engine {
            code: unsafe { ffi::sqlite3_extended_errcode(db) },
            message: unsafe { errmsg(db) },
        }
    }
}

/// Native message of the connection's most recent failure
///
/// # Safety
/// `db` must be a live connection handle.
pub(crate) unsafe fn errmsg(db: *mut ffi::sqlite3) -> String {
    let ptr = unsafe { ffi::sqlite3_errmsg(db) };
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

impl From<rusqlite::Error> for SqliteError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::CannotOpen => {
                SqliteError::CantOpenDatabase
            }
            rusqlite::Error::SqliteFailure(err, msg) => SqliteError::Engine {
                code: err.extended_code,
                message: msg.unwrap_or_else(|| err.to_string()),
            },
            other => SqliteError::Engine {
                code: ffi::SQLITE_ERROR,
                message: other.to_string(),
            },
        }
    }
}

impl From<SqliteError> for ModuleError {
    fn from(e: SqliteError) -> Self {
        ModuleError::new(MODULE_URI, e.code(), e.to_string())
    }
}
