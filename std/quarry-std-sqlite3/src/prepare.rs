//!
//! Statement Preparation
//!
//! Compiles SQL text against a registered connection. The compiled statement
//! is left unexecuted; its column count (zero for DML) decides later whether
//! execution yields rows or an affected-row count.
//!

use std::ffi::{c_char, c_int};
use std::ptr::{self, NonNull};

use rusqlite::{Connection, ffi};
use tracing::debug;

use crate::engine::Statement;
use crate::error::{Result, SqliteError, errmsg};
use crate::registry::ConnectionRegistry;

/// Compile `sql` on the connection registered under `token`
pub(crate) fn prepare(connections: &ConnectionRegistry, token: &str, sql: &str) -> Result<Statement> {
    let conn = connections.get(token)?;
    let statement = compile(conn, sql)?;
    debug!(
        connection = token,
        columns = statement.column_count(),
        parameters = statement.parameter_count(),
        "statement prepared"
    );
    Ok(statement)
}

/// Compile `sql` on `conn`. Only the first statement of `sql` is compiled.
///
/// The returned statement must be dropped before `conn` is closed; the
/// registries guarantee this for everything they own.
pub(crate) fn compile(conn: &Connection, sql: &str) -> Result<Statement> {
    let Ok(len) = c_int::try_from(sql.len()) else {
        return Err(SqliteError::InvalidSqlStatement("statement is too long".to_string()));
    };
    let db = unsafe { conn.handle() };
    let mut raw: *mut ffi::sqlite3_stmt = ptr::null_mut();
    let mut tail: *const c_char = ptr::null();

    let rc = unsafe {
        ffi::sqlite3_prepare_v2(db, sql.as_ptr() as *const c_char, len, &mut raw, &mut tail)
    };
    if rc != ffi::SQLITE_OK {
        let err = if rc == ffi::SQLITE_ERROR {
            SqliteError::InvalidSqlStatement(unsafe { errmsg(db) })
        } else {
            unsafe { SqliteError::from_handle(db) }
        };
        if !raw.is_null() {
            unsafe { ffi::sqlite3_finalize(raw) };
        }
        return Err(err);
    }

    let (Some(raw), Some(db)) = (NonNull::new(raw), NonNull::new(db)) else {
        return Err(SqliteError::InvalidSqlStatement("statement is empty".to_string()));
    };
    Ok(unsafe { Statement::from_raw(raw, db) })
}
