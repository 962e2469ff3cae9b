//!
//! Native Statement Handle
//!
//! `Statement` owns one compiled `sqlite3_stmt` and remembers the connection
//! it was compiled on. Dropping it finalizes the native statement.
//!
//! A statement must never outlive its connection. The registries uphold
//! this: closing a connection finalizes every statement that belongs to it
//! first, and one-shot statements are only reachable through a sequence that
//! borrows the session.
//!

use std::ffi::{CStr, c_char, c_int};
use std::fmt;
use std::ptr::NonNull;

use quarry_std_core::Item;
use rusqlite::ffi;

use crate::error::{Result, SqliteError};

/// Outcome of a successful cursor step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Row,
    Done,
}

/// Origin and schema attributes of one result column
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnOrigin {
    pub name: String,
    pub database: String,
    pub table: String,
    pub declared_type: String,
    pub collation: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
}

pub struct Statement {
    raw: NonNull<ffi::sqlite3_stmt>,
    db: NonNull<ffi::sqlite3>,
}

// The statement is only touched through `&mut` borrows handed out by the
// owning registry, which lives behind the session.
unsafe impl Send for Statement {}

impl Statement {
    /// Take ownership of a freshly compiled statement.
    ///
    /// # Safety
    /// `raw` must be a valid statement compiled on `db`, and `db` must stay
    /// open until the returned value is dropped.
    pub(crate) unsafe fn from_raw(
        raw: NonNull<ffi::sqlite3_stmt>,
        db: NonNull<ffi::sqlite3>,
    ) -> Self {
        Self { raw, db }
    }

    fn raw(&self) -> *mut ffi::sqlite3_stmt {
        self.raw.as_ptr()
    }

    pub(crate) fn db(&self) -> *mut ffi::sqlite3 {
        self.db.as_ptr()
    }

    /// Number of result columns; zero for statements that return no rows.
    /// Read live: a schema change recompiles the statement on its next step.
    pub fn column_count(&self) -> usize {
        unsafe { ffi::sqlite3_column_count(self.raw()) }.max(0) as usize
    }

    pub fn parameter_count(&self) -> usize {
        unsafe { ffi::sqlite3_bind_parameter_count(self.raw()) }.max(0) as usize
    }

    /// SQL text the statement was compiled from
    pub fn sql(&self) -> String {
        cstr_to_string(unsafe { ffi::sqlite3_sql(self.raw()) })
    }

    pub fn step(&mut self) -> Result<Step> {
        let rc = unsafe { ffi::sqlite3_step(self.raw()) };
        match rc {
            ffi::SQLITE_ROW => Ok(Step::Row),
            ffi::SQLITE_DONE => Ok(Step::Done),
            _ => Err(self.last_error()),
        }
    }

    /// Rewind the cursor; bindings are kept
    pub fn reset(&mut self) {
        // The return code repeats the last step error, which was already reported.
        unsafe { ffi::sqlite3_reset(self.raw()) };
    }

    pub fn clear_bindings(&mut self) {
        unsafe { ffi::sqlite3_clear_bindings(self.raw()) };
    }

    /// Rows changed by the most recent completed statement on the parent connection
    pub fn changes(&self) -> i64 {
        i64::from(unsafe { ffi::sqlite3_changes(self.db()) })
    }

    /// Rows changed since the parent connection was opened
    pub fn total_changes(&self) -> i64 {
        i64::from(unsafe { ffi::sqlite3_total_changes(self.db()) })
    }

    pub fn column_name(&self, index: usize) -> String {
        cstr_to_string(unsafe { ffi::sqlite3_column_name(self.raw(), index as c_int) })
    }

    pub fn column_names(&self) -> Vec<String> {
        (0..self.column_count()).map(|i| self.column_name(i)).collect()
    }

    /// Value of a column in the current row, converted by its dynamic type.
    /// Blobs and text are copied: the native buffer dies on the next step.
    pub fn column_item(&self, index: usize) -> Item {
        let stmt = self.raw();
        let col = index as c_int;
        unsafe {
            match ffi::sqlite3_column_type(stmt, col) {
                ffi::SQLITE_NULL => Item::Null,
                ffi::SQLITE_INTEGER => Item::Integer(ffi::sqlite3_column_int64(stmt, col)),
                ffi::SQLITE_FLOAT => Item::Double(ffi::sqlite3_column_double(stmt, col)),
                ffi::SQLITE_BLOB => {
                    let ptr = ffi::sqlite3_column_blob(stmt, col) as *const u8;
                    let len = ffi::sqlite3_column_bytes(stmt, col);
                    Item::Binary(copy_bytes(ptr, len))
                }
                _ => {
                    let ptr = ffi::sqlite3_column_text(stmt, col);
                    let len = ffi::sqlite3_column_bytes(stmt, col);
                    Item::String(String::from_utf8_lossy(&copy_bytes(ptr, len)).into_owned())
                }
            }
        }
    }

    pub(crate) fn bind_int64(&mut self, position: c_int, value: i64) -> c_int {
        unsafe { ffi::sqlite3_bind_int64(self.raw(), position, value) }
    }

    pub(crate) fn bind_double(&mut self, position: c_int, value: f64) -> c_int {
        unsafe { ffi::sqlite3_bind_double(self.raw(), position, value) }
    }

    pub(crate) fn bind_text(&mut self, position: c_int, value: &str) -> c_int {
        let Ok(len) = c_int::try_from(value.len()) else {
            return ffi::SQLITE_TOOBIG;
        };
        unsafe {
            ffi::sqlite3_bind_text(
                self.raw(),
                position,
                value.as_ptr() as *const c_char,
                len,
                ffi::SQLITE_TRANSIENT(),
            )
        }
    }

    pub(crate) fn bind_null(&mut self, position: c_int) -> c_int {
        unsafe { ffi::sqlite3_bind_null(self.raw(), position) }
    }

    pub(crate) fn last_error(&self) -> SqliteError {
        unsafe { SqliteError::from_handle(self.db()) }
    }

    /// Resolve where a result column comes from and its schema attributes.
    /// Failures carry the engine message as is.
    #[cfg(feature = "column-metadata")]
    pub fn column_origin(&self, index: usize) -> Result<ColumnOrigin> {
        let stmt = self.raw();
        let col = index as c_int;
        let db_name = unsafe { ffi::sqlite3_column_database_name(stmt, col) };
        let table_name = unsafe { ffi::sqlite3_column_table_name(stmt, col) };
        let origin_name = unsafe { ffi::sqlite3_column_origin_name(stmt, col) };
        // Expressions and literals have no origin; the lookup below must not see a null table.
        if table_name.is_null() || origin_name.is_null() {
            return Err(SqliteError::Engine {
                code: ffi::SQLITE_ERROR,
                message: format!("no such table column: {}", self.column_name(index)),
            });
        }

        let mut declared_type: *const c_char = std::ptr::null();
        let mut collation: *const c_char = std::ptr::null();
        let mut not_null: c_int = 0;
        let mut primary_key: c_int = 0;
        let mut autoincrement: c_int = 0;
        let rc = unsafe {
            ffi::sqlite3_table_column_metadata(
                self.db(),
                db_name,
                table_name,
                origin_name,
                &mut declared_type,
                &mut collation,
                &mut not_null,
                &mut primary_key,
                &mut autoincrement,
            )
        };
        if rc != ffi::SQLITE_OK {
            return Err(SqliteError::Engine {
                code: rc,
                message: unsafe { crate::error::errmsg(self.db()) },
            });
        }

        Ok(ColumnOrigin {
            name: cstr_to_string(origin_name),
            database: cstr_to_string(db_name),
            table: cstr_to_string(table_name),
            declared_type: cstr_to_string(declared_type),
            collation: cstr_to_string(collation),
            not_null: not_null != 0,
            primary_key: primary_key != 0,
            autoincrement: autoincrement != 0,
        })
    }

    #[cfg(not(feature = "column-metadata"))]
    pub fn column_origin(&self, _index: usize) -> Result<ColumnOrigin> {
        Err(SqliteError::MetadataUnavailable)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql())
            .field("columns", &self.column_count())
            .field("parameters", &self.parameter_count())
            .finish()
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        unsafe { ffi::sqlite3_finalize(self.raw()) };
    }
}

fn cstr_to_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// # Safety
/// `ptr` must be null or point to `len` readable bytes.
unsafe fn copy_bytes(ptr: *const u8, len: c_int) -> Vec<u8> {
    if ptr.is_null() || len <= 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len as usize) }.to_vec()
}
