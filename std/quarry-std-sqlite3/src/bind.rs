//!
//! Parameter Binding
//!
//! Binds one typed scalar to a 1-based placeholder position. Each `Param`
//! variant has its own binder; booleans bind as integers 0/1. Rebinding a
//! position overwrites the previous value, and a failed bind leaves every
//! other position untouched.
//!

use std::ffi::c_int;

use quarry_std_core::Item;
use rusqlite::ffi;

use crate::engine::Statement;
use crate::error::{Result, SqliteError};

/// Value that can be bound to a placeholder
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl TryFrom<&Item> for Param {
    type Error = SqliteError;

    fn try_from(item: &Item) -> Result<Self> {
        match item {
            Item::Boolean(b) => Ok(Param::Boolean(*b)),
            Item::Integer(i) => Ok(Param::Integer(*i)),
            Item::Double(d) => Ok(Param::Float(*d)),
            Item::String(s) => Ok(Param::Text(s.clone())),
            Item::Null => Ok(Param::Null),
            other => Err(SqliteError::InvalidValue(format!(
                "{} cannot be bound to a placeholder",
                other.kind()
            ))),
        }
    }
}

pub fn bind(statement: &mut Statement, position: i64, param: &Param) -> Result<()> {
    let Ok(index) = c_int::try_from(position) else {
        return Err(SqliteError::InvalidPlaceholderPosition { position });
    };
    let rc = match param {
        Param::Boolean(b) => bind_boolean(statement, index, *b),
        Param::Integer(i) => bind_integer(statement, index, *i),
        Param::Float(f) => bind_float(statement, index, *f),
        Param::Text(s) => bind_text(statement, index, s),
        Param::Null => bind_null(statement, index),
    };
    match rc {
        ffi::SQLITE_OK => Ok(()),
        ffi::SQLITE_RANGE => Err(SqliteError::InvalidPlaceholderPosition { position }),
        _ => Err(statement.last_error()),
    }
}

fn bind_boolean(statement: &mut Statement, index: c_int, value: bool) -> c_int {
    statement.bind_int64(index, i64::from(value))
}

fn bind_integer(statement: &mut Statement, index: c_int, value: i64) -> c_int {
    statement.bind_int64(index, value)
}

fn bind_float(statement: &mut Statement, index: c_int, value: f64) -> c_int {
    statement.bind_double(index, value)
}

fn bind_text(statement: &mut Statement, index: c_int, value: &str) -> c_int {
    statement.bind_text(index, value)
}

fn bind_null(statement: &mut Statement, index: c_int) -> c_int {
    statement.bind_null(index)
}

/// Reset every placeholder to NULL
pub fn clear(statement: &mut Statement) {
    statement.clear_bindings();
}
