//!
//! Connection Registry
//!
//! Owns every open connection handed out to the host. A token present here
//! always refers to an open connection; closing removes the token for good.
//!

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::{debug, warn};

use super::{CascadeClose, CascadeScope, Token};
use crate::error::{Result, SqliteError};
use crate::options::ConnectOptions;

/// Location sentinel for a private, transient in-memory database
pub const MEMORY_LOCATION: &str = "";

struct ConnectionEntry {
    conn: Connection,
    location: String,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<Token, ConnectionEntry>,
}

fn native_path(location: &str) -> &str {
    if location == MEMORY_LOCATION {
        ":memory:"
    } else {
        location
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `location` (or a fresh in-memory database for `MEMORY_LOCATION`)
    pub fn open(&mut self, location: &str, options: &ConnectOptions) -> Result<Token> {
        let path = native_path(location);
        // rusqlite closes the native handle itself when the open fails
        let conn = Connection::open_with_flags(path, options.open_flags()).map_err(|e| {
            debug!(location = path, flags = %options.describe(), error = %e, "open failed");
            SqliteError::from(e)
        })?;

        let token = Token::generate();
        debug!(connection = %token, location = path, flags = %options.describe(), "connection opened");
        self.connections.insert(
            token.clone(),
            ConnectionEntry {
                conn,
                location: location.to_string(),
            },
        );
        Ok(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.connections.contains_key(token)
    }

    pub fn get(&self, token: &str) -> Result<&Connection> {
        self.connections
            .get(token)
            .map(|entry| &entry.conn)
            .ok_or_else(SqliteError::invalid_connection)
    }

    /// Stored token for `token`, used to tag statements with their owner
    pub fn token(&self, token: &str) -> Result<Token> {
        self.connections
            .get_key_value(token)
            .map(|(key, _)| key.clone())
            .ok_or_else(SqliteError::invalid_connection)
    }

    /// Close one connection after `cascade` finalized its dependents.
    /// Returns the closed token.
    pub fn close(&mut self, token: &str, cascade: &mut dyn CascadeClose) -> Result<Token> {
        let (key, entry) = self
            .connections
            .remove_entry(token)
            .ok_or_else(SqliteError::invalid_connection)?;

        let finalized = cascade.cascade_close(CascadeScope::Connection(key.as_str()));
        match entry.conn.close() {
            Ok(()) => {
                debug!(connection = %key, location = native_path(&entry.location), finalized, "connection closed");
                Ok(key)
            }
            Err((conn, e)) => {
                warn!(connection = %key, error = %e, "connection close failed");
                self.connections.insert(
                    key,
                    ConnectionEntry {
                        conn,
                        location: entry.location,
                    },
                );
                Err(e.into())
            }
        }
    }

    /// Close everything; used at session teardown
    pub fn close_all(&mut self, cascade: &mut dyn CascadeClose) -> usize {
        let finalized = cascade.cascade_close(CascadeScope::All);
        let mut closed = 0;
        for (token, entry) in self.connections.drain() {
            match entry.conn.close() {
                Ok(()) => closed += 1,
                Err((conn, e)) => {
                    warn!(connection = %token, error = %e, "connection close failed during teardown");
                    // rusqlite panics when dropping a connection that fails to close
                    std::mem::forget(conn);
                }
            }
        }
        if closed > 0 || finalized > 0 {
            debug!(closed, finalized, "connections closed");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
