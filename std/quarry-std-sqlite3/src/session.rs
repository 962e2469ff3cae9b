//!
//! SQLite Session
//!
//! A session owns the two registries of one host session and is the only
//! way to reach them. Every module call receives the session explicitly;
//! dropping it finalizes all statements and closes all connections.
//!
//! Row and metadata sequences borrow the session mutably, so while a
//! sequence is alive no connection can be closed underneath it.
//!

use quarry_std_core::Record;
use tracing::debug;

use crate::bind::{self, Param};
use crate::config::SqliteConfig;
use crate::error::{Result, SqliteError};
use crate::metadata::MetadataSequence;
use crate::options::ConnectOptions;
use crate::prepare::prepare;
use crate::registry::{ConnectionRegistry, MEMORY_LOCATION, StatementRegistry, Token};
use crate::rows::{RowSequence, StatementSlot};

#[derive(Default)]
pub struct Session {
    config: SqliteConfig,
    connections: ConnectionRegistry,
    statements: StatementRegistry,
}

impl Session {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            connections: ConnectionRegistry::new(),
            statements: StatementRegistry::new(),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// Open a connection. `options` keys are validated before anything is opened.
    pub fn connect(&mut self, location: &str, options: Option<&Record>) -> Result<Token> {
        let options = match options {
            Some(record) => ConnectOptions::from_record(record)?,
            None => ConnectOptions::default(),
        };
        if !self.config.file_access && location != MEMORY_LOCATION {
            return Err(SqliteError::DiskAccessDisabled {
                location: location.to_string(),
            });
        }
        self.connections.open(location, &options)
    }

    pub fn is_connected(&self, token: &str) -> bool {
        self.connections.contains(token)
    }

    /// Close a connection and every statement prepared on it
    pub fn disconnect(&mut self, token: &str) -> Result<Token> {
        self.connections.close(token, &mut self.statements)
    }

    /// Validates the token; connections run in autocommit mode
    pub fn commit(&self, token: &str) -> Result<Token> {
        self.connections.token(token)
    }

    /// Validates the token; connections run in autocommit mode
    pub fn rollback(&self, token: &str) -> Result<Token> {
        self.connections.token(token)
    }

    pub fn execute_query(&mut self, token: &str, sql: &str) -> Result<RowSequence<'_>> {
        let statement = prepare(&self.connections, token, sql)?;
        Ok(RowSequence::new(StatementSlot::OneShot(statement)))
    }

    pub fn execute_update(&mut self, token: &str, sql: &str) -> Result<i64> {
        self.execute_query(token, sql)?.affected_rows()
    }

    pub fn prepare_statement(&mut self, token: &str, sql: &str) -> Result<Token> {
        let owner = self.connections.token(token)?;
        let statement = prepare(&self.connections, token, sql)?;
        Ok(self.statements.store(statement, owner))
    }

    pub fn bind(&mut self, token: &str, position: i64, param: &Param) -> Result<()> {
        bind::bind(self.statements.get_mut(token)?, position, param)
    }

    pub fn clear_params(&mut self, token: &str) -> Result<()> {
        bind::clear(self.statements.get_mut(token)?);
        Ok(())
    }

    pub fn close_prepared(&mut self, token: &str) -> Result<()> {
        self.statements.close(token)
    }

    pub fn execute_query_prepared(&mut self, token: &str) -> Result<RowSequence<'_>> {
        let statement = self.statements.get_mut(token)?;
        Ok(RowSequence::new(StatementSlot::Prepared(statement)))
    }

    pub fn execute_update_prepared(&mut self, token: &str) -> Result<i64> {
        self.execute_query_prepared(token)?.affected_rows()
    }

    /// Column metadata of a prepared statement
    pub fn metadata(&mut self, token: &str) -> Result<MetadataSequence<'_>> {
        if !self.config.metadata_available() {
            return Err(SqliteError::MetadataUnavailable);
        }
        let statement = self.statements.get_mut(token)?;
        Ok(MetadataSequence::new(statement))
    }

    /// Finalize every statement and close every connection
    pub fn close_all(&mut self) -> usize {
        self.connections.close_all(&mut self.statements)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let closed = self.close_all();
        if closed > 0 {
            debug!(closed, "session torn down");
        }
    }
}
