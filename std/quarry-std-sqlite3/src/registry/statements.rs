//!
//! Statement Registry
//!
//! Owns every prepared statement handed out to the host, together with the
//! token of the connection it was compiled on. Removing an entry finalizes
//! the native statement.
//!

use std::collections::HashMap;

use tracing::debug;

use super::{CascadeClose, CascadeScope, Token};
use crate::engine::Statement;
use crate::error::{Result, SqliteError};

struct StatementEntry {
    statement: Statement,
    connection: Token,
}

#[derive(Default)]
pub struct StatementRegistry {
    statements: HashMap<Token, StatementEntry>,
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compiled statement; `connection` is the token it was prepared on
    pub fn store(&mut self, statement: Statement, connection: Token) -> Token {
        let token = Token::generate();
        debug!(statement = %token, connection = %connection, "statement registered");
        self.statements.insert(
            token.clone(),
            StatementEntry {
                statement,
                connection,
            },
        );
        token
    }

    pub fn contains(&self, token: &str) -> bool {
        self.statements.contains_key(token)
    }

    pub fn get(&self, token: &str) -> Result<&Statement> {
        self.statements
            .get(token)
            .map(|entry| &entry.statement)
            .ok_or_else(SqliteError::invalid_statement)
    }

    pub fn get_mut(&mut self, token: &str) -> Result<&mut Statement> {
        self.statements
            .get_mut(token)
            .map(|entry| &mut entry.statement)
            .ok_or_else(SqliteError::invalid_statement)
    }

    /// Token of the connection the statement belongs to
    pub fn connection_of(&self, token: &str) -> Option<&Token> {
        self.statements.get(token).map(|entry| &entry.connection)
    }

    pub fn close(&mut self, token: &str) -> Result<()> {
        match self.statements.remove(token) {
            Some(entry) => {
                debug!(statement = token, connection = %entry.connection, "statement finalized");
                Ok(())
            }
            None => Err(SqliteError::invalid_statement()),
        }
    }

    /// Finalize every statement and empty the registry
    pub fn close_all(&mut self) -> usize {
        self.cascade_close(CascadeScope::All)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl CascadeClose for StatementRegistry {
    fn cascade_close(&mut self, scope: CascadeScope<'_>) -> usize {
        let before = self.statements.len();
        self.statements
            .retain(|_, entry| !scope.matches(entry.connection.as_str()));
        let finalized = before - self.statements.len();
        if finalized > 0 {
            debug!(finalized, scope = ?scope, "statements finalized by cascade");
        }
        finalized
    }
}
