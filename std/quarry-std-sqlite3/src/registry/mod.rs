//!
//! Handle Registries
//!
//! Two registries map opaque tokens to live engine resources:
//! - `ConnectionRegistry`: token → open connection
//! - `StatementRegistry`: token → compiled statement (+ owning connection token)
//!
//! Tokens are fresh v4 UUIDs, so a closed token is never handed out again.
//! Closing a connection goes through `CascadeClose`, which the statement
//! registry implements: dependent statements are finalized before the
//! native close runs.
//!

mod connections;
mod statements;

use std::borrow::Borrow;
use std::fmt;

use uuid::Uuid;

pub use connections::{ConnectionRegistry, MEMORY_LOCATION};
pub use statements::StatementRegistry;

/// Opaque handle given to the host in place of a native resource
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Which statements a cascade finalizes
#[derive(Clone, Copy, Debug)]
pub enum CascadeScope<'a> {
    Connection(&'a str),
    All,
}

impl CascadeScope<'_> {
    pub fn matches(&self, connection: &str) -> bool {
        match self {
            CascadeScope::Connection(token) => *token == connection,
            CascadeScope::All => true,
        }
    }
}

/// Finalizes resources that depend on a connection about to close
pub trait CascadeClose {
    /// Returns how many resources were finalized; zero matches is not an error
    fn cascade_close(&mut self, scope: CascadeScope<'_>) -> usize;
}
