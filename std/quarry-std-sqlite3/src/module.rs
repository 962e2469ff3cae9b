//!
//! SQLite Module Dispatch
//!
//! Maps host function names onto `Session` operations. Tokens travel as
//! strings, record sequences are returned lazily and keep the session
//! borrowed until the host drops them.
//!

use quarry_std_core::{
    CallResult, ExternalModule, Item, ModuleError, check_arity, integer_arg, item_arg,
    optional_arg, string_arg,
};

use crate::MODULE_URI;
use crate::bind::Param;
use crate::config::SqliteConfig;
use crate::error::SqliteError;
use crate::session::Session;

const FUNCTIONS: &[&str] = &[
    "connect",
    "is-connected",
    "disconnect",
    "close",
    "commit",
    "rollback",
    "execute",
    "execute-query",
    "execute-update",
    "prepare-statement",
    "set-value",
    "set-boolean",
    "set-numeric",
    "set-string",
    "set-null",
    "clear-params",
    "close-prepared",
    "execute-query-prepared",
    "execute-prepared",
    "execute-update-prepared",
    "metadata",
];

#[derive(Clone, Debug, Default)]
pub struct SqliteModule {
    config: SqliteConfig,
}

impl SqliteModule {
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }
}

impl ExternalModule for SqliteModule {
    type State = Session;

    fn uri(&self) -> &'static str {
        MODULE_URI
    }

    fn functions(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn new_state(&self) -> Session {
        Session::new(self.config.clone())
    }

    fn call<'s>(
        &self,
        session: &'s mut Session,
        name: &str,
        args: &[Item],
    ) -> Result<CallResult<'s>, ModuleError> {
        match name {
            "connect" => {
                check_arity(name, args, 1, 2)?;
                let location = string_arg(name, args, 0)?;
                let options = match optional_arg(args, 1) {
                    None => None,
                    Some(Item::Object(record)) => Some(record),
                    Some(other) => {
                        return Err(ModuleError::invalid_argument(
                            name,
                            format!("options must be an object, got {}", other.kind()),
                        ));
                    }
                };
                let token = session.connect(location, options)?;
                Ok(CallResult::Item(Item::String(token.into())))
            }
            "is-connected" => {
                check_arity(name, args, 1, 1)?;
                let token = string_arg(name, args, 0)?;
                Ok(CallResult::Item(Item::Boolean(session.is_connected(token))))
            }
            "disconnect" | "close" => {
                check_arity(name, args, 1, 1)?;
                let token = session.disconnect(string_arg(name, args, 0)?)?;
                Ok(CallResult::Item(Item::String(token.into())))
            }
            "commit" | "rollback" => {
                check_arity(name, args, 1, 1)?;
                let token = string_arg(name, args, 0)?;
                let token = if name == "commit" {
                    session.commit(token)?
                } else {
                    session.rollback(token)?
                };
                Ok(CallResult::Item(Item::String(token.into())))
            }
            "execute" | "execute-query" => {
                check_arity(name, args, 2, 2)?;
                let token = string_arg(name, args, 0)?;
                let sql = string_arg(name, args, 1)?;
                let rows = session.execute_query(token, sql)?;
                Ok(CallResult::Records(Box::new(
                    rows.map(|r| r.map_err(ModuleError::from)),
                )))
            }
            "execute-update" => {
                check_arity(name, args, 2, 2)?;
                let token = string_arg(name, args, 0)?;
                let sql = string_arg(name, args, 1)?;
                let affected = session.execute_update(token, sql)?;
                Ok(CallResult::Item(Item::Integer(affected)))
            }
            "prepare-statement" => {
                check_arity(name, args, 2, 2)?;
                let token = string_arg(name, args, 0)?;
                let sql = string_arg(name, args, 1)?;
                let statement = session.prepare_statement(token, sql)?;
                Ok(CallResult::Item(Item::String(statement.into())))
            }
            "set-value" | "set-boolean" | "set-numeric" | "set-string" | "set-null" => {
                let param = if name == "set-null" {
                    check_arity(name, args, 2, 2)?;
                    Param::Null
                } else {
                    check_arity(name, args, 3, 3)?;
                    param_for(name, item_arg(name, args, 2)?)?
                };
                let token = string_arg(name, args, 0)?;
                let position = integer_arg(name, args, 1)?;
                session.bind(token, position, &param)?;
                Ok(CallResult::Empty)
            }
            "clear-params" => {
                check_arity(name, args, 1, 1)?;
                session.clear_params(string_arg(name, args, 0)?)?;
                Ok(CallResult::Empty)
            }
            "close-prepared" => {
                check_arity(name, args, 1, 1)?;
                session.close_prepared(string_arg(name, args, 0)?)?;
                Ok(CallResult::Empty)
            }
            "execute-query-prepared" | "execute-prepared" => {
                check_arity(name, args, 1, 1)?;
                let rows = session.execute_query_prepared(string_arg(name, args, 0)?)?;
                Ok(CallResult::Records(Box::new(
                    rows.map(|r| r.map_err(ModuleError::from)),
                )))
            }
            "execute-update-prepared" => {
                check_arity(name, args, 1, 1)?;
                let affected = session.execute_update_prepared(string_arg(name, args, 0)?)?;
                Ok(CallResult::Item(Item::Integer(affected)))
            }
            "metadata" => {
                check_arity(name, args, 1, 1)?;
                let columns = session.metadata(string_arg(name, args, 0)?)?;
                Ok(CallResult::Records(Box::new(
                    columns.map(|r| r.map_err(ModuleError::from)),
                )))
            }
            _ => Err(ModuleError::unknown_function(MODULE_URI, name)),
        }
    }
}

/// Parameter for a typed setter; `set-value` accepts any bindable kind
fn param_for(function: &str, value: &Item) -> Result<Param, SqliteError> {
    let accepted = match (function, value) {
        ("set-value", _) => true,
        ("set-boolean", Item::Boolean(_)) => true,
        ("set-numeric", Item::Integer(_) | Item::Double(_)) => true,
        ("set-string", Item::String(_)) => true,
        _ => false,
    };
    if !accepted {
        return Err(SqliteError::InvalidValue(format!(
            "{} does not accept {}",
            function,
            value.kind()
        )));
    }
    Param::try_from(value)
}
