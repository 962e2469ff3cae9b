//!
//! Script Runner
//!
//! One call per line:
//!
//!   {"call": "<function>", "args": [...], "bind": "<name>"}
//!
//! `args` and `bind` are optional. A string argument `"$name"` is replaced
//! by the result bound to `name` by an earlier line. Blank lines and lines
//! starting with `#` are skipped.
//!

use std::collections::HashMap;

use quarry_std_core::{CallResult, Item, ModuleContext, ModuleError};
use quarry_std_sqlite3::SqliteModule;
use serde::Deserialize;
use serde_json::{Value as Json, json};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: invalid call: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Line {line}: no value bound to '${name}'")]
    Unbound { line: usize, name: String },

    #[error(transparent)]
    Config(#[from] quarry_std_sqlite3::ConfigError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Call {
    call: String,
    #[serde(default)]
    args: Vec<Json>,
    #[serde(default)]
    bind: Option<String>,
}

/// Result of one script line
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Skipped,
    Value(Json),
    Failed(Json),
}

pub struct Runner {
    context: ModuleContext<SqliteModule>,
    bindings: HashMap<String, Item>,
}

impl Runner {
    pub fn new(module: SqliteModule) -> Self {
        Self {
            context: ModuleContext::new(module),
            bindings: HashMap::new(),
        }
    }

    pub fn run_line(&mut self, number: usize, line: &str) -> Result<Outcome, ShellError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Outcome::Skipped);
        }
        let call: Call = serde_json::from_str(line).map_err(|source| ShellError::Parse {
            line: number,
            source,
        })?;
        let args = call
            .args
            .iter()
            .map(|arg| self.substitute(number, Item::from(arg)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(line = number, function = %call.call, args = args.len(), "dispatching");
        let result = self
            .context
            .call(&call.call, &args)
            .and_then(collect_result);
        match result {
            Ok(item) => {
                let output = item.to_json();
                if let Some(name) = call.bind {
                    info!(line = number, name = %name, "bound result");
                    self.bindings.insert(name, item);
                }
                Ok(Outcome::Value(output))
            }
            Err(e) => Ok(Outcome::Failed(error_json(&e))),
        }
    }

    fn substitute(&self, line: usize, item: Item) -> Result<Item, ShellError> {
        match item {
            Item::String(s) if s.starts_with('$') => {
                let name = &s[1..];
                self.bindings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ShellError::Unbound {
                        line,
                        name: name.to_string(),
                    })
            }
            Item::Array(items) => Ok(Item::Array(
                items
                    .into_iter()
                    .map(|i| self.substitute(line, i))
                    .collect::<Result<_, _>>()?,
            )),
            Item::Object(record) => Ok(Item::Object(
                record
                    .into_iter()
                    .map(|(k, v)| Ok((k, self.substitute(line, v)?)))
                    .collect::<Result<_, ShellError>>()?,
            )),
            other => Ok(other),
        }
    }
}

/// Drain a call result into one item; record streams become an array of objects
fn collect_result(result: CallResult<'_>) -> Result<Item, ModuleError> {
    match result {
        CallResult::Empty => Ok(Item::Null),
        CallResult::Item(item) => Ok(item),
        records => records.into_items().map(Item::Array),
    }
}

fn error_json(e: &ModuleError) -> Json {
    json!({
        "error": {
            "code": e.qualified_code(),
            "message": e.message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(runner: &mut Runner, line: &str) -> Outcome {
        runner.run_line(1, line).unwrap()
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let mut runner = Runner::new(SqliteModule::default());
        assert_eq!(run(&mut runner, ""), Outcome::Skipped);
        assert_eq!(run(&mut runner, "   # a comment"), Outcome::Skipped);
    }

    #[test]
    fn test_bind_and_substitute() {
        let mut runner = Runner::new(SqliteModule::default());
        let Outcome::Value(token) = run(&mut runner, r#"{"call": "connect", "args": [""], "bind": "db"}"#) else {
            panic!("connect failed");
        };
        assert!(token.is_string());

        run(&mut runner, r#"{"call": "execute-update", "args": ["$db", "CREATE TABLE t(x INT, y TEXT)"]}"#);
        let inserted = run(
            &mut runner,
            r#"{"call": "execute-update", "args": ["$db", "INSERT INTO t VALUES (1, 'a')"]}"#,
        );
        assert_eq!(inserted, Outcome::Value(json!(1)));

        let rows = run(&mut runner, r#"{"call": "execute-query", "args": ["$db", "SELECT x, y FROM t"]}"#);
        assert_eq!(rows, Outcome::Value(json!([{"x": 1, "y": "a"}])));
    }

    #[test]
    fn test_module_errors_are_reported_not_raised() {
        let mut runner = Runner::new(SqliteModule::default());
        let outcome = run(&mut runner, r#"{"call": "disconnect", "args": ["nope"]}"#);
        let Outcome::Failed(error) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(
            error["error"]["code"],
            json!("urn:quarry:modules:sqlite#INVALID-HANDLE")
        );
    }

    #[test]
    fn test_unbound_variable() {
        let mut runner = Runner::new(SqliteModule::default());
        let err = runner
            .run_line(3, r#"{"call": "is-connected", "args": ["$missing"]}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Line 3: no value bound to '$missing'");
    }

    #[test]
    fn test_malformed_line() {
        let mut runner = Runner::new(SqliteModule::default());
        let err = runner.run_line(7, r#"{"cal": "connect"}"#).unwrap_err();
        assert!(matches!(err, ShellError::Parse { line: 7, .. }));
    }
}
