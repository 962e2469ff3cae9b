//!
//! Column Metadata Sequences
//!
//! One record per result column of a prepared statement, describing where
//! the column comes from and how its source column is declared. Opening
//! steps the statement once; a statement without result columns yields an
//! empty sequence.
//!

use quarry_std_core::{Item, Record};
use tracing::trace;

use crate::engine::{ColumnOrigin, Statement};
use crate::error::Result;

pub const KEY_NAME: &str = "name";
pub const KEY_DATABASE: &str = "database";
pub const KEY_TABLE: &str = "table";
pub const KEY_TYPE: &str = "type";
pub const KEY_COLLATION: &str = "collation";
pub const KEY_NULLABLE: &str = "nullable";
pub const KEY_PRIMARY_KEY: &str = "primary key";
pub const KEY_AUTOINCREMENT: &str = "autoincrement";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataState {
    Unopened,
    Column(usize),
    Exhausted,
}

pub struct MetadataSequence<'s> {
    statement: &'s mut Statement,
    state: MetadataState,
}

impl<'s> MetadataSequence<'s> {
    pub(crate) fn new(statement: &'s mut Statement) -> Self {
        Self {
            statement,
            state: MetadataState::Unopened,
        }
    }

    pub fn state(&self) -> MetadataState {
        self.state
    }

    pub fn open(&mut self) -> Result<()> {
        if self.state != MetadataState::Unopened {
            return Ok(());
        }
        if let Err(e) = self.statement.step() {
            self.close();
            return Err(e);
        }
        let columns = self.statement.column_count();
        trace!(columns, "metadata cursor opened");
        self.state = if columns == 0 {
            MetadataState::Exhausted
        } else {
            MetadataState::Column(0)
        };
        Ok(())
    }

    pub fn next_record(&mut self) -> Result<Option<Record>> {
        self.open()?;
        let MetadataState::Column(index) = self.state else {
            return Ok(None);
        };
        let origin = match self.statement.column_origin(index) {
            Ok(origin) => origin,
            Err(e) => {
                self.close();
                return Err(e);
            }
        };
        self.state = if index + 1 >= self.statement.column_count() {
            MetadataState::Exhausted
        } else {
            MetadataState::Column(index + 1)
        };
        Ok(Some(origin_record(origin)))
    }

    /// Reset the statement and end the sequence. Idempotent.
    pub fn close(&mut self) {
        self.statement.reset();
        self.state = MetadataState::Exhausted;
    }
}

fn origin_record(origin: ColumnOrigin) -> Record {
    let mut record = Record::new();
    record.insert(KEY_NAME.to_string(), Item::String(origin.name));
    record.insert(KEY_DATABASE.to_string(), Item::String(origin.database));
    record.insert(KEY_TABLE.to_string(), Item::String(origin.table));
    record.insert(KEY_TYPE.to_string(), Item::String(origin.declared_type));
    record.insert(KEY_COLLATION.to_string(), Item::String(origin.collation));
    record.insert(KEY_NULLABLE.to_string(), Item::Boolean(!origin.not_null));
    record.insert(KEY_PRIMARY_KEY.to_string(), Item::Boolean(origin.primary_key));
    record.insert(KEY_AUTOINCREMENT.to_string(), Item::Boolean(origin.autoincrement));
    record
}

impl Iterator for MetadataSequence<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl Drop for MetadataSequence<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(all(test, feature = "column-metadata"))]
mod tests {
    use super::*;
    use crate::prepare::compile;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE people(
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL COLLATE NOCASE,
                 age INT
             );
             INSERT INTO people(name, age) VALUES ('ann', 30);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_one_record_per_column() {
        let conn = setup();
        let mut stmt = compile(&conn, "SELECT id, name, age FROM people").unwrap();
        let records: Vec<Record> = MetadataSequence::new(&mut stmt)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 3);

        let id = &records[0];
        assert_eq!(id.len(), 8);
        assert_eq!(id[KEY_NAME], Item::from("id"));
        assert_eq!(id[KEY_DATABASE], Item::from("main"));
        assert_eq!(id[KEY_TABLE], Item::from("people"));
        assert_eq!(id[KEY_TYPE], Item::from("INTEGER"));
        assert_eq!(id[KEY_PRIMARY_KEY], Item::Boolean(true));
        assert_eq!(id[KEY_AUTOINCREMENT], Item::Boolean(true));

        let name = &records[1];
        assert_eq!(name[KEY_COLLATION], Item::from("NOCASE"));
        assert_eq!(name[KEY_NULLABLE], Item::Boolean(false));
        assert_eq!(name[KEY_PRIMARY_KEY], Item::Boolean(false));

        assert_eq!(records[2][KEY_NULLABLE], Item::Boolean(true));
        assert_eq!(records[2][KEY_COLLATION], Item::from("BINARY"));
    }

    #[test]
    fn test_aliased_column_reports_origin_name() {
        let conn = setup();
        let mut stmt = compile(&conn, "SELECT age AS years FROM people").unwrap();
        let record = MetadataSequence::new(&mut stmt).next_record().unwrap().unwrap();
        assert_eq!(record[KEY_NAME], Item::from("age"));
    }

    #[test]
    fn test_dml_has_no_metadata() {
        let conn = setup();
        let mut stmt = compile(&conn, "DELETE FROM people WHERE id = 99").unwrap();
        let mut seq = MetadataSequence::new(&mut stmt);
        assert!(seq.next_record().unwrap().is_none());
        assert_eq!(seq.state(), MetadataState::Exhausted);
    }

    #[test]
    fn test_expression_column_fails_with_engine_message() {
        let conn = setup();
        let mut stmt = compile(&conn, "SELECT 1 + 1 AS two").unwrap();
        let mut seq = MetadataSequence::new(&mut stmt);
        let err = seq.next().unwrap().unwrap_err();
        assert_eq!(err.code(), "INTERNAL-SQLITE-PROBLEM");
        assert!(seq.next().is_none());
    }

    #[test]
    fn test_statement_reusable_after_metadata() {
        let conn = setup();
        let mut stmt = compile(&conn, "SELECT name FROM people").unwrap();
        assert_eq!(MetadataSequence::new(&mut stmt).count(), 1);
        let rows: Vec<Record> = crate::rows::RowSequence::new(crate::rows::StatementSlot::Prepared(&mut stmt))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows[0]["name"], Item::from("ann"));
    }
}
