//! SQLite driver for the session store, backed by rusqlite.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use tracing::trace;

use crate::connection::{Connection, DriverError, Statement, Value};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Integer(v) => v.to_sql(),
            Value::Text(v) => v.to_sql(),
        }
    }
}

/// Map a rusqlite error onto the driver failure model.
///
/// Errors reported by the SQLite engine itself carry queryable error info
/// and become [`DriverError::Failed`]. Everything else (binding, column type
/// conversion, misuse) is raised by the rusqlite layer and is kept intact as
/// an exception.
fn map_error(err: rusqlite::Error) -> DriverError {
    match err {
        rusqlite::Error::SqliteFailure(_, _) => DriverError::failed(err.to_string()),
        other => DriverError::exception(other),
    }
}

/// A prepared rusqlite statement with the current scalar result buffered.
struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
    current: Option<Vec<u8>>,
}

impl Statement for SqliteStatement<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<usize, DriverError> {
        self.current = None;
        let params = rusqlite::params_from_iter(params.iter());

        if self.stmt.column_count() == 0 {
            let affected = self.stmt.execute(params).map_err(map_error)?;
            trace!(affected, "Statement executed");
            return Ok(affected);
        }

        let column = self.stmt.column_name(0).map_err(map_error)?.to_string();
        let mut rows = self.stmt.query(params).map_err(map_error)?;
        let first = match rows.next().map_err(map_error)? {
            Some(row) => match row.get_ref(0).map_err(map_error)? {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(bytes.to_vec()),
                other => {
                    return Err(DriverError::exception(rusqlite::Error::InvalidColumnType(
                        0,
                        column,
                        other.data_type(),
                    )));
                }
            },
            None => None,
        };
        drop(rows);

        let produced = usize::from(first.is_some());
        self.current = first;
        Ok(produced)
    }

    fn fetch_scalar(&mut self) -> Result<Option<Vec<u8>>, DriverError> {
        Ok(self.current.take())
    }
}

impl Connection for rusqlite::Connection {
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError> {
        let stmt = rusqlite::Connection::prepare(self, sql).map_err(map_error)?;
        Ok(Box::new(SqliteStatement {
            stmt,
            current: None,
        }))
    }
}
