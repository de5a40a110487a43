//! Database connection abstraction consumed by the session store.
//!
//! The store only needs two capabilities from a driver: prepare a
//! parameterized statement, then execute it with positional parameters and
//! (for the one query it issues) read a single scalar column back. Keeping
//! the surface this small lets any SQL driver back the store, and lets tests
//! inject failures at each step.

use std::fmt;

/// A positional parameter bound to a prepared statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Failure reported by a driver.
#[derive(Debug)]
pub enum DriverError {
    /// The driver reported a failure and exposes its error info as text.
    Failed { message: String },

    /// The driver layer raised its own error.
    Exception(Box<dyn std::error::Error + Send + Sync>),
}

impl DriverError {
    /// Build a reported failure from the driver's error info.
    pub fn failed(message: impl Into<String>) -> Self {
        DriverError::Failed {
            message: message.into(),
        }
    }

    /// Wrap an error raised by the driver layer.
    pub fn exception(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DriverError::Exception(Box::new(err))
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Failed { message } => f.write_str(message),
            DriverError::Exception(err) => write!(f, "driver exception: {err}"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Failed { .. } => None,
            DriverError::Exception(err) => Some(err.as_ref()),
        }
    }
}

/// A prepared statement.
pub trait Statement {
    /// Execute with positional parameters.
    ///
    /// Returns the number of rows affected, or for a query, the number of
    /// rows made available to [`Statement::fetch_scalar`].
    fn execute(&mut self, params: &[Value]) -> Result<usize, DriverError>;

    /// Raw bytes of the first column of the current result row, or `None`
    /// when there is no row. Text and blob values are both returned as-is;
    /// interpreting them is the caller's job.
    fn fetch_scalar(&mut self) -> Result<Option<Vec<u8>>, DriverError>;
}

/// A live database handle able to prepare statements.
pub trait Connection {
    /// Prepare a statement using `?` positional markers.
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError> {
        (**self).prepare(sql)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError> {
        (**self).prepare(sql)
    }
}

/// A handle with no database behind it.
///
/// Usable only when no data operation will run: `open` and `close` never
/// touch the connection, everything else fails at prepare time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConnection;

impl Connection for NullConnection {
    fn prepare(&self, _sql: &str) -> Result<Box<dyn Statement + '_>, DriverError> {
        Err(DriverError::failed("no database connection"))
    }
}
