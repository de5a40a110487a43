//! Scriptable connection for exercising driver failure paths.

use std::cell::RefCell;

use crate::connection::{Connection, DriverError, Statement, Value};

/// A failure the mock should produce.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    /// Reported failure with this error info.
    Report(&'static str),
    /// Raised driver error with this message.
    Raise(&'static str),
}

impl Fault {
    fn to_driver_error(self) -> DriverError {
        match self {
            Fault::Report(message) => DriverError::failed(message),
            Fault::Raise(message) => DriverError::exception(std::io::Error::other(message)),
        }
    }
}

/// Records every statement and fails those matching a scripted prefix.
#[derive(Debug, Default)]
pub(crate) struct MockConnection {
    prepared: RefCell<Vec<String>>,
    executed: RefCell<Vec<(String, Vec<Value>)>>,
    prepare_faults: Vec<(&'static str, Fault)>,
    execute_faults: Vec<(&'static str, Fault)>,
    row: Option<Vec<u8>>,
}

impl MockConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail preparing any statement starting with `prefix`.
    pub(crate) fn fail_prepare(mut self, prefix: &'static str, fault: Fault) -> Self {
        self.prepare_faults.push((prefix, fault));
        self
    }

    /// Fail executing any statement starting with `prefix`.
    pub(crate) fn fail_execute(mut self, prefix: &'static str, fault: Fault) -> Self {
        self.execute_faults.push((prefix, fault));
        self
    }

    /// Value every SELECT returns.
    pub(crate) fn with_row(mut self, stored: impl Into<Vec<u8>>) -> Self {
        self.row = Some(stored.into());
        self
    }

    pub(crate) fn prepared(&self) -> Vec<String> {
        self.prepared.borrow().clone()
    }

    pub(crate) fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed.borrow().clone()
    }

    fn fault_for(faults: &[(&'static str, Fault)], sql: &str) -> Option<Fault> {
        faults
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix))
            .map(|(_, fault)| *fault)
    }
}

struct MockStatement<'a> {
    conn: &'a MockConnection,
    sql: String,
}

impl Statement for MockStatement<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<usize, DriverError> {
        if let Some(fault) = MockConnection::fault_for(&self.conn.execute_faults, &self.sql) {
            return Err(fault.to_driver_error());
        }
        self.conn
            .executed
            .borrow_mut()
            .push((self.sql.clone(), params.to_vec()));

        if self.sql.starts_with("SELECT") {
            Ok(usize::from(self.conn.row.is_some()))
        } else {
            Ok(1)
        }
    }

    fn fetch_scalar(&mut self) -> Result<Option<Vec<u8>>, DriverError> {
        Ok(self.conn.row.clone())
    }
}

impl Connection for MockConnection {
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>, DriverError> {
        self.prepared.borrow_mut().push(sql.to_string());
        if let Some(fault) = Self::fault_for(&self.prepare_faults, sql) {
            return Err(fault.to_driver_error());
        }
        Ok(Box::new(MockStatement {
            conn: self,
            sql: sql.to_string(),
        }))
    }
}
