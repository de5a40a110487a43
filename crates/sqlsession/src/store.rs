//! SQL-backed session handler.
//!
//! Every write inserts a new row; the current payload for a session is the
//! row with the highest surrogate `id`. Superseded rows are removed by
//! `destroy`, by `gc`, or opportunistically after a write.
//!
//! No locking is done. Concurrent writers to one session ID each insert a
//! row and the one assigned the higher `id` wins on read. Insert and cleanup
//! are independent statements; a crash between them leaves a stale row that
//! a later cleanup or `gc` removes.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::clock::{Clock, RandomSource, SystemClock, ThreadRandom};
use crate::codec;
use crate::config::StoreConfig;
use crate::connection::{Connection, DriverError, Statement, Value};
use crate::error::{ConfigError, Result, SessionError};
use crate::handler::SessionHandler;

/// Statement text, built once from the validated table name.
#[derive(Debug, Clone)]
struct Queries {
    select: String,
    insert: String,
    cleanup: String,
    destroy: String,
    gc: String,
}

impl Queries {
    fn new(table: &str) -> Self {
        Self {
            select: format!(
                "SELECT session_data FROM {table} WHERE session_id = ? ORDER BY id DESC LIMIT 1"
            ),
            insert: format!(
                "INSERT INTO {table} (time_created, session_id, session_data) VALUES (?, ?, ?)"
            ),
            cleanup: format!("DELETE FROM {table} WHERE time_created < ? AND session_id = ?"),
            destroy: format!("DELETE FROM {table} WHERE session_id = ?"),
            gc: format!("DELETE FROM {table} WHERE time_created <= ?"),
        }
    }
}

/// Session store over a single table.
///
/// Expected schema (not created here):
///
/// ```sql
/// CREATE TABLE sessions (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     time_created INTEGER NOT NULL,
///     session_id TEXT NOT NULL,
///     session_data TEXT NOT NULL
/// );
/// ```
///
/// `session_data` may equally be a BLOB column; both are read as raw bytes.
pub struct SessionStore<C> {
    conn: C,
    table: String,
    queries: Queries,
    cleanup_rate: f64,
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
}

impl<C> fmt::Debug for SessionStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("table", &self.table)
            .field("cleanup_rate", &self.cleanup_rate)
            .finish_non_exhaustive()
    }
}

impl<C: Connection> SessionStore<C> {
    /// Create a store on `table` with default settings.
    ///
    /// Fails if the table name is not `^[A-Za-z0-9_]+$`.
    pub fn new(conn: C, table: impl Into<String>) -> std::result::Result<Self, ConfigError> {
        Self::with_config(conn, StoreConfig::new().with_table(table))
    }

    /// Create a store from a full configuration.
    pub fn with_config(conn: C, config: StoreConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let queries = Queries::new(&config.dialect.quote(&config.table));
        debug!(
            table = %config.table,
            dialect = ?config.dialect,
            cleanup_rate = config.cleanup_rate,
            "Session store configured"
        );

        Ok(Self {
            conn,
            table: config.table,
            queries,
            cleanup_rate: config.cleanup_rate,
            clock: Box::new(SystemClock),
            random: Box::new(ThreadRandom),
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the random source gating opportunistic cleanup.
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    /// The validated, unquoted table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Probability that a write also clears superseded rows.
    pub fn cleanup_rate(&self) -> f64 {
        self.cleanup_rate
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>> {
        trace!(sql, "Preparing statement");
        self.conn.prepare(sql).map_err(|err| match err {
            DriverError::Failed { message } => SessionError::Prepare(message),
            DriverError::Exception(source) => SessionError::Driver(source),
        })
    }

    /// Prepare and execute one statement, returning the row count.
    fn run(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let mut stmt = self.prepare(sql)?;
        stmt.execute(params).map_err(execute_error)
    }

    /// Delete rows for `session_id` older than `now`. Failures are only
    /// logged; losing a pass just leaves work for the next one or for `gc`.
    fn cleanup(&self, session_id: &str, now: i64) {
        match self.run(
            &self.queries.cleanup,
            &[Value::from(now), Value::from(session_id)],
        ) {
            Ok(deleted) => {
                trace!(session_id = %session_id, deleted, "Superseded session rows removed");
            }
            Err(err) => {
                debug!(session_id = %session_id, error = ?err, "Opportunistic cleanup failed, ignoring");
            }
        }
    }
}

fn execute_error(err: DriverError) -> SessionError {
    match err {
        DriverError::Failed { message } => SessionError::Execute(message),
        DriverError::Exception(source) => SessionError::Driver(source),
    }
}

impl<C: Connection> SessionHandler for SessionStore<C> {
    fn read(&self, session_id: &str) -> Result<Vec<u8>> {
        let mut stmt = self.prepare(&self.queries.select)?;
        stmt.execute(&[Value::from(session_id)])
            .map_err(execute_error)?;

        let Some(stored) = stmt.fetch_scalar().map_err(execute_error)? else {
            debug!(session_id = %session_id, "No stored session data");
            return Ok(Vec::new());
        };

        let data = codec::decode(&stored).map_err(|err| {
            warn!(session_id = %session_id, error = %err, "Stored session data failed to decode");
            SessionError::Corrupted {
                session_id: session_id.to_string(),
            }
        })?;

        debug!(session_id = %session_id, bytes = data.len(), "Session read");
        Ok(data)
    }

    fn write(&self, session_id: &str, data: &[u8]) -> Result<bool> {
        let now = self.clock.now();
        let encoded = codec::encode(data);

        self.run(
            &self.queries.insert,
            &[
                Value::from(now),
                Value::from(session_id),
                Value::from(encoded),
            ],
        )?;
        debug!(session_id = %session_id, bytes = data.len(), time_created = now, "Session written");

        if self.random.draw() < self.cleanup_rate {
            self.cleanup(session_id, now);
        }

        Ok(true)
    }

    fn destroy(&self, session_id: &str) -> Result<bool> {
        let deleted = self.run(&self.queries.destroy, &[Value::from(session_id)])?;
        debug!(session_id = %session_id, deleted, "Session destroyed");
        Ok(true)
    }

    fn gc(&self, max_lifetime: i64) -> Result<bool> {
        let cutoff = self.clock.now().saturating_sub(max_lifetime);
        let deleted = self.run(&self.queries.gc, &[Value::from(cutoff)])?;
        debug!(cutoff, deleted, "Expired sessions collected");
        Ok(true)
    }
}
