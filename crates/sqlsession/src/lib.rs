//! SQL-backed session persistence.
//!
//! This crate provides a pluggable storage backend for a session-management
//! host. Session payloads are opaque bytes, stored base64-encoded in a
//! single table through four fixed parameterized statements:
//! - read the latest row for a session ID
//! - insert a new row on every write
//! - delete all rows for a session ID, or all rows past a cutoff
//!
//! The host injects an open connection; the store never creates the schema
//! and never locks. See [`SessionStore`] for the expected table layout.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlsession::{SessionHandler, SessionStore};
//!
//! let conn = rusqlite::Connection::open("sessions.db")?;
//! let store = SessionStore::new(&conn, "sessions")?;
//!
//! store.write("f3a9c1", b"user|s:5:\"alice\";")?;
//! let data = store.read("f3a9c1")?;
//! store.gc(1440)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod clock;
pub mod codec;
mod config;
mod connection;
mod error;
mod handler;
#[cfg(test)]
mod mock;
mod sqlite;
mod store;

pub use clock::{Clock, FixedDraw, ManualClock, RandomSource, SystemClock, ThreadRandom};
pub use config::{
    DEFAULT_CLEANUP_RATE, DEFAULT_TABLE, Dialect, StoreConfig, validate_table_name,
};
pub use connection::{Connection, DriverError, NullConnection, Statement, Value};
pub use error::{ConfigError, Result, SessionError};
pub use handler::SessionHandler;
pub use store::SessionStore;
