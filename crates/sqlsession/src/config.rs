//! Configuration for the session store.
//!
//! ```toml
//! [store]
//! table = "sessions"
//! dialect = "ansi"
//! cleanup_rate = 0.2
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default table holding session rows.
pub const DEFAULT_TABLE: &str = "sessions";

/// Default probability that a write also clears superseded rows.
pub const DEFAULT_CLEANUP_RATE: f64 = 0.2;

/// How the table identifier is quoted in statement text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Double quotes (SQLite, PostgreSQL).
    #[default]
    Ansi,
    /// Backticks.
    Mysql,
}

impl Dialect {
    /// Quote an already validated identifier.
    pub fn quote(self, ident: &str) -> String {
        match self {
            Dialect::Ansi => format!("\"{ident}\""),
            Dialect::Mysql => format!("`{ident}`"),
        }
    }
}

/// Configuration for a [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Table holding session rows. Interpolated into statement text, so it
    /// must match `^[A-Za-z0-9_]+$`.
    pub table: String,

    /// Identifier quoting style.
    pub dialect: Dialect,

    /// Probability (0.0–1.0) that a write also deletes older rows for the
    /// same session.
    pub cleanup_rate: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            dialect: Dialect::default(),
            cleanup_rate: DEFAULT_CLEANUP_RATE,
        }
    }
}

/// File layout with the store settings under `[store]`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    store: StoreConfig,
}

impl StoreConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the identifier quoting dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the opportunistic cleanup probability.
    pub fn with_cleanup_rate(mut self, rate: f64) -> Self {
        self.cleanup_rate = rate;
        self
    }

    /// Parse the `[store]` section of a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(s)?;
        Ok(raw.store)
    }

    /// Check every field that must hold before a store is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_table_name(&self.table)?;
        if !(0.0..=1.0).contains(&self.cleanup_rate) {
            return Err(ConfigError::InvalidCleanupRate(self.cleanup_rate));
        }
        Ok(())
    }
}

/// Reject anything but `^[A-Za-z0-9_]+$`.
pub fn validate_table_name(table: &str) -> Result<(), ConfigError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTableName(table.to_string()))
    }
}
