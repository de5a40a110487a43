//! Error types for session persistence.

/// Errors raised while building a store from its configuration.
///
/// These are fatal: a store with an unusable configuration is never
/// constructed, so no statement is ever issued with it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Table name contains characters outside `[A-Za-z0-9_]`.
    #[error("invalid table name '{0}': only ASCII letters, digits and underscores are allowed")]
    InvalidTableName(String),

    /// Cleanup rate is not a probability.
    #[error("invalid cleanup rate {0}: must be between 0.0 and 1.0")]
    InvalidCleanupRate(f64),

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The single error kind surfaced by session lifecycle operations.
///
/// Hosts generally treat any of these as fatal to the current request's
/// session handling; the variant (or the source chain) tells them why.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Statement preparation failed; carries the driver's message.
    #[error("{0}")]
    Prepare(String),

    /// Statement execution failed; carries the driver's message.
    #[error("{0}")]
    Execute(String),

    /// The driver raised its own error. The top-level message is empty,
    /// the original is available through [`std::error::Error::source`].
    #[error("")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Stored payload could not be decoded.
    #[error("session data for '{session_id}' is corrupted")]
    Corrupted { session_id: String },
}

/// Result type for session lifecycle operations.
pub type Result<T> = std::result::Result<T, SessionError>;
