//! The lifecycle interface a session-management host drives.
//!
//! Hosts register any [`SessionHandler`] as their storage backend and never
//! need to know how sessions are stored. The host owns session ID
//! generation, cookies and locking; the handler only persists bytes.

use crate::error::Result;

/// Session persistence backend.
pub trait SessionHandler {
    /// Called when the host starts a session. Arguments exist for the host's
    /// benefit; the default does nothing.
    fn open(&self, _save_path: &str, _session_name: &str) -> Result<bool> {
        Ok(true)
    }

    /// Load the current payload for a session.
    ///
    /// A session with no stored data yields an empty payload, not an error.
    fn read(&self, session_id: &str) -> Result<Vec<u8>>;

    /// Persist a payload for a session.
    fn write(&self, session_id: &str, data: &[u8]) -> Result<bool>;

    /// Called when the host is done with the session; the default does
    /// nothing.
    fn close(&self) -> Result<bool> {
        Ok(true)
    }

    /// Remove every stored payload for a session.
    fn destroy(&self, session_id: &str) -> Result<bool>;

    /// Remove all payloads written at least `max_lifetime` seconds ago.
    fn gc(&self, max_lifetime: i64) -> Result<bool>;
}
