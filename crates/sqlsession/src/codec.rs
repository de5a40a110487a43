//! Payload encoding for stored session data.
//!
//! Session payloads are opaque bytes; they are stored as standard padded
//! base64 so the column always holds printable text whatever the driver
//! assumes about text safety.

use base64::{DecodeError, Engine, engine::general_purpose::STANDARD};

/// Encode a raw payload for storage.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a stored payload back to raw bytes.
///
/// Takes the stored bytes as the driver returned them, so a value that is
/// not even valid UTF-8 is rejected here like any other malformed encoding.
pub fn decode(stored: &[u8]) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(stored)
}
