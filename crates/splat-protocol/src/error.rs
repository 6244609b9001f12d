//! Error types for the protocol layer.
//!
//! Framing errors and payload errors are deliberately separate variants:
//! the connection loop tears the connection down on the first, and only
//! drops the offending message on the second.

use crate::MessageType;

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The byte stream does not contain a complete, well-formed frame.
    ///
    /// Raised for a truncated header, a payload shorter than its declared
    /// length, or a declared length above the codec's limit. Fatal to the
    /// connection that produced it.
    #[error("framing error: {0}")]
    Framing(String),

    /// A complete frame arrived but its payload does not match the layout
    /// required by its message type (too short, empty text, unknown team).
    #[error("malformed {kind} payload: {reason}")]
    MalformedPayload { kind: MessageType, reason: String },

    /// The underlying reader or writer failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns `true` if the connection cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedPayload { .. })
    }
}

pub(crate) fn malformed(kind: MessageType, reason: impl Into<String>) -> ProtocolError {
    ProtocolError::MalformedPayload {
        kind,
        reason: reason.into(),
    }
}
