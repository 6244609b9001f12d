//! Unified error type for the Splat server.

use splat_arena::ArenaError;
use splat_protocol::ProtocolError;
use splat_spell::SpellError;
use splat_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SplatError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A framing or payload error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An arena request was refused (not found, full, duplicate).
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A cast was refused (unknown spell, cooldown).
    #[error(transparent)]
    Spell(#[from] SpellError),
}

impl SplatError {
    /// Returns `true` if the connection that produced this error must be
    /// torn down. Everything else only drops the offending message.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Protocol(e) => e.is_fatal(),
            Self::Arena(_) | Self::Spell(_) => false,
        }
    }

    /// Returns `true` if the peer went away, as opposed to sending
    /// something the server could not accept.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_disconnect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splat_protocol::{ArenaId, MessageType, SpellId};

    #[test]
    fn test_from_transport_error_is_fatal() {
        let err: SplatError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, SplatError::Transport(_)));
        assert!(err.to_string().contains("gone"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_framing_error_is_fatal() {
        let err: SplatError = ProtocolError::Framing("short read".into()).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_malformed_payload_is_not_fatal() {
        let err: SplatError = ProtocolError::MalformedPayload {
            kind: MessageType::Move,
            reason: "too short".into(),
        }
        .into();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_validation_errors_are_not_fatal() {
        let arena: SplatError = ArenaError::NotFound(ArenaId(9)).into();
        let spell: SplatError = SpellError::UnknownSpell(SpellId(9)).into();
        assert!(!arena.is_fatal());
        assert!(!spell.is_fatal());
    }

    #[test]
    fn test_is_disconnect_only_for_peer_gone() {
        let reset: SplatError = TransportError::ReceiveFailed(std::io::Error::from(
            std::io::ErrorKind::ConnectionReset,
        ))
        .into();
        let closed: SplatError = TransportError::ConnectionClosed("conn-1".into()).into();
        let framing: SplatError =
            TransportError::Protocol(ProtocolError::Framing("bad".into())).into();

        assert!(reset.is_disconnect());
        assert!(closed.is_disconnect());
        assert!(framing.is_fatal());
        assert!(!framing.is_disconnect());
    }
}
