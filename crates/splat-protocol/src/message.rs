//! Typed client messages.
//!
//! [`ClientMessage::decode`] turns a raw [`Frame`] into one tagged variant.
//! Tags the server doesn't recognize become [`ClientMessage::Unknown`]
//! instead of an error, so a newer client can't knock an older server's
//! connection over.
//!
//! Payload layouts (all little-endian, no padding):
//!
//! | Message     | Layout                                   | Bytes |
//! |-------------|------------------------------------------|-------|
//! | Login, Chat | UTF-8 text                               | any   |
//! | Move        | f64 x, f64 y                             | 16    |
//! | JoinArena   | u32 arena, u32 team                      | 8     |
//! | LeaveArena  | u32 arena                                | 4     |
//! | ArenaUpdate | u32 arena, f64 x, f64 y                  | 20    |
//! | CastSpell   | u32 spell, f64 x, f64 y, u32 target      | 24    |
//! | others      | empty                                    | 0     |
//!
//! A payload shorter than its layout is malformed. Trailing bytes past the
//! layout are ignored.

use crate::codec::Frame;
use crate::error::malformed;
use crate::{ArenaId, MessageType, PlayerId, ProtocolError, SpellId, Team};

/// A decoded client-to-server message.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Login { name: String },
    Move { x: f64, y: f64 },
    Chat { text: String },
    Logout,
    Ping,
    JoinArena { arena: ArenaId, team: Team },
    LeaveArena { arena: ArenaId },
    ArenaList,
    ArenaUpdate { arena: ArenaId, x: f64, y: f64 },
    CastSpell {
        spell: SpellId,
        x: f64,
        y: f64,
        target: PlayerId,
    },
    SpellList,
    /// A frame whose tag is not a known [`MessageType`].
    Unknown { tag: u16, payload: Vec<u8> },
}

impl ClientMessage {
    /// Decodes a frame into a typed message.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedPayload`] when the payload is too short
    /// for the tag's layout, a team value is out of range, or a text
    /// payload is empty.
    pub fn decode(frame: &Frame) -> Result<Self, ProtocolError> {
        let Some(kind) = frame.message_type() else {
            return Ok(Self::Unknown {
                tag: frame.tag,
                payload: frame.payload.clone(),
            });
        };

        let mut r = PayloadReader::new(kind, &frame.payload);
        let msg = match kind {
            MessageType::Login => Self::Login {
                name: r.text("name")?,
            },
            MessageType::Move => Self::Move {
                x: r.f64("x")?,
                y: r.f64("y")?,
            },
            MessageType::Chat => Self::Chat {
                text: r.text("text")?,
            },
            MessageType::Logout => Self::Logout,
            MessageType::Ping => Self::Ping,
            MessageType::JoinArena => {
                let arena = ArenaId(r.u32("arena id")?);
                let raw_team = r.u32("team")?;
                let team = Team::from_wire(raw_team)
                    .ok_or_else(|| malformed(kind, format!("invalid team value {raw_team}")))?;
                Self::JoinArena { arena, team }
            }
            MessageType::LeaveArena => Self::LeaveArena {
                arena: ArenaId(r.u32("arena id")?),
            },
            MessageType::ArenaList => Self::ArenaList,
            MessageType::ArenaUpdate => Self::ArenaUpdate {
                arena: ArenaId(r.u32("arena id")?),
                x: r.f64("x")?,
                y: r.f64("y")?,
            },
            MessageType::CastSpell => Self::CastSpell {
                spell: SpellId(r.u32("spell id")?),
                x: r.f64("x")?,
                y: r.f64("y")?,
                target: PlayerId(r.u32("target id")?),
            },
            MessageType::SpellList => Self::SpellList,
        };
        Ok(msg)
    }

    /// The tag this message is sent with.
    pub fn tag(&self) -> u16 {
        match self {
            Self::Login { .. } => MessageType::Login.tag(),
            Self::Move { .. } => MessageType::Move.tag(),
            Self::Chat { .. } => MessageType::Chat.tag(),
            Self::Logout => MessageType::Logout.tag(),
            Self::Ping => MessageType::Ping.tag(),
            Self::JoinArena { .. } => MessageType::JoinArena.tag(),
            Self::LeaveArena { .. } => MessageType::LeaveArena.tag(),
            Self::ArenaList => MessageType::ArenaList.tag(),
            Self::ArenaUpdate { .. } => MessageType::ArenaUpdate.tag(),
            Self::CastSpell { .. } => MessageType::CastSpell.tag(),
            Self::SpellList => MessageType::SpellList.tag(),
            Self::Unknown { tag, .. } => *tag,
        }
    }

    /// Encodes the message into a frame. Clients and tests use this; the
    /// server only decodes.
    pub fn encode(&self) -> Frame {
        let mut buf = Vec::new();
        match self {
            Self::Login { name } => buf.extend_from_slice(name.as_bytes()),
            Self::Chat { text } => buf.extend_from_slice(text.as_bytes()),
            Self::Move { x, y } => {
                buf.extend_from_slice(&x.to_le_bytes());
                buf.extend_from_slice(&y.to_le_bytes());
            }
            Self::JoinArena { arena, team } => {
                buf.extend_from_slice(&arena.0.to_le_bytes());
                buf.extend_from_slice(&team.to_wire().to_le_bytes());
            }
            Self::LeaveArena { arena } => buf.extend_from_slice(&arena.0.to_le_bytes()),
            Self::ArenaUpdate { arena, x, y } => {
                buf.extend_from_slice(&arena.0.to_le_bytes());
                buf.extend_from_slice(&x.to_le_bytes());
                buf.extend_from_slice(&y.to_le_bytes());
            }
            Self::CastSpell {
                spell,
                x,
                y,
                target,
            } => {
                buf.extend_from_slice(&spell.0.to_le_bytes());
                buf.extend_from_slice(&x.to_le_bytes());
                buf.extend_from_slice(&y.to_le_bytes());
                buf.extend_from_slice(&target.0.to_le_bytes());
            }
            Self::Unknown { payload, .. } => buf.extend_from_slice(payload),
            Self::Logout | Self::Ping | Self::ArenaList | Self::SpellList => {}
        }
        Frame::new(self.tag(), buf)
    }
}

// ---------------------------------------------------------------------------
// PayloadReader
// ---------------------------------------------------------------------------

/// Cursor over a payload that reports short reads as malformed payloads.
struct PayloadReader<'a> {
    kind: MessageType,
    rest: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    fn new(kind: MessageType, payload: &'a [u8]) -> Self {
        Self {
            kind,
            rest: payload,
        }
    }

    fn take<const N: usize>(&mut self, field: &str) -> Result<[u8; N], ProtocolError> {
        let Some((head, rest)) = self.rest.split_first_chunk::<N>() else {
            return Err(malformed(
                self.kind,
                format!(
                    "payload too short for {field}: need {N} more bytes, have {}",
                    self.rest.len()
                ),
            ));
        };
        self.rest = rest;
        Ok(*head)
    }

    fn u32(&mut self, field: &str) -> Result<u32, ProtocolError> {
        self.take::<4>(field).map(u32::from_le_bytes)
    }

    fn f64(&mut self, field: &str) -> Result<f64, ProtocolError> {
        self.take::<8>(field).map(f64::from_le_bytes)
    }

    /// The whole remaining payload as text. Invalid UTF-8 is replaced
    /// rather than rejected; an empty payload is malformed.
    fn text(&mut self, field: &str) -> Result<String, ProtocolError> {
        if self.rest.is_empty() {
            return Err(malformed(self.kind, format!("{field} must not be empty")));
        }
        let text = String::from_utf8_lossy(self.rest).into_owned();
        self.rest = &[];
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(kind: MessageType, payload: &[u8]) -> Frame {
        Frame::new(kind, payload.to_vec())
    }

    fn assert_malformed(result: Result<ClientMessage, ProtocolError>, expected: MessageType) {
        match result {
            Err(ProtocolError::MalformedPayload { kind, .. }) => assert_eq!(kind, expected),
            other => panic!("expected malformed {expected} payload, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_login_returns_name() {
        let msg = ClientMessage::decode(&frame(MessageType::Login, b"Alice")).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Login {
                name: "Alice".into()
            }
        );
    }

    #[test]
    fn test_decode_login_empty_is_malformed() {
        assert_malformed(
            ClientMessage::decode(&frame(MessageType::Login, b"")),
            MessageType::Login,
        );
    }

    #[test]
    fn test_decode_chat_invalid_utf8_is_replaced() {
        let msg = ClientMessage::decode(&frame(MessageType::Chat, b"hi\xFF")).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Chat {
                text: "hi\u{FFFD}".into()
            }
        );
    }

    #[test]
    fn test_decode_move_reads_two_floats() {
        let mut payload = 1.5f64.to_le_bytes().to_vec();
        payload.extend_from_slice(&(-2.25f64).to_le_bytes());

        let msg = ClientMessage::decode(&frame(MessageType::Move, &payload)).unwrap();
        assert_eq!(msg, ClientMessage::Move { x: 1.5, y: -2.25 });
    }

    #[test]
    fn test_decode_move_short_payload_is_malformed() {
        assert_malformed(
            ClientMessage::decode(&frame(MessageType::Move, &[0u8; 15])),
            MessageType::Move,
        );
    }

    #[test]
    fn test_decode_join_arena_reads_arena_and_team() {
        let payload = [1, 0, 0, 0, 3, 0, 0, 0];
        let msg = ClientMessage::decode(&frame(MessageType::JoinArena, &payload)).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinArena {
                arena: ArenaId(1),
                team: Team::Order,
            }
        );
    }

    #[test]
    fn test_decode_join_arena_invalid_team_is_malformed() {
        let payload = [1, 0, 0, 0, 9, 0, 0, 0];
        assert_malformed(
            ClientMessage::decode(&frame(MessageType::JoinArena, &payload)),
            MessageType::JoinArena,
        );
    }

    #[test]
    fn test_decode_leave_arena_ignores_trailing_bytes() {
        let payload = [2, 0, 0, 0, 0xAA, 0xBB];
        let msg = ClientMessage::decode(&frame(MessageType::LeaveArena, &payload)).unwrap();
        assert_eq!(msg, ClientMessage::LeaveArena { arena: ArenaId(2) });
    }

    #[test]
    fn test_decode_cast_spell_reads_24_bytes() {
        let mut payload = 4u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&10.0f64.to_le_bytes());
        payload.extend_from_slice(&20.0f64.to_le_bytes());
        payload.extend_from_slice(&7u32.to_le_bytes());

        let msg = ClientMessage::decode(&frame(MessageType::CastSpell, &payload)).unwrap();
        assert_eq!(
            msg,
            ClientMessage::CastSpell {
                spell: SpellId(4),
                x: 10.0,
                y: 20.0,
                target: PlayerId(7),
            }
        );
    }

    #[test]
    fn test_decode_cast_spell_missing_target_is_malformed() {
        assert_malformed(
            ClientMessage::decode(&frame(MessageType::CastSpell, &[0u8; 20])),
            MessageType::CastSpell,
        );
    }

    #[test]
    fn test_decode_arena_update_short_payload_is_malformed() {
        assert_malformed(
            ClientMessage::decode(&frame(MessageType::ArenaUpdate, &[0u8; 12])),
            MessageType::ArenaUpdate,
        );
    }

    #[test]
    fn test_decode_unknown_tag_keeps_payload() {
        let msg = ClientMessage::decode(&Frame::new(99u16, b"??".to_vec())).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Unknown {
                tag: 99,
                payload: b"??".to_vec(),
            }
        );
    }

    #[test]
    fn test_decode_empty_messages_ignore_payload() {
        for (kind, expected) in [
            (MessageType::Ping, ClientMessage::Ping),
            (MessageType::Logout, ClientMessage::Logout),
            (MessageType::ArenaList, ClientMessage::ArenaList),
            (MessageType::SpellList, ClientMessage::SpellList),
        ] {
            let msg = ClientMessage::decode(&frame(kind, b"x")).unwrap();
            assert_eq!(msg, expected);
        }
    }

    #[test]
    fn test_encode_then_decode_arena_update() {
        let msg = ClientMessage::ArenaUpdate {
            arena: ArenaId(3),
            x: 4.0,
            y: 5.5,
        };
        let frame = msg.encode();
        assert_eq!(frame.tag, 9);
        assert_eq!(frame.payload.len(), 20);
        assert_eq!(ClientMessage::decode(&frame).unwrap(), msg);
    }

    #[test]
    fn test_malformed_payload_is_not_fatal() {
        let err = ClientMessage::decode(&frame(MessageType::Move, b"")).unwrap_err();
        assert!(!err.is_fatal());
    }
}
