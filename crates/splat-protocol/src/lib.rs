//! Wire protocol for Splat.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Frames** ([`Frame`], [`FrameCodec`]): the length-prefixed binary
//!   unit that travels over the socket.
//! - **Messages** ([`ClientMessage`], [`MessageType`]): the typed view of a
//!   frame's payload, one variant per wire tag.
//! - **Identity types** ([`PlayerId`], [`ArenaId`], [`SpellId`], [`Team`]).
//! - **Errors** ([`ProtocolError`]): what can go wrong while framing or
//!   parsing.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the game
//! handlers. It knows nothing about players, arenas, or spells beyond the
//! identifiers that appear on the wire.
//!
//! ```text
//! Transport (bytes) → Frame (tag + payload) → ClientMessage → handler
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::{DEFAULT_MAX_PAYLOAD_LEN, Frame, FrameCodec, HEADER_LEN, decode, encode};
pub use error::ProtocolError;
pub use message::ClientMessage;
pub use types::{ArenaId, MessageType, PlayerId, SpellId, SpellInstanceId, Team};
