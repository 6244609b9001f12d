//! Core protocol types: identifiers, message tags, and teams.
//!
//! Every identifier that appears on the wire is 32 bits wide, so the
//! newtypes here wrap `u32`. Spell *instances* never travel on the wire in
//! requests and use a wider counter.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// A "newtype wrapper" around `u32`: you can't accidentally pass an
/// `ArenaId` where a `PlayerId` is expected, even though both are `u32`
/// underneath. `#[serde(transparent)]` keeps the serialized form a plain
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaId(pub u32);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// Identifies a static spell definition in the spell book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellId(pub u32);

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Identifies one live cast of a spell. Allocated by the spell system,
/// strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellInstanceId(pub u64);

impl fmt::Display for SpellInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MessageType: the 16-bit tag in every frame header
// ---------------------------------------------------------------------------

/// The wire tag identifying what a frame's payload contains.
///
/// The numeric values are stable wire constants. A frame whose tag is not
/// listed here is still a valid frame; it is routed to the unknown-message
/// fallback rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum MessageType {
    Login = 1,
    Move = 2,
    Chat = 3,
    Logout = 4,
    Ping = 5,
    JoinArena = 6,
    LeaveArena = 7,
    ArenaList = 8,
    ArenaUpdate = 9,
    CastSpell = 10,
    SpellList = 11,
}

impl MessageType {
    /// Every known message type, in tag order.
    pub const ALL: [MessageType; 11] = [
        Self::Login,
        Self::Move,
        Self::Chat,
        Self::Logout,
        Self::Ping,
        Self::JoinArena,
        Self::LeaveArena,
        Self::ArenaList,
        Self::ArenaUpdate,
        Self::CastSpell,
        Self::SpellList,
    ];

    /// Maps a raw wire tag to a known message type.
    pub fn from_tag(tag: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// The raw wire tag.
    pub fn tag(self) -> u16 {
        self as u16
    }
}

impl From<MessageType> for u16 {
    fn from(value: MessageType) -> Self {
        value.tag()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "Login",
            Self::Move => "Move",
            Self::Chat => "Chat",
            Self::Logout => "Logout",
            Self::Ping => "Ping",
            Self::JoinArena => "JoinArena",
            Self::LeaveArena => "LeaveArena",
            Self::ArenaList => "ArenaList",
            Self::ArenaUpdate => "ArenaUpdate",
            Self::CastSpell => "CastSpell",
            Self::SpellList => "SpellList",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// The side a player fights for inside an arena.
///
/// Sent as a 32-bit little-endian integer in `JoinArena` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    #[default]
    None,
    Chaos,
    Balance,
    Order,
}

impl Team {
    /// Decodes the wire value. Returns `None` for values outside 0..=3.
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Chaos),
            2 => Some(Self::Balance),
            3 => Some(Self::Order),
            _ => None,
        }
    }

    /// The wire value.
    pub fn to_wire(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Chaos => 1,
            Self::Balance => 2,
            Self::Order => 3,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Chaos => "Chaos",
            Self::Balance => "Balance",
            Self::Order => "Order",
        };
        f.write_str(name)
    }
}
