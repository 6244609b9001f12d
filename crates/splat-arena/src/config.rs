//! Arena configuration and state machine.

use serde::{Deserialize, Serialize};
use splat_protocol::ArenaId;

// ---------------------------------------------------------------------------
// ArenaConfig
// ---------------------------------------------------------------------------

/// Configuration for one arena.
///
/// Missing fields take their defaults when loaded from a config file, so
/// `{"id": 4, "name": "Pit"}` is a complete arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub id: ArenaId,

    pub name: String,

    /// Maximum roster size.
    pub capacity: usize,

    /// Which map grid the arena plays on.
    pub grid_id: u32,

    /// Roster size at which the tick starts a waiting arena.
    pub min_players: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            id: ArenaId(0),
            name: "Arena".to_string(),
            capacity: 8,
            grid_id: 0,
            min_players: 2,
        }
    }
}

impl ArenaConfig {
    /// An arena with the given id and name and default limits.
    pub fn new(id: ArenaId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_grid(mut self, grid_id: u32) -> Self {
        self.grid_id = grid_id;
        self
    }

    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players;
        self
    }

    /// Clamps values that would break the lifecycle. Called by
    /// [`Arena::new`](crate::Arena::new).
    ///
    /// - `min_players` raised to at least 1, so an empty arena never
    ///   auto-starts.
    pub fn validated(mut self) -> Self {
        if self.min_players == 0 {
            tracing::warn!(arena_id = %self.id, "min_players is 0, clamping to 1");
            self.min_players = 1;
        }
        self
    }

    /// The three arenas every server starts with.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(ArenaId(1), "Chaos Arena").with_grid(1),
            Self::new(ArenaId(2), "Balance Arena").with_grid(2),
            Self::new(ArenaId(3), "Order Arena").with_grid(3),
        ]
    }
}

// ---------------------------------------------------------------------------
// ArenaState
// ---------------------------------------------------------------------------

/// The lifecycle state of an arena.
///
/// Transitions only move forward:
///
/// ```text
/// Waiting → Active → Ended
/// ```
///
/// - **Waiting**: accepting players, not started yet.
/// - **Active**: a match is running. Started by the tick once the roster
///   reaches `min_players`, or explicitly.
/// - **Ended**: terminal. Only an explicit end gets here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArenaState {
    #[default]
    Waiting,
    Active,
    Ended,
}

impl ArenaState {
    /// The only state reachable from this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Active),
            Self::Active => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl std::fmt::Display for ArenaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Active => write!(f, "Active"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
