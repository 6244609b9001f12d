//! Error types for the arena layer.

use splat_protocol::{ArenaId, PlayerId};

/// Errors that can occur during arena operations.
///
/// All of these are validation failures: the request is dropped and the
/// connection carries on.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The arena does not exist.
    #[error("arena {0} not found")]
    NotFound(ArenaId),

    /// The arena's roster is at capacity.
    #[error("arena {0} is full")]
    Full(ArenaId),

    /// The player is already on this arena's roster.
    #[error("player {0} already in arena {1}")]
    DuplicatePlayer(PlayerId, ArenaId),
}
