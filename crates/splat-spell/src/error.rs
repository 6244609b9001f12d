//! Error types for spell casting.

use std::time::Duration;

use splat_protocol::SpellId;

/// Why a cast was refused.
#[derive(Debug, thiserror::Error)]
pub enum SpellError {
    /// No spell with this id is in the book.
    #[error("spell {0} not found")]
    UnknownSpell(SpellId),

    /// The caster used this spell too recently.
    #[error("spell {spell} on cooldown for another {remaining:?}")]
    OnCooldown { spell: SpellId, remaining: Duration },
}
