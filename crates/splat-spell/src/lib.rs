//! Spells for Splat.
//!
//! - [`SpellBook`]: the static, read-only spell definitions
//! - [`SpellSystem`]: live casts, projectile movement, expiry, and
//!   per-player cooldowns
//!
//! A cast is an atomic check-and-set: the cooldown check, the new
//! instance, and the cooldown write all happen under one lock, so a
//! player can never get two casts out of one cooldown window.

mod book;
mod error;
mod system;

pub use book::{Element, ProjectileKind, Spell, SpellBook, SpellEffect, TargetKind};
pub use error::SpellError;
pub use system::{CastRequest, SpellInstance, SpellSystem};
