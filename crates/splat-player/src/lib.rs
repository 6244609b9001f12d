//! Connected-player state for Splat.
//!
//! This crate handles the lifecycle of player records:
//!
//! 1. **Registry**: who is connected right now ([`PlayerRegistry`])
//! 2. **Persistence**: loading and saving players across sessions
//!    ([`PlayerStore`] trait, [`MemoryStore`] default)
//! 3. **Liveness**: inactivity pruning and health regeneration, driven
//!    by the game loop
//!
//! # How it fits in the stack
//!
//! ```text
//! Game loop / handlers (above)  ← add, update, prune, regenerate
//!     ↕
//! Player layer (this crate)     ← one record per connected player
//!     ↕
//! Protocol + transport (below)  ← PlayerId, ConnectionId
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod player;
mod registry;
mod store;

pub use error::StoreError;
pub use player::{MAX_HEALTH, Player, PlayerRecord};
pub use registry::PlayerRegistry;
pub use store::{MemoryStore, PlayerStore};
