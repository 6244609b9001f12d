//! Arena lifecycle and rosters for Splat.
//!
//! Each arena guards its own roster and state behind its own lock; the
//! [`ArenaManager`] guards only the directory of arenas. Operations that
//! span arenas snapshot the directory, release it, then visit each arena
//! in turn.
//!
//! # Key types
//!
//! - [`ArenaManager`]: directory of arenas, auto-start tick
//! - [`Arena`]: one arena's roster and lifecycle
//! - [`ArenaState`]: `Waiting → Active → Ended`
//! - [`ArenaConfig`]: name, capacity, grid, start threshold

mod arena;
mod config;
mod error;
mod manager;

pub use arena::{Arena, ArenaInfo, ArenaPlayer};
pub use config::{ArenaConfig, ArenaState};
pub use error::ArenaError;
pub use manager::ArenaManager;
