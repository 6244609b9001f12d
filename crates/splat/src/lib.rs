//! # Splat
//!
//! Authoritative server core for the Splat arena game.
//!
//! Clients connect over TCP and speak a small length-prefixed binary
//! protocol. The server owns all world state (players, arenas, spell
//! casts) and advances it on a fixed tick.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use splat::prelude::*;
//!
//! # async fn run() -> Result<(), SplatError> {
//! let server = SplatServer::builder()
//!     .bind("0.0.0.0:4000")
//!     .build(MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
pub mod debug;
mod error;
pub mod game_loop;
mod handler;
pub mod router;
mod server;

pub use config::{DebugConfig, GameLoopConfig, ServerConfig};
pub use debug::{CapturedPacket, DebugCapture};
pub use error::SplatError;
pub use game_loop::{GameLoop, TickReport};
pub use router::{Outcome, route};
pub use server::{ServerState, SplatServer, SplatServerBuilder};

/// Common imports for running a server.
pub mod prelude {
    pub use crate::{
        DebugConfig, GameLoopConfig, ServerConfig, ServerState, SplatError, SplatServer,
        SplatServerBuilder,
    };
    pub use splat_arena::ArenaConfig;
    pub use splat_player::{MemoryStore, PlayerRecord, PlayerStore, StoreError};
    pub use splat_protocol::{ArenaId, PlayerId, SpellId, Team};
    pub use splat_spell::SpellBook;
    pub use splat_tick::{TickConfig, TickPolicy};
}
