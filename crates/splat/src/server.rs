//! `SplatServer` builder and accept loop.
//!
//! This is the entry point for running a Splat server. It ties together
//! all the layers: transport → protocol → router → registry, arenas and
//! spells, plus the game loop that ticks them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use splat_arena::{ArenaConfig, ArenaManager};
use splat_player::{MemoryStore, PlayerRegistry, PlayerStore};
use splat_protocol::{FrameCodec, PlayerId};
use splat_spell::{SpellBook, SpellSystem};
use splat_transport::{TcpTransport, Transport};

use crate::debug::DebugCapture;
use crate::game_loop::GameLoop;
use crate::handler::handle_connection;
use crate::{DebugConfig, GameLoopConfig, ServerConfig, SplatError};

/// World state shared by every connection task and the game loop.
///
/// Built once and handed out behind an `Arc`. Each component guards itself
/// with its own lock; no lock is held while calling into another
/// component, so a handler that touches the registry and then an arena
/// does two separate critical sections.
pub struct ServerState<S: PlayerStore> {
    players: PlayerRegistry,
    arenas: ArenaManager,
    spells: SpellSystem,
    store: S,
    debug: DebugCapture,
    next_player_id: AtomicU32,
}

impl<S: PlayerStore> ServerState<S> {
    pub fn new(config: &ServerConfig, spell_book: SpellBook, store: S) -> Self {
        Self {
            players: PlayerRegistry::new(),
            arenas: ArenaManager::with_arenas(config.arenas.iter().cloned()),
            spells: SpellSystem::new(spell_book),
            store,
            debug: DebugCapture::new(config.debug.clone()),
            next_player_id: AtomicU32::new(1),
        }
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn arenas(&self) -> &ArenaManager {
        &self.arenas
    }

    pub fn spells(&self) -> &SpellSystem {
        &self.spells
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn debug(&self) -> &DebugCapture {
        &self.debug
    }

    /// Hands out the next player id. Ids start at 1 and are never reused
    /// within one server run.
    pub fn allocate_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builder for configuring and starting a Splat server.
///
/// # Example
///
/// ```rust,ignore
/// use splat::prelude::*;
///
/// let server = SplatServer::builder()
///     .bind("0.0.0.0:4000")
///     .build(MemoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct SplatServerBuilder {
    config: ServerConfig,
    spell_book: SpellBook,
}

impl SplatServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            spell_book: SpellBook::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn game_loop(mut self, config: GameLoopConfig) -> Self {
        self.config.game_loop = config;
        self
    }

    pub fn debug(mut self, config: DebugConfig) -> Self {
        self.config.debug = config;
        self
    }

    /// Sets the arenas created at startup.
    pub fn arenas(mut self, arenas: Vec<ArenaConfig>) -> Self {
        self.config.arenas = arenas;
        self
    }

    pub fn max_payload_len(mut self, max_payload_len: u32) -> Self {
        self.config.max_payload_len = max_payload_len;
        self
    }

    pub fn spell_book(mut self, spell_book: SpellBook) -> Self {
        self.spell_book = spell_book;
        self
    }

    /// Binds the listener and builds the shared state around `store`.
    pub async fn build<S: PlayerStore>(self, store: S) -> Result<SplatServer<S>, SplatError> {
        let codec = FrameCodec::new(self.config.max_payload_len);
        let transport = TcpTransport::bind(&self.config.bind_addr)
            .await?
            .with_codec(codec);

        let state = Arc::new(ServerState::new(&self.config, self.spell_book, store));

        Ok(SplatServer {
            transport,
            state,
            game_loop: self.config.game_loop,
        })
    }
}

impl Default for SplatServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Splat server.
///
/// Call [`run()`](Self::run) to start the game loop and accept
/// connections.
pub struct SplatServer<S: PlayerStore> {
    transport: TcpTransport,
    state: Arc<ServerState<S>>,
    game_loop: GameLoopConfig,
}

impl SplatServer<MemoryStore> {
    /// Creates a new builder. The store type is picked by
    /// [`SplatServerBuilder::build`], not by this call.
    pub fn builder() -> SplatServerBuilder {
        SplatServerBuilder::new()
    }
}

impl<S: PlayerStore> SplatServer<S> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, SplatError> {
        Ok(self.transport.local_addr()?)
    }

    /// The shared world state. Useful for inspecting a running server.
    pub fn state(&self) -> Arc<ServerState<S>> {
        Arc::clone(&self.state)
    }

    /// Starts the game loop and runs the accept loop.
    ///
    /// Spawns one task per accepted connection. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), SplatError> {
        let game_loop = GameLoop::new(Arc::clone(&self.state), self.game_loop.clone());
        tokio::spawn(game_loop.run());

        tracing::info!(addr = ?self.transport.local_addr().ok(), "Splat server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        match handle_connection(conn, state).await {
                            Ok(()) => {}
                            Err(e) if e.is_disconnect() => {
                                tracing::debug!(error = %e, "peer disconnected");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "connection ended with error");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
