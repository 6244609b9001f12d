//! Arena manager: the directory of arenas.

use std::collections::HashMap;
use std::sync::Arc;

use splat_protocol::{ArenaId, PlayerId};
use tokio::sync::RwLock;

use crate::{Arena, ArenaConfig, ArenaInfo};

/// Tracks every arena on the server.
///
/// The directory lock is held only long enough to look up or clone arena
/// handles. Work on an arena happens after the directory lock is released,
/// under that arena's own lock, so one busy arena never blocks lookups.
#[derive(Debug, Default)]
pub struct ArenaManager {
    arenas: RwLock<HashMap<ArenaId, Arc<Arena>>>,
}

impl ArenaManager {
    /// Creates a new, empty arena manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager pre-populated with the given arenas.
    pub fn with_arenas(configs: impl IntoIterator<Item = ArenaConfig>) -> Self {
        let arenas = configs
            .into_iter()
            .map(|config| (config.id, Arc::new(Arena::new(config))))
            .collect();
        Self {
            arenas: RwLock::new(arenas),
        }
    }

    /// Creates an arena and returns a handle to it. An existing arena with
    /// the same id is replaced.
    pub async fn create_arena(&self, config: ArenaConfig) -> Arc<Arena> {
        let arena_id = config.id;
        let arena = Arc::new(Arena::new(config));
        let replaced = self
            .arenas
            .write()
            .await
            .insert(arena_id, Arc::clone(&arena));

        if replaced.is_some() {
            tracing::warn!(%arena_id, "arena replaced");
        } else {
            tracing::info!(%arena_id, name = arena.name(), "arena created");
        }
        arena
    }

    pub async fn get_arena(&self, arena_id: ArenaId) -> Option<Arc<Arena>> {
        self.arenas.read().await.get(&arena_id).cloned()
    }

    /// Returns handles to all arenas, in ascending id order.
    ///
    /// Callers can do async work on the arenas without holding the
    /// directory lock.
    pub async fn arenas(&self) -> Vec<Arc<Arena>> {
        let mut arenas: Vec<_> = self.arenas.read().await.values().cloned().collect();
        arenas.sort_by_key(|a| a.id());
        arenas
    }

    /// Info snapshots of all arenas, in ascending id order.
    ///
    /// Each arena is read separately, so counts across arenas aren't
    /// from a single instant.
    pub async fn list(&self) -> Vec<ArenaInfo> {
        let mut infos = Vec::new();
        for arena in self.arenas().await {
            infos.push(arena.info().await);
        }
        infos
    }

    pub async fn arena_count(&self) -> usize {
        self.arenas.read().await.len()
    }

    /// Applies the auto-start rule to every arena. Returns the ids of
    /// arenas that started on this tick.
    pub async fn tick(&self) -> Vec<ArenaId> {
        let mut started = Vec::new();
        for arena in self.arenas().await {
            if arena.tick().await {
                started.push(arena.id());
            }
        }
        started
    }

    /// Removes the player from every arena's roster. Returns the ids of
    /// arenas the player was actually in.
    pub async fn remove_player_everywhere(&self, player_id: PlayerId) -> Vec<ArenaId> {
        let mut removed_from = Vec::new();
        for arena in self.arenas().await {
            if arena.remove_player(player_id).await {
                removed_from.push(arena.id());
            }
        }
        removed_from
    }
}
