//! The player registry: every connected player, keyed by id.
//!
//! Many connection tasks and the game loop touch the registry at once, so
//! the map sits behind an async `RwLock`. Lookups run concurrently;
//! mutations are serialized. No method holds the lock across an await
//! into another component.

use std::collections::HashMap;
use std::time::Duration;

use splat_protocol::PlayerId;
use tokio::sync::RwLock;

use crate::Player;

/// Registry of connected players.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: RwLock<HashMap<PlayerId, Player>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a player. An existing record with the same id is replaced.
    pub async fn add(&self, player: Player) {
        let id = player.id;
        let replaced = self.players.write().await.insert(id, player);
        if replaced.is_some() {
            tracing::debug!(player_id = %id, "replaced existing player record");
        }
    }

    /// Removes a player and returns the removed record. Removing an
    /// unknown id is a no-op.
    pub async fn remove(&self, id: PlayerId) -> Option<Player> {
        self.players.write().await.remove(&id)
    }

    /// Returns a copy of the player's record.
    pub async fn get(&self, id: PlayerId) -> Option<Player> {
        self.players.read().await.get(&id).cloned()
    }

    pub async fn contains(&self, id: PlayerId) -> bool {
        self.players.read().await.contains_key(&id)
    }

    /// Runs `f` against the player's record under the write lock.
    ///
    /// Returns `None` (without calling `f`) if the player isn't registered.
    pub async fn update<R>(&self, id: PlayerId, f: impl FnOnce(&mut Player) -> R) -> Option<R> {
        self.players.write().await.get_mut(&id).map(f)
    }

    /// Refreshes the player's last-activity timestamp. Returns `false` if
    /// the player isn't registered.
    pub async fn touch(&self, id: PlayerId) -> bool {
        self.update(id, Player::touch).await.is_some()
    }

    /// Snapshot of every registered player, in no particular order.
    pub async fn players(&self) -> Vec<Player> {
        self.players.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }

    /// Removes and returns every player idle for longer than `threshold`.
    pub async fn prune_inactive(&self, threshold: Duration) -> Vec<Player> {
        let mut players = self.players.write().await;
        let stale: Vec<PlayerId> = players
            .values()
            .filter(|p| p.idle_for() > threshold)
            .map(|p| p.id)
            .collect();

        stale
            .into_iter()
            .filter_map(|id| players.remove(&id))
            .collect()
    }

    /// Adds `amount` health (capped) to every player. With
    /// `refresh_activity` set, also marks each one as active now.
    pub async fn regenerate(&self, amount: u32, refresh_activity: bool) {
        for player in self.players.write().await.values_mut() {
            player.heal(amount);
            if refresh_activity {
                player.touch();
            }
        }
    }
}
