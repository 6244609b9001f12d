//! A single arena: roster, lifecycle state, timestamps.

use std::collections::HashMap;

use splat_protocol::{ArenaId, PlayerId, Team};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{ArenaConfig, ArenaError, ArenaState};

/// Health an [`ArenaPlayer`] starts with.
const START_HEALTH: u32 = 100;

/// A player's per-arena view. Created on join, dropped on leave.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaPlayer {
    pub player_id: PlayerId,
    pub team: Team,
    pub x: f64,
    pub y: f64,
    pub health: u32,
    pub score: u32,
}

impl ArenaPlayer {
    fn new(player_id: PlayerId, team: Team) -> Self {
        Self {
            player_id,
            team,
            x: 0.0,
            y: 0.0,
            health: START_HEALTH,
            score: 0,
        }
    }
}

/// Snapshot of an arena's public state.
#[derive(Debug, Clone)]
pub struct ArenaInfo {
    pub id: ArenaId,
    pub name: String,
    pub state: ArenaState,
    pub player_count: usize,
    pub capacity: usize,
    pub grid_id: u32,
    pub started_at: Option<Instant>,
    pub ended_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct ArenaInner {
    state: ArenaState,
    players: HashMap<PlayerId, ArenaPlayer>,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl ArenaInner {
    /// Moves to `target` if it is the next state. Returns whether it did.
    fn transition(&mut self, target: ArenaState) -> bool {
        if !self.state.can_transition_to(target) {
            return false;
        }
        self.state = target;
        match target {
            ArenaState::Active => self.started_at = Some(Instant::now()),
            ArenaState::Ended => self.ended_at = Some(Instant::now()),
            ArenaState::Waiting => {}
        }
        true
    }
}

/// One arena. Its roster and state sit behind a lock owned by the arena
/// itself, independent of the manager's directory lock.
#[derive(Debug)]
pub struct Arena {
    config: ArenaConfig,
    inner: RwLock<ArenaInner>,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config: config.validated(),
            inner: RwLock::new(ArenaInner::default()),
        }
    }

    pub fn id(&self) -> ArenaId {
        self.config.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Adds a player to the roster at the origin with full health.
    ///
    /// The capacity and duplicate checks and the insert happen under one
    /// write lock, so concurrent joins can never overfill the arena.
    ///
    /// # Errors
    /// - [`ArenaError::Full`] if the roster is at capacity
    /// - [`ArenaError::DuplicatePlayer`] if the player is already here
    pub async fn add_player(&self, player_id: PlayerId, team: Team) -> Result<(), ArenaError> {
        let mut inner = self.inner.write().await;
        if inner.players.len() >= self.config.capacity {
            return Err(ArenaError::Full(self.config.id));
        }
        if inner.players.contains_key(&player_id) {
            return Err(ArenaError::DuplicatePlayer(player_id, self.config.id));
        }
        inner
            .players
            .insert(player_id, ArenaPlayer::new(player_id, team));
        drop(inner);

        tracing::info!(arena_id = %self.config.id, %player_id, %team, "player joined arena");
        Ok(())
    }

    /// Removes a player. Returns `false` if they weren't on the roster.
    pub async fn remove_player(&self, player_id: PlayerId) -> bool {
        let removed = self.inner.write().await.players.remove(&player_id).is_some();
        if removed {
            tracing::info!(arena_id = %self.config.id, %player_id, "player left arena");
        }
        removed
    }

    /// Moves a rostered player. Does nothing if the player isn't here.
    pub async fn update_position(&self, player_id: PlayerId, x: f64, y: f64) {
        if let Some(p) = self.inner.write().await.players.get_mut(&player_id) {
            p.x = x;
            p.y = y;
        }
    }

    pub async fn player(&self, player_id: PlayerId) -> Option<ArenaPlayer> {
        self.inner.read().await.players.get(&player_id).cloned()
    }

    pub async fn players(&self) -> Vec<ArenaPlayer> {
        self.inner.read().await.players.values().cloned().collect()
    }

    pub async fn player_count(&self) -> usize {
        self.inner.read().await.players.len()
    }

    pub async fn is_full(&self) -> bool {
        self.player_count().await >= self.config.capacity
    }

    pub async fn state(&self) -> ArenaState {
        self.inner.read().await.state
    }

    /// `Waiting → Active`. Returns `false` (no-op) from any other state.
    pub async fn start(&self) -> bool {
        let started = self.inner.write().await.transition(ArenaState::Active);
        if started {
            tracing::info!(arena_id = %self.config.id, "arena started");
        }
        started
    }

    /// `Active → Ended`. Returns `false` (no-op) from any other state.
    pub async fn end(&self) -> bool {
        let ended = self.inner.write().await.transition(ArenaState::Ended);
        if ended {
            tracing::info!(arena_id = %self.config.id, "arena ended");
        }
        ended
    }

    /// Starts the arena if it is waiting and the roster has reached
    /// `min_players`. Returns whether it started.
    pub async fn tick(&self) -> bool {
        let mut inner = self.inner.write().await;
        if inner.state != ArenaState::Waiting || inner.players.len() < self.config.min_players {
            return false;
        }
        let count = inner.players.len();
        inner.transition(ArenaState::Active);
        drop(inner);

        tracing::info!(arena_id = %self.config.id, players = count, "arena auto-started");
        true
    }

    pub async fn info(&self) -> ArenaInfo {
        let inner = self.inner.read().await;
        ArenaInfo {
            id: self.config.id,
            name: self.config.name.clone(),
            state: inner.state,
            player_count: inner.players.len(),
            capacity: self.config.capacity,
            grid_id: self.config.grid_id,
            started_at: inner.started_at,
            ended_at: inner.ended_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(capacity: usize) -> Arena {
        Arena::new(ArenaConfig::new(ArenaId(1), "Test").with_capacity(capacity))
    }

    #[tokio::test]
    async fn test_add_player_starts_at_origin_with_full_health() {
        let a = arena(8);
        a.add_player(PlayerId(1), Team::Chaos).await.unwrap();

        let p = a.player(PlayerId(1)).await.unwrap();
        assert_eq!(p.team, Team::Chaos);
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert_eq!(p.health, 100);
        assert_eq!(p.score, 0);
    }

    #[tokio::test]
    async fn test_add_player_when_full_returns_full() {
        let a = arena(1);
        a.add_player(PlayerId(1), Team::None).await.unwrap();

        let result = a.add_player(PlayerId(2), Team::None).await;
        assert!(matches!(result, Err(ArenaError::Full(ArenaId(1)))));
        assert!(a.is_full().await);
    }

    #[tokio::test]
    async fn test_add_player_duplicate_leaves_roster_unchanged() {
        let a = arena(8);
        a.add_player(PlayerId(1), Team::Order).await.unwrap();

        let result = a.add_player(PlayerId(1), Team::Chaos).await;
        assert!(matches!(result, Err(ArenaError::DuplicatePlayer(..))));
        assert_eq!(a.player_count().await, 1);
        assert_eq!(a.player(PlayerId(1)).await.unwrap().team, Team::Order);
    }

    #[tokio::test]
    async fn test_remove_player_is_idempotent() {
        let a = arena(8);
        a.add_player(PlayerId(1), Team::None).await.unwrap();
        assert!(a.remove_player(PlayerId(1)).await);
        assert!(!a.remove_player(PlayerId(1)).await);
        assert!(!a.remove_player(PlayerId(99)).await);
    }

    #[tokio::test]
    async fn test_update_position_absent_player_is_noop() {
        let a = arena(8);
        a.update_position(PlayerId(5), 1.0, 2.0).await;
        assert_eq!(a.player_count().await, 0);

        a.add_player(PlayerId(5), Team::None).await.unwrap();
        a.update_position(PlayerId(5), 1.0, 2.0).await;
        let p = a.player(PlayerId(5)).await.unwrap();
        assert_eq!((p.x, p.y), (1.0, 2.0));
    }

    #[tokio::test]
    async fn test_start_and_end_follow_lifecycle() {
        let a = arena(8);
        assert!(!a.end().await, "can't end a waiting arena");
        assert!(a.start().await);
        assert!(!a.start().await, "second start is a no-op");
        assert!(a.end().await);
        assert_eq!(a.state().await, ArenaState::Ended);

        let info = a.info().await;
        assert!(info.started_at.is_some());
        assert!(info.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_tick_empty_arena_with_zero_min_players_stays_waiting() {
        let a = Arena::new(ArenaConfig::new(ArenaId(5), "Empty").with_min_players(0));
        assert_eq!(a.config().min_players, 1);
        assert!(!a.tick().await);
        assert_eq!(a.state().await, ArenaState::Waiting);

        a.add_player(PlayerId(1), Team::None).await.unwrap();
        assert!(a.tick().await);
    }

    #[tokio::test]
    async fn test_tick_below_min_players_stays_waiting() {
        let a = arena(8);
        a.add_player(PlayerId(1), Team::None).await.unwrap();
        assert!(!a.tick().await);
        assert_eq!(a.state().await, ArenaState::Waiting);
        assert!(a.info().await.started_at.is_none());
    }
}
