//! Integration tests for the world tick: inactivity prune, persistence on
//! prune, and arena cleanup. All run on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use splat::prelude::*;
use splat::{GameLoop, TickReport};
use splat_player::{Player, StoreError};

// =========================================================================
// Helpers
// =========================================================================

/// Prunes players who send nothing; regeneration doesn't count.
fn strict_config() -> GameLoopConfig {
    GameLoopConfig {
        regen_refreshes_activity: false,
        ..GameLoopConfig::default()
    }
}

fn game_loop<S: PlayerStore>(store: S, config: GameLoopConfig) -> (GameLoop<S>, Arc<ServerState<S>>) {
    let state = Arc::new(ServerState::new(&ServerConfig::default(), SpellBook::default(), store));
    (GameLoop::new(Arc::clone(&state), config), state)
}

/// Store that refuses every write.
struct ReadOnlyStore;

impl PlayerStore for ReadOnlyStore {
    async fn load_player(&self, _id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(None)
    }

    async fn save_player(&self, _record: &PlayerRecord) -> Result<(), StoreError> {
        Err(StoreError::Backend("read-only".into()))
    }
}

// =========================================================================
// Inactivity prune
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_tick_prunes_player_idle_31s() {
    let (game, state) = game_loop(MemoryStore::new(), strict_config());
    state.players().add(Player::new(PlayerId(1))).await;

    tokio::time::advance(Duration::from_secs(31)).await;
    let report = game.tick().await;

    assert_eq!(report.pruned, vec![PlayerId(1)]);
    assert!(!state.players().contains(PlayerId(1)).await);
}

#[tokio::test(start_paused = true)]
async fn test_tick_keeps_player_idle_10s() {
    let (game, state) = game_loop(MemoryStore::new(), strict_config());
    state.players().add(Player::new(PlayerId(1))).await;

    tokio::time::advance(Duration::from_secs(10)).await;
    let report = game.tick().await;

    assert_eq!(report, TickReport::default());
    assert!(state.players().contains(PlayerId(1)).await);
}

#[tokio::test(start_paused = true)]
async fn test_tick_prunes_only_idle_players() {
    let (game, state) = game_loop(MemoryStore::new(), strict_config());
    state.players().add(Player::new(PlayerId(1))).await;

    tokio::time::advance(Duration::from_secs(20)).await;
    state.players().add(Player::new(PlayerId(2))).await;
    tokio::time::advance(Duration::from_secs(11)).await;

    let report = game.tick().await;
    assert_eq!(report.pruned, vec![PlayerId(1)]);
    assert!(state.players().contains(PlayerId(2)).await);
}

#[tokio::test(start_paused = true)]
async fn test_tick_saves_pruned_player() {
    let (game, state) = game_loop(MemoryStore::new(), strict_config());
    let mut player = Player::new(PlayerId(5));
    player.name = "Idle".into();
    player.x = 7.0;
    state.players().add(player).await;

    tokio::time::advance(Duration::from_secs(31)).await;
    game.tick().await;

    let record = state.store().load_player(PlayerId(5)).await.unwrap().unwrap();
    assert_eq!(record.name, "Idle");
    assert_eq!(record.x, 7.0);
}

#[tokio::test(start_paused = true)]
async fn test_tick_prune_removes_arena_entry() {
    let (game, state) = game_loop(MemoryStore::new(), strict_config());
    state.players().add(Player::new(PlayerId(1))).await;
    let arena = state.arenas().get_arena(ArenaId(2)).await.unwrap();
    arena.add_player(PlayerId(1), Team::Balance).await.unwrap();

    tokio::time::advance(Duration::from_secs(31)).await;
    game.tick().await;

    assert_eq!(arena.player_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_tick_save_failure_still_prunes() {
    let (game, state) = game_loop(ReadOnlyStore, strict_config());
    state.players().add(Player::new(PlayerId(1))).await;

    tokio::time::advance(Duration::from_secs(31)).await;
    let report = game.tick().await;

    assert_eq!(report.pruned, vec![PlayerId(1)]);
    assert!(state.players().is_empty().await);
}

// =========================================================================
// Regeneration and activity
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_tick_default_config_regen_counts_as_activity() {
    let (game, state) = game_loop(MemoryStore::new(), GameLoopConfig::default());
    state.players().add(Player::new(PlayerId(1))).await;

    game.tick().await;
    tokio::time::advance(Duration::from_secs(31)).await;
    // The previous tick refreshed activity, but 31 s have passed since.
    assert_eq!(game.tick().await.pruned, vec![PlayerId(1)]);
}

#[tokio::test(start_paused = true)]
async fn test_tick_strict_config_regen_leaves_activity_alone() {
    let (game, state) = game_loop(MemoryStore::new(), strict_config());
    let mut player = Player::new(PlayerId(1));
    player.set_health(10);
    state.players().add(player).await;

    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(5)).await;
        game.tick().await;
    }

    let player = state.players().get(PlayerId(1)).await.unwrap();
    assert_eq!(player.health, 15);
    assert_eq!(player.idle_for(), Duration::from_secs(25));
}

// =========================================================================
// run()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_run_ticks_in_background() {
    let (game, state) = game_loop(MemoryStore::new(), GameLoopConfig::default());
    let mut player = Player::new(PlayerId(1));
    player.set_health(0);
    state.players().add(player).await;

    let handle = tokio::spawn(game.run());
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.abort();

    let health = state.players().get(PlayerId(1)).await.unwrap().health;
    assert!(health >= 25, "expected about 30 ticks of regen, got {health}");
}

#[tokio::test(start_paused = true)]
async fn test_run_with_drop_policy_and_jitter_ticks() {
    let config = GameLoopConfig {
        tick: TickConfig {
            tick_rate_hz: 20,
            policy: TickPolicy::Drop,
            initial_jitter_us: 10_000,
            ..TickConfig::default()
        },
        ..GameLoopConfig::default()
    };
    let (game, state) = game_loop(MemoryStore::new(), config);
    let mut player = Player::new(PlayerId(1));
    player.set_health(0);
    state.players().add(player).await;

    let handle = tokio::spawn(game.run());
    tokio::time::sleep(Duration::from_millis(1000)).await;
    handle.abort();

    // 20 Hz for one second, minus at most one tick lost to jitter.
    let health = state.players().get(PlayerId(1)).await.unwrap().health;
    assert!((18..=20).contains(&health), "expected about 20 ticks, got {health}");
}
