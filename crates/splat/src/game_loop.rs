//! The fixed-rate world update.
//!
//! Every tick, in order:
//!   1. Prune players idle past the inactivity timeout (saved first)
//!   2. Regenerate health for everyone left
//!   3. Tick arenas (auto-start)
//!   4. Advance active spells by a fixed step

use std::sync::Arc;

use splat_player::PlayerStore;
use splat_protocol::{ArenaId, PlayerId, SpellInstanceId};
use splat_tick::TickScheduler;

use crate::{GameLoopConfig, ServerState};

/// What one tick changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Players removed for inactivity.
    pub pruned: Vec<PlayerId>,
    /// Arenas that went from Waiting to Active.
    pub started: Vec<ArenaId>,
    /// Spell casts that ran out.
    pub expired: Vec<SpellInstanceId>,
}

/// Drives periodic updates of the shared world state.
pub struct GameLoop<S: PlayerStore> {
    state: Arc<ServerState<S>>,
    config: GameLoopConfig,
}

impl<S: PlayerStore> GameLoop<S> {
    pub fn new(state: Arc<ServerState<S>>, config: GameLoopConfig) -> Self {
        Self { state, config }
    }

    /// Performs one tick.
    pub async fn tick(&self) -> TickReport {
        let state = &self.state;

        let pruned = state
            .players()
            .prune_inactive(self.config.inactivity_timeout)
            .await;
        let mut pruned_ids = Vec::with_capacity(pruned.len());
        for player in pruned {
            tracing::info!(
                player_id = %player.id,
                name = %player.name,
                idle_secs = player.idle_for().as_secs(),
                "player timed out"
            );
            if let Err(e) = state.store().save_player(&player.record()).await {
                tracing::warn!(player_id = %player.id, error = %e, "failed to save timed out player");
            }
            state.arenas().remove_player_everywhere(player.id).await;
            pruned_ids.push(player.id);
        }

        state
            .players()
            .regenerate(self.config.regen_amount, self.config.regen_refreshes_activity)
            .await;

        let started = state.arenas().tick().await;
        let expired = state
            .spells()
            .update_active_spells(self.config.spell_delta)
            .await;

        TickReport {
            pruned: pruned_ids,
            started,
            expired,
        }
    }

    /// Ticks forever at the configured rate.
    pub async fn run(self) {
        let mut scheduler = TickScheduler::new(self.config.tick.clone());
        tracing::info!(
            rate_hz = scheduler.tick_rate_hz(),
            policy = ?self.config.tick.policy,
            "game loop started"
        );
        // One metrics summary per minute of ticks.
        let summary_every = u64::from(scheduler.tick_rate_hz()) * 60;

        loop {
            let info = scheduler.wait_for_tick().await;
            let report = self.tick().await;
            scheduler.record_tick_end();

            tracing::trace!(
                tick = info.tick,
                pruned = report.pruned.len(),
                started = report.started.len(),
                expired = report.expired.len(),
                "world updated"
            );

            if info.tick % summary_every == 0 {
                let metrics = scheduler.metrics();
                tracing::debug!(
                    ticks = metrics.total_ticks,
                    overruns = metrics.total_overruns,
                    skipped = metrics.total_skipped,
                    avg_ms = metrics.avg_tick_time.as_secs_f64() * 1000.0,
                    max_ms = metrics.max_tick_time.as_secs_f64() * 1000.0,
                    "game loop metrics"
                );
            }
        }
    }
}
