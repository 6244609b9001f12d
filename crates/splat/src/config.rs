//! Server configuration.
//!
//! Every struct here has a `Default` and `#[serde(default)]`, so a config
//! file only needs the fields it wants to change.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use splat_arena::ArenaConfig;
use splat_protocol::DEFAULT_MAX_PAYLOAD_LEN;
use splat_tick::TickConfig;

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: String,

    pub game_loop: GameLoopConfig,

    pub debug: DebugConfig,

    /// Arenas created at startup.
    pub arenas: Vec<ArenaConfig>,

    /// Largest frame payload accepted from a client. A frame declaring
    /// more than this closes the connection.
    pub max_payload_len: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            game_loop: GameLoopConfig::default(),
            debug: DebugConfig::default(),
            arenas: ArenaConfig::defaults(),
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

/// Configuration for the fixed-rate world update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameLoopConfig {
    /// Tick rate, overrun policy, budget thresholds and start jitter.
    pub tick: TickConfig,

    /// Players idle for longer than this are saved and removed.
    pub inactivity_timeout: Duration,

    /// Health restored to every player each tick.
    pub regen_amount: u32,

    /// Whether regeneration also counts as player activity.
    ///
    /// On by default, which means a connected player is never pruned for
    /// inactivity while the loop runs. Turn it off to prune players who
    /// send nothing.
    pub regen_refreshes_activity: bool,

    /// Time step handed to the spell system each tick, regardless of how
    /// much wall time actually passed.
    pub spell_delta: Duration,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            inactivity_timeout: Duration::from_secs(30),
            regen_amount: 1,
            regen_refreshes_activity: true,
            spell_delta: Duration::from_millis(16),
        }
    }
}

/// Configuration for capturing unrecognized packets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,

    /// Ring buffer size. The oldest capture is dropped when full.
    pub max_packets: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_packets: 100,
        }
    }
}
