//! The per-player record and its persisted subset.

use serde::{Deserialize, Serialize};
use splat_protocol::PlayerId;
use splat_transport::ConnectionId;
use tokio::time::Instant;

/// Health never rises above this value.
pub const MAX_HEALTH: u32 = 100;

/// One connected player, as the server sees it.
///
/// Created when a connection is accepted and removed on logout,
/// disconnect, or inactivity prune.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Always within `0..=MAX_HEALTH`. Use [`set_health`](Self::set_health)
    /// or [`heal`](Self::heal) rather than assigning directly.
    pub health: u32,
    /// Last time this player did something. The inactivity prune keys
    /// off this.
    pub last_seen: Instant,
    /// The connection this player arrived on, if any.
    pub connection: Option<ConnectionId>,
}

impl Player {
    /// A fresh player: default name `Player{id}`, at the origin, full
    /// health, active as of now.
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            name: format!("Player{}", id.0),
            x: 0.0,
            y: 0.0,
            health: MAX_HEALTH,
            last_seen: Instant::now(),
            connection: None,
        }
    }

    /// Attaches the connection handle.
    pub fn with_connection(mut self, connection: ConnectionId) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(MAX_HEALTH);
    }

    /// Adds `amount` health, capped at [`MAX_HEALTH`].
    pub fn heal(&mut self, amount: u32) {
        self.set_health(self.health.saturating_add(amount));
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// How long since this player was last active.
    pub fn idle_for(&self) -> std::time::Duration {
        self.last_seen.elapsed()
    }

    /// The persisted subset of this player.
    pub fn record(&self) -> PlayerRecord {
        PlayerRecord {
            id: self.id,
            name: self.name.clone(),
            x: self.x,
            y: self.y,
            health: self.health,
        }
    }

    /// Adopts the name, position and health of a stored record.
    pub fn apply_record(&mut self, record: &PlayerRecord) {
        self.name.clone_from(&record.name);
        self.x = record.x;
        self.y = record.y;
        self.set_health(record.health);
    }
}

/// The part of a [`Player`] that survives across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub health: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_player_has_defaults() {
        let p = Player::new(PlayerId(4));
        assert_eq!(p.name, "Player4");
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert_eq!(p.health, MAX_HEALTH);
        assert!(p.connection.is_none());
    }

    #[tokio::test]
    async fn test_heal_caps_at_max() {
        let mut p = Player::new(PlayerId(1));
        p.set_health(99);
        p.heal(5);
        assert_eq!(p.health, MAX_HEALTH);
    }

    #[tokio::test]
    async fn test_set_health_clamps_above_max() {
        let mut p = Player::new(PlayerId(1));
        p.set_health(250);
        assert_eq!(p.health, MAX_HEALTH);
    }

    #[tokio::test]
    async fn test_apply_record_adopts_stored_state() {
        let mut p = Player::new(PlayerId(9));
        p.apply_record(&PlayerRecord {
            id: PlayerId(9),
            name: "Alice".into(),
            x: 3.0,
            y: -1.0,
            health: 40,
        });
        assert_eq!(p.name, "Alice");
        assert_eq!((p.x, p.y), (3.0, -1.0));
        assert_eq!(p.health, 40);
        assert_eq!(p.record().name, "Alice");
    }

    #[test]
    fn test_record_serializes_with_plain_id() {
        let record = PlayerRecord {
            id: PlayerId(2),
            name: "Bob".into(),
            x: 0.0,
            y: 0.0,
            health: 100,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["name"], "Bob");
    }
}
