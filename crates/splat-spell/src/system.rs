//! Live spell casts and cooldowns.

use std::collections::HashMap;
use std::time::Duration;

use splat_protocol::{PlayerId, SpellId, SpellInstanceId};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{Spell, SpellBook, SpellError};

/// A request to cast a spell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastRequest {
    pub caster: PlayerId,
    pub spell: SpellId,
    pub target_x: f64,
    pub target_y: f64,
    pub target: PlayerId,
    /// Where the caster stands. Projectiles start here and fly toward the
    /// target point; without it they start at the target, motionless.
    pub origin: Option<(f64, f64)>,
}

impl CastRequest {
    pub fn new(caster: PlayerId, spell: SpellId, target_x: f64, target_y: f64, target: PlayerId) -> Self {
        Self {
            caster,
            spell,
            target_x,
            target_y,
            target,
            origin: None,
        }
    }

    pub fn from_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = Some((x, y));
        self
    }
}

/// One live cast.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellInstance {
    pub id: SpellInstanceId,
    pub spell: SpellId,
    pub caster: PlayerId,
    pub target: PlayerId,
    pub x: f64,
    pub y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub started_at: Instant,
    pub duration: Duration,
}

impl SpellInstance {
    /// A cast expires once strictly more than its duration has passed.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) > self.duration
    }
}

#[derive(Debug, Default)]
struct SpellState {
    next_instance_id: u64,
    active: HashMap<SpellInstanceId, SpellInstance>,
    /// Earliest time each (player, spell) pair may cast again.
    cooldowns: HashMap<(PlayerId, SpellId), Instant>,
}

/// Tracks live casts and per-player cooldowns.
///
/// Both tables sit behind one mutex. That is what makes
/// [`cast_spell`](Self::cast_spell) atomic: no other cast can slip between
/// its cooldown check and its cooldown write.
#[derive(Debug)]
pub struct SpellSystem {
    book: SpellBook,
    state: Mutex<SpellState>,
}

impl Default for SpellSystem {
    fn default() -> Self {
        Self::new(SpellBook::default())
    }
}

impl SpellSystem {
    pub fn new(book: SpellBook) -> Self {
        Self {
            book,
            state: Mutex::new(SpellState {
                next_instance_id: 1,
                ..SpellState::default()
            }),
        }
    }

    pub fn book(&self) -> &SpellBook {
        &self.book
    }

    pub fn spell(&self, id: SpellId) -> Option<&Spell> {
        self.book.get(id)
    }

    /// All spell definitions, in ascending id order.
    pub fn spells(&self) -> impl Iterator<Item = &Spell> {
        self.book.iter()
    }

    /// Casts a spell.
    ///
    /// On success the new instance is already registered and the caster's
    /// cooldown for this spell runs until `now + spell.cooldown`.
    ///
    /// # Errors
    /// - [`SpellError::UnknownSpell`] if the book has no such spell
    /// - [`SpellError::OnCooldown`] if the caster's cooldown hasn't run out
    pub async fn cast_spell(&self, request: CastRequest) -> Result<SpellInstance, SpellError> {
        let spell = self
            .book
            .get(request.spell)
            .ok_or(SpellError::UnknownSpell(request.spell))?;

        let mut state = self.state.lock().await;
        let now = Instant::now();
        let key = (request.caster, request.spell);

        if let Some(&ready_at) = state.cooldowns.get(&key) {
            if ready_at > now {
                return Err(SpellError::OnCooldown {
                    spell: request.spell,
                    remaining: ready_at - now,
                });
            }
        }

        let id = SpellInstanceId(state.next_instance_id);
        state.next_instance_id += 1;

        let ((x, y), (velocity_x, velocity_y)) = launch(spell, &request);
        let instance = SpellInstance {
            id,
            spell: request.spell,
            caster: request.caster,
            target: request.target,
            x,
            y,
            velocity_x,
            velocity_y,
            started_at: now,
            duration: spell.duration,
        };
        state.active.insert(id, instance.clone());
        state.cooldowns.insert(key, now + spell.cooldown);
        drop(state);

        tracing::debug!(
            caster = %request.caster,
            spell = %request.spell,
            instance = %id,
            "spell cast"
        );
        Ok(instance)
    }

    /// Advances every projectile by `delta` and drops expired casts.
    ///
    /// Returns the ids of the casts that expired, in ascending order.
    pub async fn update_active_spells(&self, delta: Duration) -> Vec<SpellInstanceId> {
        let secs = delta.as_secs_f64();
        let now = Instant::now();
        let mut expired = Vec::new();

        let mut state = self.state.lock().await;
        state.active.retain(|&id, instance| {
            if self.book.get(instance.spell).is_some_and(Spell::is_projectile) {
                instance.x += instance.velocity_x * secs;
                instance.y += instance.velocity_y * secs;
            }
            if instance.is_expired(now) {
                expired.push(id);
                false
            } else {
                true
            }
        });
        drop(state);

        expired.sort_unstable();
        if !expired.is_empty() {
            tracing::trace!(count = expired.len(), "spell instances expired");
        }
        expired
    }

    /// Snapshot of all live casts, in ascending id order.
    pub async fn active_spells(&self) -> Vec<SpellInstance> {
        let mut spells: Vec<_> = self.state.lock().await.active.values().cloned().collect();
        spells.sort_unstable_by_key(|s| s.id);
        spells
    }

    pub async fn active_count(&self) -> usize {
        self.state.lock().await.active.len()
    }

    /// Drops a live cast early. Returns the removed instance, if any.
    pub async fn remove_spell(&self, id: SpellInstanceId) -> Option<SpellInstance> {
        self.state.lock().await.active.remove(&id)
    }

    /// Copy of a player's cooldown table: spell → earliest recast time.
    ///
    /// Entries whose time has passed are still listed; they no longer
    /// block anything.
    pub async fn cooldowns(&self, player: PlayerId) -> HashMap<SpellId, Instant> {
        self.state
            .lock()
            .await
            .cooldowns
            .iter()
            .filter(|((p, _), _)| *p == player)
            .map(|(&(_, spell), &ready_at)| (spell, ready_at))
            .collect()
    }

    /// Time left before `player` can cast `spell` again, or `None` if
    /// they can cast it now.
    pub async fn cooldown_remaining(&self, player: PlayerId, spell: SpellId) -> Option<Duration> {
        let ready_at = *self.state.lock().await.cooldowns.get(&(player, spell))?;
        let now = Instant::now();
        (ready_at > now).then(|| ready_at - now)
    }
}

/// Starting position and velocity for a new cast.
fn launch(spell: &Spell, request: &CastRequest) -> ((f64, f64), (f64, f64)) {
    let target = (request.target_x, request.target_y);
    let Some(origin) = request.origin.filter(|_| spell.is_projectile()) else {
        return (target, (0.0, 0.0));
    };

    let dx = target.0 - origin.0;
    let dy = target.1 - origin.1;
    let distance = dx.hypot(dy);
    if distance == 0.0 {
        return (origin, (0.0, 0.0));
    }
    let scale = spell.speed / distance;
    (origin, (dx * scale, dy * scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast(caster: u32, spell: u32) -> CastRequest {
        CastRequest::new(PlayerId(caster), SpellId(spell), 30.0, 40.0, PlayerId(0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_cast_spell_without_origin_sits_at_target() {
        let system = SpellSystem::default();
        let instance = system.cast_spell(cast(1, 1)).await.unwrap();

        assert_eq!((instance.x, instance.y), (30.0, 40.0));
        assert_eq!((instance.velocity_x, instance.velocity_y), (0.0, 0.0));
        assert_eq!(instance.duration, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cast_spell_with_origin_flies_toward_target() {
        let system = SpellSystem::default();
        // Fire Bolt, speed 200, 3-4-5 triangle.
        let instance = system
            .cast_spell(cast(1, 1).from_origin(0.0, 0.0))
            .await
            .unwrap();

        assert_eq!((instance.x, instance.y), (0.0, 0.0));
        assert!((instance.velocity_x - 120.0).abs() < 1e-9);
        assert!((instance.velocity_y - 160.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cast_spell_origin_ignored_for_stationary_spell() {
        let system = SpellSystem::default();
        // Heal has speed 0.
        let instance = system
            .cast_spell(cast(1, 2).from_origin(0.0, 0.0))
            .await
            .unwrap();
        assert_eq!((instance.x, instance.y), (30.0, 40.0));
        assert_eq!(instance.velocity_x, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_active_spells_moves_projectiles() {
        let system = SpellSystem::default();
        system
            .cast_spell(cast(1, 1).from_origin(0.0, 0.0))
            .await
            .unwrap();

        system.update_active_spells(Duration::from_millis(500)).await;

        let active = system.active_spells().await;
        assert!((active[0].x - 60.0).abs() < 1e-9);
        assert!((active[0].y - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_expired_requires_strictly_more_than_duration() {
        let start = Instant::now();
        let instance = SpellInstance {
            id: SpellInstanceId(1),
            spell: SpellId(1),
            caster: PlayerId(1),
            target: PlayerId(0),
            x: 0.0,
            y: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            started_at: start,
            duration: Duration::from_secs(2),
        };
        assert!(!instance.is_expired(start + Duration::from_secs(2)));
        assert!(instance.is_expired(start + Duration::from_millis(2001)));
    }
}
