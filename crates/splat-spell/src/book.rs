//! Static spell definitions.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use splat_protocol::SpellId;

/// What a spell does when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellEffect {
    Damage,
    Healing,
    Speed,
    Shield,
    Slow,
    Stun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Cold,
    Light,
    Void,
    Holy,
    Earth,
    Nature,
    Air,
    Mana,
}

/// Who a spell may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Enemy,
    Ally,
    /// Only the caster.
    Caster,
}

/// How a spell travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Appears at the target immediately.
    Instant,
    Bolt,
    Ball,
    Wave,
}

/// One immutable spell definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: SpellId,
    pub name: String,
    pub description: String,
    pub effect: SpellEffect,
    pub element: Element,
    pub targets: TargetKind,
    pub projectile: ProjectileKind,
    pub damage: u32,
    pub healing: u32,
    /// How long a cast stays live. Zero means it expires on the first
    /// update after the cast.
    pub duration: Duration,
    pub cooldown: Duration,
    pub range: f64,
    /// Units per second. Zero means the cast never moves.
    pub speed: f64,
}

impl Spell {
    /// Whether casts of this spell move each update.
    pub fn is_projectile(&self) -> bool {
        self.speed > 0.0
    }
}

/// The set of spells the server knows, keyed and iterated by id.
#[derive(Debug, Clone)]
pub struct SpellBook {
    spells: BTreeMap<SpellId, Spell>,
}

impl SpellBook {
    /// Builds a book from definitions. A later definition with a repeated
    /// id replaces the earlier one.
    pub fn new(spells: impl IntoIterator<Item = Spell>) -> Self {
        Self {
            spells: spells.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    pub fn get(&self, id: SpellId) -> Option<&Spell> {
        self.spells.get(&id)
    }

    /// All spells, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.values()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}

impl Default for SpellBook {
    /// The five standard spells.
    fn default() -> Self {
        Self::new([
            Spell {
                id: SpellId(1),
                name: "Fire Bolt".into(),
                description: "Launches a bolt of fire".into(),
                effect: SpellEffect::Damage,
                element: Element::Fire,
                targets: TargetKind::Enemy,
                projectile: ProjectileKind::Bolt,
                damage: 25,
                healing: 0,
                duration: Duration::from_secs(2),
                cooldown: Duration::from_secs(1),
                range: 100.0,
                speed: 200.0,
            },
            Spell {
                id: SpellId(2),
                name: "Heal".into(),
                description: "Restores health to an ally".into(),
                effect: SpellEffect::Healing,
                element: Element::Holy,
                targets: TargetKind::Ally,
                projectile: ProjectileKind::Instant,
                damage: 0,
                healing: 30,
                duration: Duration::ZERO,
                cooldown: Duration::from_secs(3),
                range: 50.0,
                speed: 0.0,
            },
            Spell {
                id: SpellId(3),
                name: "Speed Boost".into(),
                description: "Increases movement speed".into(),
                effect: SpellEffect::Speed,
                element: Element::Air,
                targets: TargetKind::Caster,
                projectile: ProjectileKind::Instant,
                damage: 0,
                healing: 0,
                duration: Duration::from_secs(10),
                cooldown: Duration::from_secs(15),
                range: 0.0,
                speed: 0.0,
            },
            Spell {
                id: SpellId(4),
                name: "Ice Blast".into(),
                description: "Freezes and damages enemies".into(),
                effect: SpellEffect::Slow,
                element: Element::Cold,
                targets: TargetKind::Enemy,
                projectile: ProjectileKind::Ball,
                damage: 20,
                healing: 0,
                duration: Duration::from_secs(3),
                cooldown: Duration::from_secs(2),
                range: 80.0,
                speed: 150.0,
            },
            Spell {
                id: SpellId(5),
                name: "Lightning Strike".into(),
                description: "Instant lightning damage".into(),
                effect: SpellEffect::Damage,
                element: Element::Light,
                targets: TargetKind::Enemy,
                projectile: ProjectileKind::Instant,
                damage: 40,
                healing: 0,
                duration: Duration::ZERO,
                cooldown: Duration::from_secs(4),
                range: 60.0,
                speed: 0.0,
            },
        ])
    }
}
