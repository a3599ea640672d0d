//! Enemy state: regular spawns, elites, bosses, and boss projectiles.

use arrayvec::ArrayVec;
use bitflags::bitflags;
use strum::EnumIter;

use crate::element::ElementSet;
use crate::geom::Vec2;
use crate::status::StatusSlots;

bitflags! {
    /// Enemy role flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EnemyFlags: u8 {
        const BOSS = 1 << 0;
        const ELITE = 1 << 1;
        /// Boss ring projectile: harms the player, not targetable by
        /// bullets, culled offscreen instead of ending the run.
        const PROJECTILE = 1 << 2;
    }
}

/// Elite modifiers, rolled at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum EliteAffix {
    /// Moves faster.
    Fast,
    /// More max hp.
    Thick,
    /// Spawns children when dropping below the hp threshold.
    Splitter,
    /// Takes reduced damage.
    Resistant,
    /// Periodically heals nearby non-boss enemies.
    Healer,
}

pub const MAX_ELITE_AFFIXES: usize = 4;

/// One live enemy.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub flags: EnemyFlags,
    pub affixes: ArrayVec<EliteAffix, MAX_ELITE_AFFIXES>,
    pub elements: ElementSet,
    pub status: StatusSlots,
    /// Splitter children spawn once, on the crossing below the threshold.
    pub split_triggered: bool,
    /// Bitmask over boss phase thresholds already fired.
    pub phases_fired: u8,
    /// Next cooldown-driven boss ring.
    pub next_ring_at: u64,
    /// Healer pulse bookkeeping.
    pub next_heal_at: u64,
    pub heals_this_wave: u8,
}

impl Enemy {
    pub fn spawn(pos: Vec2, vel: Vec2, hp: f32, elements: ElementSet) -> Self {
        Self {
            pos,
            vel,
            hp,
            max_hp: hp,
            flags: EnemyFlags::empty(),
            affixes: ArrayVec::new(),
            elements,
            status: StatusSlots::default(),
            split_triggered: false,
            phases_fired: 0,
            next_ring_at: 0,
            next_heal_at: 0,
            heals_this_wave: 0,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.flags.contains(EnemyFlags::BOSS)
    }

    pub fn is_elite(&self) -> bool {
        self.flags.contains(EnemyFlags::ELITE)
    }

    pub fn is_projectile(&self) -> bool {
        self.flags.contains(EnemyFlags::PROJECTILE)
    }

    /// Bullets only target real enemies, not boss projectiles.
    pub fn is_targetable(&self) -> bool {
        !self.is_projectile()
    }

    pub fn has_affix(&self, affix: EliteAffix) -> bool {
        self.affixes.contains(&affix)
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        self.hp / self.max_hp
    }
}
