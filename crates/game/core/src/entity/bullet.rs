//! Player bullet state.

use crate::element::ElementSet;
use crate::geom::Vec2;

/// One live bullet.
///
/// Damage decays from `base_damage` as the bullet pierces and rebounds,
/// but never below the configured fraction of base.
#[derive(Clone, Copy, Debug)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub base_damage: f32,
    pub penetration_left: u32,
    pub rebound_left: u32,
    pub is_split_child: bool,
    pub born_at: u64,
    /// Next sim time this bullet may register a hit.
    pub hit_cooldown_until: u64,
    /// Last split event on this bullet's lineage.
    pub last_split_at: u64,
    pub elements: ElementSet,
    /// AOE-blast damage; bosses resist it.
    pub from_aoe: bool,
}

impl Bullet {
    pub fn spawn(pos: Vec2, vel: Vec2, damage: f32, elements: ElementSet, now: u64) -> Self {
        Self {
            pos,
            vel,
            damage,
            base_damage: damage,
            penetration_left: 0,
            rebound_left: 0,
            is_split_child: false,
            born_at: now,
            hit_cooldown_until: now,
            last_split_at: 0,
            elements,
            from_aoe: false,
        }
    }

    /// Lowest damage decay may take this bullet to.
    pub fn damage_floor(&self, min_ratio: f32) -> f32 {
        self.base_damage * min_ratio
    }
}
