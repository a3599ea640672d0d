//! Resolved combat statistics and the modifier aggregation pipeline.
//!
//! Every bonus source (meta shop, equipped items, socketed gems, set
//! bonuses, daily-challenge rules) is folded into one [`StatBundle`] at
//! aggregation time. Combat and firing code read the bundle; they never
//! consult the sources directly.

mod aggregator;

pub use aggregator::{aggregate, AggregatorInput, ResolvedLoadout};

use strum::{EnumIter, IntoEnumIterator};

/// Identifier for a single modifiable statistic.
///
/// Affix maps on items and gems are keyed by this; the order is stable so
/// `BTreeMap<StatKey, f32>` iterates deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatKey {
    /// Flat damage added before multipliers.
    DamageFlat,
    /// Fractional damage increase (0.08 = +8%), folded multiplicatively.
    DamageMul,
    /// Fractional fire-interval reduction (0.1 = 10% faster).
    FireRateMul,
    /// Extra penetration charges.
    PenetrationAdd,
    /// Extra rebound charges.
    ReboundAdd,
    /// Fractional bonus to split-child damage ratio.
    SplitChildMul,
    /// Fractional bonus to AOE blast radius/damage scale.
    AoeScaleMul,
    /// Additive loot-drop chance.
    LootChanceAdd,
    /// Fractional bonus to drone damage.
    DroneDamageMul,
    /// Fractional reduction of shield recharge time.
    ShieldCooldownMul,
    /// Fractional bonus to damage-over-time magnitude.
    StatusDotMul,
    /// Fractional bonus to status effect durations.
    StatusDurationMul,
    /// Additive bonus to expose vulnerability.
    StatusVulnAdd,
    /// Additive raise of the slow-strength cap.
    StatusSlowCapAdd,
    /// Fractional bonus to frozen-explosion damage.
    ExplodePowerMul,
    /// Softens per-pierce damage decay (multiplies the decay factor
    /// toward 1.0); the one multiplicative set bonus.
    PenetrationDecayMul,
}

impl StatKey {
    /// Stable identifier used in config tables and save data.
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::DamageFlat => "damage_flat",
            StatKey::DamageMul => "damage_mul",
            StatKey::FireRateMul => "fire_rate_mul",
            StatKey::PenetrationAdd => "penetration_add",
            StatKey::ReboundAdd => "rebound_add",
            StatKey::SplitChildMul => "split_child_mul",
            StatKey::AoeScaleMul => "aoe_scale_mul",
            StatKey::LootChanceAdd => "loot_chance_add",
            StatKey::DroneDamageMul => "drone_damage_mul",
            StatKey::ShieldCooldownMul => "shield_cooldown_mul",
            StatKey::StatusDotMul => "status_dot_mul",
            StatKey::StatusDurationMul => "status_duration_mul",
            StatKey::StatusVulnAdd => "status_vuln_add",
            StatKey::StatusSlowCapAdd => "status_slow_cap_add",
            StatKey::ExplodePowerMul => "explode_power_mul",
            StatKey::PenetrationDecayMul => "penetration_decay_mul",
        }
    }

    pub fn parse(id: &str) -> Option<StatKey> {
        StatKey::iter().find(|k| k.as_str() == id)
    }
}

/// Status-effect scaling portion of a resolved bundle.
///
/// All factors scale effects upward only; aggregation clamps below-neutral
/// values back to neutral so gear can never weaken the player's statuses.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusPower {
    pub dot_mul: f32,
    pub duration_mul: f32,
    pub vulnerability_add: f32,
    pub slow_cap_add: f32,
    pub explode_mul: f32,
}

impl Default for StatusPower {
    fn default() -> Self {
        Self {
            dot_mul: 1.0,
            duration_mul: 1.0,
            vulnerability_add: 0.0,
            slow_cap_add: 0.0,
            explode_mul: 1.0,
        }
    }
}

/// Fully resolved stat modifiers for the current run.
///
/// Multiplier fields default to 1.0 (neutral), additive fields to 0.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatBundle {
    pub damage_flat: f32,
    pub damage_mul: f32,
    /// Applied to the fire interval; below 1.0 is faster.
    pub fire_rate_mul: f32,
    /// Hard floor on the fire interval; shop unlock can lower it.
    pub fire_interval_floor_ms: u64,
    pub penetration_add: u32,
    pub rebound_add: u32,
    pub split_child_mul: f32,
    pub aoe_scale_mul: f32,
    pub loot_chance_add: f32,
    pub drone_damage_mul: f32,
    pub shield_cooldown_mul: f32,
    pub status: StatusPower,
    /// Multiplies the per-pierce decay factor toward 1.0; never above 1.0
    /// effective decay.
    pub penetration_decay_mul: f32,
}

impl Default for StatBundle {
    fn default() -> Self {
        Self {
            damage_flat: 0.0,
            damage_mul: 1.0,
            fire_rate_mul: 1.0,
            fire_interval_floor_ms: 0,
            penetration_add: 0,
            rebound_add: 0,
            split_child_mul: 1.0,
            aoe_scale_mul: 1.0,
            loot_chance_add: 0.0,
            drone_damage_mul: 1.0,
            shield_cooldown_mul: 1.0,
            status: StatusPower::default(),
            penetration_decay_mul: 1.0,
        }
    }
}

impl StatBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one keyed modifier into the bundle.
    ///
    /// Additive keys add; fractional keys fold as `×(1 + value)`. Count
    /// keys truncate toward zero.
    pub fn apply(&mut self, key: StatKey, value: f32) {
        match key {
            StatKey::DamageFlat => self.damage_flat += value,
            StatKey::DamageMul => self.damage_mul *= 1.0 + value,
            StatKey::FireRateMul => self.fire_rate_mul *= 1.0 - value,
            StatKey::PenetrationAdd => {
                self.penetration_add += value.max(0.0) as u32;
            }
            StatKey::ReboundAdd => {
                self.rebound_add += value.max(0.0) as u32;
            }
            StatKey::SplitChildMul => self.split_child_mul *= 1.0 + value,
            StatKey::AoeScaleMul => self.aoe_scale_mul *= 1.0 + value,
            StatKey::LootChanceAdd => self.loot_chance_add += value,
            StatKey::DroneDamageMul => self.drone_damage_mul *= 1.0 + value,
            StatKey::ShieldCooldownMul => self.shield_cooldown_mul *= 1.0 - value,
            StatKey::StatusDotMul => self.status.dot_mul *= 1.0 + value,
            StatKey::StatusDurationMul => self.status.duration_mul *= 1.0 + value,
            StatKey::StatusVulnAdd => self.status.vulnerability_add += value,
            StatKey::StatusSlowCapAdd => self.status.slow_cap_add += value,
            StatKey::ExplodePowerMul => self.status.explode_mul *= 1.0 + value,
            StatKey::PenetrationDecayMul => self.penetration_decay_mul *= 1.0 + value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_strings() {
        for key in StatKey::iter() {
            assert_eq!(StatKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn default_bundle_is_neutral() {
        let bundle = StatBundle::default();
        assert_eq!(bundle.damage_mul, 1.0);
        assert_eq!(bundle.fire_rate_mul, 1.0);
        assert_eq!(bundle.penetration_add, 0);
        assert_eq!(bundle.status.dot_mul, 1.0);
    }

    #[test]
    fn fractional_keys_fold_multiplicatively() {
        let mut bundle = StatBundle::default();
        bundle.apply(StatKey::DamageMul, 0.10);
        bundle.apply(StatKey::DamageMul, 0.10);
        assert!((bundle.damage_mul - 1.21).abs() < 1e-6);

        bundle.apply(StatKey::FireRateMul, 0.25);
        assert!((bundle.fire_rate_mul - 0.75).abs() < 1e-6);
    }

    #[test]
    fn count_keys_truncate() {
        let mut bundle = StatBundle::default();
        bundle.apply(StatKey::PenetrationAdd, 2.7);
        assert_eq!(bundle.penetration_add, 2);
    }
}
