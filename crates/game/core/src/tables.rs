//! Balance tables: every tunable number in the simulation.
//!
//! All tables are plain data with serde defaults, so a partial config file
//! overrides only what it names and `BalanceTables::default()` is the
//! complete shipped balance. Loading from disk lives in the content crate;
//! this module only defines the shapes and the defaults.

use crate::achievements::CounterKind;
use crate::element::ElementRules;
use crate::equipment::{EquipSlot, SetDef};
use crate::skill::SkillId;
use crate::stats::StatKey;

// ===== Root =====

/// The complete balance configuration for a run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BalanceTables {
    pub field: FieldTables,
    pub player: PlayerTables,
    pub leveling: LevelingTables,
    pub waves: WaveTables,
    pub boss: BossTables,
    pub elites: EliteTables,
    pub combat: CombatTables,
    pub skills: SkillTables,
    pub status: StatusTables,
    pub elements: ElementRules,
    pub drops: DropTables,
    pub shop: ShopTables,
    pub equipment: EquipmentTables,
    pub gems: GemTables,
    #[cfg_attr(feature = "serde", serde(default = "default_sets"))]
    pub sets: Vec<SetDef>,
    pub daily: DailyTables,
    #[cfg_attr(feature = "serde", serde(default = "default_achievements"))]
    pub achievements: Vec<AchievementDef>,
}

impl Default for BalanceTables {
    fn default() -> Self {
        Self {
            field: FieldTables::default(),
            player: PlayerTables::default(),
            leveling: LevelingTables::default(),
            waves: WaveTables::default(),
            boss: BossTables::default(),
            elites: EliteTables::default(),
            combat: CombatTables::default(),
            skills: SkillTables::default(),
            status: StatusTables::default(),
            elements: ElementRules::default(),
            drops: DropTables::default(),
            shop: ShopTables::default(),
            equipment: EquipmentTables::default(),
            gems: GemTables::default(),
            sets: default_sets(),
            daily: DailyTables::default(),
            achievements: default_achievements(),
        }
    }
}

// ===== Field & player =====

/// Playfield geometry. Origin is top-left; enemies descend toward +y.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FieldTables {
    pub width: f32,
    pub height: f32,
    pub player_x: f32,
    pub player_y: f32,
    /// Extra margin outside the field before a bullet is culled.
    pub cull_margin: f32,
    pub player_radius: f32,
    pub enemy_radius: f32,
    pub bullet_radius: f32,
}

impl Default for FieldTables {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 1600.0,
            player_x: 360.0,
            player_y: 1400.0,
            cull_margin: 64.0,
            player_radius: 24.0,
            enemy_radius: 26.0,
            bullet_radius: 8.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PlayerTables {
    pub base_damage: f32,
    pub base_fire_interval_ms: u64,
    /// Floor on the fire interval as a ratio of the base; the shop unlock
    /// can replace it with a lower ratio.
    pub fire_floor_ratio: f32,
    pub bullet_speed: f32,
}

impl Default for PlayerTables {
    fn default() -> Self {
        Self {
            base_damage: 10.0,
            base_fire_interval_ms: 500,
            fire_floor_ratio: 0.60,
            bullet_speed: 700.0,
        }
    }
}

/// In-run level curve: kills to next level grow geometrically.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LevelingTables {
    pub base_kills: u32,
    pub growth: f32,
    pub max_level: u8,
}

impl Default for LevelingTables {
    fn default() -> Self {
        Self {
            base_kills: 15,
            growth: 1.22,
            max_level: 12,
        }
    }
}

// ===== Waves, boss, elites =====

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct WaveTables {
    pub interval_ms: u64,
    /// Per-wave multipliers on enemy speed and hp.
    pub speed_growth: f32,
    pub hp_growth: f32,
    /// Per-wave multiplier on the spawn interval, toward the floor ratio.
    pub spawn_decay: f32,
    pub spawn_floor_ratio: f32,
    pub base_spawn_interval_ms: u64,
    pub base_enemy_speed: f32,
    pub base_enemy_hp: f32,
    /// Chance a spawned enemy carries a random element.
    pub element_chance: f32,
}

impl Default for WaveTables {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            speed_growth: 1.04,
            hp_growth: 1.06,
            spawn_decay: 0.97,
            spawn_floor_ratio: 0.3,
            base_spawn_interval_ms: 900,
            base_enemy_speed: 120.0,
            base_enemy_hp: 20.0,
            element_chance: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BossTables {
    /// A boss replaces the wave spawn on every Nth wave.
    pub every_n_waves: u32,
    /// Boss hp relative to the wave-scaled enemy hp.
    pub hp_mul: f32,
    pub descent_speed: f32,
    pub drift_speed: f32,
    pub ring_count: u32,
    pub ring_speed: f32,
    pub ring_cooldown_ms: u64,
    /// HP ratios at which the boss fires a ring exactly once each.
    pub phase_thresholds: Vec<f32>,
    /// Damage multiplier on AOE-sourced hits against the boss.
    pub aoe_resist: f32,
}

impl Default for BossTables {
    fn default() -> Self {
        Self {
            every_n_waves: 5,
            hp_mul: 12.0,
            descent_speed: 80.0,
            drift_speed: 140.0,
            ring_count: 14,
            ring_speed: 260.0,
            ring_cooldown_ms: 4500,
            phase_thresholds: vec![0.7, 0.4],
            aoe_resist: 0.75,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EliteTables {
    pub chance: f32,
    pub max_affixes: u8,
    /// Roll weights: fast, thick, splitter, resistant, healer.
    pub affix_weights: [f32; 5],
    pub fast_mul: f32,
    pub thick_mul: f32,
    pub splitter_children: u8,
    /// Children spawn with this fraction of the parent's max hp.
    pub splitter_hp_ratio: f32,
    /// Damage-taken multiplier for resistant elites.
    pub resist_mul: f32,
    pub healer_radius: f32,
    pub healer_heal: f32,
    pub healer_cooldown_ms: u64,
    /// Heal pulses a single healer contributes per wave.
    pub healer_cap_per_wave: u8,
}

impl Default for EliteTables {
    fn default() -> Self {
        Self {
            chance: 0.12,
            max_affixes: 2,
            affix_weights: [1.0, 1.0, 0.7, 0.8, 0.5],
            fast_mul: 1.25,
            thick_mul: 1.3,
            splitter_children: 2,
            splitter_hp_ratio: 0.7,
            resist_mul: 0.8,
            healer_radius: 160.0,
            healer_heal: 8.0,
            healer_cooldown_ms: 5000,
            healer_cap_per_wave: 3,
        }
    }
}

// ===== Combat =====

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CombatTables {
    /// Damage multiplier per target pierced.
    pub penetration_decay: f32,
    /// Damage multiplier per wall rebound.
    pub rebound_decay: f32,
    /// Decay never reduces damage below this fraction of base.
    pub min_damage_ratio: f32,
    /// Per-bullet cooldown between registered hits.
    pub hit_cooldown_ms: u64,
    /// Minimum spacing between split events on a bullet lineage.
    pub split_gap_ms: u64,
    pub split_child_ratio: f32,
    pub split_angle_deg: f32,
    pub rebound_jitter_deg: f32,
    pub bullet_lifetime_ms: u64,
}

impl Default for CombatTables {
    fn default() -> Self {
        Self {
            penetration_decay: 0.9,
            rebound_decay: 0.85,
            min_damage_ratio: 0.5,
            hit_cooldown_ms: 60,
            split_gap_ms: 30,
            split_child_ratio: 0.6,
            split_angle_deg: 15.0,
            rebound_jitter_deg: 4.0,
            bullet_lifetime_ms: 2000,
        }
    }
}

// ===== Skills =====

/// Per-skill level caps.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SkillCaps {
    pub atk_speed: u8,
    pub atk_power: u8,
    pub multi_shot: u8,
    pub scatter: u8,
    pub split: u8,
    pub penetration: u8,
    pub rebound: u8,
    pub defense_shield: u8,
    pub aoe_blast: u8,
}

impl Default for SkillCaps {
    fn default() -> Self {
        Self {
            atk_speed: 5,
            atk_power: 5,
            multi_shot: 5,
            scatter: 5,
            split: 3,
            penetration: 3,
            rebound: 3,
            defense_shield: 3,
            aoe_blast: 5,
        }
    }
}

impl SkillCaps {
    pub fn cap(&self, id: SkillId) -> u8 {
        match id {
            SkillId::AtkSpeed => self.atk_speed,
            SkillId::AtkPower => self.atk_power,
            SkillId::MultiShot => self.multi_shot,
            SkillId::Scatter => self.scatter,
            SkillId::Split => self.split,
            SkillId::Penetration => self.penetration,
            SkillId::Rebound => self.rebound,
            SkillId::DefenseShield => self.defense_shield,
            SkillId::AoeBlast => self.aoe_blast,
        }
    }
}

/// One scatter level: the base angle list and its total damage multiplier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScatterLevel {
    pub angles: Vec<f32>,
    pub total_mul: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SkillTables {
    pub caps: SkillCaps,
    /// Fire interval multiplier per attack-speed level.
    pub fire_interval_mul: f32,
    /// Damage multiplier per attack-power level.
    pub damage_mul: f32,
    /// Scatter angle sets indexed by level-1.
    pub scatter_levels: Vec<ScatterLevel>,
    /// Symmetric jitter (degrees) added per multi-shot level, indexed by
    /// level-1. Used when no scatter fan is active.
    pub multi_jitter_deg: Vec<f32>,
    /// Tighter micro-split offsets used instead of `multi_jitter_deg`
    /// while a scatter fan is active, so extra bullets hug each fan angle
    /// rather than re-spreading the fan.
    pub multi_micro_split_deg: Vec<f32>,
    /// Total-multiplier growth per multi-shot level (`growth^level`).
    pub multi_total_growth: f32,
    pub aoe_interval_ms: u64,
    pub aoe_radius: f32,
    /// AOE damage as a fraction of current bullet damage, per level.
    pub aoe_damage_ratio: f32,
    pub aoe_scale_per_level: f32,
    pub shield_max_charges: u8,
    pub shield_recharge_ms: u64,
}

impl Default for SkillTables {
    fn default() -> Self {
        Self {
            caps: SkillCaps::default(),
            fire_interval_mul: 0.9,
            damage_mul: 1.08,
            scatter_levels: vec![
                ScatterLevel {
                    angles: vec![-8.0, 0.0, 8.0],
                    total_mul: 1.2,
                },
                ScatterLevel {
                    angles: vec![-12.0, -4.0, 4.0, 12.0],
                    total_mul: 1.35,
                },
                ScatterLevel {
                    angles: vec![-16.0, -8.0, 0.0, 8.0, 16.0],
                    total_mul: 1.5,
                },
                ScatterLevel {
                    angles: vec![-20.0, -12.0, -4.0, 4.0, 12.0, 20.0],
                    total_mul: 1.65,
                },
                ScatterLevel {
                    angles: vec![-24.0, -16.0, -8.0, 0.0, 8.0, 16.0, 24.0],
                    total_mul: 1.8,
                },
            ],
            multi_jitter_deg: vec![6.0, 11.0, 17.0, 23.0, 30.0],
            multi_micro_split_deg: vec![2.0, 3.0, 4.5, 5.5, 7.5],
            multi_total_growth: 1.1,
            aoe_interval_ms: 6000,
            aoe_radius: 140.0,
            aoe_damage_ratio: 0.8,
            aoe_scale_per_level: 0.15,
            shield_max_charges: 3,
            shield_recharge_ms: 12_000,
        }
    }
}

// ===== Status effects =====

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BurnTables {
    pub chance: f32,
    pub duration_ms: u64,
    pub tick_ms: u64,
    /// DoT per tick as a fraction of the triggering hit's damage.
    pub damage_ratio: f32,
    /// Boss ticks use this reduced fraction of the normal ratio.
    pub boss_ratio: f32,
}

impl Default for BurnTables {
    fn default() -> Self {
        Self {
            chance: 0.25,
            duration_ms: 2000,
            tick_ms: 500,
            damage_ratio: 0.4,
            boss_ratio: 0.6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FreezeTables {
    pub chance: f32,
    pub duration_ms: u64,
    /// Bosses are slowed instead of frozen, for a shorter duration.
    pub boss_duration_ms: u64,
    pub boss_slow: f32,
}

impl Default for FreezeTables {
    fn default() -> Self {
        Self {
            chance: 0.2,
            duration_ms: 1250,
            boss_duration_ms: 800,
            boss_slow: 0.4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RootTables {
    pub chance: f32,
    pub duration_ms: u64,
    pub boss_duration_ms: u64,
}

impl Default for RootTables {
    fn default() -> Self {
        Self {
            chance: 0.2,
            duration_ms: 1000,
            boss_duration_ms: 600,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ShatterTables {
    pub chance: f32,
    /// One-shot bonus damage fraction consumed by the next hit.
    pub bonus: f32,
}

impl Default for ShatterTables {
    fn default() -> Self {
        Self {
            chance: 0.2,
            bonus: 0.15,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ExposeTables {
    pub chance: f32,
    /// Extra damage taken while exposed.
    pub bonus: f32,
    pub duration_ms: u64,
    pub boss_duration_ms: u64,
}

impl Default for ExposeTables {
    fn default() -> Self {
        Self {
            chance: 0.25,
            bonus: 0.12,
            duration_ms: 4000,
            boss_duration_ms: 6000,
        }
    }
}

/// Fire hit on a frozen target: clear the freeze, debuff the hit, and
/// detonate if the pre-debuff damage clears the threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FrozenExplodeTables {
    pub threshold: f32,
    pub power: f32,
    pub boss_power: f32,
    /// Fractional debuff applied to the triggering hit.
    pub debuff: f32,
    pub radius: f32,
}

impl Default for FrozenExplodeTables {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            power: 0.35,
            boss_power: 0.2,
            debuff: 0.2,
            radius: 120.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StatusTables {
    pub burn: BurnTables,
    pub freeze: FreezeTables,
    pub root: RootTables,
    pub shatter: ShatterTables,
    pub expose: ExposeTables,
    pub frozen_explode: FrozenExplodeTables,
    /// Hard cap on combined slow strength against any target.
    pub slow_cap: f32,
}

impl Default for StatusTables {
    fn default() -> Self {
        Self {
            burn: BurnTables::default(),
            freeze: FreezeTables::default(),
            root: RootTables::default(),
            shatter: ShatterTables::default(),
            expose: ExposeTables::default(),
            frozen_explode: FrozenExplodeTables::default(),
            slow_cap: 0.6,
        }
    }
}

// ===== Drops & shop =====

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DropTables {
    /// Haste-orb drop chance; after loot bonuses, clamped to the cap.
    pub orb_chance: f32,
    pub orb_chance_cap: f32,
    /// Fire interval multiplier while hasted.
    pub haste_mul: f32,
    pub haste_duration_ms: u64,
    pub coins_per_kill: u32,
    pub coins_per_elite: u32,
    pub coins_per_boss: u32,
    pub score_per_kill: u64,
    pub score_per_elite: u64,
    pub score_per_boss: u64,
    /// Score bonus fraction added per kill in the current streak.
    pub combo_score_step: f32,
    /// Ceiling on the streak bonus fraction.
    pub combo_score_cap: f32,
    pub equipment_chance: f32,
    pub gem_chance: f32,
}

impl Default for DropTables {
    fn default() -> Self {
        Self {
            orb_chance: 0.15,
            orb_chance_cap: 0.5,
            haste_mul: 0.75,
            haste_duration_ms: 8000,
            coins_per_kill: 1,
            coins_per_elite: 5,
            coins_per_boss: 25,
            score_per_kill: 10,
            score_per_elite: 50,
            score_per_boss: 500,
            combo_score_step: 0.02,
            combo_score_cap: 1.0,
            equipment_chance: 0.03,
            gem_chance: 0.02,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ShopTables {
    pub damage_step: f32,
    pub damage_max_level: u8,
    pub damage_base_cost: u32,
    /// One-shot unlock lowering the fire floor ratio.
    pub fire_floor_unlocked_ratio: f32,
    pub fire_floor_cost: u32,
    pub loot_step: f32,
    pub loot_max_level: u8,
    pub loot_cap: f32,
    pub loot_base_cost: u32,
}

impl Default for ShopTables {
    fn default() -> Self {
        Self {
            damage_step: 0.08,
            damage_max_level: 10,
            damage_base_cost: 50,
            fire_floor_unlocked_ratio: 0.55,
            fire_floor_cost: 200,
            loot_step: 0.03,
            loot_max_level: 10,
            loot_cap: 0.30,
            loot_base_cost: 30,
        }
    }
}

// ===== Equipment & gems =====

/// One rollable affix: a stat range available to a slot.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffixRange {
    pub slot: EquipSlot,
    pub stat: StatKey,
    pub min: f32,
    pub max: f32,
}

/// Hard ceiling on the total gear-derived bonus for one stat.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatCap {
    pub stat: StatKey,
    pub max: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EquipmentTables {
    pub affix_scale_per_level: f32,
    pub max_level: u8,
    /// Shards to go from level N to N+1, indexed by current level.
    pub upgrade_curve: Vec<u32>,
    /// Shards refunded on salvage, per rarity tier.
    pub salvage_shards: [u32; 4],
    /// Affixes rolled per rarity tier.
    pub affix_count: [u8; 4],
    /// Magnitude multiplier per rarity tier.
    pub tier_scale: [f32; 4],
    pub rarity_weights: [f32; 4],
    /// Chance a rolled item belongs to a set.
    pub set_chance: f32,
    pub affix_pool: Vec<AffixRange>,
    /// Ceilings on the summed item + gem + set bonus per stat.
    pub stat_caps: Vec<StatCap>,
}

impl EquipmentTables {
    /// Ceiling for the combined gear bonus on `stat`, if one is set.
    pub fn stat_cap(&self, stat: StatKey) -> Option<f32> {
        self.stat_caps.iter().find(|c| c.stat == stat).map(|c| c.max)
    }
}

impl Default for EquipmentTables {
    fn default() -> Self {
        Self {
            affix_scale_per_level: 0.08,
            max_level: 10,
            upgrade_curve: vec![0, 3, 6, 10, 15, 21, 28, 36, 45, 55],
            salvage_shards: [1, 3, 8, 20],
            affix_count: [1, 2, 3, 4],
            tier_scale: [1.0, 1.4, 1.9, 2.5],
            rarity_weights: [0.60, 0.28, 0.09, 0.03],
            set_chance: 0.35,
            affix_pool: default_affix_pool(),
            stat_caps: default_stat_caps(),
        }
    }
}

fn default_stat_caps() -> Vec<StatCap> {
    use StatKey::*;
    vec![
        StatCap { stat: DamageFlat, max: 25.0 },
        StatCap { stat: DamageMul, max: 1.0 },
        StatCap { stat: FireRateMul, max: 0.35 },
        StatCap { stat: PenetrationAdd, max: 4.0 },
        StatCap { stat: ReboundAdd, max: 4.0 },
        StatCap { stat: SplitChildMul, max: 0.5 },
        StatCap { stat: AoeScaleMul, max: 0.8 },
        StatCap { stat: LootChanceAdd, max: 0.25 },
        StatCap { stat: DroneDamageMul, max: 0.8 },
        StatCap { stat: ShieldCooldownMul, max: 0.5 },
        StatCap { stat: StatusDotMul, max: 0.6 },
        StatCap { stat: StatusDurationMul, max: 0.5 },
        StatCap { stat: StatusVulnAdd, max: 0.2 },
        StatCap { stat: StatusSlowCapAdd, max: 0.2 },
        StatCap { stat: ExplodePowerMul, max: 0.8 },
        StatCap { stat: PenetrationDecayMul, max: 0.15 },
    ]
}

fn default_affix_pool() -> Vec<AffixRange> {
    use EquipSlot::*;
    use StatKey::*;
    vec![
        AffixRange { slot: Weapon, stat: DamageMul, min: 0.04, max: 0.08 },
        AffixRange { slot: Weapon, stat: DamageFlat, min: 1.0, max: 3.0 },
        AffixRange { slot: Weapon, stat: FireRateMul, min: 0.02, max: 0.05 },
        AffixRange { slot: Core, stat: FireRateMul, min: 0.03, max: 0.06 },
        AffixRange { slot: Core, stat: AoeScaleMul, min: 0.05, max: 0.12 },
        AffixRange { slot: Core, stat: SplitChildMul, min: 0.05, max: 0.10 },
        AffixRange { slot: Module, stat: PenetrationAdd, min: 1.0, max: 2.0 },
        AffixRange { slot: Module, stat: ReboundAdd, min: 1.0, max: 2.0 },
        AffixRange { slot: Module, stat: StatusDotMul, min: 0.08, max: 0.15 },
        AffixRange { slot: Module, stat: StatusDurationMul, min: 0.05, max: 0.12 },
        AffixRange { slot: Charm, stat: LootChanceAdd, min: 0.02, max: 0.05 },
        AffixRange { slot: Charm, stat: ShieldCooldownMul, min: 0.05, max: 0.10 },
        AffixRange { slot: Charm, stat: DroneDamageMul, min: 0.05, max: 0.12 },
        AffixRange { slot: Charm, stat: StatusVulnAdd, min: 0.02, max: 0.05 },
    ]
}

/// One gem stat option: the base magnitude at tier 1.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GemStatDef {
    pub stat: StatKey,
    pub base: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GemTables {
    pub tier_scale: [f32; 4],
    pub sockets_by_rarity: [u8; 4],
    /// Legend items at or past this level gain one extra socket.
    pub legend_bonus_level: u8,
    pub max_sockets: u8,
    pub element_chance: f32,
    pub stat_pool: Vec<GemStatDef>,
}

impl Default for GemTables {
    fn default() -> Self {
        use StatKey::*;
        Self {
            tier_scale: [1.0, 1.6, 2.4, 3.5],
            sockets_by_rarity: [2, 3, 4, 5],
            legend_bonus_level: 8,
            max_sockets: 6,
            element_chance: 0.3,
            stat_pool: vec![
                GemStatDef { stat: DamageMul, base: 0.03 },
                GemStatDef { stat: FireRateMul, base: 0.02 },
                GemStatDef { stat: LootChanceAdd, base: 0.02 },
                GemStatDef { stat: StatusDotMul, base: 0.05 },
                GemStatDef { stat: StatusDurationMul, base: 0.04 },
                GemStatDef { stat: ExplodePowerMul, base: 0.06 },
            ],
        }
    }
}

fn default_sets() -> Vec<SetDef> {
    use crate::equipment::SetBonus;
    use StatKey::*;
    vec![
        SetDef {
            id: "ember".into(),
            name: "Ember Vanguard".into(),
            bonuses: vec![
                SetBonus { pieces: 2, stat: DamageMul, value: 0.05 },
                SetBonus { pieces: 4, stat: ExplodePowerMul, value: 0.15 },
            ],
        },
        SetDef {
            id: "lance".into(),
            name: "Piercing Lance".into(),
            bonuses: vec![
                SetBonus { pieces: 2, stat: PenetrationAdd, value: 1.0 },
                SetBonus { pieces: 4, stat: PenetrationDecayMul, value: 0.05 },
            ],
        },
    ]
}

// ===== Daily challenge =====

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DailyTables {
    pub min_rules: u8,
    pub max_rules: u8,
    /// Spawn-rate multiplier for the high-density rule.
    pub high_density_mul: f32,
    /// Replacement penetration decay for the weak-penetration rule.
    pub weak_penetration_decay: f32,
    /// Replacement rebound decay for the strong-rebound rule.
    pub strong_rebound_decay: f32,
    pub thick_enemies_mul: f32,
    pub fast_enemies_mul: f32,
    pub elite_surge_mul: f32,
    pub low_loot_mul: f32,
    pub short_wave_interval_ms: u64,
    pub elite_density_mul: f32,
}

impl Default for DailyTables {
    fn default() -> Self {
        Self {
            min_rules: 1,
            max_rules: 2,
            high_density_mul: 1.6,
            weak_penetration_decay: 0.7,
            strong_rebound_decay: 0.95,
            thick_enemies_mul: 1.4,
            fast_enemies_mul: 1.3,
            elite_surge_mul: 2.0,
            low_loot_mul: 0.6,
            short_wave_interval_ms: 20_000,
            elite_density_mul: 1.8,
        }
    }
}

// ===== Achievements =====

/// One achievement: counter, threshold, and unlock rewards.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    pub counter: CounterKind,
    pub threshold: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub coin_reward: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shard_reward: u32,
}

fn default_achievements() -> Vec<AchievementDef> {
    fn def(
        id: &str,
        name: &str,
        counter: CounterKind,
        threshold: u64,
        coin_reward: u32,
        shard_reward: u32,
    ) -> AchievementDef {
        AchievementDef {
            id: id.into(),
            name: name.into(),
            counter,
            threshold,
            coin_reward,
            shard_reward,
        }
    }
    use CounterKind::*;
    vec![
        def("first_blood", "First Blood", TotalKills, 1, 10, 0),
        def("centurion", "Centurion", TotalKills, 100, 50, 0),
        def("legion", "Legion", TotalKills, 1000, 200, 5),
        def("myriad", "Myriad", TotalKills, 10_000, 1000, 20),
        def("boss_breaker", "Boss Breaker", BossKills, 10, 150, 5),
        def("elite_hunter", "Elite Hunter", EliteKills, 50, 100, 3),
        def("wave_rider", "Wave Rider", HighestWave, 20, 100, 0),
        def("combo_artist", "Combo Artist", HighestCombo, 50, 80, 0),
        def("marathon", "Marathon", LongestRunSecs, 600, 120, 0),
        def("detonator", "Detonator", AoeTriggers, 200, 80, 3),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let tables = BalanceTables::default();
        assert_eq!(tables.leveling.base_kills, 15);
        assert_eq!(tables.boss.every_n_waves, 5);
        assert_eq!(tables.skills.scatter_levels.len(), 5);
        assert!(!tables.sets.is_empty());
        assert!(!tables.achievements.is_empty());
        assert_eq!(tables.equipment.upgrade_curve.len(), 10);
    }

    #[test]
    fn skill_caps_cover_every_skill() {
        use strum::IntoEnumIterator;
        let caps = SkillCaps::default();
        for id in SkillId::iter() {
            assert!(caps.cap(id) > 0);
        }
    }
}
