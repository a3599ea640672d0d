//! Daily challenge rules.
//!
//! The calendar date hashes to a seed, the seed picks one or two rules,
//! and every player sees the same rule set for the same date. Rules only
//! exist as multipliers injected into the wave director, the aggregator,
//! and the combat context.

use sha2::{Digest, Sha256};
use strum::{EnumIter, IntoEnumIterator};

use crate::rng::{mix_seed, Pcg, RollSource};
use crate::tables::DailyTables;

/// One mutator from the daily pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DailyRule {
    HighDensity,
    WeakPenetration,
    StrongRebound,
    ThickEnemies,
    FastEnemies,
    EliteSurge,
    LowLoot,
    ShortWaves,
    EliteDensityPlus,
}

/// Seed derived from a calendar date string (e.g. `"2026-08-27"`).
pub fn date_seed(date: &str) -> u64 {
    let digest = Sha256::digest(date.as_bytes());
    u64::from_le_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Pick today's rules; deterministic in the date.
pub fn roll_rules(date: &str, tables: &DailyTables) -> Vec<DailyRule> {
    let seed = date_seed(date);
    let pcg = Pcg;
    let pool: Vec<DailyRule> = DailyRule::iter().collect();

    let count = pcg.range_u32(
        mix_seed(seed, 0, 0, 50),
        tables.min_rules as u32,
        tables.max_rules as u32,
    ) as usize;

    let mut rules = Vec::with_capacity(count);
    let mut attempt = 1u64;
    while rules.len() < count.min(pool.len()) {
        let remaining: Vec<DailyRule> =
            pool.iter().copied().filter(|r| !rules.contains(r)).collect();
        let idx = pcg.range_u32(
            mix_seed(seed, attempt, 0, 51),
            0,
            remaining.len() as u32 - 1,
        ) as usize;
        rules.push(remaining[idx]);
        attempt += 1;
    }
    rules
}

/// Resolved multiplier set for the active rules; neutral by default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DailyModifiers {
    pub spawn_rate_mul: f32,
    pub penetration_decay_override: Option<f32>,
    pub rebound_decay_override: Option<f32>,
    pub enemy_hp_mul: f32,
    pub enemy_speed_mul: f32,
    pub elite_chance_mul: f32,
    pub loot_mul: f32,
    pub wave_interval_override: Option<u64>,
}

impl Default for DailyModifiers {
    fn default() -> Self {
        Self {
            spawn_rate_mul: 1.0,
            penetration_decay_override: None,
            rebound_decay_override: None,
            enemy_hp_mul: 1.0,
            enemy_speed_mul: 1.0,
            elite_chance_mul: 1.0,
            loot_mul: 1.0,
            wave_interval_override: None,
        }
    }
}

impl DailyModifiers {
    /// Fold the active rules into one modifier set.
    pub fn resolve(rules: &[DailyRule], tables: &DailyTables) -> Self {
        let mut mods = Self::default();
        for rule in rules {
            match rule {
                DailyRule::HighDensity => mods.spawn_rate_mul *= tables.high_density_mul,
                DailyRule::WeakPenetration => {
                    mods.penetration_decay_override = Some(tables.weak_penetration_decay);
                }
                DailyRule::StrongRebound => {
                    mods.rebound_decay_override = Some(tables.strong_rebound_decay);
                }
                DailyRule::ThickEnemies => mods.enemy_hp_mul *= tables.thick_enemies_mul,
                DailyRule::FastEnemies => mods.enemy_speed_mul *= tables.fast_enemies_mul,
                DailyRule::EliteSurge => mods.elite_chance_mul *= tables.elite_surge_mul,
                DailyRule::LowLoot => mods.loot_mul *= tables.low_loot_mul,
                DailyRule::ShortWaves => {
                    mods.wave_interval_override = Some(tables.short_wave_interval_ms);
                }
                DailyRule::EliteDensityPlus => {
                    mods.elite_chance_mul *= tables.elite_density_mul;
                }
            }
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_date_same_rules() {
        let tables = DailyTables::default();
        let a = roll_rules("2026-08-27", &tables);
        let b = roll_rules("2026-08-27", &tables);
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert!(a.len() <= tables.max_rules as usize);
    }

    #[test]
    fn different_dates_usually_differ() {
        let tables = DailyTables::default();
        let differs = (0..10).any(|day| {
            roll_rules(&format!("2026-08-{:02}", day + 1), &tables)
                != roll_rules("2026-08-27", &tables)
        });
        assert!(differs);
    }

    #[test]
    fn rules_are_distinct() {
        let tables = DailyTables::default();
        for day in 1..=28 {
            let rules = roll_rules(&format!("2026-02-{day:02}"), &tables);
            let mut dedup = rules.clone();
            dedup.dedup();
            assert_eq!(rules.len(), dedup.len());
        }
    }

    #[test]
    fn modifiers_fold_neutrally() {
        let tables = DailyTables::default();
        let mods = DailyModifiers::resolve(&[], &tables);
        assert_eq!(mods, DailyModifiers::default());

        let mods = DailyModifiers::resolve(
            &[DailyRule::WeakPenetration, DailyRule::ThickEnemies],
            &tables,
        );
        assert_eq!(
            mods.penetration_decay_override,
            Some(tables.weak_penetration_decay)
        );
        assert!((mods.enemy_hp_mul - tables.thick_enemies_mul).abs() < 1e-6);
        assert_eq!(mods.wave_interval_override, None);
    }
}
