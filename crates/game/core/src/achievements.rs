//! Cumulative achievement counters and threshold unlocks.

use std::collections::BTreeSet;

use strum::EnumIter;

use crate::tables::AchievementDef;

/// Which lifetime counter an achievement watches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CounterKind {
    TotalKills,
    BossKills,
    EliteKills,
    HighestWave,
    HighestCombo,
    LongestRunSecs,
    AoeTriggers,
}

/// Lifetime counters across every run.
///
/// Kills and triggers accumulate; wave, combo, and run length keep the
/// best value seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Counters {
    pub total_kills: u64,
    pub boss_kills: u64,
    pub elite_kills: u64,
    pub highest_wave: u64,
    pub highest_combo: u64,
    pub longest_run_secs: u64,
    pub aoe_triggers: u64,
}

impl Counters {
    pub fn value(&self, kind: CounterKind) -> u64 {
        match kind {
            CounterKind::TotalKills => self.total_kills,
            CounterKind::BossKills => self.boss_kills,
            CounterKind::EliteKills => self.elite_kills,
            CounterKind::HighestWave => self.highest_wave,
            CounterKind::HighestCombo => self.highest_combo,
            CounterKind::LongestRunSecs => self.longest_run_secs,
            CounterKind::AoeTriggers => self.aoe_triggers,
        }
    }

    /// Fold one finished run into the lifetime counters.
    pub fn fold_run(&mut self, run: &RunTally) {
        self.total_kills += run.kills;
        self.boss_kills += run.boss_kills;
        self.elite_kills += run.elite_kills;
        self.highest_wave = self.highest_wave.max(run.wave);
        self.highest_combo = self.highest_combo.max(run.highest_combo);
        self.longest_run_secs = self.longest_run_secs.max(run.run_secs);
        self.aoe_triggers += run.aoe_triggers;
    }
}

/// Per-run tallies folded in at run end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunTally {
    pub kills: u64,
    pub boss_kills: u64,
    pub elite_kills: u64,
    pub wave: u64,
    pub highest_combo: u64,
    pub run_secs: u64,
    pub aoe_triggers: u64,
}

/// Counters plus the append-only unlocked set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AchievementState {
    pub counters: Counters,
    pub unlocked: BTreeSet<String>,
}

impl AchievementState {
    /// Evaluate definitions against the counters, appending any newly
    /// crossed thresholds. Returns the fresh unlocks so the caller can
    /// grant rewards and surface toasts.
    pub fn check_unlocks<'a>(&mut self, defs: &'a [AchievementDef]) -> Vec<&'a AchievementDef> {
        let mut fresh = Vec::new();
        for def in defs {
            if self.unlocked.contains(&def.id) {
                continue;
            }
            if self.counters.value(def.counter) >= def.threshold {
                self.unlocked.insert(def.id.clone());
                fresh.push(def);
            }
        }
        fresh
    }
}
