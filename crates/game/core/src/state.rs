//! Per-run mutable state.
//!
//! Everything here resets when a run starts; meta progression (coins,
//! shop levels, equipment) lives in the profile and only reaches the run
//! through the resolved stat bundle.

use crate::pattern::ShotPattern;
use crate::skill::{SkillId, SkillLevels};
use crate::stats::StatBundle;
use crate::tables::{BalanceTables, DropTables};

/// Temporary fire-rate buff from an energy orb.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HasteBuff {
    pub expires_at: u64,
    pub multiplier: f32,
}

/// Mutable state for one run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunState {
    pub score: u64,
    /// 1-based; escalated by the wave director.
    pub wave: u32,
    /// 1-based player level, capped by the leveling tables.
    pub level: u8,
    /// Kills since the last level-up.
    pub kill_count: u32,
    pub next_level_kills: u32,
    /// Coins banked this run; folded into the profile at run end.
    pub coins_earned: u32,
    pub combo: u32,
    pub highest_combo: u32,
    pub run_millis: u64,
    pub haste: Option<HasteBuff>,
    /// Current fire interval before haste.
    pub fire_interval_ms: u64,
    /// Hard floor; attack-speed levels and haste never go below it.
    pub fire_floor_ms: u64,
    /// Damage multiplier from attack-power levels.
    pub damage_mul: f32,
    pub skills: SkillLevels,
    /// Cached; recomputed only when scatter/multi-shot change.
    pub pattern: ShotPattern,
    pub shield_charges: u8,
}

impl RunState {
    /// Fresh run from the tables and the resolved meta bundle.
    pub fn new(tables: &BalanceTables, bundle: &StatBundle) -> Self {
        let base = tables.player.base_fire_interval_ms;
        let floor = if bundle.fire_interval_floor_ms > 0 {
            bundle.fire_interval_floor_ms
        } else {
            (base as f32 * tables.player.fire_floor_ratio) as u64
        };
        let interval = ((base as f32 * bundle.fire_rate_mul) as u64).max(floor);

        Self {
            score: 0,
            wave: 1,
            level: 1,
            kill_count: 0,
            next_level_kills: tables.leveling.base_kills,
            coins_earned: 0,
            combo: 0,
            highest_combo: 0,
            run_millis: 0,
            haste: None,
            fire_interval_ms: interval,
            fire_floor_ms: floor,
            damage_mul: 1.0,
            skills: SkillLevels::new(),
            pattern: ShotPattern::default(),
            shield_charges: 0,
        }
    }

    /// Apply a chosen level-up: raise the skill, advance the level curve,
    /// and apply the skill's immediate effect.
    pub fn apply_skill(&mut self, id: SkillId, tables: &BalanceTables) {
        self.skills.raise(id);

        match id {
            SkillId::AtkSpeed => {
                let next = (self.fire_interval_ms as f32 * tables.skills.fire_interval_mul) as u64;
                self.fire_interval_ms = next.max(self.fire_floor_ms);
            }
            SkillId::AtkPower => {
                self.damage_mul *= tables.skills.damage_mul;
            }
            SkillId::Scatter | SkillId::MultiShot => {
                self.pattern = ShotPattern::resolve(&self.skills, &tables.skills);
            }
            SkillId::DefenseShield => {
                let cap = tables.skills.shield_max_charges;
                self.shield_charges = (self.shield_charges + 1).min(cap);
            }
            // Passive skills; combat/sim read the level directly.
            SkillId::Split | SkillId::Penetration | SkillId::Rebound | SkillId::AoeBlast => {}
        }

        self.level = self.level.saturating_add(1).min(tables.leveling.max_level);
        self.kill_count = 0;
        self.next_level_kills =
            (self.next_level_kills as f32 * tables.leveling.growth).ceil() as u32;
    }

    /// Tally a kill toward score, combo, and the level curve.
    ///
    /// The streak feeds the score: every kill in the current combo adds
    /// `combo_score_step` of the base value, up to `combo_score_cap`.
    pub fn record_kill(&mut self, base_score: u64, drops: &DropTables) {
        self.combo += 1;
        self.highest_combo = self.highest_combo.max(self.combo);
        let bonus = (drops.combo_score_step * self.combo as f32).min(drops.combo_score_cap);
        self.score += (base_score as f32 * (1.0 + bonus)).round() as u64;
        self.kill_count += 1;
    }

    /// Reset the streak; an enemy reaching the player does this.
    pub fn break_combo(&mut self) {
        self.combo = 0;
    }

    /// Fire interval in effect at `now`, haste included, floor-clamped.
    pub fn effective_fire_interval(&self, now: u64) -> u64 {
        match self.haste {
            Some(buff) if now < buff.expires_at => {
                ((self.fire_interval_ms as f32 * buff.multiplier) as u64).max(self.fire_floor_ms)
            }
            _ => self.fire_interval_ms,
        }
    }

    pub fn grant_haste(&mut self, now: u64, duration_ms: u64, multiplier: f32) {
        self.haste = Some(HasteBuff {
            expires_at: now + duration_ms,
            multiplier,
        });
    }

    /// Drop the haste buff once expired; returns true if it just lapsed.
    pub fn expire_haste(&mut self, now: u64) -> bool {
        if matches!(self.haste, Some(buff) if now >= buff.expires_at) {
            self.haste = None;
            return true;
        }
        false
    }
}
