//! Run-scoped skills: identifiers, level bookkeeping, and the level-up
//! progression state machine.
//!
//! Skills are the in-run upgrade track chosen on level-up. They are a
//! separate namespace from the meta shop upgrades in [`crate::shop`]; the
//! two never share caps or levels.

mod fsm;

pub use fsm::{ChoiceError, LevelUpPhase, SkillOffer, SkillProgression};

use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// The in-run skill roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SkillId {
    /// Multiplicatively shortens the fire interval, clamped to the floor.
    AtkSpeed,
    /// Multiplicative bullet damage increase.
    AtkPower,
    /// Adds symmetric extra bullets around each base angle.
    MultiShot,
    /// Replaces the base angle list with a fan pattern.
    Scatter,
    /// Bullets split into two children on their final hit.
    Split,
    /// Bullets survive hits, decaying damage per target pierced.
    Penetration,
    /// Bullets reflect off the field walls.
    Rebound,
    /// Shield charges that absorb player collisions.
    DefenseShield,
    /// Periodic radial blast around the player.
    AoeBlast,
}

impl SkillId {
    /// Stable identifier used in config tables and save data.
    pub fn as_str(self) -> &'static str {
        match self {
            SkillId::AtkSpeed => "atk_speed",
            SkillId::AtkPower => "atk_power",
            SkillId::MultiShot => "multi_shot",
            SkillId::Scatter => "scatter",
            SkillId::Split => "split",
            SkillId::Penetration => "penetration",
            SkillId::Rebound => "rebound",
            SkillId::DefenseShield => "defense_shield",
            SkillId::AoeBlast => "aoe_blast",
        }
    }

    /// Parse a stable identifier; unknown ids yield `None` (defensive,
    /// old saves may carry retired skills).
    pub fn parse(id: &str) -> Option<SkillId> {
        SkillId::iter().find(|s| s.as_str() == id)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-skill levels for the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillLevels {
    levels: [u8; SkillId::COUNT],
}

impl SkillLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, id: SkillId) -> u8 {
        self.levels[id.index()]
    }

    pub fn set(&mut self, id: SkillId, level: u8) {
        self.levels[id.index()] = level;
    }

    /// Increment a skill by one level, returning the new level.
    pub fn raise(&mut self, id: SkillId) -> u8 {
        let slot = &mut self.levels[id.index()];
        *slot = slot.saturating_add(1);
        *slot
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillId, u8)> + '_ {
        SkillId::iter().map(|id| (id, self.level(id)))
    }

    /// Skills with at least one level taken.
    pub fn taken(&self) -> impl Iterator<Item = (SkillId, u8)> + '_ {
        self.iter().filter(|(_, level)| *level > 0)
    }
}
