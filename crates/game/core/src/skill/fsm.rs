//! Level-up progression state machine.
//!
//! Kills accumulate toward the next level; crossing the threshold parks
//! the machine in a pending state until the presentation layer asks for
//! candidates, then holds the same three-candidate offer until one is
//! chosen. The offer is pure data and re-requesting it never rerolls.

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::rng::{mix_seed, Pcg, RollSource};
use crate::skill::{SkillId, SkillLevels};
use crate::tables::SkillCaps;

const OFFER_SIZE: usize = 3;

/// Where the machine currently sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LevelUpPhase {
    #[default]
    Playing,
    /// Threshold crossed; waiting for the offer to be presented.
    LevelUpPending,
    /// Offer on screen; gameplay paused until a choice lands.
    ChoicePresented,
}

/// Three distinct skill candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillOffer {
    pub candidates: ArrayVec<SkillId, OFFER_SIZE>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("no skill offer is currently presented")]
    NotPresented,
    #[error("skill {0:?} is not among the offered candidates")]
    NotOffered(SkillId),
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillProgression {
    phase: LevelUpPhase,
    offer: Option<SkillOffer>,
}

impl SkillProgression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LevelUpPhase {
        self.phase
    }

    /// Check the kill threshold after kills are tallied.
    ///
    /// Returns true on the Playing → LevelUpPending transition. Maxed-out
    /// players never re-enter the pending state.
    pub fn check(&mut self, kill_count: u32, next_level_kills: u32, level: u8, max_level: u8) -> bool {
        if self.phase != LevelUpPhase::Playing {
            return false;
        }
        if level >= max_level || kill_count < next_level_kills {
            return false;
        }
        self.phase = LevelUpPhase::LevelUpPending;
        true
    }

    /// Present the offer for a pending level-up.
    ///
    /// The first call samples three distinct candidates from `seed`;
    /// repeat calls while presented return the same offer. Below-cap
    /// skills are preferred; capped skills pad the offer only when fewer
    /// than three remain below cap.
    pub fn present(
        &mut self,
        levels: &SkillLevels,
        caps: &SkillCaps,
        seed: u64,
    ) -> Option<&SkillOffer> {
        match self.phase {
            LevelUpPhase::Playing => return None,
            LevelUpPhase::ChoicePresented => return self.offer.as_ref(),
            LevelUpPhase::LevelUpPending => {}
        }

        let open: Vec<SkillId> = SkillId::iter()
            .filter(|id| levels.level(*id) < caps.cap(*id))
            .collect();
        let capped: Vec<SkillId> = SkillId::iter()
            .filter(|id| levels.level(*id) >= caps.cap(*id))
            .collect();

        let mut candidates: ArrayVec<SkillId, OFFER_SIZE> = ArrayVec::new();
        sample_into(&mut candidates, &open, seed, 0);
        if !candidates.is_full() {
            sample_into(&mut candidates, &capped, seed, 1);
        }

        self.offer = Some(SkillOffer { candidates });
        self.phase = LevelUpPhase::ChoicePresented;
        self.offer.as_ref()
    }

    /// Commit a choice and return to play.
    ///
    /// The caller applies the skill's effect and resets the kill counter;
    /// this only validates the pick against the standing offer.
    pub fn choose(&mut self, id: SkillId) -> Result<SkillId, ChoiceError> {
        let Some(offer) = self.offer.as_ref() else {
            return Err(ChoiceError::NotPresented);
        };
        if self.phase != LevelUpPhase::ChoicePresented {
            return Err(ChoiceError::NotPresented);
        }
        if !offer.candidates.contains(&id) {
            return Err(ChoiceError::NotOffered(id));
        }
        self.offer = None;
        self.phase = LevelUpPhase::Playing;
        Ok(id)
    }

    /// Abandon any pending offer (scene teardown).
    pub fn reset(&mut self) {
        self.offer = None;
        self.phase = LevelUpPhase::Playing;
    }
}

fn sample_into(out: &mut ArrayVec<SkillId, OFFER_SIZE>, pool: &[SkillId], seed: u64, lane: u32) {
    let pcg = Pcg;
    let mut attempt = 0u64;
    while !out.is_full() {
        let remaining: Vec<SkillId> = pool.iter().copied().filter(|id| !out.contains(id)).collect();
        if remaining.is_empty() {
            break;
        }
        let idx = pcg.range_u32(
            mix_seed(seed, attempt, 0, lane),
            0,
            remaining.len() as u32 - 1,
        ) as usize;
        out.push(remaining[idx]);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> SkillCaps {
        SkillCaps::default()
    }

    #[test]
    fn threshold_triggers_pending_once() {
        let mut fsm = SkillProgression::new();
        assert!(!fsm.check(10, 15, 1, 12));
        assert!(fsm.check(15, 15, 1, 12));
        assert_eq!(fsm.phase(), LevelUpPhase::LevelUpPending);
        // Already pending: no double trigger.
        assert!(!fsm.check(30, 15, 1, 12));
    }

    #[test]
    fn maxed_level_never_triggers() {
        let mut fsm = SkillProgression::new();
        assert!(!fsm.check(999, 15, 12, 12));
        assert_eq!(fsm.phase(), LevelUpPhase::Playing);
    }

    #[test]
    fn offer_is_idempotent_until_chosen() {
        let mut fsm = SkillProgression::new();
        let levels = SkillLevels::new();
        fsm.check(15, 15, 1, 12);

        let first = fsm.present(&levels, &caps(), 42).cloned();
        let second = fsm.present(&levels, &caps(), 777).cloned();
        assert_eq!(first, second);

        let offer = first.expect("offer present");
        assert_eq!(offer.candidates.len(), 3);
        let mut distinct = offer.candidates.to_vec();
        distinct.dedup();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn choose_validates_against_offer() {
        let mut fsm = SkillProgression::new();
        let levels = SkillLevels::new();
        assert_eq!(
            fsm.choose(SkillId::Scatter),
            Err(ChoiceError::NotPresented)
        );

        fsm.check(15, 15, 1, 12);
        let offer = fsm.present(&levels, &caps(), 42).cloned().expect("offer");
        let not_offered = SkillId::iter()
            .find(|id| !offer.candidates.contains(id))
            .expect("nine skills, three offered");
        assert_eq!(
            fsm.choose(not_offered),
            Err(ChoiceError::NotOffered(not_offered))
        );

        let pick = offer.candidates[0];
        assert_eq!(fsm.choose(pick), Ok(pick));
        assert_eq!(fsm.phase(), LevelUpPhase::Playing);
    }

    #[test]
    fn capped_skills_only_pad_when_pool_exhausted() {
        let mut fsm = SkillProgression::new();
        let capset = caps();
        let mut levels = SkillLevels::new();
        // Cap everything except two skills.
        for id in SkillId::iter() {
            if id != SkillId::Scatter && id != SkillId::Split {
                levels.set(id, capset.cap(id));
            }
        }
        fsm.check(15, 15, 1, 12);
        let offer = fsm.present(&levels, &capset, 5).cloned().expect("offer");
        assert!(offer.candidates.contains(&SkillId::Scatter));
        assert!(offer.candidates.contains(&SkillId::Split));
        assert_eq!(offer.candidates.len(), 3);
    }
}
