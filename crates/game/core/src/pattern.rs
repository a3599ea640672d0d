//! Shot pattern resolution.
//!
//! Scatter and multi-shot compose into a single flat list of firing
//! angles plus a damage split. The pattern is a pure function of the two
//! skill levels and is cached on the run state; it is only recomputed
//! when a skill level changes.

use std::collections::BTreeSet;

use crate::skill::{SkillId, SkillLevels};
use crate::tables::SkillTables;

/// Resolved firing pattern for one trigger pull.
///
/// Angles are degrees relative to the aim direction, ascending, deduped.
/// Total damage is conserved: each bullet carries `total_mul / angles.len()`
/// of the base damage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotPattern {
    pub angles: Vec<f32>,
    pub total_mul: f32,
    pub per_shot_mul: f32,
}

impl Default for ShotPattern {
    fn default() -> Self {
        Self {
            angles: vec![0.0],
            total_mul: 1.0,
            per_shot_mul: 1.0,
        }
    }
}

impl ShotPattern {
    /// Resolve the pattern for the current scatter/multi-shot levels.
    pub fn resolve(skills: &SkillLevels, tables: &SkillTables) -> ShotPattern {
        let scatter = skills.level(SkillId::Scatter) as usize;
        let multi = skills.level(SkillId::MultiShot) as usize;

        let (base_angles, scatter_mul): (Vec<f32>, f32) = if scatter > 0 {
            let idx = scatter.min(tables.scatter_levels.len()) - 1;
            let level = &tables.scatter_levels[idx];
            (level.angles.clone(), level.total_mul)
        } else {
            (vec![0.0], 1.0)
        };

        // With a scatter fan active, extra bullets use the tight
        // micro-split offsets so they hug each fan angle; without one
        // they spread with the full jitter list.
        let jitters = if scatter > 0 {
            &tables.multi_micro_split_deg
        } else {
            &tables.multi_jitter_deg
        };

        // Centidegree keys give the 2-decimal dedup and the ascending
        // order in one pass.
        let mut keys: BTreeSet<i64> = BTreeSet::new();
        for angle in &base_angles {
            keys.insert(centi(*angle));
        }
        for jitter in jitters.iter().take(multi) {
            for angle in &base_angles {
                keys.insert(centi(angle + jitter));
                keys.insert(centi(angle - jitter));
            }
        }

        let angles: Vec<f32> = keys.into_iter().map(|k| k as f32 / 100.0).collect();
        let angles = if angles.is_empty() { vec![0.0] } else { angles };

        let multi_mul = tables.multi_total_growth.powi(multi as i32);
        let total_mul = scatter_mul.max(multi_mul).max(1.0);
        let per_shot_mul = total_mul / angles.len() as f32;

        ShotPattern {
            angles,
            total_mul,
            per_shot_mul,
        }
    }
}

fn centi(angle: f32) -> i64 {
    (angle * 100.0).round() as i64
}
