//! Socketable gems: rolls, socket capacity, and three-to-one merging.

use strum::EnumIter;

use crate::element::Element;
use crate::equipment::Rarity;
use crate::rng::{mix_seed, Pcg, RollSource};
use crate::stats::StatKey;
use crate::tables::GemTables;

/// Gem quality, ordered weakest to strongest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GemTier {
    Flawed,
    Normal,
    Flawless,
    Perfect,
}

impl GemTier {
    pub fn tier(self) -> u8 {
        match self {
            GemTier::Flawed => 1,
            GemTier::Normal => 2,
            GemTier::Flawless => 3,
            GemTier::Perfect => 4,
        }
    }

    pub fn next(self) -> Option<GemTier> {
        match self {
            GemTier::Flawed => Some(GemTier::Normal),
            GemTier::Normal => Some(GemTier::Flawless),
            GemTier::Flawless => Some(GemTier::Perfect),
            GemTier::Perfect => None,
        }
    }
}

/// A socketable gem granting one stat, optionally element-attuned.
///
/// An element-attuned gem socketed into the equipped loadout adds its
/// element to the player's attack element set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gem {
    pub id: u64,
    pub stat: StatKey,
    pub tier: GemTier,
    pub element: Option<Element>,
}

impl Gem {
    /// Stat magnitude granted when socketed.
    pub fn magnitude(&self, tables: &GemTables) -> f32 {
        let base = tables
            .stat_pool
            .iter()
            .find(|def| def.stat == self.stat)
            .map(|def| def.base)
            .unwrap_or(0.0);
        base * tables.tier_scale[self.tier.tier() as usize - 1]
    }
}

/// Socket count an item offers, from rarity and level.
///
/// Legend items past the bonus level gain one extra socket; the result is
/// clamped to the table cap.
pub fn socket_capacity(rarity: Rarity, level: u8, tables: &GemTables) -> u8 {
    let mut sockets = tables.sockets_by_rarity[rarity.tier() as usize - 1];
    if rarity == Rarity::Legend && level >= tables.legend_bonus_level {
        sockets += 1;
    }
    sockets.min(tables.max_sockets)
}

/// Merge three identical gems (same stat, same tier) into one of the next
/// tier. Element attunement carries only if all three agree.
pub fn merge_gems(id: u64, gems: &[Gem; 3]) -> Option<Gem> {
    let [a, b, c] = gems;
    if a.stat != b.stat || a.stat != c.stat || a.tier != b.tier || a.tier != c.tier {
        return None;
    }
    let tier = a.tier.next()?;
    let element = if a.element == b.element && a.element == c.element {
        a.element
    } else {
        None
    };
    Some(Gem {
        id,
        stat: a.stat,
        tier,
        element,
    })
}

/// Roll a fresh gem from the drop tables; deterministic in `seed`.
pub fn roll_gem(id: u64, seed: u64, tables: &GemTables) -> Gem {
    let pcg = Pcg;
    let pick = pcg.range_u32(
        mix_seed(seed, 0, 0, 20),
        0,
        tables.stat_pool.len() as u32 - 1,
    ) as usize;
    let stat = tables.stat_pool[pick].stat;

    let tier_roll = pcg.unit(mix_seed(seed, 0, 0, 21));
    let tier = if tier_roll < 0.6 {
        GemTier::Flawed
    } else if tier_roll < 0.9 {
        GemTier::Normal
    } else {
        GemTier::Flawless
    };

    let element = if pcg.chance(mix_seed(seed, 0, 0, 22), tables.element_chance) {
        let wheel = Element::WHEEL;
        let idx = pcg.range_u32(mix_seed(seed, 0, 0, 23), 0, wheel.len() as u32 - 1) as usize;
        Some(wheel[idx])
    } else {
        None
    };

    Gem {
        id,
        stat,
        tier,
        element,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem(stat: StatKey, tier: GemTier) -> Gem {
        Gem {
            id: 1,
            stat,
            tier,
            element: None,
        }
    }

    #[test]
    fn socket_counts_by_rarity() {
        let tables = GemTables::default();
        assert_eq!(socket_capacity(Rarity::Common, 1, &tables), 2);
        assert_eq!(socket_capacity(Rarity::Rare, 10, &tables), 3);
        assert_eq!(socket_capacity(Rarity::Epic, 1, &tables), 4);
        assert_eq!(socket_capacity(Rarity::Legend, 7, &tables), 5);
        assert_eq!(socket_capacity(Rarity::Legend, 8, &tables), 6);
    }

    #[test]
    fn merge_requires_identical_gems() {
        let trio = [
            gem(StatKey::DamageMul, GemTier::Flawed),
            gem(StatKey::DamageMul, GemTier::Flawed),
            gem(StatKey::DamageMul, GemTier::Flawed),
        ];
        let merged = merge_gems(9, &trio).unwrap();
        assert_eq!(merged.tier, GemTier::Normal);
        assert_eq!(merged.stat, StatKey::DamageMul);

        let mixed = [
            gem(StatKey::DamageMul, GemTier::Flawed),
            gem(StatKey::LootChanceAdd, GemTier::Flawed),
            gem(StatKey::DamageMul, GemTier::Flawed),
        ];
        assert!(merge_gems(9, &mixed).is_none());
    }

    #[test]
    fn perfect_gems_do_not_merge() {
        let trio = [
            gem(StatKey::DamageMul, GemTier::Perfect),
            gem(StatKey::DamageMul, GemTier::Perfect),
            gem(StatKey::DamageMul, GemTier::Perfect),
        ];
        assert!(merge_gems(9, &trio).is_none());
    }

    #[test]
    fn magnitude_scales_with_tier() {
        let tables = GemTables::default();
        let low = gem(StatKey::DamageMul, GemTier::Flawed).magnitude(&tables);
        let high = gem(StatKey::DamageMul, GemTier::Perfect).magnitude(&tables);
        assert!(high > low);
        assert!(low > 0.0);
    }
}
