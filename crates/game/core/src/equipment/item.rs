//! Item rolls, upgrades, merges, and salvage.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::equipment::{EquipSlot, Rarity};
use crate::rng::{mix_seed, Pcg, RollSource};
use crate::stats::StatKey;
use crate::tables::EquipmentTables;

use super::sets::SetDef;

/// A single piece of gear.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Unique within the owning profile.
    pub id: u64,
    pub slot: EquipSlot,
    pub rarity: Rarity,
    /// 1..=max from tables; affixes scale with level.
    pub level: u8,
    /// Base (level-1) affix magnitudes.
    pub affixes: BTreeMap<StatKey, f32>,
    /// Set membership, if the item rolled into one.
    pub set_id: Option<String>,
    /// Locked items refuse merge and salvage.
    pub locked: bool,
}

impl Item {
    /// Affixes scaled for the item's current level.
    pub fn scaled_affixes<'a>(
        &'a self,
        tables: &'a EquipmentTables,
    ) -> impl Iterator<Item = (StatKey, f32)> + 'a {
        let scale = 1.0 + tables.affix_scale_per_level * (self.level.saturating_sub(1)) as f32;
        self.affixes.iter().map(move |(k, v)| (*k, v * scale))
    }

    /// Rough comparative strength, for sorting and auto-equip hints.
    pub fn power_score(&self, tables: &EquipmentTables) -> f32 {
        let affix_sum: f32 = self.scaled_affixes(tables).map(|(_, v)| v.abs()).sum();
        affix_sum * 100.0 * self.rarity.tier() as f32
    }

    pub fn is_max_level(&self, tables: &EquipmentTables) -> bool {
        self.level >= tables.max_level
    }
}

/// Shard cost to raise `item` by one level; `None` at max level.
pub fn upgrade_cost(item: &Item, tables: &EquipmentTables) -> Option<u32> {
    if item.is_max_level(tables) {
        return None;
    }
    tables.upgrade_curve.get(item.level as usize).copied()
}

/// Roll a fresh item from the drop tables.
///
/// All randomness derives from `seed`; the same seed always yields the
/// same item (modulo the caller-assigned `id`).
pub fn roll_item(
    id: u64,
    seed: u64,
    tables: &EquipmentTables,
    sets: &[SetDef],
) -> Item {
    let pcg = Pcg;

    let slots: Vec<EquipSlot> = EquipSlot::iter().collect();
    let slot = slots[pcg.range_u32(mix_seed(seed, 0, 0, 0), 0, slots.len() as u32 - 1) as usize];
    let rarity = roll_rarity(seed, tables);

    let affixes = roll_affixes(seed, slot, rarity, tables);

    let set_id = if !sets.is_empty() && pcg.chance(mix_seed(seed, 0, 0, 3), tables.set_chance) {
        let idx = pcg.range_u32(mix_seed(seed, 0, 0, 4), 0, sets.len() as u32 - 1) as usize;
        Some(sets[idx].id.clone())
    } else {
        None
    };

    Item {
        id,
        slot,
        rarity,
        level: 1,
        affixes,
        set_id,
        locked: false,
    }
}

fn roll_rarity(seed: u64, tables: &EquipmentTables) -> Rarity {
    let pcg = Pcg;
    let total: f32 = tables.rarity_weights.iter().sum();
    let mut roll = pcg.unit(mix_seed(seed, 0, 0, 1)) * total;
    for (rarity, weight) in Rarity::iter().zip(tables.rarity_weights.iter()) {
        if roll < *weight {
            return rarity;
        }
        roll -= weight;
    }
    Rarity::Legend
}

fn roll_affixes(
    seed: u64,
    slot: EquipSlot,
    rarity: Rarity,
    tables: &EquipmentTables,
) -> BTreeMap<StatKey, f32> {
    let pcg = Pcg;
    let pool: Vec<_> = tables
        .affix_pool
        .iter()
        .filter(|range| range.slot == slot)
        .collect();

    let want = tables.affix_count[rarity.tier() as usize - 1] as usize;
    let tier_scale = tables.tier_scale[rarity.tier() as usize - 1];

    let mut affixes = BTreeMap::new();
    let mut attempt = 0u64;
    while affixes.len() < want.min(pool.len()) {
        let pick =
            pcg.range_u32(mix_seed(seed, attempt, 0, 10), 0, pool.len() as u32 - 1) as usize;
        let range = pool[pick];
        attempt += 1;
        if affixes.contains_key(&range.stat) {
            continue;
        }
        let magnitude =
            pcg.range_f32(mix_seed(seed, attempt, 0, 11), range.min, range.max) * tier_scale;
        affixes.insert(range.stat, magnitude);
        attempt += 1;
    }
    affixes
}

/// Result of merging two items.
#[derive(Clone, Debug, PartialEq)]
pub enum MergeOutcome {
    /// Consumed the fodder item, raised the kept item's level.
    LevelUp(Item),
    /// Both were max level: promoted to the next rarity with rerolled
    /// affixes at the new tier.
    RarityUp(Item),
    /// Items are incompatible (slot/rarity mismatch, locked, or already
    /// at the ceiling).
    Incompatible,
}

/// Merge `fodder` into `kept`.
///
/// Same slot and rarity are required. Locked fodder is never consumed.
pub fn merge_items(
    kept: &Item,
    fodder: &Item,
    seed: u64,
    tables: &EquipmentTables,
    sets: &[SetDef],
) -> MergeOutcome {
    if fodder.locked || kept.slot != fodder.slot || kept.rarity != fodder.rarity {
        return MergeOutcome::Incompatible;
    }

    if !kept.is_max_level(tables) {
        let mut out = kept.clone();
        out.level += 1;
        return MergeOutcome::LevelUp(out);
    }

    if !fodder.is_max_level(tables) {
        return MergeOutcome::Incompatible;
    }

    let Some(next) = kept.rarity.next() else {
        return MergeOutcome::Incompatible;
    };

    let mut promoted = roll_item(kept.id, seed, tables, sets);
    promoted.slot = kept.slot;
    promoted.rarity = next;
    promoted.affixes = roll_affixes(seed, kept.slot, next, tables);
    promoted.set_id = kept.set_id.clone();
    promoted.locked = kept.locked;
    MergeOutcome::RarityUp(promoted)
}

/// Shards refunded for destroying an item; locked items yield nothing.
pub fn salvage_value(item: &Item, tables: &EquipmentTables) -> Option<u32> {
    if item.locked {
        return None;
    }
    Some(tables.salvage_shards[item.rarity.tier() as usize - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::EquipmentTables;

    fn item(slot: EquipSlot, rarity: Rarity, level: u8) -> Item {
        Item {
            id: 1,
            slot,
            rarity,
            level,
            affixes: [(StatKey::DamageMul, 0.05)].into_iter().collect(),
            set_id: None,
            locked: false,
        }
    }

    #[test]
    fn roll_is_deterministic() {
        let tables = EquipmentTables::default();
        let a = roll_item(1, 42, &tables, &[]);
        let b = roll_item(1, 42, &tables, &[]);
        assert_eq!(a, b);
        assert_eq!(a.level, 1);
        assert!(!a.affixes.is_empty());
    }

    #[test]
    fn affixes_scale_with_level() {
        let tables = EquipmentTables::default();
        let mut it = item(EquipSlot::Weapon, Rarity::Common, 1);
        let base: f32 = it.scaled_affixes(&tables).map(|(_, v)| v).sum();
        it.level = 5;
        let scaled: f32 = it.scaled_affixes(&tables).map(|(_, v)| v).sum();
        let expect = base * (1.0 + tables.affix_scale_per_level * 4.0);
        assert!((scaled - expect).abs() < 1e-5);
    }

    #[test]
    fn upgrade_cost_follows_curve_and_stops_at_max() {
        let tables = EquipmentTables::default();
        let mut it = item(EquipSlot::Core, Rarity::Rare, 1);
        assert_eq!(upgrade_cost(&it, &tables), Some(tables.upgrade_curve[1]));
        it.level = tables.max_level;
        assert_eq!(upgrade_cost(&it, &tables), None);
    }

    #[test]
    fn merge_levels_then_promotes() {
        let tables = EquipmentTables::default();
        let kept = item(EquipSlot::Weapon, Rarity::Common, 2);
        let fodder = item(EquipSlot::Weapon, Rarity::Common, 1);
        match merge_items(&kept, &fodder, 7, &tables, &[]) {
            MergeOutcome::LevelUp(out) => assert_eq!(out.level, 3),
            other => panic!("expected level up, got {other:?}"),
        }

        let kept = item(EquipSlot::Weapon, Rarity::Common, tables.max_level);
        let fodder = item(EquipSlot::Weapon, Rarity::Common, tables.max_level);
        match merge_items(&kept, &fodder, 7, &tables, &[]) {
            MergeOutcome::RarityUp(out) => {
                assert_eq!(out.rarity, Rarity::Rare);
                assert_eq!(out.slot, EquipSlot::Weapon);
            }
            other => panic!("expected rarity up, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_or_locked_merges_refused() {
        let tables = EquipmentTables::default();
        let kept = item(EquipSlot::Weapon, Rarity::Common, 1);
        let mut fodder = item(EquipSlot::Core, Rarity::Common, 1);
        assert_eq!(
            merge_items(&kept, &fodder, 7, &tables, &[]),
            MergeOutcome::Incompatible
        );
        fodder.slot = EquipSlot::Weapon;
        fodder.locked = true;
        assert_eq!(
            merge_items(&kept, &fodder, 7, &tables, &[]),
            MergeOutcome::Incompatible
        );
        assert_eq!(salvage_value(&fodder, &tables), None);
    }
}
