//! Folds every bonus source into one resolved bundle at run start.
//!
//! The fold is pure: no RNG, no clock, no I/O. The same profile and
//! tables always resolve to the same bundle. Gear bonuses are summed per
//! stat and clamped to the ceilings in
//! [`EquipmentTables::stat_caps`](crate::tables::EquipmentTables) before
//! they reach the bundle.

use std::collections::BTreeMap;

use crate::element::ElementSet;
use crate::equipment::{active_set_bonuses, Gem, Item};
use crate::shop::ShopState;
use crate::stats::{StatBundle, StatKey};
use crate::tables::{BalanceTables, EquipmentTables};

/// Everything the aggregation reads.
#[derive(Clone, Copy)]
pub struct AggregatorInput<'a> {
    pub tables: &'a BalanceTables,
    pub shop: &'a ShopState,
    /// Currently equipped items, at most one per slot.
    pub equipped: &'a [&'a Item],
    /// Gems socketed across the equipped items.
    pub socketed: &'a [&'a Gem],
}

/// The resolved loadout: stat bundle plus the attack element set
/// contributed by element-attuned gems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedLoadout {
    pub bundle: StatBundle,
    pub elements: ElementSet,
}

/// Resolve shop, equipment, gem, and set contributions.
pub fn aggregate(input: &AggregatorInput) -> ResolvedLoadout {
    let tables = input.tables;
    let mut bundle = StatBundle::new();

    // Shop: capped at the shop's own limits before it ever reaches here.
    bundle.apply(StatKey::DamageMul, input.shop.damage_bonus(&tables.shop));
    bundle.apply(StatKey::LootChanceAdd, input.shop.loot_bonus(&tables.shop));
    let floor_ratio = input
        .shop
        .fire_floor_ratio(tables.player.fire_floor_ratio, &tables.shop);
    bundle.fire_interval_floor_ms =
        (tables.player.base_fire_interval_ms as f32 * floor_ratio) as u64;

    // Gear contributions (item affixes, gems, set bonuses) accumulate
    // per stat before folding in, so the per-stat ceilings apply to the
    // combined total. Penetration decay is the one multiplicative
    // stacking bonus; everything else sums.
    let mut gear: BTreeMap<StatKey, f32> = BTreeMap::new();
    let mut decay = 1.0f32;

    for item in input.equipped {
        for (key, value) in item.scaled_affixes(&tables.equipment) {
            fold_gear(&mut gear, &mut decay, key, value);
        }
    }

    let mut elements = ElementSet::EMPTY;
    for gem in input.socketed {
        fold_gear(&mut gear, &mut decay, gem.stat, gem.magnitude(&tables.gems));
        if let Some(element) = gem.element {
            elements.insert(element);
        }
    }

    for bonus in active_set_bonuses(input.equipped, &tables.sets) {
        fold_gear(&mut gear, &mut decay, bonus.stat, bonus.value);
    }

    for (key, value) in gear {
        bundle.apply(key, clamp_to_cap(key, value, &tables.equipment));
    }
    if decay != 1.0 {
        bundle.apply(
            StatKey::PenetrationDecayMul,
            clamp_to_cap(StatKey::PenetrationDecayMul, decay - 1.0, &tables.equipment),
        );
    }

    // Status power never drops below neutral.
    bundle.status.dot_mul = bundle.status.dot_mul.max(1.0);
    bundle.status.duration_mul = bundle.status.duration_mul.max(1.0);
    bundle.status.explode_mul = bundle.status.explode_mul.max(1.0);
    bundle.status.vulnerability_add = bundle.status.vulnerability_add.max(0.0);
    bundle.status.slow_cap_add = bundle.status.slow_cap_add.max(0.0);

    ResolvedLoadout { bundle, elements }
}

fn fold_gear(gear: &mut BTreeMap<StatKey, f32>, decay: &mut f32, key: StatKey, value: f32) {
    if key == StatKey::PenetrationDecayMul {
        *decay *= 1.0 + value;
    } else {
        *gear.entry(key).or_default() += value;
    }
}

fn clamp_to_cap(key: StatKey, value: f32, tables: &EquipmentTables) -> f32 {
    match tables.stat_cap(key) {
        Some(max) => value.min(max),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::equipment::{EquipSlot, GemTier, Rarity, SetBonus, SetDef};

    fn item(slot: EquipSlot, affixes: &[(StatKey, f32)], set_id: Option<&str>) -> Item {
        Item {
            id: 1,
            slot,
            rarity: Rarity::Common,
            level: 1,
            affixes: affixes.iter().copied().collect(),
            set_id: set_id.map(str::to_owned),
            locked: false,
        }
    }

    #[test]
    fn empty_sources_resolve_neutral() {
        let tables = BalanceTables::default();
        let shop = ShopState::default();
        let out = aggregate(&AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &[],
            socketed: &[],
        });
        assert_eq!(out.bundle.damage_mul, 1.0);
        assert_eq!(out.bundle.fire_interval_floor_ms, 300);
        assert!(out.elements.is_empty());
    }

    #[test]
    fn aggregation_is_pure() {
        let tables = BalanceTables::default();
        let shop = ShopState {
            damage_level: 3,
            ..ShopState::default()
        };
        let weapon = item(EquipSlot::Weapon, &[(StatKey::DamageMul, 0.06)], None);
        let equipped = [&weapon];
        let input = AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &equipped,
            socketed: &[],
        };
        assert_eq!(aggregate(&input), aggregate(&input));
    }

    #[test]
    fn shop_and_gear_compose() {
        let tables = BalanceTables::default();
        let shop = ShopState {
            damage_level: 2,
            fire_floor_unlocked: true,
            ..ShopState::default()
        };
        let weapon = item(EquipSlot::Weapon, &[(StatKey::DamageMul, 0.10)], None);
        let equipped = [&weapon];
        let out = aggregate(&AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &equipped,
            socketed: &[],
        });
        // (1 + 0.16) shop level, then ×1.10 from the affix.
        assert!((out.bundle.damage_mul - 1.16 * 1.10).abs() < 1e-6);
        // Unlocked floor: 500 ms × 0.55.
        assert_eq!(out.bundle.fire_interval_floor_ms, 275);
    }

    #[test]
    fn gem_elements_reach_the_loadout() {
        let tables = BalanceTables::default();
        let shop = ShopState::default();
        let gem = Gem {
            id: 1,
            stat: StatKey::DamageMul,
            tier: GemTier::Normal,
            element: Some(Element::Fire),
        };
        let socketed = [&gem];
        let out = aggregate(&AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &[],
            socketed: &socketed,
        });
        assert!(out.elements.contains(Element::Fire));
        assert!(out.bundle.damage_mul > 1.0);
    }

    #[test]
    fn set_bonuses_add_except_penetration_decay() {
        let mut tables = BalanceTables::default();
        tables.sets = vec![SetDef {
            id: "test".into(),
            name: "Test".into(),
            bonuses: vec![
                SetBonus {
                    pieces: 2,
                    stat: StatKey::DamageMul,
                    value: 0.05,
                },
                SetBonus {
                    pieces: 2,
                    stat: StatKey::PenetrationDecayMul,
                    value: 0.05,
                },
            ],
        }];
        let shop = ShopState::default();
        let a = item(EquipSlot::Weapon, &[], Some("test"));
        let b = item(EquipSlot::Core, &[], Some("test"));
        let equipped = [&a, &b];
        let out = aggregate(&AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &equipped,
            socketed: &[],
        });
        assert!((out.bundle.damage_mul - 1.05).abs() < 1e-6);
        assert!((out.bundle.penetration_decay_mul - 1.05).abs() < 1e-6);
    }

    #[test]
    fn gear_totals_clamp_to_stat_ceilings() {
        let tables = BalanceTables::default();
        let shop = ShopState::default();

        // A wildly over-rolled affix, amplified further by level scaling.
        let mut weapon = item(EquipSlot::Weapon, &[(StatKey::DamageMul, 5.0)], None);
        weapon.rarity = Rarity::Legend;
        weapon.level = tables.equipment.max_level;
        let equipped = [&weapon];
        let out = aggregate(&AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &equipped,
            socketed: &[],
        });
        let cap = tables.equipment.stat_cap(StatKey::DamageMul).unwrap();
        assert!((out.bundle.damage_mul - (1.0 + cap)).abs() < 1e-6);

        // A modest roll stays under the ceiling untouched.
        let modest = item(EquipSlot::Weapon, &[(StatKey::DamageMul, 0.06)], None);
        let equipped = [&modest];
        let out = aggregate(&AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &equipped,
            socketed: &[],
        });
        assert!((out.bundle.damage_mul - 1.06).abs() < 1e-6);
    }

    #[test]
    fn status_power_clamps_to_neutral() {
        let tables = BalanceTables::default();
        let shop = ShopState::default();
        // A hostile affix trying to weaken DoT.
        let cursed = item(EquipSlot::Module, &[(StatKey::StatusDotMul, -0.5)], None);
        let equipped = [&cursed];
        let out = aggregate(&AggregatorInput {
            tables: &tables,
            shop: &shop,
            equipped: &equipped,
            socketed: &[],
        });
        assert_eq!(out.bundle.status.dot_mul, 1.0);
    }
}
