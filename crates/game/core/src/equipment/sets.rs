//! Set bonus definitions and resolution.

use std::collections::BTreeMap;

use crate::equipment::Item;
use crate::stats::StatKey;

/// One bonus granted when a piece-count threshold is met.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetBonus {
    /// Equipped pieces required (2 or 4 in the shipped tables).
    pub pieces: u8,
    pub stat: StatKey,
    pub value: f32,
}

/// A named equipment set with its threshold bonuses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetDef {
    pub id: String,
    pub name: String,
    pub bonuses: Vec<SetBonus>,
}

/// Resolve the set bonuses active for an equipped loadout.
///
/// Counts equipped pieces per set id and yields every bonus whose piece
/// threshold is met. Stacking semantics (additive for most stats,
/// multiplicative for penetration decay) are applied by the aggregator
/// via [`crate::stats::StatBundle::apply`].
pub fn active_set_bonuses<'a>(
    equipped: &[&Item],
    sets: &'a [SetDef],
) -> impl Iterator<Item = &'a SetBonus> + 'a {
    let mut counts: BTreeMap<&str, u8> = BTreeMap::new();
    for item in equipped {
        if let Some(id) = item.set_id.as_deref() {
            *counts.entry(id).or_default() += 1;
        }
    }
    let counts: BTreeMap<String, u8> = counts
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

    sets.iter().flat_map(move |set| {
        let have = counts.get(&set.id).copied().unwrap_or(0);
        set.bonuses.iter().filter(move |bonus| have >= bonus.pieces)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{EquipSlot, Rarity};

    fn piece(set_id: Option<&str>, slot: EquipSlot) -> Item {
        Item {
            id: 1,
            slot,
            rarity: Rarity::Common,
            level: 1,
            affixes: BTreeMap::new(),
            set_id: set_id.map(str::to_owned),
            locked: false,
        }
    }

    fn demo_set() -> SetDef {
        SetDef {
            id: "ember".into(),
            name: "Ember Vanguard".into(),
            bonuses: vec![
                SetBonus {
                    pieces: 2,
                    stat: StatKey::DamageMul,
                    value: 0.05,
                },
                SetBonus {
                    pieces: 4,
                    stat: StatKey::PenetrationDecayMul,
                    value: 0.05,
                },
            ],
        }
    }

    #[test]
    fn thresholds_gate_bonuses() {
        let sets = [demo_set()];
        let a = piece(Some("ember"), EquipSlot::Weapon);
        let b = piece(Some("ember"), EquipSlot::Core);
        let c = piece(Some("ember"), EquipSlot::Module);
        let d = piece(Some("ember"), EquipSlot::Charm);

        let two: Vec<_> = active_set_bonuses(&[&a, &b], &sets).collect();
        assert_eq!(two.len(), 1);
        assert_eq!(two[0].pieces, 2);

        let four: Vec<_> = active_set_bonuses(&[&a, &b, &c, &d], &sets).collect();
        assert_eq!(four.len(), 2);
    }

    #[test]
    fn off_set_pieces_do_not_count() {
        let sets = [demo_set()];
        let a = piece(Some("ember"), EquipSlot::Weapon);
        let b = piece(None, EquipSlot::Core);
        let active: Vec<_> = active_set_bonuses(&[&a, &b], &sets).collect();
        assert!(active.is_empty());
    }
}
