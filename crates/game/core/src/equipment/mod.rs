//! Meta-progression gear: items, gems, and set bonuses.
//!
//! Equipment lives in the profile, not the run. Runs only ever see the
//! resolved [`crate::stats::StatBundle`]; all inventory manipulation
//! (rolls, upgrades, merges, sockets) happens between runs.

mod gems;
mod item;
mod sets;

pub use gems::{merge_gems, roll_gem, socket_capacity, Gem, GemTier};
pub use item::{merge_items, roll_item, salvage_value, upgrade_cost, Item, MergeOutcome};
pub use sets::{active_set_bonuses, SetBonus, SetDef};

use strum::{EnumIter, IntoEnumIterator};

/// Gear slot; one item of each slot may be equipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EquipSlot {
    Weapon,
    Core,
    Module,
    Charm,
}

impl EquipSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Core => "core",
            EquipSlot::Module => "module",
            EquipSlot::Charm => "charm",
        }
    }

    pub fn parse(id: &str) -> Option<EquipSlot> {
        EquipSlot::iter().find(|s| s.as_str() == id)
    }
}

/// Item rarity, ordered weakest to strongest.
///
/// Rarity fixes the affix tier (1..=4) used when rolling affix magnitudes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legend,
}

impl Rarity {
    /// Affix tier backing this rarity.
    pub fn tier(self) -> u8 {
        match self {
            Rarity::Common => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legend => 4,
        }
    }

    /// Next rarity up, if any.
    pub fn next(self) -> Option<Rarity> {
        match self {
            Rarity::Common => Some(Rarity::Rare),
            Rarity::Rare => Some(Rarity::Epic),
            Rarity::Epic => Some(Rarity::Legend),
            Rarity::Legend => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legend => "legend",
        }
    }

    pub fn parse(id: &str) -> Option<Rarity> {
        Rarity::iter().find(|r| r.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_ordering_matches_tier() {
        assert!(Rarity::Common < Rarity::Legend);
        assert_eq!(Rarity::Epic.tier(), 3);
        assert_eq!(Rarity::Legend.next(), None);
        assert_eq!(Rarity::Common.next(), Some(Rarity::Rare));
    }
}
