//! Persistent player profile.
//!
//! The profile is everything that survives between runs: currencies,
//! lifetime counters, shop purchases, the gear and gem collections, and
//! a snapshot of the interrupted run's skill build so a closed game can
//! resume where it left off. Serialized as JSON by the store layer; all
//! fields carry `serde(default)` so older or hand-edited saves load.

mod migrate;

pub use migrate::{CURRENT_VERSION, migrate};

use std::collections::BTreeMap;

use game_core::equipment::socket_capacity;
use game_core::tables::GemTables;
use game_core::{AchievementState, EquipSlot, Gem, Item, ShopState, SkillLevels};
use serde::{Deserialize, Serialize};

/// Player-facing settings persisted alongside progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub low_power_mode: bool,
}

/// The gear collection: owned items, one equipped per slot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentBag {
    /// Next item id to assign; ids are unique within the profile.
    pub next_id: u64,
    pub inventory: Vec<Item>,
    pub equipped: BTreeMap<EquipSlot, u64>,
}

/// The gem collection: owned gems, socketed ones keyed by item id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemBag {
    pub next_id: u64,
    pub inventory: Vec<Gem>,
    /// Gem ids socketed into each item, keyed by item id.
    pub socketed: BTreeMap<u64, Vec<u64>>,
}

/// A named equip preset the player can switch between.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    pub name: String,
    pub equipped: BTreeMap<EquipSlot, u64>,
}

/// Everything that persists between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub version: u32,
    pub locale: String,
    pub high_score: u64,
    pub max_wave: u32,
    pub coins: u32,
    /// Currency from salvage and achievement rewards; spent on upgrades.
    pub shards: u32,
    /// Resume snapshot: the interrupted run's level and skill build.
    pub level: u8,
    pub skill_state: SkillLevels,
    pub achievements: AchievementState,
    pub toggles: Toggles,
    pub tutorial_completed: bool,
    pub shop: ShopState,
    pub equipment: EquipmentBag,
    pub gems: GemBag,
    pub loadouts: Vec<Loadout>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            locale: "en".to_string(),
            high_score: 0,
            max_wave: 0,
            coins: 0,
            shards: 0,
            level: 0,
            skill_state: SkillLevels::default(),
            achievements: AchievementState::default(),
            toggles: Toggles::default(),
            tutorial_completed: false,
            shop: ShopState::default(),
            equipment: EquipmentBag::default(),
            gems: GemBag::default(),
            loadouts: Vec::new(),
        }
    }
}

impl Profile {
    pub fn item(&self, id: u64) -> Option<&Item> {
        self.equipment.inventory.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: u64) -> Option<&mut Item> {
        self.equipment.inventory.iter_mut().find(|i| i.id == id)
    }

    pub fn gem(&self, id: u64) -> Option<&Gem> {
        self.gems.inventory.iter().find(|g| g.id == id)
    }

    /// Mint the next item id.
    pub fn next_item_id(&mut self) -> u64 {
        self.equipment.next_id += 1;
        self.equipment.next_id
    }

    /// Mint the next gem id.
    pub fn next_gem_id(&mut self) -> u64 {
        self.gems.next_id += 1;
        self.gems.next_id
    }

    /// Currently equipped items, in slot order.
    pub fn equipped_items(&self) -> Vec<&Item> {
        self.equipment
            .equipped
            .values()
            .filter_map(|id| self.item(*id))
            .collect()
    }

    /// Gems socketed into the currently equipped items, in item order.
    pub fn socketed_gems(&self) -> Vec<&Gem> {
        self.equipment
            .equipped
            .values()
            .filter_map(|item_id| self.gems.socketed.get(item_id))
            .flatten()
            .filter_map(|gem_id| self.gem(*gem_id))
            .collect()
    }

    /// Equip an owned item into its slot. Returns `false` if the item is
    /// unknown or the slot does not match.
    pub fn equip(&mut self, slot: EquipSlot, item_id: u64) -> bool {
        match self.item(item_id) {
            Some(item) if item.slot == slot => {
                self.equipment.equipped.insert(slot, item_id);
                true
            }
            _ => false,
        }
    }

    pub fn unequip(&mut self, slot: EquipSlot) {
        self.equipment.equipped.remove(&slot);
    }

    /// Socket an owned gem into an owned item, respecting the item's
    /// socket capacity. Returns `false` if either id is unknown, the gem
    /// is already socketed somewhere, or the item is full.
    pub fn socket_gem(&mut self, item_id: u64, gem_id: u64, tables: &GemTables) -> bool {
        if self.gem(gem_id).is_none() {
            return false;
        }
        if self.gems.socketed.values().any(|ids| ids.contains(&gem_id)) {
            return false;
        }
        let Some(item) = self.item(item_id) else {
            return false;
        };
        let capacity = socket_capacity(item.rarity, item.level, tables) as usize;
        let sockets = self.gems.socketed.entry(item_id).or_default();
        if sockets.len() >= capacity {
            return false;
        }
        sockets.push(gem_id);
        true
    }

    /// Pull a gem back out of an item's sockets.
    pub fn unsocket_gem(&mut self, item_id: u64, gem_id: u64) -> bool {
        let Some(sockets) = self.gems.socketed.get_mut(&item_id) else {
            return false;
        };
        let before = sockets.len();
        sockets.retain(|id| *id != gem_id);
        sockets.len() != before
    }

    /// Snapshot the current equip map under a name, replacing any preset
    /// with the same name.
    pub fn save_loadout(&mut self, name: &str) {
        let equipped = self.equipment.equipped.clone();
        if let Some(existing) = self.loadouts.iter_mut().find(|l| l.name == name) {
            existing.equipped = equipped;
        } else {
            self.loadouts.push(Loadout {
                name: name.to_string(),
                equipped,
            });
        }
    }

    /// Restore a named preset, skipping ids no longer in the inventory.
    pub fn apply_loadout(&mut self, name: &str) -> bool {
        let Some(loadout) = self.loadouts.iter().find(|l| l.name == name).cloned() else {
            return false;
        };
        self.equipment.equipped.clear();
        for (slot, item_id) in loadout.equipped {
            self.equip(slot, item_id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::equipment::{Rarity, roll_gem, roll_item};
    use game_core::tables::BalanceTables;

    fn profile_with_gear() -> (Profile, BalanceTables) {
        let tables = BalanceTables::default();
        let mut profile = Profile::default();
        for seed in 0..4u64 {
            let id = profile.next_item_id();
            let item = roll_item(id, seed, &tables.equipment, &tables.sets);
            profile.equipment.inventory.push(item);
        }
        (profile, tables)
    }

    #[test]
    fn equip_rejects_wrong_slot() {
        let (mut profile, _tables) = profile_with_gear();
        let item = profile.equipment.inventory[0].clone();
        let wrong = match item.slot {
            EquipSlot::Weapon => EquipSlot::Core,
            _ => EquipSlot::Weapon,
        };
        assert!(!profile.equip(wrong, item.id));
        assert!(profile.equip(item.slot, item.id));
        assert_eq!(profile.equipped_items().len(), 1);
    }

    #[test]
    fn socket_capacity_is_enforced() {
        let (mut profile, tables) = profile_with_gear();
        let item = profile.equipment.inventory[0].clone();
        let capacity = socket_capacity(item.rarity, item.level, &tables.gems) as usize;

        let mut socketed = 0;
        for seed in 0..10u64 {
            let id = profile.next_gem_id();
            let gem = roll_gem(id, seed, &tables.gems);
            profile.gems.inventory.push(gem);
            if profile.socket_gem(item.id, id, &tables.gems) {
                socketed += 1;
            }
        }
        assert_eq!(socketed, capacity);
        assert!(capacity >= 2);
    }

    #[test]
    fn gem_cannot_be_socketed_twice() {
        let (mut profile, tables) = profile_with_gear();
        let first = profile.equipment.inventory[0].id;
        let second = profile.equipment.inventory[1].id;
        let gem_id = profile.next_gem_id();
        let gem = roll_gem(gem_id, 7, &tables.gems);
        profile.gems.inventory.push(gem);

        assert!(profile.socket_gem(first, gem_id, &tables.gems));
        assert!(!profile.socket_gem(second, gem_id, &tables.gems));
        assert!(profile.unsocket_gem(first, gem_id));
        assert!(profile.socket_gem(second, gem_id, &tables.gems));
    }

    #[test]
    fn loadouts_round_trip_the_equip_map() {
        let (mut profile, _tables) = profile_with_gear();
        let item = profile.equipment.inventory[0].clone();
        profile.equip(item.slot, item.id);
        profile.save_loadout("farming");

        profile.unequip(item.slot);
        assert!(profile.equipped_items().is_empty());

        assert!(profile.apply_loadout("farming"));
        assert_eq!(profile.equipped_items().len(), 1);
        assert!(!profile.apply_loadout("missing"));
    }

    #[test]
    fn legend_items_reach_extra_sockets_at_high_level() {
        let tables = BalanceTables::default();
        let low = socket_capacity(Rarity::Legend, 1, &tables.gems);
        let high = socket_capacity(
            Rarity::Legend,
            tables.gems.legend_bonus_level,
            &tables.gems,
        );
        assert_eq!(high, low + 1);
    }
}
