//! Meta shop: coin-bought permanent upgrades.
//!
//! Shop levels live in the profile and are a separate namespace from the
//! in-run skill levels; the two never share caps. The aggregator turns
//! shop state into stat-bundle contributions at run start.

use thiserror::Error;

use crate::tables::ShopTables;

/// Purchasable upgrade tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShopUpgrade {
    /// +damage per level.
    Damage,
    /// One-shot: lowers the fire-interval floor.
    FireFloor,
    /// +loot chance per level, capped.
    Loot,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    #[error("upgrade is already at its maximum")]
    Maxed,
    #[error("not enough coins: need {need}, have {have}")]
    InsufficientCoins { need: u32, have: u32 },
}

/// Persistent shop purchase state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShopState {
    pub damage_level: u8,
    pub fire_floor_unlocked: bool,
    pub loot_level: u8,
}

impl ShopState {
    /// Coin cost of the next step on a track; `None` once maxed.
    pub fn cost(&self, upgrade: ShopUpgrade, tables: &ShopTables) -> Option<u32> {
        match upgrade {
            ShopUpgrade::Damage => {
                if self.damage_level >= tables.damage_max_level {
                    return None;
                }
                Some(tables.damage_base_cost * (self.damage_level as u32 + 1))
            }
            ShopUpgrade::FireFloor => {
                if self.fire_floor_unlocked {
                    return None;
                }
                Some(tables.fire_floor_cost)
            }
            ShopUpgrade::Loot => {
                if self.loot_level >= tables.loot_max_level {
                    return None;
                }
                Some(tables.loot_base_cost * (self.loot_level as u32 + 1))
            }
        }
    }

    /// Buy the next step, deducting from `coins`.
    pub fn purchase(
        &mut self,
        upgrade: ShopUpgrade,
        coins: &mut u32,
        tables: &ShopTables,
    ) -> Result<(), ShopError> {
        let need = self.cost(upgrade, tables).ok_or(ShopError::Maxed)?;
        if *coins < need {
            return Err(ShopError::InsufficientCoins { need, have: *coins });
        }
        *coins -= need;
        match upgrade {
            ShopUpgrade::Damage => self.damage_level += 1,
            ShopUpgrade::FireFloor => self.fire_floor_unlocked = true,
            ShopUpgrade::Loot => self.loot_level += 1,
        }
        Ok(())
    }

    /// Fractional damage bonus from purchased levels.
    pub fn damage_bonus(&self, tables: &ShopTables) -> f32 {
        tables.damage_step * self.damage_level as f32
    }

    /// Additive loot-chance bonus, clamped to the cap.
    pub fn loot_bonus(&self, tables: &ShopTables) -> f32 {
        (tables.loot_step * self.loot_level as f32).min(tables.loot_cap)
    }

    /// Fire-interval floor ratio the player has unlocked.
    pub fn fire_floor_ratio(&self, base_ratio: f32, tables: &ShopTables) -> f32 {
        if self.fire_floor_unlocked {
            tables.fire_floor_unlocked_ratio
        } else {
            base_ratio
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_deducts_and_levels() {
        let tables = ShopTables::default();
        let mut shop = ShopState::default();
        let mut coins = 200;

        shop.purchase(ShopUpgrade::Damage, &mut coins, &tables).unwrap();
        assert_eq!(shop.damage_level, 1);
        assert_eq!(coins, 150);
        // Next level costs more.
        assert_eq!(shop.cost(ShopUpgrade::Damage, &tables), Some(100));
    }

    #[test]
    fn insufficient_coins_change_nothing() {
        let tables = ShopTables::default();
        let mut shop = ShopState::default();
        let mut coins = 10;
        let err = shop
            .purchase(ShopUpgrade::FireFloor, &mut coins, &tables)
            .unwrap_err();
        assert_eq!(
            err,
            ShopError::InsufficientCoins {
                need: tables.fire_floor_cost,
                have: 10
            }
        );
        assert_eq!(coins, 10);
        assert!(!shop.fire_floor_unlocked);
    }

    #[test]
    fn tracks_cap_out() {
        let tables = ShopTables::default();
        let mut shop = ShopState {
            damage_level: tables.damage_max_level,
            fire_floor_unlocked: true,
            loot_level: 0,
        };
        let mut coins = 10_000;
        assert_eq!(
            shop.purchase(ShopUpgrade::Damage, &mut coins, &tables),
            Err(ShopError::Maxed)
        );
        assert_eq!(
            shop.purchase(ShopUpgrade::FireFloor, &mut coins, &tables),
            Err(ShopError::Maxed)
        );
        assert_eq!(coins, 10_000);
    }

    #[test]
    fn loot_bonus_caps() {
        let tables = ShopTables::default();
        let shop = ShopState {
            loot_level: tables.loot_max_level,
            ..ShopState::default()
        };
        assert!(shop.loot_bonus(&tables) <= tables.loot_cap + 1e-6);
    }

    #[test]
    fn fire_floor_unlock_lowers_ratio() {
        let tables = ShopTables::default();
        let mut shop = ShopState::default();
        assert_eq!(shop.fire_floor_ratio(0.60, &tables), 0.60);
        shop.fire_floor_unlocked = true;
        assert_eq!(
            shop.fire_floor_ratio(0.60, &tables),
            tables.fire_floor_unlocked_ratio
        );
    }
}
