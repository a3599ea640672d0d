//! Run lifecycle around the deterministic simulation.
//!
//! The session owns the profile and the balance tables, builds a
//! [`Simulation`] per run from the aggregated loadout, and folds the run
//! summary back into the profile when it ends. Everything between runs
//! (shop, salvage, upgrades, merges) also goes through here so the
//! profile stays the single source of truth.

use game_core::equipment::{
    MergeOutcome, merge_gems, merge_items, roll_gem, roll_item, salvage_value, upgrade_cost,
};
use game_core::stats::{AggregatorInput, ResolvedLoadout, aggregate};
use game_core::tables::BalanceTables;
use game_core::{
    ChoiceError, DailyModifiers, DailyRule, Gem, Presenter, RunSummary, ShopError, ShopUpgrade,
    SkillId, Simulation, date_seed, mix_seed, roll_rules,
};

use crate::profile::Profile;
use crate::store::ProfileStore;

// Seed lanes for the post-run reward rolls.
const ITEM_ROLL_CONTEXT: u32 = 80;
const GEM_ROLL_CONTEXT: u32 = 81;
const MERGE_ROLL_CONTEXT: u32 = 82;

/// Errors from between-run economy operations.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    #[error("unknown item id {0}")]
    UnknownItem(u64),

    #[error("unknown gem id {0}")]
    UnknownGem(u64),

    #[error("item is locked")]
    Locked,

    #[error("item is already at max level")]
    Maxed,

    #[error("need {need} shards, have {have}")]
    InsufficientShards { need: u32, have: u32 },

    #[error("items cannot be merged")]
    IncompatibleMerge,

    #[error(transparent)]
    Shop(#[from] ShopError),
}

/// One player's sitting: profile, tables, and the save path.
pub struct Session<S: ProfileStore> {
    tables: BalanceTables,
    profile: Profile,
    store: S,
    /// Monotonic counter salting reward rolls within a sitting.
    reward_nonce: u64,
}

impl<S: ProfileStore> Session<S> {
    /// Open a session, loading the saved profile if one exists.
    ///
    /// A store that fails outright (I/O, poisoned lock) logs and starts
    /// from the default profile; the broken save stays on disk untouched
    /// until the next successful write.
    pub fn open(store: S, tables: BalanceTables) -> Self {
        let profile = match store.load() {
            Ok(Some(profile)) => profile,
            Ok(None) => Profile::default(),
            Err(e) => {
                tracing::warn!(error = %e, "profile load failed, starting fresh");
                Profile::default()
            }
        };
        Self {
            tables,
            profile,
            store,
            reward_nonce: 0,
        }
    }

    /// Open a session with tables assembled from a content directory.
    ///
    /// Missing or malformed content files fall back to the compiled-in
    /// defaults; see [`game_content::loaders::ContentFactory`].
    pub fn open_from_dir(store: S, data_dir: impl Into<std::path::PathBuf>) -> Self {
        let tables = game_content::loaders::ContentFactory::new(data_dir).assemble();
        Self::open(store, tables)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    pub fn tables(&self) -> &BalanceTables {
        &self.tables
    }

    /// Resolve the current loadout into the stat bundle a run consumes.
    pub fn resolve_loadout(&self) -> ResolvedLoadout {
        let equipped = self.profile.equipped_items();
        let socketed = self.profile.socketed_gems();
        aggregate(&AggregatorInput {
            tables: &self.tables,
            shop: &self.profile.shop,
            equipped: &equipped,
            socketed: &socketed,
        })
    }

    /// Build a standard run from the current profile.
    pub fn start_run(&self, run_seed: u64) -> Simulation {
        Simulation::new(
            run_seed,
            self.tables.clone(),
            self.resolve_loadout(),
            DailyModifiers::default(),
        )
    }

    /// Build a daily challenge run for a calendar date (`YYYY-MM-DD`).
    ///
    /// The date fixes both the run seed and the rule set, so every
    /// player faces the same board on the same day.
    pub fn start_daily_run(&self, date: &str) -> (Simulation, Vec<DailyRule>) {
        let rules = roll_rules(date, &self.tables.daily);
        let modifiers = DailyModifiers::resolve(&rules, &self.tables.daily);
        let sim = Simulation::new(
            date_seed(date),
            self.tables.clone(),
            self.resolve_loadout(),
            modifiers,
        );
        (sim, rules)
    }

    /// Today's daily run, by the UTC calendar.
    pub fn start_todays_daily(&self) -> (Simulation, Vec<DailyRule>) {
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        self.start_daily_run(&date)
    }

    /// Commit a level-up skill choice on a live run and snapshot the
    /// run's level and skill levels into the profile.
    ///
    /// The snapshot is what a reopened session resumes from if the
    /// process dies mid-run; [`finish_run`](Self::finish_run) clears it.
    pub fn choose_skill(
        &mut self,
        sim: &mut Simulation,
        id: SkillId,
        presenter: &mut impl Presenter,
    ) -> Result<(), ChoiceError> {
        sim.choose_skill(id, presenter)?;
        self.profile.level = sim.run().level;
        self.profile.skill_state = sim.run().skills;
        self.save();
        Ok(())
    }

    /// Fold a finished run into the profile and save.
    ///
    /// Equipment and gem drops earned during the run are rolled into
    /// real inventory pieces here, seeded from the run so a replayed run
    /// yields the same loot. The save is best-effort: a failure is
    /// logged and the profile stays dirty in memory.
    pub fn finish_run(&mut self, summary: &RunSummary, run_seed: u64) {
        self.profile.high_score = self.profile.high_score.max(summary.score);
        self.profile.max_wave = self.profile.max_wave.max(summary.wave);
        self.profile.coins = self.profile.coins.saturating_add(summary.coins);
        self.profile.achievements.counters.fold_run(&summary.tally);

        for n in 0..summary.equipment_drops {
            let id = self.profile.next_item_id();
            let seed = mix_seed(run_seed, n as u64, 0, ITEM_ROLL_CONTEXT);
            let item = roll_item(id, seed, &self.tables.equipment, &self.tables.sets);
            self.profile.equipment.inventory.push(item);
        }
        for n in 0..summary.gem_drops {
            let id = self.profile.next_gem_id();
            let seed = mix_seed(run_seed, n as u64, 0, GEM_ROLL_CONTEXT);
            let gem = roll_gem(id, seed, &self.tables.gems);
            self.profile.gems.inventory.push(gem);
        }

        let fresh = self
            .profile
            .achievements
            .check_unlocks(&self.tables.achievements);
        for def in &fresh {
            tracing::info!(id = %def.id, "achievement unlocked");
        }
        let (coins, shards) = fresh
            .iter()
            .fold((0u32, 0u32), |(c, s), def| {
                (c + def.coin_reward, s + def.shard_reward)
            });
        self.profile.coins = self.profile.coins.saturating_add(coins);
        self.profile.shards = self.profile.shards.saturating_add(shards);

        // The run is over; drop the resume snapshot.
        self.profile.level = 0;
        self.profile.skill_state = Default::default();

        self.save();
    }

    /// Persist the profile, logging failures instead of propagating.
    pub fn save(&self) {
        if let Err(e) = self.store.save(&self.profile) {
            tracing::warn!(error = %e, "profile save failed");
        }
    }

    /// Buy a shop upgrade with profile coins.
    pub fn purchase(&mut self, upgrade: ShopUpgrade) -> Result<(), EconomyError> {
        let mut coins = self.profile.coins;
        self.profile
            .shop
            .purchase(upgrade, &mut coins, &self.tables.shop)?;
        self.profile.coins = coins;
        self.save();
        Ok(())
    }

    /// Destroy an item for shards.
    ///
    /// An equipped item is unequipped as it goes; gems socketed into it
    /// return to the bag. Locked items refuse.
    pub fn salvage_item(&mut self, item_id: u64) -> Result<u32, EconomyError> {
        let item = self
            .profile
            .item(item_id)
            .ok_or(EconomyError::UnknownItem(item_id))?;
        let shards = salvage_value(item, &self.tables.equipment).ok_or(EconomyError::Locked)?;

        self.remove_item(item_id);
        self.profile.shards = self.profile.shards.saturating_add(shards);
        self.save();
        Ok(shards)
    }

    /// Spend shards to raise an item one level.
    pub fn upgrade_item(&mut self, item_id: u64) -> Result<(), EconomyError> {
        let item = self
            .profile
            .item(item_id)
            .ok_or(EconomyError::UnknownItem(item_id))?;
        let need = upgrade_cost(item, &self.tables.equipment).ok_or(EconomyError::Maxed)?;
        let have = self.profile.shards;
        if have < need {
            return Err(EconomyError::InsufficientShards { need, have });
        }

        self.profile.shards = have - need;
        if let Some(item) = self.profile.item_mut(item_id) {
            item.level += 1;
        }
        self.save();
        Ok(())
    }

    /// Merge `fodder` into `kept`, consuming the fodder on success.
    pub fn merge_items(&mut self, kept_id: u64, fodder_id: u64) -> Result<(), EconomyError> {
        let kept = self
            .profile
            .item(kept_id)
            .ok_or(EconomyError::UnknownItem(kept_id))?
            .clone();
        let fodder = self
            .profile
            .item(fodder_id)
            .ok_or(EconomyError::UnknownItem(fodder_id))?
            .clone();

        self.reward_nonce += 1;
        let seed = mix_seed(kept.id, self.reward_nonce, 0, MERGE_ROLL_CONTEXT);
        let merged = match merge_items(&kept, &fodder, seed, &self.tables.equipment, &self.tables.sets)
        {
            MergeOutcome::LevelUp(item) | MergeOutcome::RarityUp(item) => item,
            MergeOutcome::Incompatible => return Err(EconomyError::IncompatibleMerge),
        };

        self.remove_item(fodder_id);
        if let Some(slot) = self.profile.item_mut(kept_id) {
            *slot = merged;
        }
        self.save();
        Ok(())
    }

    /// Merge three identical gems into one of the next tier.
    pub fn merge_gems(&mut self, gem_ids: [u64; 3]) -> Result<u64, EconomyError> {
        let mut gems: Vec<Gem> = Vec::with_capacity(3);
        for id in gem_ids {
            gems.push(
                self.profile
                    .gem(id)
                    .ok_or(EconomyError::UnknownGem(id))?
                    .clone(),
            );
        }
        let trio: [Gem; 3] = [gems[0].clone(), gems[1].clone(), gems[2].clone()];

        let new_id = self.profile.next_gem_id();
        let merged = merge_gems(new_id, &trio).ok_or(EconomyError::IncompatibleMerge)?;

        for id in gem_ids {
            self.remove_gem(id);
        }
        self.profile.gems.inventory.push(merged);
        self.save();
        Ok(new_id)
    }

    fn remove_item(&mut self, item_id: u64) {
        self.profile.equipment.inventory.retain(|i| i.id != item_id);
        self.profile.equipment.equipped.retain(|_, id| *id != item_id);
        // Gems socketed in the destroyed item return to the bag.
        self.profile.gems.socketed.remove(&item_id);
    }

    fn remove_gem(&mut self, gem_id: u64) {
        self.profile.gems.inventory.retain(|g| g.id != gem_id);
        for sockets in self.profile.gems.socketed.values_mut() {
            sockets.retain(|id| *id != gem_id);
        }
    }
}
