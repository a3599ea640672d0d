//! Deterministic combat and progression simulation for a vertical wave
//! shooter.
//!
//! `game-core` owns the run-time rules: the damage pipeline, shot pattern
//! composition, status effects, wave scaling, pooled entities, and the
//! level-up state machine. Everything is pure with respect to the run
//! seed and the virtual clock: no wall-clock reads, no I/O, no global
//! state. Persistence and session orchestration live in the runtime
//! crate; TOML table loading lives in the content crate.
pub mod achievements;
pub mod clock;
pub mod combat;
pub mod daily;
pub mod element;
pub mod entity;
pub mod equipment;
pub mod events;
pub mod geom;
pub mod pattern;
pub mod rng;
pub mod shop;
pub mod sim;
pub mod skill;
pub mod state;
pub mod stats;
pub mod status;
pub mod tables;
pub mod wave;

pub use achievements::{AchievementState, CounterKind, Counters, RunTally};
pub use clock::{PauseLatch, PauseReason, SimClock};
pub use combat::{BulletFate, CombatContext, Explosion, HitOutcome};
pub use daily::{date_seed, roll_rules, DailyModifiers, DailyRule};
pub use element::{damage_multiplier, Element, ElementRules, ElementSet};
pub use entity::{Bullet, EliteAffix, Enemy, EnemyFlags, Handle, Pool};
pub use equipment::{
    EquipSlot, Gem, GemTier, Item, MergeOutcome, Rarity, SetBonus, SetDef,
};
pub use events::{NullPresenter, Presenter, SoundId, VisualKind};
pub use geom::Vec2;
pub use pattern::ShotPattern;
pub use rng::{mix_seed, Pcg, RollSource, RunRng};
pub use shop::{ShopError, ShopState, ShopUpgrade};
pub use sim::{EndReason, RunSummary, Simulation};
pub use skill::{ChoiceError, LevelUpPhase, SkillId, SkillLevels, SkillOffer, SkillProgression};
pub use state::{HasteBuff, RunState};
pub use stats::{aggregate, AggregatorInput, ResolvedLoadout, StatBundle, StatKey, StatusPower};
pub use status::StatusSlots;
pub use tables::BalanceTables;
pub use wave::{RingBurst, WaveDirector, WaveTick};
