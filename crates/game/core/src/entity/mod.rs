//! Pooled entities: bullets, enemies, and the slot arena behind them.

mod bullet;
mod enemy;
mod pool;

pub use bullet::Bullet;
pub use enemy::{EliteAffix, Enemy, EnemyFlags, MAX_ELITE_AFFIXES};
pub use pool::{Handle, Pool};
