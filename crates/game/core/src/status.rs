//! Status effects carried by enemies.
//!
//! Slots are stored inline on each enemy; the functions here implement
//! application rules (burn and freeze exclude each other, expose refreshes
//! instead of stacking), expiry, and burn tick cadence against the sim
//! clock. Status-power stats only ever scale effects upward.

use crate::stats::StatusPower;
use crate::tables::StatusTables;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurnState {
    pub expires_at: u64,
    pub next_tick_at: u64,
    pub tick_damage: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreezeState {
    pub expires_at: u64,
    /// Full freeze immobilizes; bosses only get the partial slow.
    pub full: bool,
    pub slow: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootState {
    pub expires_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShatterState {
    /// One-shot bonus fraction consumed by the next hit.
    pub bonus: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExposeState {
    pub expires_at: u64,
    pub bonus: f32,
}

/// Per-enemy status slots.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusSlots {
    pub burn: Option<BurnState>,
    pub freeze: Option<FreezeState>,
    pub root: Option<RootState>,
    pub shatter: Option<ShatterState>,
    pub expose: Option<ExposeState>,
}

impl StatusSlots {
    /// Apply burn from a hit for `hit_damage`. No-op while frozen.
    pub fn apply_burn(
        &mut self,
        hit_damage: f32,
        is_boss: bool,
        now: u64,
        tables: &StatusTables,
        power: &StatusPower,
    ) {
        if self.freeze.is_some() {
            return;
        }
        let ratio = if is_boss {
            tables.burn.damage_ratio * tables.burn.boss_ratio
        } else {
            tables.burn.damage_ratio
        };
        let duration = scale_ms(tables.burn.duration_ms, power.duration_mul);
        self.burn = Some(BurnState {
            expires_at: now + duration,
            next_tick_at: now + tables.burn.tick_ms,
            tick_damage: hit_damage * ratio * power.dot_mul,
        });
    }

    /// Apply freeze. No-op while burning. Bosses get a shorter slow
    /// instead of the full immobilize.
    pub fn apply_freeze(
        &mut self,
        is_boss: bool,
        now: u64,
        tables: &StatusTables,
        power: &StatusPower,
    ) {
        if self.burn.is_some() {
            return;
        }
        let (duration_ms, full, slow) = if is_boss {
            (
                tables.freeze.boss_duration_ms,
                false,
                (tables.freeze.boss_slow + power.slow_cap_add).min(tables.slow_cap),
            )
        } else {
            (tables.freeze.duration_ms, true, 1.0)
        };
        self.freeze = Some(FreezeState {
            expires_at: now + scale_ms(duration_ms, power.duration_mul),
            full,
            slow,
        });
    }

    pub fn apply_root(
        &mut self,
        is_boss: bool,
        now: u64,
        tables: &StatusTables,
        power: &StatusPower,
    ) {
        let duration_ms = if is_boss {
            tables.root.boss_duration_ms
        } else {
            tables.root.duration_ms
        };
        self.root = Some(RootState {
            expires_at: now + scale_ms(duration_ms, power.duration_mul),
        });
    }

    pub fn apply_shatter(&mut self, tables: &StatusTables) {
        self.shatter = Some(ShatterState {
            bonus: tables.shatter.bonus,
        });
    }

    /// Apply expose: refresh-on-reapply, never stacking.
    pub fn apply_expose(
        &mut self,
        is_boss: bool,
        now: u64,
        tables: &StatusTables,
        power: &StatusPower,
    ) {
        let duration_ms = if is_boss {
            tables.expose.boss_duration_ms
        } else {
            tables.expose.duration_ms
        };
        self.expose = Some(ExposeState {
            expires_at: now + scale_ms(duration_ms, power.duration_mul),
            bonus: tables.expose.bonus + power.vulnerability_add,
        });
    }

    /// Expire lapsed statuses and emit due burn ticks.
    ///
    /// Returns the damage-over-time to subtract this update. Multiple
    /// ticks can come due in one long frame.
    pub fn update(&mut self, now: u64, tick_ms: u64) -> f32 {
        let mut dot = 0.0;
        if let Some(burn) = self.burn.as_mut() {
            while burn.next_tick_at <= now && burn.next_tick_at <= burn.expires_at {
                dot += burn.tick_damage;
                burn.next_tick_at += tick_ms;
            }
            if now >= burn.expires_at {
                self.burn = None;
            }
        }
        if matches!(self.freeze, Some(f) if now >= f.expires_at) {
            self.freeze = None;
        }
        if matches!(self.root, Some(r) if now >= r.expires_at) {
            self.root = None;
        }
        if matches!(self.expose, Some(e) if now >= e.expires_at) {
            self.expose = None;
        }
        dot
    }

    /// Movement speed multiplier under the active control effects.
    pub fn movement_multiplier(&self, now: u64, slow_cap: f32) -> f32 {
        if matches!(self.root, Some(r) if now < r.expires_at) {
            return 0.0;
        }
        match self.freeze {
            Some(f) if now < f.expires_at => {
                if f.full {
                    0.0
                } else {
                    1.0 - f.slow.min(slow_cap)
                }
            }
            _ => 1.0,
        }
    }

    /// Extra-damage fraction from an active expose.
    pub fn expose_bonus(&self, now: u64) -> f32 {
        match self.expose {
            Some(e) if now < e.expires_at => e.bonus,
            _ => 0.0,
        }
    }

    /// Consume the one-shot shatter bonus, if armed.
    pub fn consume_shatter(&mut self) -> f32 {
        self.shatter.take().map(|s| s.bonus).unwrap_or(0.0)
    }

    pub fn is_frozen(&self, now: u64) -> bool {
        matches!(self.freeze, Some(f) if now < f.expires_at)
    }

    /// Clear the freeze (a fire hit landed); returns true if one was
    /// active.
    pub fn break_freeze(&mut self) -> bool {
        self.freeze.take().is_some()
    }
}

fn scale_ms(base: u64, mul: f32) -> u64 {
    (base as f32 * mul.max(1.0)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> StatusTables {
        StatusTables::default()
    }

    fn power() -> StatusPower {
        StatusPower::default()
    }

    #[test]
    fn burn_and_freeze_exclude_each_other() {
        let mut slots = StatusSlots::default();
        slots.apply_burn(10.0, false, 0, &tables(), &power());
        slots.apply_freeze(false, 0, &tables(), &power());
        assert!(slots.burn.is_some());
        assert!(slots.freeze.is_none());

        let mut slots = StatusSlots::default();
        slots.apply_freeze(false, 0, &tables(), &power());
        slots.apply_burn(10.0, false, 0, &tables(), &power());
        assert!(slots.freeze.is_some());
        assert!(slots.burn.is_none());
    }

    #[test]
    fn burn_ticks_on_cadence() {
        let t = tables();
        let mut slots = StatusSlots::default();
        slots.apply_burn(10.0, false, 0, &t, &power());
        // 2000 ms duration, 500 ms cadence: ticks at 500/1000/1500/2000.
        assert_eq!(slots.update(400, t.burn.tick_ms), 0.0);
        let tick = 10.0 * t.burn.damage_ratio;
        assert!((slots.update(500, t.burn.tick_ms) - tick).abs() < 1e-6);
        assert!((slots.update(1600, t.burn.tick_ms) - 2.0 * tick).abs() < 1e-6);
        assert!((slots.update(2500, t.burn.tick_ms) - tick).abs() < 1e-6);
        assert!(slots.burn.is_none());
    }

    #[test]
    fn boss_burn_is_reduced() {
        let t = tables();
        let mut slots = StatusSlots::default();
        slots.apply_burn(10.0, true, 0, &t, &power());
        let expect = 10.0 * t.burn.damage_ratio * t.burn.boss_ratio;
        assert!((slots.burn.unwrap().tick_damage - expect).abs() < 1e-6);
    }

    #[test]
    fn freeze_immobilizes_and_boss_slow_caps() {
        let t = tables();
        let mut slots = StatusSlots::default();
        slots.apply_freeze(false, 0, &t, &power());
        assert_eq!(slots.movement_multiplier(100, t.slow_cap), 0.0);

        let mut slots = StatusSlots::default();
        slots.apply_freeze(true, 0, &t, &power());
        let mul = slots.movement_multiplier(100, t.slow_cap);
        assert!((mul - (1.0 - t.freeze.boss_slow)).abs() < 1e-6);
    }

    #[test]
    fn root_stacks_with_burn() {
        let t = tables();
        let mut slots = StatusSlots::default();
        slots.apply_burn(10.0, false, 0, &t, &power());
        slots.apply_root(false, 0, &t, &power());
        assert!(slots.burn.is_some());
        assert_eq!(slots.movement_multiplier(100, t.slow_cap), 0.0);
        assert!(slots.update(3000, t.burn.tick_ms) > 0.0);
        assert_eq!(slots.movement_multiplier(3000, t.slow_cap), 1.0);
    }

    #[test]
    fn expose_refreshes_instead_of_stacking() {
        let t = tables();
        let mut slots = StatusSlots::default();
        slots.apply_expose(false, 0, &t, &power());
        let first = slots.expose.unwrap();
        slots.apply_expose(false, 1000, &t, &power());
        let second = slots.expose.unwrap();
        assert_eq!(second.bonus, first.bonus);
        assert_eq!(second.expires_at, 1000 + t.expose.duration_ms);
    }

    #[test]
    fn shatter_consumes_once() {
        let t = tables();
        let mut slots = StatusSlots::default();
        slots.apply_shatter(&t);
        assert!((slots.consume_shatter() - t.shatter.bonus).abs() < 1e-6);
        assert_eq!(slots.consume_shatter(), 0.0);
    }

    #[test]
    fn status_power_scales_upward_only() {
        let t = tables();
        let weak = StatusPower {
            duration_mul: 0.5,
            ..StatusPower::default()
        };
        let mut slots = StatusSlots::default();
        slots.apply_burn(10.0, false, 0, &t, &weak);
        // Below-neutral duration clamps back to the base duration.
        assert_eq!(slots.burn.unwrap().expires_at, t.burn.duration_ms);
    }
}
