//! Wave escalation, spawn pacing, elites, and boss behavior.
//!
//! The director owns the wave and spawn timers. Escalation multiplies
//! enemy speed and hp per wave, decays the spawn interval toward its
//! floor, and restarts the spawn timer. Every Nth wave spawns a boss
//! instead of restarting the regular flow.

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;

use crate::daily::DailyModifiers;
use crate::element::{Element, ElementSet};
use crate::entity::{EliteAffix, Enemy, EnemyFlags, MAX_ELITE_AFFIXES};
use crate::geom::Vec2;
use crate::rng::{mix_seed, Pcg, RollSource};
use crate::tables::BalanceTables;

/// What the director wants done this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveTick {
    /// Set when the wave just escalated, carrying the new wave number.
    pub escalated: Option<u32>,
    /// Spawn a regular enemy this tick.
    pub spawn_enemy: bool,
    /// Spawn the boss for this wave.
    pub spawn_boss: bool,
}

/// Wave and spawn pacing state.
#[derive(Clone, Debug)]
pub struct WaveDirector {
    wave: u32,
    next_wave_at: u64,
    next_spawn_at: u64,
    spawn_interval_ms: f32,
    speed_mul: f32,
    hp_mul: f32,
}

impl WaveDirector {
    pub fn new(now: u64, tables: &BalanceTables, daily: &DailyModifiers) -> Self {
        let interval = tables.waves.base_spawn_interval_ms as f32 / daily.spawn_rate_mul;
        Self {
            wave: 1,
            next_wave_at: now + wave_interval(tables, daily),
            next_spawn_at: now + interval as u64,
            spawn_interval_ms: interval,
            speed_mul: 1.0,
            hp_mul: 1.0,
        }
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Advance the timers; at most one escalation and one spawn directive
    /// per call.
    pub fn tick(&mut self, now: u64, tables: &BalanceTables, daily: &DailyModifiers) -> WaveTick {
        let mut out = WaveTick::default();

        if now >= self.next_wave_at {
            self.wave += 1;
            self.speed_mul *= tables.waves.speed_growth;
            self.hp_mul *= tables.waves.hp_growth;
            let floor = tables.waves.base_spawn_interval_ms as f32
                * tables.waves.spawn_floor_ratio
                / daily.spawn_rate_mul;
            self.spawn_interval_ms = (self.spawn_interval_ms * tables.waves.spawn_decay).max(floor);
            self.next_wave_at = now + wave_interval(tables, daily);
            self.next_spawn_at = now + self.spawn_interval_ms as u64;
            out.escalated = Some(self.wave);
            if self.wave % tables.boss.every_n_waves == 0 {
                out.spawn_boss = true;
            }
        }

        if now >= self.next_spawn_at {
            self.next_spawn_at = now + self.spawn_interval_ms as u64;
            out.spawn_enemy = true;
        }

        out
    }

    /// Scaled hp for an enemy spawned on the current wave.
    pub fn enemy_hp(&self, tables: &BalanceTables, daily: &DailyModifiers) -> f32 {
        tables.waves.base_enemy_hp * self.hp_mul * daily.enemy_hp_mul
    }

    pub fn enemy_speed(&self, tables: &BalanceTables, daily: &DailyModifiers) -> f32 {
        tables.waves.base_enemy_speed * self.speed_mul * daily.enemy_speed_mul
    }

    /// Build a regular (possibly elite) enemy at the top of the field.
    pub fn build_enemy(
        &self,
        seed: u64,
        tables: &BalanceTables,
        daily: &DailyModifiers,
    ) -> Enemy {
        let pcg = Pcg;
        let x = pcg.range_f32(
            mix_seed(seed, 0, 0, 60),
            tables.field.enemy_radius,
            tables.field.width - tables.field.enemy_radius,
        );
        let speed = self.enemy_speed(tables, daily);
        let mut hp = self.enemy_hp(tables, daily);

        let elements = roll_elements(seed, tables);
        let elite_chance = (tables.elites.chance * daily.elite_chance_mul).min(1.0);
        let mut affixes: ArrayVec<EliteAffix, MAX_ELITE_AFFIXES> = ArrayVec::new();
        if pcg.chance(mix_seed(seed, 0, 0, 61), elite_chance) {
            affixes = roll_elite_affixes(seed, tables);
        }

        let mut speed = speed;
        if affixes.contains(&EliteAffix::Fast) {
            speed *= tables.elites.fast_mul;
        }
        if affixes.contains(&EliteAffix::Thick) {
            hp *= tables.elites.thick_mul;
        }

        let mut enemy = Enemy::spawn(
            Vec2::new(x, -tables.field.enemy_radius),
            Vec2::new(0.0, speed),
            hp,
            elements,
        );
        if !affixes.is_empty() {
            enemy.flags |= EnemyFlags::ELITE;
            enemy.affixes = affixes;
        }
        enemy
    }

    /// Build the boss for the current wave.
    pub fn build_boss(
        &self,
        seed: u64,
        now: u64,
        tables: &BalanceTables,
        daily: &DailyModifiers,
    ) -> Enemy {
        let hp = self.enemy_hp(tables, daily) * tables.boss.hp_mul;
        let drift = if Pcg.chance(mix_seed(seed, 0, 0, 62), 0.5) {
            tables.boss.drift_speed
        } else {
            -tables.boss.drift_speed
        };
        let mut boss = Enemy::spawn(
            Vec2::new(tables.field.width / 2.0, -tables.field.enemy_radius * 2.0),
            Vec2::new(drift, tables.boss.descent_speed),
            hp,
            roll_elements(seed, tables),
        );
        boss.flags |= EnemyFlags::BOSS;
        boss.next_ring_at = now + tables.boss.ring_cooldown_ms;
        boss
    }
}

fn wave_interval(tables: &BalanceTables, daily: &DailyModifiers) -> u64 {
    daily
        .wave_interval_override
        .unwrap_or(tables.waves.interval_ms)
}

fn roll_elements(seed: u64, tables: &BalanceTables) -> ElementSet {
    let pcg = Pcg;
    if !pcg.chance(mix_seed(seed, 0, 0, 63), tables.waves.element_chance) {
        return ElementSet::EMPTY;
    }
    let wheel = Element::WHEEL;
    let idx = pcg.range_u32(mix_seed(seed, 0, 0, 64), 0, wheel.len() as u32 - 1) as usize;
    ElementSet::single(wheel[idx])
}

/// Roll 1..=max distinct weighted affixes for an elite spawn.
pub fn roll_elite_affixes(
    seed: u64,
    tables: &BalanceTables,
) -> ArrayVec<EliteAffix, MAX_ELITE_AFFIXES> {
    let pcg = Pcg;
    let count = pcg.range_u32(mix_seed(seed, 0, 0, 65), 1, tables.elites.max_affixes as u32);

    let mut affixes: ArrayVec<EliteAffix, MAX_ELITE_AFFIXES> = ArrayVec::new();
    let mut attempt = 0u64;
    while (affixes.len() as u32) < count && !affixes.is_full() {
        let pool: Vec<(EliteAffix, f32)> = EliteAffix::iter()
            .zip(tables.elites.affix_weights.iter().copied())
            .filter(|(affix, _)| !affixes.contains(affix))
            .collect();
        if pool.is_empty() {
            break;
        }
        let total: f32 = pool.iter().map(|(_, w)| w).sum();
        let mut roll = pcg.unit(mix_seed(seed, attempt, 0, 66)) * total;
        attempt += 1;
        for (affix, weight) in &pool {
            if roll < *weight {
                affixes.push(*affix);
                break;
            }
            roll -= weight;
        }
    }
    affixes
}

/// A boss ring burst: `count` projectiles radially from `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingBurst {
    pub center: Vec2,
    pub count: u32,
    pub speed: f32,
}

/// Check whether the boss owes a ring this tick: a phase-threshold
/// crossing fires exactly once per threshold; the cooldown ring repeats.
pub fn boss_ring_due(boss: &mut Enemy, now: u64, tables: &BalanceTables) -> Option<RingBurst> {
    if !boss.is_boss() {
        return None;
    }
    let ratio = boss.hp_ratio();
    for (idx, threshold) in tables.boss.phase_thresholds.iter().enumerate() {
        let bit = 1u8 << idx;
        if ratio <= *threshold && boss.phases_fired & bit == 0 {
            boss.phases_fired |= bit;
            return Some(ring(boss, tables));
        }
    }
    if now >= boss.next_ring_at {
        boss.next_ring_at = now + tables.boss.ring_cooldown_ms;
        return Some(ring(boss, tables));
    }
    None
}

fn ring(boss: &Enemy, tables: &BalanceTables) -> RingBurst {
    RingBurst {
        center: boss.pos,
        count: tables.boss.ring_count,
        speed: tables.boss.ring_speed,
    }
}

/// Keep the boss drifting inside the walls.
pub fn steer_boss(boss: &mut Enemy, field_width: f32, margin: f32) {
    if (boss.pos.x <= margin && boss.vel.x < 0.0)
        || (boss.pos.x >= field_width - margin && boss.vel.x > 0.0)
    {
        boss.vel.x = -boss.vel.x;
    }
}

/// Healer elite pulse check: capped per wave, cooldown-paced.
pub fn healer_pulse_due(healer: &mut Enemy, now: u64, tables: &BalanceTables) -> bool {
    if !healer.has_affix(EliteAffix::Healer) {
        return false;
    }
    if healer.heals_this_wave >= tables.elites.healer_cap_per_wave {
        return false;
    }
    if now < healer.next_heal_at {
        return false;
    }
    healer.next_heal_at = now + tables.elites.healer_cooldown_ms;
    healer.heals_this_wave += 1;
    true
}
