//! Per-hit damage pipeline and bullet fate.
//!
//! A hit runs the full modifier chain in one pass: element matchup,
//! expose vulnerability, the one-shot shatter bonus, elite resistance,
//! boss AOE resistance, then HP subtraction. Afterwards the bullet either
//! pierces (with decayed damage), splits into children, or expires.
//! Rebound is a separate wall-contact pass; it never competes with
//! penetration on the same hit.

use crate::element::{self, Element};
use crate::entity::{Bullet, EliteAffix, Enemy};
use crate::geom::Vec2;
use crate::rng::{mix_seed, Pcg, RollSource};
use crate::stats::StatBundle;
use crate::tables::BalanceTables;

/// What happened to the bullet after the hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BulletFate {
    /// Release the bullet.
    Expired,
    /// Bullet survives with decayed damage.
    Pierced,
    /// Bullet expires but spawns two children.
    Split,
}

/// A frozen-shatter detonation to be applied around the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
}

/// Result of one resolved hit.
#[derive(Clone, Copy, Debug)]
pub struct HitOutcome {
    pub damage_dealt: f32,
    pub killed: bool,
    pub broke_freeze: bool,
    pub explosion: Option<Explosion>,
    pub fate: BulletFate,
}

/// Per-run modifiers the resolver needs beyond the tables.
#[derive(Clone, Copy, Debug)]
pub struct CombatContext<'a> {
    pub tables: &'a BalanceTables,
    pub bundle: &'a StatBundle,
    /// Daily-rule overrides; `None` means use the tables.
    pub penetration_decay_override: Option<f32>,
    pub rebound_decay_override: Option<f32>,
    /// Split skill is taken this run.
    pub split_level: u8,
}

impl<'a> CombatContext<'a> {
    pub fn penetration_decay(&self) -> f32 {
        let base = self
            .penetration_decay_override
            .unwrap_or(self.tables.combat.penetration_decay);
        // Gear can soften the decay but never turn it into a gain.
        (base * self.bundle.penetration_decay_mul).min(1.0)
    }

    pub fn rebound_decay(&self) -> f32 {
        self.rebound_decay_override
            .unwrap_or(self.tables.combat.rebound_decay)
    }
}

/// Resolve a bullet/enemy overlap.
///
/// Returns `None` while the bullet's hit cooldown is running; the overlap
/// is ignored entirely and the bullet flies on.
pub fn resolve_hit(
    bullet: &mut Bullet,
    enemy: &mut Enemy,
    now: u64,
    seed: u64,
    ctx: &CombatContext,
) -> Option<HitOutcome> {
    if now < bullet.hit_cooldown_until {
        return None;
    }
    let tables = ctx.tables;
    let is_boss = enemy.is_boss();

    let mut damage = bullet.damage
        * element::damage_multiplier(bullet.elements, enemy.elements, &tables.elements);

    // Fire on a frozen target: shatter the ice. The explosion check uses
    // the pre-debuff damage; the hit itself lands debuffed.
    let mut broke_freeze = false;
    let mut explosion = None;
    if bullet.elements.contains(Element::Fire) && enemy.status.is_frozen(now) {
        enemy.status.break_freeze();
        broke_freeze = true;
        let fe = &tables.status.frozen_explode;
        if damage >= fe.threshold {
            let power = if is_boss { fe.boss_power } else { fe.power };
            explosion = Some(Explosion {
                center: enemy.pos,
                radius: fe.radius,
                damage: damage * power * ctx.bundle.status.explode_mul,
            });
        }
        damage *= 1.0 - fe.debuff;
    }

    damage *= 1.0 + enemy.status.expose_bonus(now);
    damage *= 1.0 + enemy.status.consume_shatter();

    if enemy.has_affix(EliteAffix::Resistant) {
        damage *= tables.elites.resist_mul;
    }
    if bullet.from_aoe && is_boss {
        damage *= tables.boss.aoe_resist;
    }

    enemy.hp -= damage;
    bullet.hit_cooldown_until = now + tables.combat.hit_cooldown_ms;
    let killed = enemy.hp <= 0.0;

    if !killed {
        roll_status_applications(bullet, enemy, damage, now, seed, ctx);
    }

    let fate = resolve_fate(bullet, now, ctx);
    Some(HitOutcome {
        damage_dealt: damage,
        killed,
        broke_freeze,
        explosion,
        fate,
    })
}

/// Roll element-keyed status applications for a landed hit.
fn roll_status_applications(
    bullet: &Bullet,
    enemy: &mut Enemy,
    damage: f32,
    now: u64,
    seed: u64,
    ctx: &CombatContext,
) {
    let pcg = Pcg;
    let status = &ctx.tables.status;
    let power = &ctx.bundle.status;
    let is_boss = enemy.is_boss();

    for (lane, el) in bullet.elements.iter().enumerate() {
        let roll = mix_seed(seed, lane as u64, 0, 40);
        match el {
            Element::Fire => {
                if pcg.chance(roll, status.burn.chance) {
                    enemy.status.apply_burn(damage, is_boss, now, status, power);
                }
            }
            Element::Water => {
                if pcg.chance(roll, status.freeze.chance) {
                    enemy.status.apply_freeze(is_boss, now, status, power);
                }
            }
            Element::Wood => {
                if pcg.chance(roll, status.root.chance) {
                    enemy.status.apply_root(is_boss, now, status, power);
                }
            }
            Element::Earth => {
                if pcg.chance(roll, status.shatter.chance) {
                    enemy.status.apply_shatter(status);
                }
            }
            Element::Metal => {
                if pcg.chance(roll, status.expose.chance) {
                    enemy.status.apply_expose(is_boss, now, status, power);
                }
            }
        }
    }
}

/// Decide the bullet's fate after a registered hit. Penetration always
/// resolves before split is considered.
fn resolve_fate(bullet: &mut Bullet, now: u64, ctx: &CombatContext) -> BulletFate {
    let combat = &ctx.tables.combat;

    if bullet.penetration_left > 0 {
        bullet.penetration_left -= 1;
        let floor = bullet.damage_floor(combat.min_damage_ratio);
        bullet.damage = (bullet.damage * ctx.penetration_decay()).max(floor);
        return BulletFate::Pierced;
    }

    let can_split = ctx.split_level > 0
        && !bullet.is_split_child
        && now.saturating_sub(bullet.last_split_at) >= combat.split_gap_ms;
    if can_split {
        return BulletFate::Split;
    }

    BulletFate::Expired
}

/// Build the two children for a [`BulletFate::Split`] outcome.
pub fn split_children(parent: &Bullet, now: u64, ctx: &CombatContext) -> [Bullet; 2] {
    let combat = &ctx.tables.combat;
    let damage =
        parent.base_damage * combat.split_child_ratio * ctx.bundle.split_child_mul;
    let speed = parent.vel.length();
    let heading = parent.vel.angle_deg();

    let make = |angle: f32| {
        let mut child = Bullet::spawn(
            parent.pos,
            Vec2::from_angle_deg(angle).scaled(speed),
            damage,
            parent.elements,
            now,
        );
        child.is_split_child = true;
        child.last_split_at = now;
        child
    };

    [
        make(heading - combat.split_angle_deg),
        make(heading + combat.split_angle_deg),
    ]
}

/// Reflect the bullet off the side and top walls if it has rebounds left.
///
/// Returns true if a rebound consumed a charge. Each rebound decays
/// damage and jitters the heading a few degrees.
pub fn try_rebound(
    bullet: &mut Bullet,
    field_width: f32,
    seed: u64,
    ctx: &CombatContext,
) -> bool {
    let hit_left = bullet.pos.x <= 0.0 && bullet.vel.x < 0.0;
    let hit_right = bullet.pos.x >= field_width && bullet.vel.x > 0.0;
    let hit_top = bullet.pos.y <= 0.0 && bullet.vel.y < 0.0;
    if !(hit_left || hit_right || hit_top) {
        return false;
    }
    if bullet.rebound_left == 0 {
        return false;
    }
    bullet.rebound_left -= 1;

    if hit_left || hit_right {
        bullet.vel.x = -bullet.vel.x;
        bullet.pos.x = bullet.pos.x.clamp(0.0, field_width);
    }
    if hit_top {
        bullet.vel.y = -bullet.vel.y;
        bullet.pos.y = bullet.pos.y.max(0.0);
    }

    let combat = &ctx.tables.combat;
    let jitter = Pcg.range_f32(
        mix_seed(seed, 0, 0, 41),
        -combat.rebound_jitter_deg,
        combat.rebound_jitter_deg,
    );
    let speed = bullet.vel.length();
    let heading = bullet.vel.angle_deg() + jitter;
    bullet.vel = Vec2::from_angle_deg(heading).scaled(speed);

    let floor = bullet.damage_floor(combat.min_damage_ratio);
    bullet.damage = (bullet.damage * ctx.rebound_decay()).max(floor);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementSet;

    fn ctx(tables: &BalanceTables, bundle: &StatBundle) -> CombatContext<'static> {
        // Tests only: leak to get 'static, the tables live for the test.
        let tables: &'static BalanceTables = Box::leak(Box::new(tables.clone()));
        let bundle: &'static StatBundle = Box::leak(Box::new(*bundle));
        CombatContext {
            tables,
            bundle,
            penetration_decay_override: None,
            rebound_decay_override: None,
            split_level: 0,
        }
    }

    fn bullet(damage: f32) -> Bullet {
        Bullet::spawn(Vec2::ZERO, Vec2::from_angle_deg(0.0).scaled(700.0), damage, ElementSet::EMPTY, 0)
    }

    fn enemy(hp: f32) -> Enemy {
        Enemy::spawn(Vec2::ZERO, Vec2::ZERO, hp, ElementSet::EMPTY)
    }

    #[test]
    fn penetrating_chain_kills_twenty_hp_in_two_hits() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let ctx = ctx(&tables, &bundle);

        let mut b = bullet(10.0);
        b.penetration_left = 2;

        let mut first = enemy(20.0);
        let out = resolve_hit(&mut b, &mut first, 0, 1, &ctx).unwrap();
        assert!(!out.killed);
        assert_eq!(out.fate, BulletFate::Pierced);
        assert!((first.hp - 10.0).abs() < 1e-6);
        assert!((b.damage - 9.0).abs() < 1e-6);

        // Cooldown blocks an immediate second hit on the same target.
        assert!(resolve_hit(&mut b, &mut first, 30, 2, &ctx).is_none());

        let out = resolve_hit(&mut b, &mut first, 60, 3, &ctx).unwrap();
        assert!(out.killed);
        assert!((out.damage_dealt - 9.0).abs() < 1e-6);
    }

    #[test]
    fn decay_never_goes_below_half_base() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let ctx = ctx(&tables, &bundle);

        let mut b = bullet(10.0);
        b.penetration_left = 50;
        let mut now = 0;
        for i in 0..50u64 {
            let mut e = enemy(1000.0);
            resolve_hit(&mut b, &mut e, now, i, &ctx).unwrap();
            now += tables.combat.hit_cooldown_ms;
            assert!(b.damage >= 5.0 - 1e-6);
        }
        assert!((b.damage - 5.0).abs() < 1e-6);
    }

    #[test]
    fn split_fires_only_for_eligible_parents() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let mut ctx = ctx(&tables, &bundle);
        ctx.split_level = 1;

        let mut b = bullet(10.0);
        let mut e = enemy(1000.0);
        let out = resolve_hit(&mut b, &mut e, 100, 1, &ctx).unwrap();
        assert_eq!(out.fate, BulletFate::Split);

        let children = split_children(&b, 100, &ctx);
        for child in &children {
            assert!(child.is_split_child);
            assert!((child.damage - 6.0).abs() < 1e-6);
        }

        // Children never split again.
        let mut child = children[0];
        let mut e2 = enemy(1000.0);
        let out = resolve_hit(&mut child, &mut e2, 200, 3, &ctx).unwrap();
        assert_eq!(out.fate, BulletFate::Expired);
    }

    #[test]
    fn split_respects_minimum_gap() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let mut ctx = ctx(&tables, &bundle);
        ctx.split_level = 1;

        let mut b = bullet(10.0);
        b.last_split_at = 100;
        let mut e = enemy(1000.0);
        let out = resolve_hit(&mut b, &mut e, 110, 1, &ctx).unwrap();
        assert_eq!(out.fate, BulletFate::Expired);
    }

    #[test]
    fn penetration_resolves_before_split() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let mut ctx = ctx(&tables, &bundle);
        ctx.split_level = 3;

        let mut b = bullet(10.0);
        b.penetration_left = 1;
        let mut e = enemy(1000.0);
        let out = resolve_hit(&mut b, &mut e, 0, 1, &ctx).unwrap();
        assert_eq!(out.fate, BulletFate::Pierced);
    }

    #[test]
    fn rebound_reflects_and_decays() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let ctx = ctx(&tables, &bundle);

        let mut b = bullet(10.0);
        b.rebound_left = 1;
        b.pos = Vec2::new(0.0, 500.0);
        b.vel = Vec2::new(-300.0, -300.0);
        assert!(try_rebound(&mut b, 720.0, 7, &ctx));
        assert!(b.vel.x > 0.0);
        assert!((b.damage - 8.5).abs() < 1e-6);
        assert_eq!(b.rebound_left, 0);

        // No charges left: the next wall contact does nothing.
        b.pos = Vec2::new(720.0, 400.0);
        b.vel = Vec2::new(300.0, -300.0);
        assert!(!try_rebound(&mut b, 720.0, 8, &ctx));
    }

    #[test]
    fn resistant_elites_and_boss_aoe_take_less() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let ctx = ctx(&tables, &bundle);

        let mut b = bullet(10.0);
        let mut e = enemy(1000.0);
        e.affixes.push(EliteAffix::Resistant);
        let out = resolve_hit(&mut b, &mut e, 0, 1, &ctx).unwrap();
        assert!((out.damage_dealt - 8.0).abs() < 1e-6);

        let mut b = bullet(10.0);
        b.from_aoe = true;
        let mut boss = enemy(1000.0);
        boss.flags |= crate::entity::EnemyFlags::BOSS;
        let out = resolve_hit(&mut b, &mut boss, 0, 2, &ctx).unwrap();
        assert!((out.damage_dealt - 7.5).abs() < 1e-6);
    }

    #[test]
    fn frozen_fire_hit_breaks_ice_and_detonates() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let ctx = ctx(&tables, &bundle);

        let mut b = bullet(120.0);
        b.elements = ElementSet::single(Element::Fire);
        let mut e = enemy(10_000.0);
        e.status
            .apply_freeze(false, 0, &tables.status, &bundle.status);

        let out = resolve_hit(&mut b, &mut e, 10, 1, &ctx).unwrap();
        assert!(out.broke_freeze);
        let explosion = out.explosion.expect("above threshold");
        assert!((explosion.damage - 120.0 * tables.status.frozen_explode.power).abs() < 1e-4);
        // The landed hit is debuffed.
        assert!((out.damage_dealt - 120.0 * 0.8).abs() < 1e-4);
        assert!(!e.status.is_frozen(10));
    }

    #[test]
    fn weak_fire_hit_breaks_ice_without_detonating() {
        let tables = BalanceTables::default();
        let bundle = StatBundle::default();
        let ctx = ctx(&tables, &bundle);

        let mut b = bullet(50.0);
        b.elements = ElementSet::single(Element::Fire);
        let mut e = enemy(10_000.0);
        e.status
            .apply_freeze(false, 0, &tables.status, &bundle.status);

        let out = resolve_hit(&mut b, &mut e, 10, 1, &ctx).unwrap();
        assert!(out.broke_freeze);
        assert!(out.explosion.is_none());
    }
}
