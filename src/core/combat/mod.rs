//! Combat resolution: attack FSM ticking, hitbox spawning and the per-frame
//! O(hitboxes x entities) overlap pass.
//!
//! Rules
//! - a hitbox never touches its owner or the owner's team,
//! - a hitbox deals damage at most once, then dies,
//! - dead entities are skipped,
//! - damage floors hp at zero and flips the victim's animation label.

pub mod fsm;
pub mod hitbox;

use crate::core::entity::{AnimLabel, EntityId, EntityStore};

use fsm::AttackSpec;
use hitbox::Hitbox;

/// One landed hit, surfaced for logging/FX.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitEvent {
    pub attacker: EntityId,
    pub victim: EntityId,
    pub damage: i32,
    pub lethal: bool,
}

#[derive(Default)]
pub struct CombatState {
    pub hitboxes: Vec<Hitbox>,
    pub events: Vec<HitEvent>,
}

impl CombatState {
    /// Request a swing for `id`; checks FSM idleness and stamina.
    pub fn try_attack(&mut self, store: &mut EntityStore, id: EntityId, spec: &AttackSpec) -> bool {
        let Some(e) = store.get_mut(id) else {
            return false;
        };
        if !e.hp.alive() || !e.attack.is_idle() {
            return false;
        }
        if !e.stamina.try_spend(spec.stamina_cost) {
            log::debug!("attack blocked: entity {:?} out of stamina", id);
            return false;
        }
        let started = e.attack.start(spec);
        if started {
            e.anim = AnimLabel::Attack;
        }
        started
    }

    /// Advance every FSM and hitbox by dt, spawn hitboxes on active edges,
    /// resolve overlaps. Events from this frame replace last frame's.
    pub fn tick(&mut self, store: &mut EntityStore, spec: &AttackSpec, dt: f32) {
        self.events.clear();

        // 1) FSMs: tick, spawn hitboxes on the windup->active edge.
        let mut spawned: Vec<Hitbox> = Vec::new();
        for e in store.iter_mut() {
            if !e.hp.alive() {
                continue;
            }
            let entered_active = e.attack.tick(spec, dt);
            if entered_active {
                spawned.push(Hitbox::from_attack(e, spec));
            }
            if e.attack.is_idle() && e.anim == AnimLabel::Attack {
                e.anim = AnimLabel::Idle;
            }
            // No stamina regen mid-swing.
            if e.attack.is_idle() {
                e.stamina.regen(dt);
            }
        }
        // 2) Overlap pass: naive all-pairs, fine at prototype counts.
        // Pre-existing boxes age by dt; boxes spawned this frame resolve
        // without aging so a large dt cannot swallow their active window.
        for hb in &mut self.hitboxes {
            hb.remaining_s -= dt;
            if hb.expired() {
                continue;
            }
            resolve_overlap(hb, store, &mut self.events);
        }
        for hb in &mut spawned {
            resolve_overlap(hb, store, &mut self.events);
        }
        self.hitboxes.append(&mut spawned);

        // 3) Expiry.
        self.hitboxes.retain(|hb| !hb.expired());
    }
}

/// Strike the first intersecting hostile entity, if any. The box records the
/// victim and is culled by the caller's expiry pass.
fn resolve_overlap(hb: &mut Hitbox, store: &mut EntityStore, events: &mut Vec<HitEvent>) {
    let owner_team = match store.get(hb.owner) {
        Some(o) => o.team,
        None => return,
    };
    // Pick the victim immutably, then apply damage.
    let victim = store
        .iter()
        .filter(|v| v.id != hb.owner && v.hp.alive())
        .filter(|v| owner_team.hostile_to(v.team))
        .find(|v| hb.aabb.intersects(&v.hurtbox()))
        .map(|v| v.id);
    if let Some(vid) = victim {
        hb.struck = Some(vid);
        if let Some(v) = store.get_mut(vid) {
            v.hp.damage(hb.damage);
            let lethal = !v.hp.alive();
            v.anim = if lethal {
                AnimLabel::Dead
            } else {
                AnimLabel::Stagger
            };
            events.push(HitEvent {
                attacker: hb.owner,
                victim: vid,
                damage: hb.damage,
                lethal,
            });
            log::debug!(
                "hit: {:?} -> {:?} for {} ({})",
                hb.owner,
                vid,
                hb.damage,
                if lethal { "lethal" } else { "hit" }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{EntityKind, EntityStore, Team};
    use glam::Vec3;

    fn arena() -> (EntityStore, EntityId, EntityId) {
        let mut store = EntityStore::default();
        // Player at origin facing +Z; raider one meter ahead.
        let player = store.spawn(EntityKind::Player, Team::Player, Vec3::ZERO, 0.0);
        let raider = store.spawn(
            EntityKind::Raider,
            Team::Hostile,
            Vec3::new(0.0, 0.0, 1.2),
            std::f32::consts::PI,
        );
        (store, player, raider)
    }

    #[test]
    fn swing_lands_once() {
        let (mut store, player, raider) = arena();
        let spec = AttackSpec::default();
        let mut combat = CombatState::default();
        assert!(combat.try_attack(&mut store, player, &spec));
        // Through windup into active: the hit lands this frame.
        combat.tick(&mut store, &spec, spec.windup_s + 0.01);
        assert_eq!(combat.events.len(), 1);
        let hp_after = store.get(raider).unwrap().hp.hp;
        assert_eq!(hp_after, 40 - spec.damage);
        // Following frames: the box is gone, no double hit.
        combat.tick(&mut store, &spec, 0.016);
        assert!(combat.events.is_empty());
        assert_eq!(store.get(raider).unwrap().hp.hp, hp_after);
        assert!(combat.hitboxes.is_empty());
    }

    #[test]
    fn owner_is_never_struck() {
        let (mut store, player, _raider) = arena();
        let spec = AttackSpec {
            reach: 0.0, // swing volume centered on the attacker
            ..Default::default()
        };
        let mut combat = CombatState::default();
        combat.try_attack(&mut store, player, &spec);
        combat.tick(&mut store, &spec, spec.windup_s + 0.01);
        assert!(combat.events.iter().all(|e| e.victim != player));
        assert_eq!(store.get(player).unwrap().hp.hp, 100);
    }

    #[test]
    fn whiff_expires_without_damage() {
        let mut store = EntityStore::default();
        let player = store.spawn(EntityKind::Player, Team::Player, Vec3::ZERO, 0.0);
        // Raider far out of reach.
        let raider = store.spawn(
            EntityKind::Raider,
            Team::Hostile,
            Vec3::new(0.0, 0.0, 10.0),
            0.0,
        );
        let spec = AttackSpec::default();
        let mut combat = CombatState::default();
        combat.try_attack(&mut store, player, &spec);
        combat.tick(&mut store, &spec, spec.windup_s + 0.01);
        assert!(!combat.hitboxes.is_empty());
        combat.tick(&mut store, &spec, spec.active_s + 0.01);
        assert!(combat.hitboxes.is_empty());
        assert!(combat.events.is_empty());
        assert_eq!(store.get(raider).unwrap().hp.hp, 40);
    }

    #[test]
    fn lethal_hit_flips_anim_and_stops_further_damage() {
        let (mut store, player, raider) = arena();
        store.get_mut(raider).unwrap().hp = crate::core::entity::Health::full(5);
        let spec = AttackSpec::default();
        let mut combat = CombatState::default();
        combat.try_attack(&mut store, player, &spec);
        combat.tick(&mut store, &spec, spec.windup_s + 0.01);
        let v = store.get(raider).unwrap();
        assert_eq!(v.hp.hp, 0);
        assert_eq!(v.anim, AnimLabel::Dead);
        assert!(combat.events[0].lethal);
        // A second full swing cannot hit the corpse.
        combat.tick(&mut store, &spec, 2.0); // finish recovery
        combat.try_attack(&mut store, player, &spec);
        combat.tick(&mut store, &spec, spec.windup_s + 0.01);
        assert!(combat.events.is_empty());
    }

    #[test]
    fn stamina_blocks_back_to_back_swings() {
        let (mut store, player, _raider) = arena();
        let spec = AttackSpec {
            stamina_cost: 80.0,
            ..Default::default()
        };
        let mut combat = CombatState::default();
        assert!(combat.try_attack(&mut store, player, &spec));
        // Swing completes; 2s of regen is not enough to afford another 80.
        combat.tick(&mut store, &spec, 2.0);
        assert!(!combat.try_attack(&mut store, player, &spec));
    }
}
