//! Entity store and basic combat-adjacent components.
//!
//! Flat `Vec` store with stable ids; at prototype entity counts a linear scan
//! beats any index.

use glam::Vec3;

use crate::core::combat::fsm::AttackState;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Raider,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Team {
    Player,
    Hostile,
}

impl Team {
    #[inline]
    pub fn hostile_to(self, other: Team) -> bool {
        self != other
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Health {
    pub hp: i32,
    pub max: i32,
}

impl Health {
    pub fn full(max: i32) -> Self {
        Self { hp: max, max }
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage; hp never drops below zero.
    #[inline]
    pub fn damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
    }

    /// Heal up to max.
    #[inline]
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).min(self.max);
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Stamina {
    pub value: f32,
    pub max: f32,
    pub regen_per_s: f32,
}

impl Stamina {
    pub fn full(max: f32) -> Self {
        Self {
            value: max,
            max,
            regen_per_s: 12.0,
        }
    }

    #[inline]
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if self.value >= cost {
            self.value -= cost;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn regen(&mut self, dt: f32) {
        self.value = (self.value + self.regen_per_s * dt).min(self.max);
    }
}

/// Animation-state label driven by movement/combat; the renderer maps it to a
/// simple visual cue, no blending.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AnimLabel {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    Stagger,
    Dead,
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub team: Team,
    pub pos: Vec3,
    pub yaw: f32,
    pub vel: Vec3,
    /// Body half-extents for the hurtbox (x/z radius, y half-height above feet).
    pub half_extent: Vec3,
    pub hp: Health,
    pub stamina: Stamina,
    pub attack: AttackState,
    pub anim: AnimLabel,
    /// Seconds since death; corpses are removed after a grace period.
    pub dead_for: f32,
}

impl Entity {
    /// Facing on the XZ plane.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// World-space hurtbox centered on the body.
    pub fn hurtbox(&self) -> crate::gfx::frustum::Aabb {
        let center = self.pos + Vec3::Y * self.half_extent.y;
        crate::gfx::frustum::Aabb::new(center - self.half_extent, center + self.half_extent)
    }
}

#[derive(Default, Debug)]
pub struct EntityStore {
    next_id: u32,
    pub entities: Vec<Entity>,
}

impl EntityStore {
    pub fn spawn(&mut self, kind: EntityKind, team: Team, pos: Vec3, yaw: f32) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let (hp, half_extent) = match kind {
            EntityKind::Player => (Health::full(100), Vec3::new(0.4, 0.9, 0.4)),
            EntityKind::Raider => (Health::full(40), Vec3::new(0.45, 0.85, 0.45)),
        };
        self.entities.push(Entity {
            id,
            kind,
            team,
            pos,
            yaw,
            vel: Vec3::ZERO,
            half_extent,
            hp,
            stamina: Stamina::full(100.0),
            attack: AttackState::Idle,
            anim: AnimLabel::Idle,
            dead_for: 0.0,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Age corpses and drop them once the grace period elapses.
    pub fn reap(&mut self, dt: f32, corpse_linger_s: f32) {
        for e in &mut self.entities {
            if !e.hp.alive() {
                e.dead_for += dt;
            }
        }
        self.entities
            .retain(|e| e.hp.alive() || e.dead_for < corpse_linger_s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_never_goes_below_zero() {
        let mut h = Health::full(30);
        h.damage(100);
        assert_eq!(h.hp, 0);
        assert!(!h.alive());
        h.damage(5);
        assert_eq!(h.hp, 0);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut h = Health::full(30);
        h.damage(10);
        h.heal(100);
        assert_eq!(h.hp, 30);
    }

    #[test]
    fn stamina_gates_spend() {
        let mut s = Stamina::full(20.0);
        assert!(s.try_spend(15.0));
        assert!(!s.try_spend(15.0));
        s.regen(1.0);
        assert!(s.value > 5.0);
    }

    #[test]
    fn reap_keeps_corpses_briefly() {
        let mut store = EntityStore::default();
        let id = store.spawn(EntityKind::Raider, Team::Hostile, Vec3::ZERO, 0.0);
        store.get_mut(id).unwrap().hp.damage(999);
        store.reap(0.5, 3.0);
        assert!(store.get(id).is_some());
        store.reap(3.0, 3.0);
        assert!(store.get(id).is_none());
    }

    #[test]
    fn spawn_increments_ids() {
        let mut store = EntityStore::default();
        let a = store.spawn(EntityKind::Player, Team::Player, Vec3::ZERO, 0.0);
        let b = store.spawn(EntityKind::Raider, Team::Hostile, Vec3::X, 0.0);
        assert_ne!(a, b);
        assert_eq!(store.entities.len(), 2);
    }
}
