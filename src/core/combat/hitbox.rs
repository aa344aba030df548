//! Transient attack hitboxes.

use glam::Vec3;

use crate::core::entity::{Entity, EntityId};
use crate::gfx::frustum::Aabb;

use super::fsm::AttackSpec;

/// Axis-aligned attack volume; destroyed on expiry or first hit.
#[derive(Clone, Debug)]
pub struct Hitbox {
    pub owner: EntityId,
    pub aabb: Aabb,
    pub damage: i32,
    pub remaining_s: f32,
    /// Entity already struck by this box (at most one; the box dies on hit).
    pub struck: Option<EntityId>,
}

impl Hitbox {
    /// Place the swing volume in front of the attacker at torso height.
    pub fn from_attack(attacker: &Entity, spec: &AttackSpec) -> Self {
        let he = Vec3::from_array(spec.half_extent);
        let center =
            attacker.pos + attacker.forward() * spec.reach + Vec3::Y * attacker.half_extent.y;
        Self {
            owner: attacker.id,
            aabb: Aabb::new(center - he, center + he),
            damage: spec.damage,
            remaining_s: spec.active_s,
            struck: None,
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.remaining_s <= 0.0 || self.struck.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{EntityKind, EntityStore, Team};

    #[test]
    fn hitbox_spawns_in_front_of_attacker() {
        let mut store = EntityStore::default();
        let id = store.spawn(EntityKind::Player, Team::Player, Vec3::ZERO, 0.0);
        let spec = AttackSpec::default();
        let hb = Hitbox::from_attack(store.get(id).unwrap(), &spec);
        // yaw 0 faces +Z
        assert!(hb.aabb.center().z > 0.0);
        assert_eq!(hb.owner, id);
    }

    #[test]
    fn hitbox_dies_on_first_hit_or_expiry() {
        let mut store = EntityStore::default();
        let id = store.spawn(EntityKind::Player, Team::Player, Vec3::ZERO, 0.0);
        let spec = AttackSpec::default();
        let mut hb = Hitbox::from_attack(store.get(id).unwrap(), &spec);
        assert!(!hb.expired());
        hb.struck = Some(EntityId(99));
        assert!(hb.expired());
        let mut hb2 = Hitbox::from_attack(store.get(id).unwrap(), &spec);
        hb2.remaining_s = 0.0;
        assert!(hb2.expired());
    }
}
