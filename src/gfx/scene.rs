//! Demo scene assembly: spawns the player and a raider ring on the terrain.
//!
//! Deterministic by construction (seeded RNG) so a given zone always produces
//! the same encounter.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::entity::{EntityId, EntityKind, EntityStore, Team};
use crate::gfx::terrain::{self, TerrainCPU};

pub struct SceneBuild {
    pub player: EntityId,
    pub raiders: Vec<EntityId>,
    pub cam_target: Vec3,
}

pub fn build_scene(store: &mut EntityStore, terrain: &TerrainCPU, raider_count: u32) -> SceneBuild {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    // Player at the zone origin, snapped to the ground.
    let (h, _) = terrain::height_at(terrain, 0.0, 0.0);
    let spawn = Vec3::new(0.0, h, 0.0);
    let player = store.spawn(EntityKind::Player, Team::Player, spawn, 0.0);

    // Raiders on a loose ring, facing the player.
    let mut raiders = Vec::with_capacity(raider_count as usize);
    for i in 0..raider_count {
        let theta = (i as f32) / (raider_count.max(1) as f32) * std::f32::consts::TAU;
        let radius = 12.0 + rng.gen_range(-2.0..4.0);
        let x = radius * theta.cos();
        let z = radius * theta.sin();
        let (y, _) = terrain::height_at(terrain, x, z);
        let yaw = (-x).atan2(-z); // face the origin
        raiders.push(store.spawn(
            EntityKind::Raider,
            Team::Hostile,
            Vec3::new(x, y, z),
            yaw,
        ));
    }
    log::info!("scene: player + {} raiders", raiders.len());

    SceneBuild {
        player,
        raiders,
        cam_target: spawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::terrain::generate_heightmap;

    #[test]
    fn scene_is_deterministic() {
        let terrain = generate_heightmap(33, 50.0, 7);
        let mut a = EntityStore::default();
        let mut b = EntityStore::default();
        let sa = build_scene(&mut a, &terrain, 5);
        let sb = build_scene(&mut b, &terrain, 5);
        assert_eq!(sa.raiders.len(), 5);
        for (ra, rb) in sa.raiders.iter().zip(sb.raiders.iter()) {
            let ea = a.get(*ra).unwrap();
            let eb = b.get(*rb).unwrap();
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.yaw, eb.yaw);
        }
    }

    #[test]
    fn raiders_face_the_player() {
        let terrain = generate_heightmap(33, 50.0, 7);
        let mut store = EntityStore::default();
        let scene = build_scene(&mut store, &terrain, 8);
        for id in &scene.raiders {
            let e = store.get(*id).unwrap();
            // Forward should point roughly at the origin.
            let to_origin = -Vec3::new(e.pos.x, 0.0, e.pos.z).normalize_or_zero();
            assert!(e.forward().dot(to_origin) > 0.9);
        }
    }
}
