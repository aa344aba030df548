//! Raider brain: close on the player, swing when in reach, idle on cooldown.
//!
//! Pure decision function plus an integration tick that moves the raiders and
//! requests attacks through the combat manager.

use glam::Vec3;

use crate::core::combat::fsm::AttackSpec;
use crate::core::combat::CombatState;
use crate::core::entity::{AnimLabel, EntityId, EntityKind, EntityStore};
use crate::gfx::terrain::{self, TerrainCPU};

#[derive(Clone, Copy, Debug)]
pub struct AiCfg {
    pub aggro_radius: f32,
    pub attack_range: f32,
    pub move_speed: f32,
    pub turn_rate: f32,
    /// Pause between swings so the player gets a punish window.
    pub attack_cooldown_s: f32,
}

impl Default for AiCfg {
    fn default() -> Self {
        Self {
            aggro_radius: 25.0,
            attack_range: 1.6,
            move_speed: 3.2,
            turn_rate: 2.5,
            attack_cooldown_s: 1.2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AiDecision {
    Idle,
    Chase,
    Attack,
}

/// Decide from distance alone; the caller handles facing and cooldowns.
pub fn decide(cfg: &AiCfg, dist_to_player: f32) -> AiDecision {
    if dist_to_player <= cfg.attack_range {
        AiDecision::Attack
    } else if dist_to_player <= cfg.aggro_radius {
        AiDecision::Chase
    } else {
        AiDecision::Idle
    }
}

/// Per-raider cooldown bookkeeping, parallel to the store.
#[derive(Default)]
pub struct AiState {
    cooldowns: Vec<(EntityId, f32)>,
}

impl AiState {
    fn cooldown_mut(&mut self, id: EntityId) -> &mut f32 {
        let i = match self.cooldowns.iter().position(|(cid, _)| *cid == id) {
            Some(i) => i,
            None => {
                self.cooldowns.push((id, 0.0));
                self.cooldowns.len() - 1
            }
        };
        &mut self.cooldowns[i].1
    }

    /// Move every living raider toward the player and open attacks in range.
    pub fn tick(
        &mut self,
        cfg: &AiCfg,
        store: &mut EntityStore,
        combat: &mut CombatState,
        spec: &AttackSpec,
        player: EntityId,
        terrain: &TerrainCPU,
        dt: f32,
    ) {
        let Some(target) = store.get(player).map(|p| p.pos) else {
            return;
        };
        let raiders: Vec<EntityId> = store
            .iter()
            .filter(|e| e.kind == EntityKind::Raider && e.hp.alive())
            .map(|e| e.id)
            .collect();
        for id in raiders {
            let cd = {
                let c = self.cooldown_mut(id);
                *c = (*c - dt).max(0.0);
                *c
            };
            let Some(e) = store.get_mut(id) else { continue };
            let to_player = Vec3::new(target.x - e.pos.x, 0.0, target.z - e.pos.z);
            let dist = to_player.length();
            // Always turn toward the player while aggroed.
            if dist <= cfg.aggro_radius && dist > 1e-3 {
                let desired = to_player.x.atan2(to_player.z);
                e.yaw = crate::client::controller::turn_towards(e.yaw, desired, cfg.turn_rate * dt);
            }
            match decide(cfg, dist) {
                AiDecision::Idle => {
                    if e.attack.is_idle() {
                        e.anim = AnimLabel::Idle;
                    }
                }
                AiDecision::Chase => {
                    if e.attack.is_idle() {
                        let step = e.forward() * cfg.move_speed * dt;
                        e.pos += step;
                        let (h, _) = terrain::height_at(terrain, e.pos.x, e.pos.z);
                        e.pos.y = h;
                        e.anim = AnimLabel::Walk;
                    }
                }
                AiDecision::Attack => {
                    if cd <= 0.0 && combat.try_attack(store, id, spec) {
                        *self.cooldown_mut(id) = cfg.attack_cooldown_s;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Team;
    use crate::gfx::terrain::generate_heightmap;

    #[test]
    fn decision_bands() {
        let cfg = AiCfg::default();
        assert_eq!(decide(&cfg, 1.0), AiDecision::Attack);
        assert_eq!(decide(&cfg, 10.0), AiDecision::Chase);
        assert_eq!(decide(&cfg, 100.0), AiDecision::Idle);
    }

    #[test]
    fn raider_closes_distance() {
        let terrain = generate_heightmap(33, 50.0, 5);
        let cfg = AiCfg::default();
        let mut store = EntityStore::default();
        let player = store.spawn(EntityKind::Player, Team::Player, Vec3::ZERO, 0.0);
        let raider = store.spawn(
            EntityKind::Raider,
            Team::Hostile,
            Vec3::new(0.0, 0.0, 10.0),
            std::f32::consts::PI,
        );
        let mut ai = AiState::default();
        let mut combat = CombatState::default();
        let spec = AttackSpec::default();
        let d0 = store.get(raider).unwrap().pos.distance(Vec3::ZERO);
        for _ in 0..60 {
            ai.tick(&cfg, &mut store, &mut combat, &spec, player, &terrain, 1.0 / 60.0);
        }
        let d1 = store.get(raider).unwrap().pos.distance(store.get(player).unwrap().pos);
        assert!(d1 < d0);
    }

    #[test]
    fn raider_attacks_in_range_with_cooldown() {
        let terrain = generate_heightmap(33, 50.0, 5);
        let cfg = AiCfg::default();
        let mut store = EntityStore::default();
        let player = store.spawn(EntityKind::Player, Team::Player, Vec3::ZERO, 0.0);
        let raider = store.spawn(
            EntityKind::Raider,
            Team::Hostile,
            Vec3::new(0.0, 0.0, 1.0),
            std::f32::consts::PI,
        );
        let mut ai = AiState::default();
        let mut combat = CombatState::default();
        let spec = AttackSpec::default();
        ai.tick(&cfg, &mut store, &mut combat, &spec, player, &terrain, 0.016);
        assert!(!store.get(raider).unwrap().attack.is_idle());
        // Immediately after, the cooldown holds even once the swing ends.
        combat.tick(&mut store, &spec, 1.0); // swing finishes
        ai.tick(&cfg, &mut store, &mut combat, &spec, player, &terrain, 0.016);
        assert!(store.get(raider).unwrap().attack.is_idle());
    }
}
