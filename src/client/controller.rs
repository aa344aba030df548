//! Third-person character controller for the player.
//!
//! - A/D turn the character in place (no strafing).
//! - W/S translate along the character's facing.
//! - Shift runs; running is forward-only.
//! - The character walks the terrain heightfield.

use glam::Vec3;

use crate::gfx::terrain::{self, TerrainCPU};

use super::input::InputState;

#[derive(Debug, Clone, Copy)]
pub struct PlayerController {
    pub pos: Vec3,
    pub yaw: f32,
    /// Attack key state from last frame, for edge detection.
    attack_was_down: bool,
}

/// What the controller decided this frame, for the game loop to act on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerOutput {
    pub moving: bool,
    pub running: bool,
    /// True on the frame the attack key goes down.
    pub attack_pressed: bool,
}

impl PlayerController {
    pub fn new(initial_pos: Vec3) -> Self {
        Self {
            pos: initial_pos,
            yaw: 0.0,
            attack_was_down: false,
        }
    }

    pub fn update(
        &mut self,
        input: &InputState,
        terrain: &TerrainCPU,
        dt: f32,
    ) -> ControllerOutput {
        // Tunables: faster forward movement, slower turning
        let speed = if input.run && input.forward && !input.backward {
            9.0
        } else {
            5.0
        };
        let yaw_rate = 1.8; // rad/s

        // In-place yaw
        if input.left {
            self.yaw = wrap_angle(self.yaw + yaw_rate * dt);
        }
        if input.right {
            self.yaw = wrap_angle(self.yaw - yaw_rate * dt);
        }

        // Translation along facing; back-pedal is slower.
        let fwd = Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos());
        let mut moving = false;
        if input.forward {
            self.pos += fwd * speed * dt;
            moving = true;
        }
        if input.backward {
            self.pos -= fwd * speed * 0.5 * dt;
            moving = true;
        }

        // Clamp to the terrain footprint and walk the surface.
        let e = terrain.extent;
        self.pos.x = self.pos.x.clamp(-e, e);
        self.pos.z = self.pos.z.clamp(-e, e);
        let (h, _n) = terrain::height_at(terrain, self.pos.x, self.pos.z);
        self.pos.y = h;

        let attack_pressed = input.attack && !self.attack_was_down;
        self.attack_was_down = input.attack;

        ControllerOutput {
            moving,
            running: moving && speed > 5.0,
            attack_pressed,
        }
    }
}

/// Rotate `current` toward `target`, moving at most `max_delta` radians.
pub fn turn_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = wrap_angle(target - current);
    if delta.abs() <= max_delta {
        return target;
    }
    if delta > 0.0 {
        wrap_angle(current + max_delta)
    } else {
        wrap_angle(current - max_delta)
    }
}

pub fn wrap_angle(a: f32) -> f32 {
    let mut x = a;
    while x > std::f32::consts::PI {
        x -= std::f32::consts::TAU;
    }
    while x < -std::f32::consts::PI {
        x += std::f32::consts::TAU;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::terrain::generate_heightmap;

    #[test]
    fn turn_towards_limits_angular_velocity() {
        let cur = 0.0;
        let target = std::f32::consts::FRAC_PI_2; // 90 deg
        let next = turn_towards(cur, target, 0.1);
        assert!((next - 0.1).abs() < 1e-6);
    }

    #[test]
    fn update_rotates_smoothly() {
        let terrain = generate_heightmap(33, 50.0, 7);
        let mut pc = PlayerController::new(Vec3::ZERO);
        let input = InputState {
            right: true,
            ..Default::default()
        };
        pc.update(&input, &terrain, 0.016);
        // Should change yaw smoothly (magnitude less than 90deg)
        assert!(pc.yaw.abs() > 0.0 && pc.yaw.abs() < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn forward_motion_follows_facing_and_terrain() {
        let terrain = generate_heightmap(33, 50.0, 7);
        let mut pc = PlayerController::new(Vec3::ZERO);
        pc.yaw = std::f32::consts::FRAC_PI_2; // facing +X
        let input = InputState {
            forward: true,
            ..Default::default()
        };
        let out = pc.update(&input, &terrain, 0.1);
        assert!(out.moving && !out.running);
        assert!(pc.pos.x > 0.0);
        assert!(pc.pos.z.abs() < 1e-4);
        let (h, _) = crate::gfx::terrain::height_at(&terrain, pc.pos.x, pc.pos.z);
        assert!((pc.pos.y - h).abs() < 1e-5);
    }

    #[test]
    fn run_requires_forward() {
        let terrain = generate_heightmap(33, 50.0, 7);
        let mut pc = PlayerController::new(Vec3::ZERO);
        let out = pc.update(
            &InputState {
                backward: true,
                run: true,
                ..Default::default()
            },
            &terrain,
            0.1,
        );
        assert!(out.moving && !out.running);
    }

    #[test]
    fn attack_is_edge_triggered() {
        let terrain = generate_heightmap(33, 50.0, 7);
        let mut pc = PlayerController::new(Vec3::ZERO);
        let held = InputState {
            attack: true,
            ..Default::default()
        };
        assert!(pc.update(&held, &terrain, 0.016).attack_pressed);
        assert!(!pc.update(&held, &terrain, 0.016).attack_pressed);
        let released = InputState::default();
        pc.update(&released, &terrain, 0.016);
        assert!(pc.update(&held, &terrain, 0.016).attack_pressed);
    }

    #[test]
    fn position_clamped_to_terrain_extent() {
        let terrain = generate_heightmap(33, 20.0, 7);
        let mut pc = PlayerController::new(Vec3::new(19.9, 0.0, 0.0));
        pc.yaw = std::f32::consts::FRAC_PI_2; // facing +X
        for _ in 0..100 {
            pc.update(
                &InputState {
                    forward: true,
                    run: true,
                    ..Default::default()
                },
                &terrain,
                0.1,
            );
        }
        assert!(pc.pos.x <= terrain.extent + 1e-4);
    }
}
