//! Third-person chase rig + globals buffer prep.
//!
//! Pure functions so the rig can be tested without a device: given the player
//! pose and terrain, produce a camera and the per-frame `Globals` contents.

use glam::Vec3;

use crate::gfx::camera::Camera;
use crate::gfx::terrain::TerrainCPU;
use crate::gfx::types::Globals;

#[derive(Clone, Copy, Debug)]
pub struct CameraRigCfg {
    /// Distance behind the player along their facing.
    pub boom_len: f32,
    /// Eye height above the player's feet.
    pub boom_height: f32,
    /// Where on the player the camera aims (above the feet).
    pub look_height: f32,
    /// Downward pitch limit applied when terrain pushes the eye up.
    pub min_ground_clearance: f32,
}

impl Default for CameraRigCfg {
    fn default() -> Self {
        Self {
            boom_len: 8.5,
            boom_height: 3.2,
            look_height: 1.4,
            min_ground_clearance: 0.5,
        }
    }
}

/// Place the chase camera behind the player facing, keeping the eye above the
/// terrain, and prepare the globals uniform for this frame.
pub fn follow_and_globals(
    cfg: &CameraRigCfg,
    player_pos: Vec3,
    player_yaw: f32,
    terrain: &TerrainCPU,
    aspect: f32,
    t: f32,
    wind: (Vec3, f32),
) -> (Camera, Globals) {
    let fwd = Vec3::new(player_yaw.sin(), 0.0, player_yaw.cos());
    let mut eye = player_pos - fwd * cfg.boom_len + Vec3::Y * cfg.boom_height;
    // Keep the boom out of the hillside.
    let (ground, _n) = crate::gfx::terrain::height_at(terrain, eye.x, eye.z);
    if eye.y < ground + cfg.min_ground_clearance {
        eye.y = ground + cfg.min_ground_clearance;
    }
    let target = player_pos + Vec3::Y * cfg.look_height;
    let cam = Camera::look_at(eye, target, aspect);

    let forward = (target - eye).normalize_or_zero();
    let right = forward.cross(Vec3::Y).normalize_or_zero();
    let (wind_dir, wind_strength) = wind;
    let globals = Globals {
        view_proj: cam.view_proj().to_cols_array_2d(),
        cam_right_time: [right.x, right.y, right.z, t],
        wind_dir_strength: [wind_dir.x, wind_dir.y, wind_dir.z, wind_strength],
    };
    (cam, globals)
}
