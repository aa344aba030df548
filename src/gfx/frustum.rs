//! View-frustum extraction and AABB visibility tests.
//!
//! Planes are pulled straight from the view-projection matrix (Gribb/Hartmann)
//! and kept unnormalized; the AABB test only needs consistent signs.

use glam::{Mat4, Vec3, Vec4};

/// World-space axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Six planes as (normal, d); a point p is inside when dot(n, p) + d >= 0.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_proj(vp: Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);
        Self {
            planes: [
                r3 + r0, // left
                r3 - r0, // right
                r3 + r1, // bottom
                r3 - r1, // top
                r3 + r2, // near
                r3 - r2, // far
            ],
        }
    }

    /// Conservative AABB test: true when the box is at least partially inside.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for p in &self.planes {
            // Most-positive vertex along the plane normal.
            let v = Vec3::new(
                if p.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if p.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if p.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if p.x * v.x + p.y * v.y + p.z * v.z + p.w < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look_down_z() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::Z * 10.0, Vec3::Y);
        let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        Frustum::from_view_proj(proj * view)
    }

    #[test]
    fn box_ahead_is_visible() {
        let f = look_down_z();
        let b = Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 7.0));
        assert!(f.intersects_aabb(&b));
    }

    #[test]
    fn box_behind_is_culled() {
        let f = look_down_z();
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -7.0), Vec3::new(1.0, 1.0, -5.0));
        assert!(!f.intersects_aabb(&b));
    }

    #[test]
    fn box_straddling_near_plane_is_visible() {
        let f = look_down_z();
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(f.intersects_aabb(&b));
    }

    #[test]
    fn aabb_overlap_is_symmetric() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(0.5), Vec3::splat(2.0));
        let c = Aabb::new(Vec3::splat(3.0), Vec3::splat(4.0));
        assert!(a.intersects(&b) && b.intersects(&a));
        assert!(!a.intersects(&c));
    }
}
