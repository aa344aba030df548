//! Buffer/vertex types shared across pipelines.
//!
//! All types here are `#[repr(C)]` and `bytemuck`-safe so they can be uploaded to GPU buffers
//! without extra copies.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera right vector, w = time in seconds (drives wind sway).
    pub cam_right_time: [f32; 4],
    /// xyz = wind direction (normalized, XZ plane), w = wind strength.
    pub wind_dir_strength: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Model {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub emissive: f32,
    pub _pad: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

/// Per-instance data for solid meshes (entities, props).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Instance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub selected: f32,
}

impl Instance {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Instance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,
            6 => Float32x3, 7 => Float32
        ],
    };
}

/// Per-blade instance data for the grass pipeline.
///
/// Deliberately compact (no full matrix): a blade is placed by position + yaw +
/// nonuniform scale, all reconstructed in the vertex shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GrassInstance {
    /// World-space root of the blade (on the terrain surface).
    pub pos: [f32; 3],
    /// Rotation about +Y in radians.
    pub yaw: f32,
    /// xy = width/height scale, z = sway phase offset, w = sway amplitude scale.
    pub scale_sway: [f32; 4],
    /// Albedo tint (rgb) + unused alpha kept for 16-byte stride alignment.
    pub color: [f32; 4],
}

impl GrassInstance {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GrassInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            2 => Float32x3, 3 => Float32, 4 => Float32x4, 5 => Float32x4
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_instance_is_tightly_packed() {
        // 3 + 1 + 4 + 4 floats
        assert_eq!(std::mem::size_of::<GrassInstance>(), 48);
    }

    #[test]
    fn instance_stride_matches_attr_floats() {
        // mat4 + vec3 + f32
        assert_eq!(std::mem::size_of::<Instance>(), 80);
    }
}
