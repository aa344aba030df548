//! CPU-side procedural meshes: unit cube for entities/props and the two
//! grass-blade meshes (high/low detail) shared by every grass instance.

use wgpu::util::DeviceExt;

use crate::gfx::types::Vertex;

pub fn create_cube(device: &wgpu::Device) -> (wgpu::Buffer, wgpu::Buffer, u32) {
    let p = 0.5f32;
    #[rustfmt::skip]
    let verts = [
        // +Z
        Vertex { pos: [-p, -p,  p], nrm: [0.0, 0.0, 1.0] },
        Vertex { pos: [ p, -p,  p], nrm: [0.0, 0.0, 1.0] },
        Vertex { pos: [ p,  p,  p], nrm: [0.0, 0.0, 1.0] },
        Vertex { pos: [-p,  p,  p], nrm: [0.0, 0.0, 1.0] },
        // -Z
        Vertex { pos: [ p, -p, -p], nrm: [0.0, 0.0, -1.0] },
        Vertex { pos: [-p, -p, -p], nrm: [0.0, 0.0, -1.0] },
        Vertex { pos: [-p,  p, -p], nrm: [0.0, 0.0, -1.0] },
        Vertex { pos: [ p,  p, -p], nrm: [0.0, 0.0, -1.0] },
        // +X
        Vertex { pos: [ p, -p,  p], nrm: [1.0, 0.0, 0.0] },
        Vertex { pos: [ p, -p, -p], nrm: [1.0, 0.0, 0.0] },
        Vertex { pos: [ p,  p, -p], nrm: [1.0, 0.0, 0.0] },
        Vertex { pos: [ p,  p,  p], nrm: [1.0, 0.0, 0.0] },
        // -X
        Vertex { pos: [-p, -p, -p], nrm: [-1.0, 0.0, 0.0] },
        Vertex { pos: [-p, -p,  p], nrm: [-1.0, 0.0, 0.0] },
        Vertex { pos: [-p,  p,  p], nrm: [-1.0, 0.0, 0.0] },
        Vertex { pos: [-p,  p, -p], nrm: [-1.0, 0.0, 0.0] },
        // +Y
        Vertex { pos: [-p,  p,  p], nrm: [0.0, 1.0, 0.0] },
        Vertex { pos: [ p,  p,  p], nrm: [0.0, 1.0, 0.0] },
        Vertex { pos: [ p,  p, -p], nrm: [0.0, 1.0, 0.0] },
        Vertex { pos: [-p,  p, -p], nrm: [0.0, 1.0, 0.0] },
        // -Y
        Vertex { pos: [-p, -p, -p], nrm: [0.0, -1.0, 0.0] },
        Vertex { pos: [ p, -p, -p], nrm: [0.0, -1.0, 0.0] },
        Vertex { pos: [ p, -p,  p], nrm: [0.0, -1.0, 0.0] },
        Vertex { pos: [-p, -p,  p], nrm: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: [u16; 36] = [
        0, 1, 2, 2, 3, 0,
        4, 5, 6, 6, 7, 4,
        8, 9, 10, 10, 11, 8,
        12, 13, 14, 14, 15, 12,
        16, 17, 18, 18, 19, 16,
        20, 21, 22, 22, 23, 20,
    ];
    let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("cube-vb"),
        contents: bytemuck::cast_slice(&verts),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("cube-ib"),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vb, ib, indices.len() as u32)
}

/// Tapered multi-segment blade for near grass. `segments` quads stacked along
/// +Y, each narrower than the last; unit height/width, scaled per instance.
/// Double-sided via shader (no culling on the grass pipeline), so only the
/// front faces are emitted. Normals lean up so lighting reads soft.
pub fn blade_mesh(segments: u32) -> (Vec<Vertex>, Vec<u16>) {
    let segs = segments.max(1);
    let mut verts: Vec<Vertex> = Vec::with_capacity(((segs + 1) * 2) as usize);
    let half_w = 0.5f32;
    for s in 0..=segs {
        let t = s as f32 / segs as f32;
        let w = half_w * (1.0 - t * 0.85); // taper toward the tip
        let n = glam::Vec3::new(0.0, 0.35, 1.0).normalize();
        verts.push(Vertex {
            pos: [-w, t, 0.0],
            nrm: [n.x, n.y, n.z],
        });
        verts.push(Vertex {
            pos: [w, t, 0.0],
            nrm: [n.x, n.y, n.z],
        });
    }
    let mut indices: Vec<u16> = Vec::with_capacity((segs * 6) as usize);
    for s in 0..segs {
        let b = (s * 2) as u16;
        indices.extend_from_slice(&[b, b + 1, b + 2, b + 2, b + 1, b + 3]);
    }
    (verts, indices)
}

/// Single-quad blade for distant grass.
pub fn blade_mesh_low() -> (Vec<Vertex>, Vec<u16>) {
    blade_mesh(1)
}

pub fn upload_mesh(
    device: &wgpu::Device,
    label: &str,
    verts: &[Vertex],
    indices: &[u16],
) -> (wgpu::Buffer, wgpu::Buffer, u32) {
    let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(verts),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vb, ib, indices.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blade_tapers_toward_tip() {
        let (verts, indices) = blade_mesh(4);
        assert_eq!(verts.len(), 10);
        assert_eq!(indices.len(), 24);
        let base_w = verts[1].pos[0] - verts[0].pos[0];
        let tip_w = verts[9].pos[0] - verts[8].pos[0];
        assert!(tip_w < base_w);
        // Unit height
        assert!((verts[8].pos[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn low_lod_is_one_quad() {
        let (verts, indices) = blade_mesh_low();
        assert_eq!(verts.len(), 4);
        assert_eq!(indices.len(), 6);
    }
}
