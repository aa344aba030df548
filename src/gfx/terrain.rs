//! Heightmap terrain generation.
//!
//! Scope
//! - Deterministic CPU heightmap (seeded value-noise fBm), central-difference
//!   normals, and a displaced grid mesh uploaded once at startup.
//! - Bilinear height/normal sampling at arbitrary world XZ; movement, grass
//!   placement and the camera boom all walk this surface.
//!
//! Extension points
//! - Replace the noise with imported heightmaps, streaming tiles, or biomes.
//! - Add texture splats (albedo/normal) and terrain LOD.

use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::gfx::types::Vertex;

pub struct TerrainBuffers {
    pub vb: wgpu::Buffer,
    pub ib: wgpu::Buffer,
    pub index_count: u32,
}

pub struct TerrainCPU {
    pub size: usize, // grid dimension (N x N vertices)
    pub extent: f32, // world-space half-extent (meters)
    pub heights: Vec<f32>,
    pub normals: Vec<[f32; 3]>,
}

/// Generate a deterministic heightmap and upload GPU buffers.
pub fn create_terrain(
    device: &wgpu::Device,
    size: usize,
    extent: f32,
    seed: u32,
) -> (TerrainCPU, TerrainBuffers) {
    let cpu = generate_heightmap(size, extent, seed);
    let (verts, indices) = build_mesh(&cpu);
    let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("terrain-vb"),
        contents: bytemuck::cast_slice(&verts),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("terrain-ib"),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let index_count = indices.len() as u32;
    log::info!(
        "terrain: {}x{} vertices, extent {:.0}m, seed {}",
        size,
        size,
        extent,
        seed
    );
    (
        cpu,
        TerrainBuffers {
            vb,
            ib,
            index_count,
        },
    )
}

/// Public sampler: terrain height and surface normal at world XZ.
pub fn height_at(cpu: &TerrainCPU, x: f32, z: f32) -> (f32, Vec3) {
    sample_height_normal(cpu, Vec2::new(x, z))
}

pub fn generate_heightmap(size: usize, extent: f32, seed: u32) -> TerrainCPU {
    let mut heights = vec![0.0f32; size * size];
    let base_freq = 1.0 / 50.0; // meters -> noise frequency
    let mut s = splitmix(seed as u64);
    // Per-octave domain offsets so the octaves decorrelate.
    let offsets: [f32; 3] = [
        rand01(&mut s) * 1000.0,
        rand01(&mut s) * 1000.0,
        rand01(&mut s) * 1000.0,
    ];
    let amps = [1.0f32, 0.5, 0.25];
    let norm: f32 = amps.iter().sum();
    for j in 0..size {
        for i in 0..size {
            let x = ((i as f32) / (size as f32 - 1.0) * 2.0 - 1.0) * extent;
            let z = ((j as f32) / (size as f32 - 1.0) * 2.0 - 1.0) * extent;
            // fBm: 3 octaves of value noise, gentle hills
            let mut h = 0.0f32;
            for (oct, (&amp, &off)) in amps.iter().zip(offsets.iter()).enumerate() {
                let f = base_freq * (1 << oct) as f32;
                h += amp * value_noise_2d((x + off) * f, (z + off) * f, seed ^ (oct as u32 * 0x9E37));
            }
            heights[j * size + i] = 8.0 * h / norm;
        }
    }
    let normals = compute_normals(size, extent, &heights);
    TerrainCPU {
        size,
        extent,
        heights,
        normals,
    }
}

fn build_mesh(cpu: &TerrainCPU) -> (Vec<Vertex>, Vec<u32>) {
    let n = cpu.size;
    let mut verts = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let x = ((i as f32) / (n as f32 - 1.0) * 2.0 - 1.0) * cpu.extent;
            let z = ((j as f32) / (n as f32 - 1.0) * 2.0 - 1.0) * cpu.extent;
            let y = cpu.heights[j * n + i];
            let nrm = cpu.normals[j * n + i];
            verts.push(Vertex { pos: [x, y, z], nrm });
        }
    }
    let quads = (n - 1) * (n - 1);
    let mut indices: Vec<u32> = Vec::with_capacity(quads * 6);
    for j in 0..(n - 1) {
        for i in 0..(n - 1) {
            let i0 = (j * n + i) as u32;
            let i1 = (j * n + (i + 1)) as u32;
            let i2 = ((j + 1) * n + i) as u32;
            let i3 = ((j + 1) * n + (i + 1)) as u32;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }
    (verts, indices)
}

fn compute_normals(size: usize, extent: f32, h: &[f32]) -> Vec<[f32; 3]> {
    let step = (2.0 * extent) / (size as f32 - 1.0);
    let mut nrm = vec![[0.0; 3]; size * size];
    let idx = |i: isize, j: isize| -> usize {
        let ii = i.clamp(0, (size - 1) as isize) as usize;
        let jj = j.clamp(0, (size - 1) as isize) as usize;
        jj * size + ii
    };
    for j in 0..size as isize {
        for i in 0..size as isize {
            let h_l = h[idx(i - 1, j)];
            let h_r = h[idx(i + 1, j)];
            let h_d = h[idx(i, j - 1)];
            let h_u = h[idx(i, j + 1)];
            // Gradient via central differences
            let sx = (h_r - h_l) / (2.0 * step);
            let sz = (h_u - h_d) / (2.0 * step);
            let n = Vec3::new(-sx, 1.0, -sz).normalize();
            nrm[(j as usize) * size + (i as usize)] = [n.x, n.y, n.z];
        }
    }
    nrm
}

fn sample_height_normal(cpu: &TerrainCPU, p: Vec2) -> (f32, Vec3) {
    // Convert world x,z to grid space
    let n = cpu.size as i32;
    let gx = ((p.x / cpu.extent) * 0.5 + 0.5) * (n as f32 - 1.0);
    let gz = ((p.y / cpu.extent) * 0.5 + 0.5) * (n as f32 - 1.0);
    let x0 = (gx.floor() as i32).clamp(0, n - 1);
    let z0 = (gz.floor() as i32).clamp(0, n - 1);
    let x1 = (x0 + 1).clamp(0, n - 1);
    let z1 = (z0 + 1).clamp(0, n - 1);
    let tx = (gx - x0 as f32).clamp(0.0, 1.0);
    let tz = (gz - z0 as f32).clamp(0.0, 1.0);
    let idx = |x: i32, z: i32| -> usize { (z as usize) * cpu.size + (x as usize) };
    let h00 = cpu.heights[idx(x0, z0)];
    let h10 = cpu.heights[idx(x1, z0)];
    let h01 = cpu.heights[idx(x0, z1)];
    let h11 = cpu.heights[idx(x1, z1)];
    let h0 = h00 * (1.0 - tx) + h10 * tx;
    let h1 = h01 * (1.0 - tx) + h11 * tx;
    let h = h0 * (1.0 - tz) + h1 * tz;
    // Normal: bilinear blend then normalize
    let n00 = Vec3::from_array(cpu.normals[idx(x0, z0)]);
    let n10 = Vec3::from_array(cpu.normals[idx(x1, z0)]);
    let n01 = Vec3::from_array(cpu.normals[idx(x0, z1)]);
    let n11 = Vec3::from_array(cpu.normals[idx(x1, z1)]);
    let n0 = n00.lerp(n10, tx);
    let n1 = n01.lerp(n11, tx);
    let nrm = n0.lerp(n1, tz).normalize();
    (h, nrm)
}

// ----------------------
// Deterministic utilities
// ----------------------

pub(crate) fn splitmix(z: u64) -> u64 {
    // Advance once before first use (so seed=0 != first state 0)
    z.wrapping_add(0x9E3779B97F4A7C15)
}

pub(crate) fn next_u64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut x = *state;
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

pub(crate) fn rand01(state: &mut u64) -> f32 {
    (next_u64(state) as f64 / (u64::MAX as f64)) as f32
}

pub(crate) fn hash_i(i: i32, j: i32, seed: u32) -> f32 {
    // 2D integer hash -> [0,1)
    let mut x = (i as u64).wrapping_mul(0x27d4_eb2d);
    x ^= (j as u64).wrapping_mul(0x1656_6791_9E37_79F9);
    x ^= (seed as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let u = x ^ (x >> 33);
    (u as f64 / (u64::MAX as f64)) as f32
}

fn value_noise_2d(x: f32, y: f32, seed: u32) -> f32 {
    let xi = x.floor() as i32;
    let yi = y.floor() as i32;
    let tx = x - xi as f32;
    let ty = y - yi as f32;
    // quintic smoothstep for C2 continuity
    let sx = tx * tx * tx * (tx * (tx * 6.0 - 15.0) + 10.0);
    let sy = ty * ty * ty * (ty * (ty * 6.0 - 15.0) + 10.0);
    let c00 = hash_i(xi, yi, seed);
    let c10 = hash_i(xi + 1, yi, seed);
    let c01 = hash_i(xi, yi + 1, seed);
    let c11 = hash_i(xi + 1, yi + 1, seed);
    let a = c00 * (1.0 - sx) + c10 * sx;
    let b = c01 * (1.0 - sx) + c11 * sx;
    // Map to [-1,1]
    ((a * (1.0 - sy) + b * sy) * 2.0) - 1.0
}
