//! Grass patch streaming + LOD.
//!
//! The terrain plane is bucketed into square patches. Every frame the system
//! reconciles patch residency against an anchor point (the player/camera):
//! patches entering the view radius are materialized with deterministic,
//! seeded per-blade attributes; patches leaving a strictly larger exit radius
//! are released. Resident patches carry a two-level LOD (blade mesh near,
//! quad far) switched with hysteresis so a camera dithering on the boundary
//! never flickers detail. Frustum culling only gates drawing; culled patches
//! stay resident.
//!
//! CPU bookkeeping (`GrassSystem`) is pure and unit tested; GPU packing
//! (`GrassGpu`) is a thin layer that re-uploads only when residency or LOD
//! actually changed.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::gfx::frustum::{Aabb, Frustum};
use crate::gfx::terrain::{self, TerrainCPU};
use crate::gfx::types::GrassInstance;

/// Tunables for streaming, LOD and blade generation.
#[derive(Clone, Copy, Debug)]
pub struct GrassParams {
    /// Patch side length in meters.
    pub patch_size: f32,
    /// Patches whose center is within this radius of the anchor are resident.
    pub view_radius: f32,
    /// Release only beyond `view_radius + exit_margin` (anti-thrash).
    pub exit_margin: f32,
    /// High-detail LOD inside this radius.
    pub lod_radius: f32,
    /// Promote below `lod_radius - lod_margin`, demote above `lod_radius +
    /// lod_margin`; in between, keep the current level.
    pub lod_margin: f32,
    /// Blades per patch at high/low detail.
    pub blades_high: u32,
    pub blades_low: u32,
    /// Skip blades where the terrain normal is flatter than this (steep slope).
    pub min_normal_y: f32,
    /// Scatter seed; combined with patch coordinates per blade.
    pub seed: u32,
}

impl Default for GrassParams {
    fn default() -> Self {
        Self {
            patch_size: 8.0,
            view_radius: 60.0,
            exit_margin: 6.0,
            lod_radius: 28.0,
            lod_margin: 3.0,
            blades_high: 512,
            blades_low: 96,
            min_normal_y: 0.7,
            seed: 0x6d6f_7373, // "moss"
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchCoord {
    pub x: i32,
    pub z: i32,
}

impl PatchCoord {
    #[inline]
    pub fn from_world(p: Vec2, patch_size: f32) -> Self {
        Self {
            x: (p.x / patch_size).floor() as i32,
            z: (p.y / patch_size).floor() as i32,
        }
    }

    /// World-space center of the patch footprint.
    #[inline]
    pub fn center(&self, patch_size: f32) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * patch_size,
            (self.z as f32 + 0.5) * patch_size,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrassLod {
    High,
    Low,
}

#[derive(Debug)]
pub struct GrassPatch {
    pub coord: PatchCoord,
    pub aabb: Aabb,
    pub lod: GrassLod,
    /// Set per frame by frustum culling; culled patches stay resident.
    pub visible: bool,
    pub instances: Vec<GrassInstance>,
}

/// Counters for one `update` call; tests and debug logging read these.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrassUpdateStats {
    pub spawned: usize,
    pub released: usize,
    pub promoted: usize,
    pub demoted: usize,
    pub resident: usize,
    pub drawn: usize,
}

impl GrassUpdateStats {
    /// True when the packed instance buffer must be rebuilt.
    #[inline]
    pub fn residency_changed(&self) -> bool {
        self.spawned + self.released + self.promoted + self.demoted > 0
    }
}

pub struct GrassSystem {
    pub params: GrassParams,
    patches: HashMap<PatchCoord, GrassPatch>,
    /// Sticky flag consumed by the GPU layer.
    dirty: bool,
}

impl GrassSystem {
    pub fn new(params: GrassParams) -> Self {
        Self {
            params,
            patches: HashMap::new(),
            dirty: false,
        }
    }

    #[inline]
    pub fn patches(&self) -> impl Iterator<Item = &GrassPatch> {
        self.patches.values()
    }

    #[inline]
    pub fn patch(&self, coord: PatchCoord) -> Option<&GrassPatch> {
        self.patches.get(&coord)
    }

    #[inline]
    pub fn resident_count(&self) -> usize {
        self.patches.len()
    }

    /// Take the dirty flag (true when any residency/LOD change happened since
    /// the last call).
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Reconcile residency, LOD and visibility against the anchor for this
    /// frame. `anchor` is the player position; `frustum` is the camera's.
    pub fn update(
        &mut self,
        anchor: Vec3,
        frustum: &Frustum,
        terrain: &TerrainCPU,
    ) -> GrassUpdateStats {
        let mut stats = GrassUpdateStats::default();
        let p = self.params;
        let anchor2 = Vec2::new(anchor.x, anchor.z);
        let enter_r = p.view_radius;
        let exit_r = p.view_radius + p.exit_margin;

        // 1) Spawn: walk the coord window covering the enter radius.
        let min_c = PatchCoord::from_world(anchor2 - Vec2::splat(enter_r), p.patch_size);
        let max_c = PatchCoord::from_world(anchor2 + Vec2::splat(enter_r), p.patch_size);
        for cz in min_c.z..=max_c.z {
            for cx in min_c.x..=max_c.x {
                let coord = PatchCoord { x: cx, z: cz };
                if self.patches.contains_key(&coord) {
                    continue;
                }
                let center = coord.center(p.patch_size);
                if center.distance(anchor2) > enter_r {
                    continue;
                }
                if !patch_on_terrain(coord, p.patch_size, terrain) {
                    continue;
                }
                // LOD at spawn is chosen without hysteresis.
                let lod = if center.distance(anchor2) <= p.lod_radius {
                    GrassLod::High
                } else {
                    GrassLod::Low
                };
                let patch = generate_patch(coord, lod, &p, terrain);
                self.patches.insert(coord, patch);
                stats.spawned += 1;
            }
        }

        // 2) Release + LOD hysteresis on survivors.
        let mut regen: Vec<(PatchCoord, GrassLod)> = Vec::new();
        self.patches.retain(|coord, patch| {
            let dist = coord.center(p.patch_size).distance(anchor2);
            if dist > exit_r {
                stats.released += 1;
                return false;
            }
            match patch.lod {
                GrassLod::Low if dist < p.lod_radius - p.lod_margin => {
                    regen.push((*coord, GrassLod::High));
                    stats.promoted += 1;
                }
                GrassLod::High if dist > p.lod_radius + p.lod_margin => {
                    regen.push((*coord, GrassLod::Low));
                    stats.demoted += 1;
                }
                _ => {}
            }
            true
        });
        for (coord, lod) in regen {
            let patch = generate_patch(coord, lod, &p, terrain);
            self.patches.insert(coord, patch);
        }

        // 3) Visibility: cull against the frustum, keep residency.
        for patch in self.patches.values_mut() {
            patch.visible = frustum.intersects_aabb(&patch.aabb);
            if patch.visible {
                stats.drawn += 1;
            }
        }
        stats.resident = self.patches.len();

        if stats.residency_changed() {
            self.dirty = true;
            log::debug!(
                "grass: +{} -{} lod {}/{} resident {} drawn {}",
                stats.spawned,
                stats.released,
                stats.promoted,
                stats.demoted,
                stats.resident,
                stats.drawn
            );
        }
        stats
    }
}

/// True when the patch footprint overlaps the terrain extent.
fn patch_on_terrain(coord: PatchCoord, patch_size: f32, terrain: &TerrainCPU) -> bool {
    let min = Vec2::new(coord.x as f32 * patch_size, coord.z as f32 * patch_size);
    let max = min + Vec2::splat(patch_size);
    let e = terrain.extent;
    min.x < e && max.x > -e && min.y < e && max.y > -e
}

/// Deterministic per-blade attribute generation for one patch.
///
/// The RNG state is derived from the scatter seed and the patch coordinate, so
/// a patch always regenerates bit-identically regardless of visit order.
pub fn generate_patch(
    coord: PatchCoord,
    lod: GrassLod,
    params: &GrassParams,
    terrain: &TerrainCPU,
) -> GrassPatch {
    let blade_count = match lod {
        GrassLod::High => params.blades_high,
        GrassLod::Low => params.blades_low,
    };
    let mut state = terrain::splitmix(
        (params.seed as u64) ^ ((coord.x as u64) << 32) ^ (coord.z as u64 & 0xFFFF_FFFF),
    );
    let origin = Vec2::new(
        coord.x as f32 * params.patch_size,
        coord.z as f32 * params.patch_size,
    );
    let mut instances = Vec::with_capacity(blade_count as usize);
    let mut y_min = f32::INFINITY;
    let mut y_max = f32::NEG_INFINITY;
    let half_e = terrain.extent;
    for _ in 0..blade_count {
        let jx = terrain::rand01(&mut state) * params.patch_size;
        let jz = terrain::rand01(&mut state) * params.patch_size;
        let yaw = terrain::rand01(&mut state) * std::f32::consts::TAU;
        let height = 0.6 + terrain::rand01(&mut state) * 0.7;
        let width = 0.06 + terrain::rand01(&mut state) * 0.05;
        let phase = terrain::rand01(&mut state) * std::f32::consts::TAU;
        let tint = terrain::rand01(&mut state);

        let x = origin.x + jx;
        let z = origin.y + jz;
        if x.abs() > half_e || z.abs() > half_e {
            continue;
        }
        let (y, n) = terrain::height_at(terrain, x, z);
        if n.y < params.min_normal_y {
            // steep slope: bare ground
            continue;
        }
        y_min = y_min.min(y);
        y_max = y_max.max(y + height);
        // Blend from dry straw to meadow green.
        let dry = Vec3::new(0.58, 0.55, 0.24);
        let green = Vec3::new(0.18, 0.48, 0.16);
        let c = dry.lerp(green, tint);
        instances.push(GrassInstance {
            pos: [x, y, z],
            yaw,
            scale_sway: [width, height, phase, 0.5 + 0.5 * tint],
            color: [c.x, c.y, c.z, 1.0],
        });
    }
    if instances.is_empty() {
        y_min = 0.0;
        y_max = 0.0;
    }
    let aabb = Aabb::new(
        Vec3::new(origin.x, y_min, origin.y),
        Vec3::new(
            origin.x + params.patch_size,
            y_max,
            origin.y + params.patch_size,
        ),
    );
    GrassPatch {
        coord,
        aabb,
        lod,
        visible: true,
        instances,
    }
}

// ----------------------
// GPU packing
// ----------------------

/// A contiguous instance range inside the packed buffer.
#[derive(Clone, Copy, Debug)]
struct PatchRange {
    coord: PatchCoord,
    first: u32,
    count: u32,
    lod: GrassLod,
}

/// One draw: an instance range plus which blade mesh to bind.
#[derive(Clone, Copy, Debug)]
pub struct GrassDraw {
    pub first: u32,
    pub count: u32,
    pub lod: GrassLod,
}

/// GPU resources for the grass: the two blade meshes and a packed instance
/// buffer rebuilt only when the CPU side reports a residency/LOD change.
pub struct GrassGpu {
    pub hi_vb: wgpu::Buffer,
    pub hi_ib: wgpu::Buffer,
    pub hi_index_count: u32,
    pub lo_vb: wgpu::Buffer,
    pub lo_ib: wgpu::Buffer,
    pub lo_index_count: u32,
    pub instances: wgpu::Buffer,
    capacity: u64,
    ranges: Vec<PatchRange>,
}

impl GrassGpu {
    pub fn new(device: &wgpu::Device) -> Self {
        let (hi_verts, hi_idx) = super::mesh::blade_mesh(4);
        let (hi_vb, hi_ib, hi_index_count) =
            super::mesh::upload_mesh(device, "grass-blade-hi", &hi_verts, &hi_idx);
        let (lo_verts, lo_idx) = super::mesh::blade_mesh_low();
        let (lo_vb, lo_ib, lo_index_count) =
            super::mesh::upload_mesh(device, "grass-blade-lo", &lo_verts, &lo_idx);
        let capacity = 64 * 1024; // instances; grown on demand
        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grass-instances"),
            size: capacity * std::mem::size_of::<GrassInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            hi_vb,
            hi_ib,
            hi_index_count,
            lo_vb,
            lo_ib,
            lo_index_count,
            instances,
            capacity,
            ranges: Vec::new(),
        }
    }

    /// Repack every resident patch into the instance buffer. Patch order is
    /// sorted by coordinate so uploads are reproducible frame to frame.
    pub fn repack(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, sys: &GrassSystem) {
        let mut patches: Vec<&GrassPatch> = sys.patches().collect();
        patches.sort_by_key(|p| p.coord);
        let total: usize = patches.iter().map(|p| p.instances.len()).sum();
        if (total as u64) > self.capacity {
            self.capacity = (total as u64).next_power_of_two();
            self.instances = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("grass-instances"),
                size: self.capacity * std::mem::size_of::<GrassInstance>() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            log::debug!("grass: instance buffer grown to {} instances", self.capacity);
        }
        let mut packed: Vec<GrassInstance> = Vec::with_capacity(total);
        self.ranges.clear();
        for patch in patches {
            let first = packed.len() as u32;
            packed.extend_from_slice(&patch.instances);
            self.ranges.push(PatchRange {
                coord: patch.coord,
                first,
                count: patch.instances.len() as u32,
                lod: patch.lod,
            });
        }
        if !packed.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&packed));
        }
    }

    /// Draw list for this frame: visible patches only, ranges from the last
    /// repack.
    pub fn draws(&self, sys: &GrassSystem) -> Vec<GrassDraw> {
        self.ranges
            .iter()
            .filter(|r| sys.patch(r.coord).map(|p| p.visible).unwrap_or(false))
            .filter(|r| r.count > 0)
            .map(|r| GrassDraw {
                first: r.first,
                count: r.count,
                lod: r.lod,
            })
            .collect()
    }
}
