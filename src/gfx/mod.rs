//! gfx: rendering module and per-frame game loop for the prototype.
//!
//! This module wraps wgpu initialization and draws the scene:
//! - the heightfield terrain,
//! - instanced entity bodies (player + raiders),
//! - streamed instanced grass with two LODs.
//!
//! It is deliberately split into focused files so the structure resembles a
//! real codebase you could extend into a full client.
//!
//! Files
//! - camera.rs / camera_sys.rs: camera type and the third-person chase rig
//! - frustum.rs: view-frustum extraction + AABB tests
//! - types.rs: POD buffer structs and vertex layouts
//! - mesh.rs: CPU-side procedural meshes (cube + grass blades)
//! - terrain.rs: heightmap generation and sampling
//! - grass.rs: patch streaming, LOD and instance packing
//! - pipeline.rs: pipelines + shader module (WGSL in shader.wgsl)
//! - scene.rs: entity spawning for the demo encounter

pub mod camera;
pub mod camera_sys;
pub mod frustum;
pub mod grass;
pub mod mesh;
mod pipeline;
pub mod scene;
pub mod terrain;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::client::controller::PlayerController;
use crate::client::input::InputState;
use crate::core::ai::{AiCfg, AiState};
use crate::core::combat::fsm::AttackSpec;
use crate::core::combat::CombatState;
use crate::core::data::zone::ZoneManifest;
use crate::core::entity::{AnimLabel, EntityId, EntityKind, EntityStore};
use frustum::Frustum;
use types::{Globals, Instance, Model};

const MAX_ENTITY_INSTANCES: u64 = 256;
const CORPSE_LINGER_S: f32 = 5.0;

/// Renderer owns the GPU state, the scene resources and the game state.
///
/// The platform layer owns a `Renderer` and calls `resize`, `render` and the
/// input hooks based on window events.
pub struct Renderer {
    // --- GPU & Surface ---
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: wgpu::TextureView,

    // --- Pipelines & bind groups ---
    terrain_pipeline: wgpu::RenderPipeline,
    inst_pipeline: wgpu::RenderPipeline,
    grass_pipeline: wgpu::RenderPipeline,
    globals_bg: wgpu::BindGroup,
    terrain_model_bg: wgpu::BindGroup,

    // --- Buffers ---
    globals_buf: wgpu::Buffer,
    entity_instances: wgpu::Buffer,
    entity_instance_count: u32,

    // --- Geometry ---
    terrain_cpu: terrain::TerrainCPU,
    terrain_bufs: terrain::TerrainBuffers,
    cube_vb: wgpu::Buffer,
    cube_ib: wgpu::Buffer,
    cube_index_count: u32,

    // --- Grass ---
    grass: grass::GrassSystem,
    grass_gpu: grass::GrassGpu,

    // --- Game state ---
    pub input: InputState,
    controller: PlayerController,
    store: EntityStore,
    combat: CombatState,
    ai: AiState,
    ai_cfg: AiCfg,
    attack_spec: AttackSpec,
    player: EntityId,
    rig: camera_sys::CameraRigCfg,
    wind_dir: Vec3,
    wind_strength: f32,

    start: Instant,
    last_frame: Instant,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("mossblade-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("request device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth = create_depth(&device, config.width, config.height);

        // --- Zone + world ---
        let zone = ZoneManifest::load_or_default("meadow");
        log::info!("loading zone '{}' ({})", zone.slug, zone.display_name);
        let (terrain_cpu, terrain_bufs) = terrain::create_terrain(
            &device,
            zone.terrain.size as usize,
            zone.terrain.extent,
            zone.terrain.seed,
        );

        let mut store = EntityStore::default();
        let scene = scene::build_scene(&mut store, &terrain_cpu, zone.raider_count);
        let controller = PlayerController::new(scene.cam_target);

        let grass = grass::GrassSystem::new(zone.grass.to_params());
        let grass_gpu = grass::GrassGpu::new(&device);

        // --- Pipelines and bind groups ---
        let shader = pipeline::create_shader(&device);
        let (globals_bgl, model_bgl) = pipeline::create_bind_group_layouts(&device);
        let (terrain_pipeline, inst_pipeline) =
            pipeline::create_pipelines(&device, &shader, &globals_bgl, &model_bgl, format);
        let grass_pipeline = pipeline::create_grass_pipeline(&device, &shader, &globals_bgl, format);

        let globals_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals-buf"),
            contents: bytemuck::bytes_of(&Globals {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                cam_right_time: [1.0, 0.0, 0.0, 0.0],
                wind_dir_strength: [1.0, 0.0, 0.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals-bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        let terrain_model_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-model-buf"),
            contents: bytemuck::bytes_of(&Model {
                model: Mat4::IDENTITY.to_cols_array_2d(),
                color: [0.32, 0.42, 0.18],
                emissive: 0.0,
                _pad: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let terrain_model_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-model-bg"),
            layout: &model_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: terrain_model_buf.as_entire_binding(),
            }],
        });

        let entity_instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("entity-instances"),
            size: MAX_ENTITY_INSTANCES * std::mem::size_of::<Instance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (cube_vb, cube_ib, cube_index_count) = mesh::create_cube(&device);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth,
            terrain_pipeline,
            inst_pipeline,
            grass_pipeline,
            globals_bg,
            terrain_model_bg,
            globals_buf,
            entity_instances,
            entity_instance_count: 0,
            terrain_cpu,
            terrain_bufs,
            cube_vb,
            cube_ib,
            cube_index_count,
            grass,
            grass_gpu,
            input: InputState::default(),
            controller,
            store,
            combat: CombatState::default(),
            ai: AiState::default(),
            ai_cfg: AiCfg::default(),
            attack_spec: AttackSpec::default(),
            player: scene.player,
            rig: camera_sys::CameraRigCfg::default(),
            wind_dir: Vec3::new(0.8, 0.0, 0.6).normalize(),
            wind_strength: 1.0,
            start: Instant::now(),
            last_frame: Instant::now(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = create_depth(&self.device, self.config.width, self.config.height);
    }

    /// Advance the game one frame and draw it.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        // Clamp hitches so combat timers and movement stay sane.
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        let t = (now - self.start).as_secs_f32();

        let globals = self.update(dt, t);
        self.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.45,
                            g: 0.62,
                            b: 0.82,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Terrain
            pass.set_pipeline(&self.terrain_pipeline);
            pass.set_bind_group(0, &self.globals_bg, &[]);
            pass.set_bind_group(1, &self.terrain_model_bg, &[]);
            pass.set_vertex_buffer(0, self.terrain_bufs.vb.slice(..));
            pass.set_index_buffer(self.terrain_bufs.ib.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.terrain_bufs.index_count, 0, 0..1);

            // Entities
            if self.entity_instance_count > 0 {
                pass.set_pipeline(&self.inst_pipeline);
                pass.set_bind_group(0, &self.globals_bg, &[]);
                pass.set_bind_group(1, &self.terrain_model_bg, &[]);
                pass.set_vertex_buffer(0, self.cube_vb.slice(..));
                pass.set_vertex_buffer(1, self.entity_instances.slice(..));
                pass.set_index_buffer(self.cube_ib.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..self.entity_instance_count);
            }

            // Grass: one bind per LOD, ranges from the packed buffer.
            let draws = self.grass_gpu.draws(&self.grass);
            if !draws.is_empty() {
                pass.set_pipeline(&self.grass_pipeline);
                pass.set_bind_group(0, &self.globals_bg, &[]);
                pass.set_vertex_buffer(1, self.grass_gpu.instances.slice(..));
                for want in [grass::GrassLod::High, grass::GrassLod::Low] {
                    let (vb, ib, n) = match want {
                        grass::GrassLod::High => (
                            &self.grass_gpu.hi_vb,
                            &self.grass_gpu.hi_ib,
                            self.grass_gpu.hi_index_count,
                        ),
                        grass::GrassLod::Low => (
                            &self.grass_gpu.lo_vb,
                            &self.grass_gpu.lo_ib,
                            self.grass_gpu.lo_index_count,
                        ),
                    };
                    pass.set_vertex_buffer(0, vb.slice(..));
                    pass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint16);
                    for d in draws.iter().filter(|d| d.lod == want) {
                        pass.draw_indexed(0..n, 0, d.first..d.first + d.count);
                    }
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Fixed-order per-frame update: input -> controller -> AI -> combat ->
    /// camera -> grass. Returns the globals for this frame.
    fn update(&mut self, dt: f32, t: f32) -> Globals {
        // Player movement.
        let out = self.controller.update(&self.input, &self.terrain_cpu, dt);
        if let Some(p) = self.store.get_mut(self.player) {
            if p.hp.alive() {
                p.pos = self.controller.pos;
                p.yaw = self.controller.yaw;
                if p.attack.is_idle() {
                    p.anim = if out.running {
                        AnimLabel::Run
                    } else if out.moving {
                        AnimLabel::Walk
                    } else {
                        AnimLabel::Idle
                    };
                }
            }
        }
        if out.attack_pressed {
            self.combat
                .try_attack(&mut self.store, self.player, &self.attack_spec);
        }

        // Enemies, then combat resolution, then corpse cleanup.
        self.ai.tick(
            &self.ai_cfg,
            &mut self.store,
            &mut self.combat,
            &self.attack_spec,
            self.player,
            &self.terrain_cpu,
            dt,
        );
        self.combat.tick(&mut self.store, &self.attack_spec, dt);
        self.store.reap(dt, CORPSE_LINGER_S);

        // Camera follows the player.
        let aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        let (cam, globals) = camera_sys::follow_and_globals(
            &self.rig,
            self.controller.pos,
            self.controller.yaw,
            &self.terrain_cpu,
            aspect,
            t,
            (self.wind_dir, self.wind_strength),
        );

        // Grass streaming against the player anchor and the camera frustum.
        let frustum = Frustum::from_view_proj(cam.view_proj());
        self.grass
            .update(self.controller.pos, &frustum, &self.terrain_cpu);
        if self.grass.take_dirty() {
            self.grass_gpu
                .repack(&self.device, &self.queue, &self.grass);
        }

        // Entity instance data (tiny; rebuilt every frame).
        let instances = build_entity_instances(&self.store);
        self.entity_instance_count = instances.len().min(MAX_ENTITY_INSTANCES as usize) as u32;
        if self.entity_instance_count > 0 {
            self.queue.write_buffer(
                &self.entity_instances,
                0,
                bytemuck::cast_slice(&instances[..self.entity_instance_count as usize]),
            );
        }

        globals
    }
}

fn build_entity_instances(store: &EntityStore) -> Vec<Instance> {
    let mut out = Vec::with_capacity(store.entities.len());
    for e in store.iter() {
        let color = match (e.kind, e.hp.alive()) {
            (_, false) => [0.25, 0.22, 0.2],
            (EntityKind::Player, true) => [0.2, 0.45, 0.85],
            (EntityKind::Raider, true) => [0.75, 0.25, 0.2],
        };
        // Body box from the hurtbox half-extents; corpses flatten.
        let scale = if e.hp.alive() {
            Vec3::new(
                e.half_extent.x * 2.0,
                e.half_extent.y * 2.0,
                e.half_extent.z * 2.0,
            )
        } else {
            Vec3::new(e.half_extent.x * 2.0, 0.25, e.half_extent.z * 2.0)
        };
        let center = e.pos + Vec3::Y * scale.y * 0.5;
        let model = Mat4::from_scale_rotation_translation(
            scale,
            glam::Quat::from_rotation_y(e.yaw),
            center,
        );
        out.push(Instance {
            model: model.to_cols_array_2d(),
            color,
            selected: if e.anim == AnimLabel::Attack { 1.0 } else { 0.0 },
        });
    }
    out
}

fn create_depth(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&Default::default())
}
