//! wgpu implementation of the renderer boundary.
//!
//! [`GpuState`] owns the surface, device, pipelines, and buffers, and
//! implements [`RenderSink`]: the wave frame is written straight into vertex
//! buffers, particle sprites are batched per blend mode and flushed as
//! instanced billboard draws when the frame is rendered.

mod camera;

pub use camera::Camera;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::render::{BlendMode, ParticleSprite, RenderSink, WaveFrame};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// WGSL source for the wave strip pipeline.
pub const WAVE_SOURCE: &str = include_str!("wave.wgsl");
/// WGSL source for the particle billboard pipeline.
pub const PARTICLE_SOURCE: &str = include_str!("particle.wgsl");

/// Per-frame uniforms shared by both pipelines.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    /// x = elapsed seconds, y = delta seconds.
    time_data: [f32; 4],
}

/// One billboard instance.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SpriteInstance {
    /// xyz = world center, w = radius.
    center_radius: [f32; 4],
    /// x = opacity.
    tint: [f32; 4],
}

/// A run of queued sprites sharing one blend mode.
struct SpriteBatch {
    mode: BlendMode,
    start: u32,
    count: u32,
}

/// GPU-side state and the wgpu rendering of wave + particles.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    /// Surface configuration, public so the driver can recover from
    /// `SurfaceError::Lost` by resizing to the current dimensions.
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    wave_pipeline: wgpu::RenderPipeline,
    wave_positions: wgpu::Buffer,
    wave_normals: wgpu::Buffer,
    wave_colors: wgpu::Buffer,
    wave_indices: wgpu::Buffer,
    wave_index_count: u32,

    particle_alpha_pipeline: wgpu::RenderPipeline,
    particle_additive_pipeline: wgpu::RenderPipeline,
    sprite_buffer: wgpu::Buffer,
    sprite_capacity: u32,
    sprites: Vec<SpriteInstance>,
    batches: Vec<SpriteBatch>,

    blend: BlendMode,

    /// Orbit camera; the window layer mutates it directly on mouse input.
    pub camera: Camera,
}

impl GpuState {
    /// Initialize the device and build every pipeline and buffer.
    ///
    /// Buffer capacities are fixed up front from the mesh dimensions and the
    /// particle count; the simulation never submits more than it declared.
    pub async fn new(
        window: Arc<Window>,
        wave_vertex_count: usize,
        wave_index_count: usize,
        sprite_capacity: u32,
        camera: Camera,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Wave: three tightly packed vertex streams plus a static strip index.
        let wave_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Wave Shader"),
            source: wgpu::ShaderSource::Wgsl(WAVE_SOURCE.into()),
        });

        let wave_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Wave Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &wave_shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x3,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 16,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32x4,
                        }],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &wave_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SOURCE.into()),
        });

        let particle_alpha_pipeline = create_particle_pipeline(
            &device,
            &pipeline_layout,
            &particle_shader,
            config.format,
            BlendMode::Alpha,
        );
        let particle_additive_pipeline = create_particle_pipeline(
            &device,
            &pipeline_layout,
            &particle_shader,
            config.format,
            BlendMode::Additive,
        );

        let wave_positions = create_vertex_buffer(
            &device,
            "Wave Position Buffer",
            (wave_vertex_count * 3 * 4) as u64,
        );
        let wave_normals = create_vertex_buffer(
            &device,
            "Wave Normal Buffer",
            (wave_vertex_count * 3 * 4) as u64,
        );
        let wave_colors = create_vertex_buffer(
            &device,
            "Wave Color Buffer",
            (wave_vertex_count * 4 * 4) as u64,
        );
        let wave_indices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Wave Index Buffer"),
            size: (wave_index_count * 4) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sprite_buffer = create_vertex_buffer(
            &device,
            "Sprite Instance Buffer",
            sprite_capacity as u64 * std::mem::size_of::<SpriteInstance>() as u64,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            uniform_buffer,
            uniform_bind_group,
            wave_pipeline,
            wave_positions,
            wave_normals,
            wave_colors,
            wave_indices,
            wave_index_count: 0,
            particle_alpha_pipeline,
            particle_additive_pipeline,
            sprite_buffer,
            sprite_capacity,
            sprites: Vec::with_capacity(sprite_capacity as usize),
            batches: Vec::new(),
            blend: BlendMode::Alpha,
            camera,
        })
    }

    /// Reconfigure the surface and depth buffer for a new window size.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    fn update_uniforms(&mut self, time: f32, delta: f32) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let view_proj = self.camera.view_proj(aspect);

        let forward = (self.camera.target - self.camera.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            camera_right: [right.x, right.y, right.z, 0.0],
            camera_up: [up.x, up.y, up.z, 0.0],
            time_data: [time, delta, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Render everything submitted since the last call, then clear the
    /// sprite queue.
    pub fn render(&mut self, time: f32, delta: f32) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms(time, delta);

        if !self.sprites.is_empty() {
            self.queue
                .write_buffer(&self.sprite_buffer, 0, bytemuck::cast_slice(&self.sprites));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.005,
                            g: 0.01,
                            b: 0.02,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if self.wave_index_count > 0 {
                render_pass.set_pipeline(&self.wave_pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.wave_positions.slice(..));
                render_pass.set_vertex_buffer(1, self.wave_normals.slice(..));
                render_pass.set_vertex_buffer(2, self.wave_colors.slice(..));
                render_pass
                    .set_index_buffer(self.wave_indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.wave_index_count, 0, 0..1);
            }

            for batch in &self.batches {
                let pipeline = match batch.mode {
                    BlendMode::Alpha => &self.particle_alpha_pipeline,
                    BlendMode::Additive => &self.particle_additive_pipeline,
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.sprite_buffer.slice(..));
                render_pass.draw(0..6, batch.start..batch.start + batch.count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.sprites.clear();
        self.batches.clear();

        Ok(())
    }
}

impl RenderSink for GpuState {
    fn draw_wave(&mut self, frame: WaveFrame<'_>) {
        self.queue
            .write_buffer(&self.wave_positions, 0, bytemuck::cast_slice(frame.positions));
        self.queue
            .write_buffer(&self.wave_normals, 0, bytemuck::cast_slice(frame.normals));
        self.queue
            .write_buffer(&self.wave_colors, 0, bytemuck::cast_slice(frame.colors));
        self.queue
            .write_buffer(&self.wave_indices, 0, bytemuck::cast_slice(frame.indices));
        self.wave_index_count = frame.indices.len() as u32;
    }

    fn draw_particle(&mut self, sprite: ParticleSprite) {
        if self.sprites.len() as u32 >= self.sprite_capacity {
            return;
        }

        let index = self.sprites.len() as u32;
        self.sprites.push(SpriteInstance {
            center_radius: [
                sprite.position.x,
                sprite.position.y,
                sprite.position.z,
                sprite.radius,
            ],
            tint: [sprite.opacity, 0.0, 0.0, 0.0],
        });

        match self.batches.last_mut() {
            Some(batch) if batch.mode == self.blend => batch.count += 1,
            _ => self.batches.push(SpriteBatch {
                mode: self.blend,
                start: index,
                count: 1,
            }),
        }
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_particle_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    blend_mode: BlendMode,
) -> wgpu::RenderPipeline {
    let blend_state = match blend_mode {
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    };

    let label = match blend_mode {
        BlendMode::Alpha => "Particle Pipeline (alpha)",
        BlendMode::Additive => "Particle Pipeline (additive)",
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x4,
                    },
                    wgpu::VertexAttribute {
                        offset: 16,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x4,
                    },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(blend_state),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            // Disable depth writes for additive blending
            depth_write_enabled: !matches!(blend_mode, BlendMode::Additive),
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
