//! Windowed driver for the simulation.
//!
//! One frame per `RedrawRequested`: advance the clock, update particles and
//! wave, hand both to the GPU sink, render. Left drag orbits the camera,
//! scroll zooms, right press holds the repulsion field at the cursor, space
//! pauses the clock.

use std::sync::Arc;

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::{ParticleSettings, WaveSettings};
use crate::error::AppError;
use crate::gpu::{Camera, GpuState};
use crate::noise::PerlinSource;
use crate::spawn::SpawnVolume;
use crate::system::ParticleSystem;
use crate::time::Time;
use crate::wave::WaveMesh;

/// The interactive visualizer application.
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    wave: WaveMesh<PerlinSource>,
    particles: ParticleSystem,
    time: Time,
    wave_settings: WaveSettings,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    cursor_pos: (f64, f64),
}

impl App {
    /// Build the simulation from settings. Fails fast on invalid parameters.
    pub fn new(
        wave_settings: WaveSettings,
        particle_settings: ParticleSettings,
        noise_seed: u32,
    ) -> Result<Self, AppError> {
        let wave = WaveMesh::new(&wave_settings, PerlinSource::new(noise_seed))?;

        // Particles live in the air box above the surface.
        let span = wave.num_lines() as f32 * wave.gap();
        let depth = wave.num_rows() as f32 * wave.gap() * 2.0;
        let height = wave_settings.camera_offset_h as f32;
        let spawn = SpawnVolume::Box {
            min: Vec3::new(-span * 0.5, 0.0, -depth),
            max: Vec3::new(span * 0.5, height, 0.0),
        };

        let mut particles = ParticleSystem::new(&particle_settings, spawn)?;
        particles.set_attractor(
            Vec3::new(0.0, height * 0.5, -depth * 0.5),
            particle_settings.attractor_factor,
        );

        Ok(Self {
            window: None,
            gpu: None,
            wave,
            particles,
            time: Time::new(),
            wave_settings,
            mouse_pressed: false,
            last_mouse_pos: None,
            cursor_pos: (0.0, 0.0),
        })
    }

    /// Run the event loop until the window closes.
    pub fn run(mut self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    /// Project the cursor onto the mid-height plane of the particle box.
    fn cursor_world_position(&self) -> Vec3 {
        let gpu = match &self.gpu {
            Some(gpu) => gpu,
            None => return Vec3::ZERO,
        };

        let width = gpu.config.width as f32;
        let height = gpu.config.height as f32;
        let ndc_x = 2.0 * self.cursor_pos.0 as f32 / width - 1.0;
        let ndc_y = 1.0 - 2.0 * self.cursor_pos.1 as f32 / height;

        let inverse = gpu.camera.view_proj(width / height).inverse();
        let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        let direction = (far - near).normalize_or_zero();

        let plane_y = self.wave_settings.camera_offset_h as f32 * 0.5;
        if direction.y.abs() < 1e-4 {
            return near;
        }
        let t = (plane_y - near.y) / direction.y;
        near + direction * t
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("Swell")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.wave_settings.window_width,
                    self.wave_settings.window_height,
                ));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    eprintln!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.window = Some(window.clone());

            let span = self.wave.num_lines() as f32 * self.wave.gap();
            let camera = Camera::new(self.wave_settings.camera_offset_h as f32, span);

            let gpu = pollster::block_on(GpuState::new(
                window,
                self.wave.vertex_count(),
                self.wave.index_count(),
                self.particles.len() as u32,
                camera,
            ));
            match gpu {
                Ok(gpu) => self.gpu = Some(gpu),
                Err(e) => {
                    eprintln!("GPU initialization failed: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Space)
                {
                    self.time.toggle_pause();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match button {
                MouseButton::Left => {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
                MouseButton::Right => {
                    let active = state == ElementState::Pressed;
                    let position = self.cursor_world_position();
                    self.particles.set_repulsion(active, position);
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = (position.x, position.y);
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;

                        if let Some(gpu) = &mut self.gpu {
                            gpu.camera.yaw -= dx as f32 * 0.005;
                            gpu.camera.pitch += dy as f32 * 0.005;
                            gpu.camera.pitch = gpu.camera.pitch.clamp(-1.5, 1.5);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
                if self.particles.repulsion_active() {
                    let position = self.cursor_world_position();
                    self.particles.set_repulsion(true, position);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu) = &mut self.gpu {
                    gpu.camera.distance -= scroll * gpu.camera.distance * 0.1;
                    gpu.camera.distance = gpu.camera.distance.clamp(100.0, 50_000.0);
                }
            }
            WindowEvent::RedrawRequested => {
                let (elapsed, delta) = self.time.update();

                if !self.time.is_paused() {
                    self.particles.update(elapsed);
                    self.wave.update(elapsed, self.wave_settings.speed_factor);
                }

                if let Some(gpu) = &mut self.gpu {
                    self.wave.draw(gpu);
                    self.particles.draw(gpu);

                    match gpu.render(elapsed, delta) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                            width: gpu.config.width,
                            height: gpu.config.height,
                        }),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
