//! # Swell
//!
//! A procedurally animated ocean surface with a field of slowly breathing
//! particles drifting above it.
//!
//! The simulation core is renderer-agnostic: [`WaveMesh`] re-elevates a vertex
//! grid every frame from layered Perlin noise and trigonometric terms, and
//! [`ParticleSystem`] drives a collection of independently aging particles
//! through timed visibility windows under an attractor or repulsion field.
//! Both hand their output to a [`RenderSink`](render::RenderSink); the wgpu
//! implementation lives in [`gpu`] and the winit driver in [`window`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use swell::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     App::new(WaveSettings::default(), ParticleSettings::default(), 42)?.run()
//! }
//! ```
//!
//! ## Headless use
//!
//! The core runs without a window: build a [`WaveMesh`] and a
//! [`ParticleSystem`], step them with your own clock, and collect the output
//! with any [`RenderSink`](render::RenderSink) implementation.
//!
//! ```
//! use swell::config::{ParticleSettings, WaveSettings};
//! use swell::noise::PerlinSource;
//! use swell::render::NullSink;
//! use swell::spawn::SpawnVolume;
//! use swell::system::ParticleSystem;
//! use swell::wave::WaveMesh;
//! use swell::Vec3;
//!
//! let mut wave = WaveMesh::new(&WaveSettings::default(), PerlinSource::new(1)).unwrap();
//! let spawn = SpawnVolume::Sphere { center: Vec3::ZERO, radius: 100.0 };
//! let mut particles = ParticleSystem::new(&ParticleSettings::default(), spawn).unwrap();
//!
//! let mut sink = NullSink::default();
//! for frame in 1..=10 {
//!     let elapsed = frame as f32 / 60.0;
//!     particles.update(elapsed);
//!     wave.update(elapsed, 0.5);
//!     wave.draw(&mut sink);
//!     particles.draw(&mut sink);
//! }
//! ```

pub mod config;
pub mod error;
pub mod gpu;
pub mod noise;
pub mod particle;
pub mod render;
pub mod spawn;
pub mod system;
pub mod time;
pub mod wave;
pub mod window;

pub use glam::{Vec2, Vec3, Vec4};

pub use config::{LifeBounds, ParticleSettings, WaveSettings};
pub use error::{AppError, ConfigError, GpuError, ParticleError};
pub use particle::{LifeState, Particle, ParticleId};
pub use system::ParticleSystem;
pub use wave::{WaveMesh, WaveVertex};
pub use window::App;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use swell::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{LifeBounds, ParticleSettings, WaveSettings};
    pub use crate::error::{AppError, ConfigError, ParticleError};
    pub use crate::noise::{NoiseSource, PerlinSource};
    pub use crate::particle::{LifeState, Particle, ParticleId};
    pub use crate::render::{BlendMode, BlendScope, ParticleSprite, RenderSink, WaveFrame};
    pub use crate::spawn::SpawnVolume;
    pub use crate::system::ParticleSystem;
    pub use crate::time::Time;
    pub use crate::wave::{WaveMesh, WaveVertex};
    pub use crate::window::App;
    pub use crate::{Vec2, Vec3, Vec4};
}
