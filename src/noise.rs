//! Coherent noise for the wave animation.
//!
//! The simulation only needs two pure functions: 2D and 3D coherent noise,
//! continuous and reproducible for identical inputs. They sit behind the
//! [`NoiseSource`] trait so tests can pin the surface math to a deterministic
//! stub.

use noise::{NoiseFn, Perlin};

/// A deterministic coherent-noise field.
///
/// Implementations must be pure: the same coordinates always produce the same
/// value, and nearby coordinates produce nearby values. Output is expected to
/// stay roughly within [-1, 1].
pub trait NoiseSource {
    /// Sample the 2D noise field.
    fn sample2(&self, x: f32, y: f32) -> f32;

    /// Sample the 3D noise field.
    fn sample3(&self, x: f32, y: f32, z: f32) -> f32;
}

/// Perlin-noise production source.
///
/// # Example
///
/// ```
/// use swell::noise::{NoiseSource, PerlinSource};
///
/// let source = PerlinSource::new(42);
/// let a = source.sample2(0.3, 0.7);
/// let b = source.sample2(0.3, 0.7);
/// assert_eq!(a, b);
/// ```
pub struct PerlinSource {
    perlin: Perlin,
}

impl PerlinSource {
    /// Create a new Perlin source with the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl NoiseSource for PerlinSource {
    fn sample2(&self, x: f32, y: f32) -> f32 {
        self.perlin.get([x as f64, y as f64]) as f32
    }

    fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        self.perlin.get([x as f64, y as f64, z as f64]) as f32
    }
}
