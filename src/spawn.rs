//! Spawn volumes for particle re-roll positions.
//!
//! When a particle finishes its hidden phase it is handed a fresh random
//! position drawn from the system's spawn volume, decoupling its visual
//! identity between life cycles.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// A region of space particles respawn into.
#[derive(Clone, Debug)]
pub enum SpawnVolume {
    /// Every respawn lands on the same point.
    Point {
        /// Spawn position.
        position: Vec3,
    },

    /// Respawn uniformly inside an axis-aligned box.
    Box {
        /// Minimum corner of the box.
        min: Vec3,
        /// Maximum corner of the box.
        max: Vec3,
    },

    /// Respawn uniformly inside a sphere.
    Sphere {
        /// Sphere center.
        center: Vec3,
        /// Sphere radius.
        radius: f32,
    },
}

impl SpawnVolume {
    /// Draw a random position from the volume.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec3 {
        match self {
            SpawnVolume::Point { position } => *position,

            SpawnVolume::Box { min, max } => Vec3::new(
                rng.gen_range(min.x..=max.x),
                rng.gen_range(min.y..=max.y),
                rng.gen_range(min.z..=max.z),
            ),

            SpawnVolume::Sphere { center, radius } => {
                let theta = rng.gen_range(0.0..TAU);
                let phi = rng.gen_range(0.0..PI);
                // Cube root for uniform volume distribution
                let r = radius * rng.gen::<f32>().cbrt();

                *center
                    + Vec3::new(
                        r * phi.sin() * theta.cos(),
                        r * phi.sin() * theta.sin(),
                        r * phi.cos(),
                    )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_point_always_lands_on_point() {
        let mut rng = SmallRng::seed_from_u64(1);
        let volume = SpawnVolume::Point {
            position: Vec3::new(1.0, 2.0, 3.0),
        };
        for _ in 0..10 {
            assert_eq!(volume.sample(&mut rng), Vec3::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_box_stays_inside_bounds() {
        let mut rng = SmallRng::seed_from_u64(2);
        let min = Vec3::new(-10.0, 0.0, -5.0);
        let max = Vec3::new(10.0, 20.0, 5.0);
        let volume = SpawnVolume::Box { min, max };

        for _ in 0..100 {
            let p = volume.sample(&mut rng);
            assert!(p.x >= min.x && p.x <= max.x);
            assert!(p.y >= min.y && p.y <= max.y);
            assert!(p.z >= min.z && p.z <= max.z);
        }
    }

    #[test]
    fn test_sphere_stays_inside_radius() {
        let mut rng = SmallRng::seed_from_u64(3);
        let center = Vec3::new(5.0, -2.0, 0.0);
        let volume = SpawnVolume::Sphere {
            center,
            radius: 4.0,
        };

        for _ in 0..100 {
            let p = volume.sample(&mut rng);
            assert!((p - center).length() <= 4.0 + 1e-4);
        }
    }
}
