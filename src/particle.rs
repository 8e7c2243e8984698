//! A single emitted particle.
//!
//! Particles are owned exclusively by a [`ParticleSystem`](crate::system::ParticleSystem),
//! which drives their life cycle and applies the active force field. The
//! particle itself only knows how to accumulate forces and integrate its own
//! motion.

use glam::Vec3;

/// Visibility phase of a particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifeState {
    /// Never evaluated by the life cycle yet.
    #[default]
    Unspawned,
    /// Inside its visible window; opacity pulses.
    Live,
    /// Past its visible window; fading out or awaiting re-roll.
    Hidden,
}

/// Identifier assigned by the owning system, stable for the particle's whole
/// lifetime in the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleId(pub u32);

/// One emitted entity: a position with motion state and a timed visibility
/// window.
#[derive(Clone, Debug)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// Current velocity.
    pub velocity: Vec3,
    /// Sprite radius in world units.
    pub radius: f32,
    /// Inertial mass; forces are divided by it on integration.
    pub mass: f32,
    /// Velocity retention factor applied each step (1.0 = frictionless).
    pub drag: f32,
    /// Opacity in [0, 1], driven by the life cycle.
    pub opacity: f32,
    /// Simulation time at which the visible window ends.
    pub time_to_live: f32,
    /// Simulation time at which the particle is fully hidden and may re-roll.
    pub time_to_hide: f32,
    /// Phase jitter staggering the opacity pulse between particles.
    pub time_offset: f32,
    /// Current visibility phase.
    pub status: LifeState,
    forces: Vec3,
}

impl Particle {
    /// Create a particle at rest at the origin.
    ///
    /// Both deadlines start at zero so the first life-cycle evaluation
    /// immediately re-rolls the particle onto a fresh schedule and position.
    pub fn new(radius: f32, mass: f32, drag: f32, time_offset: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            radius,
            mass,
            drag,
            opacity: 0.0,
            time_to_live: 0.0,
            time_to_hide: 0.0,
            time_offset,
            status: LifeState::Unspawned,
            forces: Vec3::ZERO,
        }
    }

    /// Accumulate a force for the next integration step.
    pub fn add_force(&mut self, force: Vec3) {
        self.forces += force;
    }

    /// Integrate one step of motion and clear the force accumulator.
    pub fn integrate(&mut self) {
        self.velocity += self.forces / self.mass;
        self.velocity *= self.drag;
        self.position += self.velocity;
        self.forces = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle_is_unspawned_with_zero_deadlines() {
        let p = Particle::new(1.0, 50.0, 1.0, 0.3);
        assert_eq!(p.status, LifeState::Unspawned);
        assert_eq!(p.time_to_live, 0.0);
        assert_eq!(p.time_to_hide, 0.0);
        assert_eq!(p.opacity, 0.0);
    }

    #[test]
    fn test_integrate_divides_force_by_mass() {
        let mut p = Particle::new(1.0, 10.0, 1.0, 0.0);
        p.add_force(Vec3::new(20.0, 0.0, 0.0));
        p.integrate();

        assert_eq!(p.velocity, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(p.position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_integrate_clears_accumulated_forces() {
        let mut p = Particle::new(1.0, 10.0, 1.0, 0.0);
        p.add_force(Vec3::new(10.0, 0.0, 0.0));
        p.integrate();
        p.integrate();

        // Velocity unchanged by the second step: no force left to apply.
        assert_eq!(p.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p.position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_drag_bleeds_velocity() {
        let mut p = Particle::new(1.0, 1.0, 0.5, 0.0);
        p.add_force(Vec3::new(8.0, 0.0, 0.0));
        p.integrate();
        assert_eq!(p.velocity.x, 4.0);

        p.integrate();
        assert_eq!(p.velocity.x, 2.0);
    }

    #[test]
    fn test_forces_accumulate_within_a_step() {
        let mut p = Particle::new(1.0, 2.0, 1.0, 0.0);
        p.add_force(Vec3::new(1.0, 0.0, 0.0));
        p.add_force(Vec3::new(3.0, 0.0, 0.0));
        p.integrate();

        assert_eq!(p.velocity, Vec3::new(2.0, 0.0, 0.0));
    }
}
