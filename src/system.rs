//! The particle system: ownership, life cycles, and force fields.
//!
//! A [`ParticleSystem`] owns its whole collection. Every frame it advances
//! each particle's timed visibility window, applies the active force field
//! (attractor spring or radius-bounded repulsion), and integrates motion, in
//! that order. Particles never observe each other: the field acting on a
//! particle depends only on system state, so one update is O(n).

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::{LifeBounds, ParticleSettings};
use crate::error::{ConfigError, ParticleError};
use crate::particle::{LifeState, Particle, ParticleId};
use crate::render::{BlendMode, BlendScope, ParticleSprite, RenderSink};
use crate::spawn::SpawnVolume;

/// Owner and driver of a collection of particles.
pub struct ParticleSystem {
    entries: Vec<(ParticleId, Particle)>,
    next_id: u32,
    life: LifeBounds,
    spawn: SpawnVolume,
    rng: SmallRng,
    attractor_position: Vec3,
    attractor_factor: f32,
    repulsion_position: Vec3,
    repulsion_factor: f32,
    repulsion_radius: f32,
    repulsion_active: bool,
}

impl ParticleSystem {
    /// Populate a new system from settings, spawning into `spawn`.
    ///
    /// Each particle gets an independently randomized radius (sampled from a
    /// nested chain of ranges biasing toward small values), a mass uniform in
    /// [30, 100), unit drag, and a random pulse phase. Fails fast on invalid
    /// settings.
    pub fn new(settings: &ParticleSettings, spawn: SpawnVolume) -> Result<Self, ConfigError> {
        Self::with_rng(settings, spawn, SmallRng::from_entropy())
    }

    /// Like [`ParticleSystem::new`] but with a caller-provided RNG seed, for
    /// reproducible runs.
    pub fn with_seed(
        settings: &ParticleSettings,
        spawn: SpawnVolume,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(settings, spawn, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(
        settings: &ParticleSettings,
        spawn: SpawnVolume,
        mut rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        let mut entries = Vec::with_capacity(settings.count as usize);
        for id in 0..settings.count {
            let radius = Self::random_radius(&mut rng);
            let mass = rng.gen_range(30.0..100.0);
            let time_offset = rng.gen_range(0.0..TAU);
            entries.push((ParticleId(id), Particle::new(radius, mass, 1.0, time_offset)));
        }

        Ok(Self {
            entries,
            next_id: settings.count,
            life: settings.life,
            spawn,
            rng,
            attractor_position: Vec3::ZERO,
            attractor_factor: settings.attractor_factor,
            repulsion_position: Vec3::ZERO,
            repulsion_factor: settings.repulsion_factor,
            repulsion_radius: settings.repulsion_radius,
            repulsion_active: false,
        })
    }

    /// Nested uniform chain: mostly sub-pixel grains, the occasional big orb.
    fn random_radius(rng: &mut SmallRng) -> f32 {
        let r = rng.gen_range(5.0..12.0);
        let r = rng.gen_range(1.6..r);
        let r = rng.gen_range(1.2..r);
        let r = rng.gen_range(0.8..r);
        rng.gen_range(0.5..r)
    }

    /// Number of particles currently owned.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the particles and their ids.
    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.entries.iter().map(|(id, p)| (*id, p))
    }

    /// Look up a particle by id.
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, p)| p)
    }

    /// Insert a particle, transferring ownership to the system.
    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, particle));
        id
    }

    /// Remove a particle, releasing ownership back to the caller.
    ///
    /// Absence is a normal, reportable outcome, not a crash.
    pub fn remove_particle(&mut self, id: ParticleId) -> Result<Particle, ParticleError> {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => Ok(self.entries.remove(index).1),
            None => Err(ParticleError::NotFound(id.0)),
        }
    }

    /// Move the attractor anchor and set its spring factor.
    pub fn set_attractor(&mut self, position: Vec3, factor: f32) {
        self.attractor_position = position;
        self.attractor_factor = factor;
    }

    /// Toggle the repulsion field and reposition its center.
    pub fn set_repulsion(&mut self, active: bool, position: Vec3) {
        self.repulsion_active = active;
        self.repulsion_position = position;
    }

    /// Whether the repulsion field is currently active.
    #[inline]
    pub fn repulsion_active(&self) -> bool {
        self.repulsion_active
    }

    /// Where the repulsion field was last placed.
    #[inline]
    pub fn repulsion_position(&self) -> Vec3 {
        self.repulsion_position
    }

    /// Spring force pulling a point toward the attractor.
    pub fn attractor_force(&self, position: Vec3) -> Vec3 {
        (self.attractor_position - position) * self.attractor_factor
    }

    /// Radius-bounded push on a point while the repulsion field is active.
    ///
    /// Zero outside the radius and exactly at the anchor, so no NaN can leak
    /// out of the normalization.
    pub fn repulsion_force(&self, position: Vec3) -> Vec3 {
        // The direction is measured from the attractor anchor, which the
        // repulsion field shares; `repulsion_position` only records where the
        // field was last placed.
        let offset = self.attractor_position - position;
        let distance = offset.length();

        let direction = if distance > 0.0 && self.repulsion_radius - distance >= 0.0 {
            offset / distance
        } else {
            Vec3::ZERO
        };
        direction * self.repulsion_factor
    }

    /// Advance every particle by one frame at `elapsed` seconds of simulation
    /// time: life cycle first, then field force, then integration.
    pub fn update(&mut self, elapsed: f32) {
        for i in 0..self.entries.len() {
            Self::advance_life(
                &self.life,
                &self.spawn,
                &mut self.rng,
                &mut self.entries[i].1,
                elapsed,
            );

            let position = self.entries[i].1.position;
            let force = if self.repulsion_active {
                self.repulsion_force(position)
            } else {
                self.attractor_force(position)
            };

            let particle = &mut self.entries[i].1;
            particle.add_force(force);
            particle.integrate();
        }
    }

    /// Timer-driven visibility machine, evaluated once per particle per frame.
    ///
    /// While `elapsed` is short of the hide deadline the particle is either
    /// pulsing (live window) or fading (past its visible window). Once the
    /// hide deadline passes it re-rolls: fresh deadlines drawn from the life
    /// bounds and a fresh position from the spawn volume. A particle that was
    /// never evaluated gets a zero deadline so its first real schedule starts
    /// on the next frame.
    fn advance_life(
        life: &LifeBounds,
        spawn: &SpawnVolume,
        rng: &mut SmallRng,
        particle: &mut Particle,
        elapsed: f32,
    ) {
        if particle.time_to_hide > elapsed {
            if particle.time_to_live > elapsed {
                particle.status = LifeState::Live;
                let pulse = ((elapsed + particle.time_offset) * 8.0
                    + (elapsed * 0.25 + particle.time_offset).sin())
                .sin();
                let opacity = (pulse * 0.5 + 0.5) * 0.75;
                particle.opacity = opacity * opacity * (3.0 - 2.0 * opacity) * 0.75;
            } else {
                particle.status = LifeState::Hidden;
                particle.opacity -= elapsed * 0.025;
            }
        } else {
            let ttl = if particle.status != LifeState::Unspawned {
                elapsed + rng.gen_range(life.min_ttl..=life.max_ttl)
            } else {
                0.0
            };
            let tth = ttl + rng.gen_range(life.min_tth..=life.max_tth);

            particle.status = LifeState::Hidden;
            particle.time_to_live = ttl;
            particle.time_to_hide = tth;
            particle.position = spawn.sample(rng);
        }
    }

    /// Submit one sprite per visible particle under additive blending.
    ///
    /// The previous blend mode is restored when the batch scope drops,
    /// whatever path leaves this function.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        let mut scope = BlendScope::new(sink, BlendMode::Additive);
        for (_, particle) in &self.entries {
            if particle.status != LifeState::Unspawned && particle.opacity > 0.0 {
                scope.draw_particle(ParticleSprite {
                    position: particle.position,
                    radius: particle.radius,
                    opacity: particle.opacity,
                });
            }
        }
    }
}
