//! Integration tests for the frame-stepped simulation.
//!
//! These walk the public API the way the windowed driver does: explicit
//! elapsed time, one update per frame, draw into a recording sink.

use glam::Vec3;
use swell::config::{LifeBounds, ParticleSettings, WaveSettings};
use swell::noise::NoiseSource;
use swell::particle::LifeState;
use swell::render::{BlendMode, ParticleSprite, RenderSink, WaveFrame};
use swell::spawn::SpawnVolume;
use swell::system::ParticleSystem;
use swell::wave::WaveMesh;

/// Deterministic stand-in for the Perlin source.
struct StubNoise;

impl NoiseSource for StubNoise {
    fn sample2(&self, x: f32, y: f32) -> f32 {
        (x * 0.19).sin() * (y * 0.23).cos()
    }

    fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        (x * 0.19).sin() * (y * 0.23).cos() * (z * 0.29).sin()
    }
}

/// Sink that keeps everything it is handed.
#[derive(Default)]
struct RecordingSink {
    blend: BlendMode,
    sprites: Vec<(BlendMode, ParticleSprite)>,
    wave_uploads: usize,
    last_index_count: usize,
}

impl RenderSink for RecordingSink {
    fn draw_wave(&mut self, frame: WaveFrame<'_>) {
        self.wave_uploads += 1;
        self.last_index_count = frame.indices.len();
    }

    fn draw_particle(&mut self, sprite: ParticleSprite) {
        self.sprites.push((self.blend, sprite));
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }
}

fn pinned_life_settings() -> ParticleSettings {
    ParticleSettings {
        count: 1,
        life: LifeBounds {
            min_ttl: 1.0,
            max_ttl: 1.0,
            min_tth: 2.0,
            max_tth: 2.0,
        },
        ..Default::default()
    }
}

fn spawn_box() -> SpawnVolume {
    SpawnVolume::Box {
        min: Vec3::new(-50.0, 0.0, -50.0),
        max: Vec3::new(50.0, 50.0, 50.0),
    }
}

#[test]
fn test_lifecycle_walk_live_to_hidden_to_reroll() {
    let mut system = ParticleSystem::with_seed(&pinned_life_settings(), spawn_box(), 11).unwrap();

    // Frame 0: first evaluation schedules the particle with a zero live
    // window (deadlines 0), so it lands hidden.
    system.update(0.0);
    let p = system.particles().next().unwrap().1;
    assert_eq!(p.status, LifeState::Hidden);
    assert_eq!(p.time_to_live, 0.0);
    assert_eq!(p.time_to_hide, 2.0);

    // A hair later the hide deadline (2.0) is still ahead but the live
    // window is over, so the particle keeps fading.
    system.update(0.01);
    let p = system.particles().next().unwrap().1;
    assert_eq!(p.status, LifeState::Hidden);

    // Past the hide deadline: re-roll onto a real schedule. With both
    // bounds pinned, ttl = elapsed + 1 and tth = ttl + 2.
    system.update(2.1);
    let p = system.particles().next().unwrap().1;
    assert_eq!(p.status, LifeState::Hidden);
    let ttl = p.time_to_live;
    let tth = p.time_to_hide;
    let rerolled_position = p.position;
    assert!((ttl - 3.1).abs() < 1e-3);
    assert!((tth - 5.1).abs() < 1e-3);

    // Inside the fresh live window: LIVE, pulsing.
    system.update(2.2);
    let p = system.particles().next().unwrap().1;
    assert_eq!(p.status, LifeState::Live);
    assert!(p.opacity >= 0.0 && p.opacity <= 0.75);

    // Past ttl but short of tth: fading again (t ~= ttl).
    system.update(ttl + 0.1);
    let p = system.particles().next().unwrap().1;
    assert_eq!(p.status, LifeState::Hidden);

    // Past tth: another re-roll with a new schedule and a new position.
    system.update(tth + 0.1);
    let p = system.particles().next().unwrap().1;
    assert!(p.time_to_live > ttl);
    assert!(p.time_to_hide >= p.time_to_live);
    // The spawn volume re-rolls position; a repeat would need the RNG to
    // hit the exact same point twice.
    assert_ne!(p.position, rerolled_position);
}

#[test]
fn test_hide_always_trails_live_across_rerolls() {
    let settings = ParticleSettings {
        count: 16,
        ..Default::default()
    };
    let mut system = ParticleSystem::with_seed(&settings, spawn_box(), 5).unwrap();

    for step in 0..2000 {
        system.update(step as f32 * 0.02);
        for (_, p) in system.particles() {
            assert!(p.time_to_hide >= p.time_to_live);
        }
    }
}

#[test]
fn test_full_frame_matches_windowed_driver_shape() {
    let wave_settings = WaveSettings::default();
    let mut wave = WaveMesh::new(&wave_settings, StubNoise).unwrap();
    let mut system = ParticleSystem::with_seed(
        &ParticleSettings::default(),
        spawn_box(),
        3,
    )
    .unwrap();
    let mut sink = RecordingSink::default();

    for frame in 1..=120 {
        let elapsed = frame as f32 / 60.0;
        system.update(elapsed);
        wave.update(elapsed, wave_settings.speed_factor);
        wave.draw(&mut sink);
        system.draw(&mut sink);
    }

    assert_eq!(sink.wave_uploads, 120);
    assert_eq!(
        sink.last_index_count,
        (wave_settings.num_rows as usize - 1)
            * wave_settings.effective_lines() as usize
            * 2
    );

    // Sprites were all submitted under additive blending, and the sink was
    // handed back its default mode afterwards.
    assert!(sink.sprites.iter().all(|(mode, _)| *mode == BlendMode::Additive));
    assert_eq!(sink.blend_mode(), BlendMode::Alpha);
}

#[test]
fn test_identical_runs_produce_identical_surfaces() {
    let settings = WaveSettings {
        num_rows: 8,
        num_lines: 8,
        ..Default::default()
    };

    let mut first = WaveMesh::new(&settings, StubNoise).unwrap();
    let mut second = WaveMesh::new(&settings, StubNoise).unwrap();

    for frame in 1..=30 {
        let elapsed = frame as f32 * 0.016;
        first.update(elapsed, 0.4);
        second.update(elapsed, 0.4);
    }

    assert_eq!(first.positions(), second.positions());
    assert_eq!(first.normals(), second.normals());
}
