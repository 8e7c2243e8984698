//! Benchmarks for the per-frame simulation cost.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use swell::config::{ParticleSettings, WaveSettings};
use swell::noise::PerlinSource;
use swell::spawn::SpawnVolume;
use swell::system::ParticleSystem;
use swell::wave::WaveMesh;

fn bench_wave_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("wave_update");

    for (rows, lines) in [(30, 40), (60, 80), (120, 160)] {
        let settings = WaveSettings {
            num_rows: rows,
            num_lines: lines,
            ..Default::default()
        };
        let mut mesh = WaveMesh::new(&settings, PerlinSource::new(42)).unwrap();
        let mut elapsed = 0.0f32;

        group.bench_function(BenchmarkId::from_parameter(format!("{}x{}", rows, lines)), |b| {
            b.iter(|| {
                elapsed += 0.016;
                mesh.update(black_box(elapsed), black_box(0.5));
            })
        });
    }

    group.finish();
}

fn bench_particle_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_update");

    for count in [100u32, 1000, 10_000] {
        let settings = ParticleSettings {
            count,
            ..Default::default()
        };
        let spawn = SpawnVolume::Box {
            min: Vec3::new(-500.0, 0.0, -500.0),
            max: Vec3::new(500.0, 300.0, 500.0),
        };
        let mut system = ParticleSystem::with_seed(&settings, spawn, 42).unwrap();
        let mut elapsed = 0.0f32;

        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            b.iter(|| {
                elapsed += 0.016;
                system.update(black_box(elapsed));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_wave_update, bench_particle_update);
criterion_main!(benches);
