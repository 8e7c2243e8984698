//! The wave surface: a vertex grid with cached adjacency, re-elevated every
//! frame from layered noise and trigonometric terms.
//!
//! The grid is allocated once at setup. Per frame, [`WaveMesh::update`]
//! recomputes every vertex's elevation ([`compute_positions`]) and then its
//! surface normal from cached neighbour cross-products ([`compute_normals`]).
//! Only elevations and normals mutate after setup; base (x, z) coordinates,
//! adjacency, colors, and the strip index list are fixed for the mesh's whole
//! lifetime.
//!
//! The elevation math is a hand-tuned cascade of coupled constants. Its
//! visual signature depends on the exact coupling, so the arithmetic below is
//! deliberately literal rather than factored into "nicer" pieces.
//!
//! [`compute_positions`]: WaveMesh::update
//! [`compute_normals`]: WaveMesh::update

use glam::{Vec3, Vec4};

use crate::config::WaveSettings;
use crate::error::ConfigError;
use crate::noise::NoiseSource;
use crate::render::{RenderSink, WaveFrame};

/// One grid point of the surface.
///
/// Neighbour slots are in fixed order: +row, +col, -row, -col. A `None` slot
/// marks a grid boundary. `partials` caches one partial normal per slot so
/// adjacent vertices can reuse it instead of recomputing the cross product.
#[derive(Clone, Debug)]
pub struct WaveVertex {
    /// World-space position; only `y` changes after setup.
    pub position: Vec3,
    /// Vertex color, RGBA.
    pub color: Vec4,
    /// Unit surface normal, refreshed every frame.
    pub normal: Vec3,
    neighbours: [Option<u32>; 4],
    partials: [Vec3; 4],
}

impl WaveVertex {
    fn new(position: Vec3, color: Vec4, neighbours: [Option<u32>; 4]) -> Self {
        Self {
            position,
            color,
            normal: Vec3::ZERO,
            neighbours,
            partials: [Vec3::ZERO; 4],
        }
    }

    /// Neighbour indices in slot order +row, +col, -row, -col.
    #[inline]
    pub fn neighbours(&self) -> [Option<u32>; 4] {
        self.neighbours
    }
}

/// The animated surface grid.
pub struct WaveMesh<N> {
    noise: N,
    num_rows: usize,
    num_lines: usize,
    gap: f32,
    offset_h: f32,
    wave_motion_limit: f32,
    frame_counter: u64,
    vertices: Vec<WaveVertex>,
    positions: Vec<f32>,
    normals: Vec<f32>,
    colors: Vec<f32>,
    indices: Vec<u32>,
}

impl<N: NoiseSource> WaveMesh<N> {
    /// Allocate the grid, its adjacency, and the strip index list.
    ///
    /// The grid keeps `num_rows x (3/4 num_lines)` vertices spaced by a gap
    /// derived from the window width; the index list walks the rows in a
    /// serpentine order (even rows left to right, odd rows right to left) so
    /// consecutive strip segments stay spatially coherent.
    pub fn new(settings: &WaveSettings, noise: N) -> Result<Self, ConfigError> {
        settings.validate()?;

        let num_rows = settings.num_rows as usize;
        let num_lines = settings.effective_lines() as usize;
        let gap = settings.window_width as f32 / settings.num_lines as f32 + 1.0;
        let offset_h = settings.camera_offset_h as f32;
        let wave_motion_limit = (offset_h * 0.9).trunc();

        let num_points = num_rows * num_lines;
        let color = Vec4::new(1.0, 1.0, 1.0, 0.1);

        let mut vertices = Vec::with_capacity(num_points);
        for i in 0..num_rows {
            for j in 0..num_lines {
                let id = (i * num_lines + j) as u32;
                let x = j as f32 * gap - num_lines as f32 * 0.5 * gap + gap * 0.5;
                let z = (i as f32 * gap - num_rows as f32 * gap) * 2.0;

                let neighbours = [
                    (i < num_rows - 1).then(|| id + num_lines as u32),
                    (j < num_lines - 1).then(|| id + 1),
                    (i > 0).then(|| id - num_lines as u32),
                    (j > 0).then(|| id - 1),
                ];
                vertices.push(WaveVertex::new(Vec3::new(x, 0.0, z), color, neighbours));
            }
        }

        let mut indices = Vec::with_capacity((num_rows - 1) * num_lines * 2);
        for i in 0..num_rows - 1 {
            for j in 0..num_lines {
                let id = if i % 2 == 1 {
                    i * num_lines + num_lines - j - 1
                } else {
                    i * num_lines + j
                };
                indices.push(id as u32);
                indices.push((id + num_lines) as u32);
            }
        }

        let mut positions = vec![0.0; num_points * 3];
        let normals = vec![0.0; num_points * 3];
        let mut colors = vec![0.0; num_points * 4];
        for (id, vertex) in vertices.iter().enumerate() {
            positions[id * 3..id * 3 + 3].copy_from_slice(&vertex.position.to_array());
            colors[id * 4..id * 4 + 4].copy_from_slice(&vertex.color.to_array());
        }

        Ok(Self {
            noise,
            num_rows,
            num_lines,
            gap,
            offset_h,
            wave_motion_limit,
            frame_counter: 0,
            vertices,
            positions,
            normals,
            colors,
            indices,
        })
    }

    /// Advance the surface by one frame.
    ///
    /// `speed_factor` in [0, 1] is blended into an animation speed through a
    /// smoothstep-style cubic, so the ends of the range ease in and out.
    pub fn update(&mut self, elapsed_time: f32, speed_factor: f32) {
        let speed = 2.8 + speed_factor * speed_factor * (3.0 - 2.0 * speed_factor);
        self.frame_counter += 1;
        self.compute_positions(self.frame_counter, elapsed_time, speed);
        self.compute_normals();
    }

    /// Recompute every vertex's elevation.
    ///
    /// Deterministic in its inputs: for a fixed `frame`, `elapsed_time`, and
    /// `speed` (and a deterministic noise source) the output is bit-identical
    /// across invocations — elevation only reads the immutable base (x, z) of
    /// each vertex, never the previous `y`.
    fn compute_positions(&mut self, frame: u64, elapsed_time: f32, speed: f32) {
        // The visible motion is nonlinear in wall-clock time.
        let elapsed_time = (elapsed_time * 0.01 * speed).cos() * 30.0 + 35.0;
        let frame = frame as f32;
        let frame_slow = frame * 0.001 * speed;

        // Lots of waving parameters.
        let speed = speed + self.noise.sample2(frame * 0.0002, elapsed_time * 0.0002) * 0.8;
        let sin_time = elapsed_time.sin();
        let elapsed_slow = elapsed_time * (0.35 + sin_time * 0.08);
        let sin_slow = (elapsed_slow - elapsed_time).sin();
        let sin_amplitude = (elapsed_slow * speed).sin();
        let sin_slow_speed = sin_slow * speed;
        let horizontal_speed = elapsed_time * 100.0 * speed;
        let z_speed = elapsed_time * 25.0 * speed;
        let z_noise_speed = elapsed_time * (0.0015 * elapsed_slow.sin()) * speed * 0.01;
        let sin_high_amplitude = sin_time * (8.0 + 2.0 * sin_amplitude);
        let frequency_noise = self.noise.sample2(frame * 0.0025, elapsed_slow);
        let frequency =
            (0.001 + 0.000028 * sin_slow) + elapsed_slow * 0.00008 + frequency_noise * 0.00004;
        let amplitude = sin_slow;
        let amplitude = (160.0 + 60.0 * frequency_noise)
            + elapsed_slow * 54.0 * z_noise_speed
            + self.noise.sample3(
                amplitude * frame * 0.00225,
                amplitude * elapsed_slow * 0.2,
                sin_high_amplitude * 0.00025,
            ) * z_speed
                * frequency
                * 0.14;

        let move_noise = self.noise.sample2(elapsed_time, frame * 0.001)
            * ((elapsed_time * 0.35 + 1.0).sin()
                - (3.0 + (elapsed_time + elapsed_time.sin()) * 0.25).cos() * 2.3);

        let wave_second_amplitude = self.offset_h * 0.0035;
        let factor_x = 0.0005 + 0.0009 * (1.0 + sin_time);
        let factor_x2 = factor_x * (0.8 + sin_amplitude);
        let factor_z = 0.01 + 0.0002 * (1.0 + sin_slow);
        let mut wave_offset = 2.0 * self.wave_motion_limit * sin_amplitude + factor_x2;
        wave_offset += sin_amplitude * 50.0;

        for i in 0..self.num_rows {
            let row_t = i as f32 / self.num_rows as f32;
            let border = (4.0 * row_t * (1.0 - row_t)).powf(0.125) * 18.0;

            for j in 0..self.num_lines {
                let id = i * self.num_lines + j;
                let mut position = self.vertices[id].position;

                let sin_wave_x = ((position.x + horizontal_speed) * frequency).sin() + move_noise;
                let sin_a = (-position.z * 0.0001).sin() * 0.5;
                let sin_b = (position.x * 0.001 + elapsed_slow).sin();
                let wave_first_amplitude = 35.0 * (sin_b + 1.6 + factor_z);
                position.x = position.x * factor_x + sin_a + sin_high_amplitude;
                position.z = position.z * factor_z * (1.0 + move_noise.cos() * 0.25) + elapsed_time;

                let mut y = self.noise.sample2(
                    position.x * 0.75,
                    (position.z * (1.0 + factor_z) + elapsed_time) * 0.78,
                ) * wave_first_amplitude;
                y += self.noise.sample2(
                    position.x + sin_slow * 0.002,
                    (position.z * 1.2 + frame_slow) * 0.25,
                ) * 60.0;
                y += sin_a * sin_b * y * wave_second_amplitude;
                y += sin_wave_x * amplitude + sin_slow_speed * 1.25;
                y += wave_offset;
                y += (sin_slow_speed + position.x * 0.08 * position.z * 0.2).sin() * 60.0;
                y += border;

                self.vertices[id].position.y = y;
                self.positions[id * 3..id * 3 + 3]
                    .copy_from_slice(&self.vertices[id].position.to_array());
            }
        }
    }

    /// Recompute every vertex's normal from its neighbourhood.
    ///
    /// Traversal is row-major ascending and that order is a contract: slots 0
    /// and 1 compute a cross product of the two neighbour offsets, while
    /// slots 2 and 3 reuse the same-slot value cached on the -row / -col
    /// neighbour, which this traversal order has already visited this frame.
    /// Valid partials are averaged; a vertex with no valid contribution keeps
    /// a zero normal rather than propagating NaN.
    fn compute_normals(&mut self) {
        for i in 0..self.num_rows {
            for j in 0..self.num_lines {
                let id = i * self.num_lines + j;
                let position = self.vertices[id].position;
                let mut normal = Vec3::ZERO;
                let mut contributions = 0u32;

                let neighbours = self.vertices[id].neighbours;
                for k in 0..3 {
                    if let (Some(a), Some(b)) = (neighbours[k], neighbours[k + 1]) {
                        let partial = if k > 1 {
                            self.vertices[a as usize].partials[k]
                        } else {
                            (self.vertices[a as usize].position - position)
                                .cross(self.vertices[b as usize].position - position)
                        };
                        self.vertices[id].partials[k] = partial;
                        normal += partial;
                        contributions += 1;
                    }
                }

                if let Some(a) = neighbours[3] {
                    normal += self.vertices[a as usize].partials[3];
                    contributions += 1;
                }

                if contributions > 0 {
                    normal /= contributions as f32;
                }
                let normal = normal.normalize_or_zero();
                self.vertices[id].normal = normal;
                self.normals[id * 3..id * 3 + 3].copy_from_slice(&normal.to_array());
            }
        }
    }

    /// Hand the current geometry to the renderer as one strip frame.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        sink.draw_wave(WaveFrame {
            positions: &self.positions,
            normals: &self.normals,
            colors: &self.colors,
            indices: &self.indices,
        });
    }

    /// Number of grid vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of strip indices.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Grid row count.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Effective line count (after the 3/4 depth scale).
    #[inline]
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// Spacing between adjacent vertices in a row.
    #[inline]
    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Frames simulated so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_counter
    }

    /// The grid vertices, row-major.
    #[inline]
    pub fn vertices(&self) -> &[WaveVertex] {
        &self.vertices
    }

    /// Packed vertex positions, 3 floats per vertex.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Packed vertex normals, 3 floats per vertex.
    #[inline]
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    /// Triangle-strip indices.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::PerlinSource;

    /// Noise stub: a cheap deterministic ripple, no hidden state.
    struct StubNoise;

    impl NoiseSource for StubNoise {
        fn sample2(&self, x: f32, y: f32) -> f32 {
            (x * 0.17).sin() * (y * 0.13).cos()
        }

        fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
            (x * 0.17).sin() * (y * 0.13).cos() * (z * 0.11).sin()
        }
    }

    fn small_settings() -> WaveSettings {
        WaveSettings {
            window_width: 640,
            window_height: 480,
            num_rows: 4,
            num_lines: 4,
            camera_offset_h: 300,
            speed_factor: 0.5,
        }
    }

    #[test]
    fn test_setup_counts() {
        let mesh = WaveMesh::new(&small_settings(), StubNoise).unwrap();
        // 4 requested lines keep 3; 4 rows of 3 vertices.
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.index_count(), 18);
        assert_eq!(mesh.positions().len(), 36);
        assert_eq!(mesh.normals().len(), 36);
    }

    #[test]
    fn test_setup_rejects_bad_grid() {
        let settings = WaveSettings {
            num_rows: 1,
            ..small_settings()
        };
        assert!(WaveMesh::new(&settings, StubNoise).is_err());
    }

    #[test]
    fn test_serpentine_strip_order() {
        let mesh = WaveMesh::new(&small_settings(), StubNoise).unwrap();
        // Even rows walk left to right, odd rows right to left, each vertex
        // paired with the one a row further.
        let expected: Vec<u32> = vec![
            0, 3, 1, 4, 2, 5, // row 0, ascending
            5, 8, 4, 7, 3, 6, // row 1, descending
            6, 9, 7, 10, 8, 11, // row 2, ascending
        ];
        assert_eq!(mesh.indices(), expected.as_slice());
    }

    #[test]
    fn test_interior_vertices_have_full_adjacency() {
        let settings = WaveSettings {
            num_rows: 6,
            num_lines: 8, // 6 effective
            ..small_settings()
        };
        let mesh = WaveMesh::new(&settings, StubNoise).unwrap();
        let lines = mesh.num_lines();

        for i in 0..mesh.num_rows() {
            for j in 0..lines {
                let id = (i * lines + j) as u32;
                let [up, right, down, left] = mesh.vertices()[id as usize].neighbours();

                let interior =
                    i > 0 && i < mesh.num_rows() - 1 && j > 0 && j < lines - 1;
                if interior {
                    assert_eq!(up, Some(id + lines as u32));
                    assert_eq!(right, Some(id + 1));
                    assert_eq!(down, Some(id - lines as u32));
                    assert_eq!(left, Some(id - 1));
                } else {
                    assert_eq!(up.is_none(), i == mesh.num_rows() - 1);
                    assert_eq!(right.is_none(), j == lines - 1);
                    assert_eq!(down.is_none(), i == 0);
                    assert_eq!(left.is_none(), j == 0);
                }
            }
        }
    }

    #[test]
    fn test_flat_grid_normals_point_up() {
        let mut mesh = WaveMesh::new(&small_settings(), StubNoise).unwrap();
        // Before any elevation pass the grid is flat at y = 0.
        mesh.compute_normals();

        let lines = mesh.num_lines();
        for i in 1..mesh.num_rows() - 1 {
            for j in 1..lines - 1 {
                let normal = mesh.vertices()[i * lines + j].normal;
                assert!(
                    (normal - Vec3::Y).length() < 1e-5,
                    "vertex ({}, {}) normal {:?}",
                    i,
                    j,
                    normal
                );
            }
        }
    }

    #[test]
    fn test_compute_positions_is_deterministic() {
        let mut mesh = WaveMesh::new(&small_settings(), StubNoise).unwrap();

        mesh.compute_positions(17, 3.25, 3.1);
        let first: Vec<f32> = mesh.positions().to_vec();

        mesh.compute_positions(17, 3.25, 3.1);
        assert_eq!(mesh.positions(), first.as_slice());
    }

    #[test]
    fn test_update_advances_frame_and_moves_surface() {
        let mut mesh = WaveMesh::new(&small_settings(), PerlinSource::new(9)).unwrap();

        mesh.update(0.5, 0.5);
        assert_eq!(mesh.frame(), 1);
        let first: Vec<f32> = mesh.positions().to_vec();

        mesh.update(1.0, 0.5);
        assert_eq!(mesh.frame(), 2);
        assert_ne!(mesh.positions(), first.as_slice());
    }

    #[test]
    fn test_update_only_moves_elevation() {
        let mut mesh = WaveMesh::new(&small_settings(), StubNoise).unwrap();
        let base: Vec<(f32, f32)> = mesh
            .vertices()
            .iter()
            .map(|v| (v.position.x, v.position.z))
            .collect();

        mesh.update(2.0, 0.3);

        for (vertex, (x, z)) in mesh.vertices().iter().zip(base) {
            assert_eq!(vertex.position.x, x);
            assert_eq!(vertex.position.z, z);
        }
    }

    #[test]
    fn test_normals_are_unit_or_zero() {
        let mut mesh = WaveMesh::new(&small_settings(), PerlinSource::new(3)).unwrap();
        mesh.update(1.2, 0.7);

        for vertex in mesh.vertices() {
            let len = vertex.normal.length();
            assert!(len < 1e-6 || (len - 1.0).abs() < 1e-4);
        }
    }
}
