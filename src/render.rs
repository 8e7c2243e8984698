//! The renderer boundary.
//!
//! The simulation core never talks to the GPU directly. Each frame it hands a
//! [`RenderSink`] flat vertex arrays (wave) and sprite draw calls (particles);
//! buffer layout, shaders, and draw submission are the sink's concern.
//!
//! Blend state is scoped: [`BlendScope`] switches the sink's blend mode and
//! restores the previous mode when dropped, on every exit path.

use glam::Vec3;
use std::ops::{Deref, DerefMut};

/// How overlapping fragments combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,
    /// Additive blending; overlapping sprites accumulate brightness.
    Additive,
}

/// One frame of wave geometry, already flattened for upload.
///
/// Positions and normals are packed `[x, y, z]` triples and colors
/// `[r, g, b, a]` quads, in row-major vertex order; `indices` describes a
/// single triangle strip over those vertices.
#[derive(Clone, Copy, Debug)]
pub struct WaveFrame<'a> {
    /// Packed vertex positions, 3 floats per vertex.
    pub positions: &'a [f32],
    /// Packed vertex normals, 3 floats per vertex.
    pub normals: &'a [f32],
    /// Packed vertex colors, 4 floats per vertex.
    pub colors: &'a [f32],
    /// Triangle-strip indices into the vertex arrays.
    pub indices: &'a [u32],
}

/// One particle draw request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSprite {
    /// World-space center.
    pub position: Vec3,
    /// Sprite radius in world units.
    pub radius: f32,
    /// Opacity in [0, 1].
    pub opacity: f32,
}

/// Sink for the per-frame draw output of the simulation.
///
/// Implementations are free to batch: calls only promise that everything
/// submitted during a frame is visible in that frame's render.
pub trait RenderSink {
    /// Push the current wave geometry and issue one indexed strip draw.
    fn draw_wave(&mut self, frame: WaveFrame<'_>);

    /// Queue a single particle sprite using the current blend mode.
    fn draw_particle(&mut self, sprite: ParticleSprite);

    /// Current blend mode.
    fn blend_mode(&self) -> BlendMode;

    /// Switch the blend mode for subsequent sprite submissions.
    ///
    /// Prefer [`BlendScope`] over calling this directly so the previous mode
    /// is restored even on early exits.
    fn set_blend_mode(&mut self, mode: BlendMode);
}

/// RAII guard that switches a sink's blend mode and restores it on drop.
///
/// # Example
///
/// ```
/// use swell::render::{BlendMode, BlendScope, NullSink, RenderSink};
///
/// let mut sink = NullSink::default();
/// {
///     let mut scope = BlendScope::new(&mut sink, BlendMode::Additive);
///     assert_eq!(scope.blend_mode(), BlendMode::Additive);
/// }
/// assert_eq!(sink.blend_mode(), BlendMode::Alpha);
/// ```
pub struct BlendScope<'a, S: RenderSink + ?Sized> {
    sink: &'a mut S,
    restore: BlendMode,
}

impl<'a, S: RenderSink + ?Sized> BlendScope<'a, S> {
    /// Switch `sink` to `mode`, remembering the mode to restore.
    pub fn new(sink: &'a mut S, mode: BlendMode) -> Self {
        let restore = sink.blend_mode();
        sink.set_blend_mode(mode);
        Self { sink, restore }
    }
}

impl<S: RenderSink + ?Sized> Deref for BlendScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.sink
    }
}

impl<S: RenderSink + ?Sized> DerefMut for BlendScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.sink
    }
}

impl<S: RenderSink + ?Sized> Drop for BlendScope<'_, S> {
    fn drop(&mut self) {
        self.sink.set_blend_mode(self.restore);
    }
}

/// Sink that discards everything. Useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullSink {
    blend: BlendMode,
}

impl RenderSink for NullSink {
    fn draw_wave(&mut self, _frame: WaveFrame<'_>) {}

    fn draw_particle(&mut self, _sprite: ParticleSprite) {}

    fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_scope_restores_on_drop() {
        let mut sink = NullSink::default();
        {
            let _scope = BlendScope::new(&mut sink, BlendMode::Additive);
        }
        assert_eq!(sink.blend_mode(), BlendMode::Alpha);
    }

    #[test]
    fn test_blend_scope_restores_on_panic_unwind() {
        let mut sink = NullSink::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = BlendScope::new(&mut sink, BlendMode::Additive);
            panic!("mid-draw failure");
        }));
        assert!(result.is_err());
        assert_eq!(sink.blend_mode(), BlendMode::Alpha);
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let mut sink = NullSink::default();
        {
            let mut outer = BlendScope::new(&mut sink, BlendMode::Additive);
            {
                let inner = BlendScope::new(&mut *outer, BlendMode::Alpha);
                assert_eq!(inner.blend_mode(), BlendMode::Alpha);
            }
            assert_eq!(outer.blend_mode(), BlendMode::Additive);
        }
        assert_eq!(sink.blend_mode(), BlendMode::Alpha);
    }
}
