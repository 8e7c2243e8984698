//! Orbit camera for the surface view.

use glam::{Mat4, Vec3};

/// Yaw/pitch orbit camera around a target point.
pub struct Camera {
    /// Rotation around the vertical axis, radians.
    pub yaw: f32,
    /// Elevation angle, radians.
    pub pitch: f32,
    /// Distance from the target.
    pub distance: f32,
    /// Orbit center.
    pub target: Vec3,
}

impl Camera {
    /// Camera hovering above and behind the surface center.
    ///
    /// `offset_h` is the configured height offset; `span` the horizontal
    /// extent of the surface, used to pick a distance that frames it.
    pub fn new(offset_h: f32, span: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.35,
            distance: span * 1.2,
            target: Vec3::new(0.0, offset_h * 0.25, -span * 0.5),
        }
    }

    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// View matrix looking at the target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Projection-view matrix for the given aspect ratio.
    ///
    /// The far plane scales with the orbit distance so the whole surface
    /// stays inside the frustum when zooming out.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let far = (self.distance * 20.0).max(1000.0);
        let proj = Mat4::perspective_rh(45.0_f32.to_radians(), aspect, 1.0, far);
        proj * self.view_matrix()
    }
}
