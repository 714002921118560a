//! Camera state shared with the web frontend.
//!
//! These types avoid referencing platform-specific APIs and are suitable for
//! use on both native and web targets. The web frontend consumes them to build
//! camera matrices every frame.

use crate::constants::{FOV_Y_DEGREES, INITIAL_EYE, INITIAL_TARGET, Z_FAR, Z_NEAR};
use glam::{Mat4, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: INITIAL_EYE,
            target: INITIAL_TARGET,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: FOV_Y_DEGREES.to_radians(),
            znear: Z_NEAR,
            zfar: Z_FAR,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Track a viewport resize. Zero-height viewports keep the previous aspect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}
