//! Orbit-camera controls: pointer drag rotates the eye around a fixed target,
//! the wheel dollies in and out.

use crate::constants::*;
use crate::state::Camera;
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub radius: f32,
    /// Angle around +Y measured from +Z toward +X.
    pub azimuth: f32,
    /// Angle from +Y.
    pub polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pending: Vec2,
    dragging: bool,
    last_pointer: Vec2,
}

impl Default for OrbitControls {
    fn default() -> Self {
        let mut controls = Self {
            target: INITIAL_TARGET,
            radius: 1.0,
            azimuth: 0.0,
            polar: PI * 0.5,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            damping: ORBIT_DAMPING,
            rotate_speed: ORBIT_ROTATE_SPEED,
            pending: Vec2::ZERO,
            dragging: false,
            last_pointer: Vec2::ZERO,
        };
        controls.set_from_camera(INITIAL_EYE, INITIAL_TARGET);
        controls
    }
}

impl OrbitControls {
    /// Re-derive spherical state from an eye/target pair and drop any pending
    /// rotation.
    pub fn set_from_camera(&mut self, eye: Vec3, target: Vec3) {
        let offset = eye - target;
        self.target = target;
        self.radius = offset.length().max(self.min_distance);
        self.azimuth = offset.x.atan2(offset.z);
        self.polar = (offset.y / offset.length().max(1e-6)).clamp(-1.0, 1.0).acos();
        self.clamp_polar();
        self.pending = Vec2::ZERO;
    }

    pub fn eye(&self) -> Vec3 {
        let sin_p = self.polar.sin();
        self.target
            + Vec3::new(
                self.radius * sin_p * self.azimuth.sin(),
                self.radius * self.polar.cos(),
                self.radius * sin_p * self.azimuth.cos(),
            )
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.dragging = true;
        self.last_pointer = pos;
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if !self.dragging {
            return;
        }
        let delta = pos - self.last_pointer;
        self.last_pointer = pos;
        // Dragging right swings the camera left around the target.
        self.pending += Vec2::new(-delta.x, -delta.y) * self.rotate_speed;
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Positive `notches` zoom out, negative zoom in.
    pub fn zoom(&mut self, notches: f32) {
        let factor = ORBIT_ZOOM_STEP.powf(-notches);
        self.radius = (self.radius * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Apply a damped share of the pending rotation.
    pub fn update(&mut self) {
        let step = if self.damping > 0.0 {
            self.pending * self.damping
        } else {
            self.pending
        };
        self.azimuth += step.x;
        self.polar += step.y;
        self.pending -= step;
        if self.pending.length_squared() < 1e-10 {
            self.pending = Vec2::ZERO;
        }
        self.clamp_polar();
    }

    pub fn apply_to(&self, camera: &mut Camera) {
        camera.eye = self.eye();
        camera.target = self.target;
    }

    fn clamp_polar(&mut self) {
        self.polar = self
            .polar
            .clamp(ORBIT_POLAR_EPSILON, PI - ORBIT_POLAR_EPSILON);
    }
}
