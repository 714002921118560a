//! Drag-only model rotation: the camera stays put and pointer drags turn the
//! model itself. Yaw is free, pitch is clamped.

use crate::constants::{DRAG_PITCH_LIMIT_DEGREES, DRAG_ROTATE_SPEED};
use glam::{Quat, Vec2};

#[derive(Clone, Copy, Debug)]
pub struct DragRotation {
    pub active: bool,
    pub last: Vec2,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub pitch_limit: f32,
}

impl Default for DragRotation {
    fn default() -> Self {
        Self {
            active: false,
            last: Vec2::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            speed: DRAG_ROTATE_SPEED,
            pitch_limit: DRAG_PITCH_LIMIT_DEGREES.to_radians(),
        }
    }
}

impl DragRotation {
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.active = true;
        self.last = pos;
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if !self.active {
            return;
        }
        let delta = pos - self.last;
        self.last = pos;
        self.rotate_by(delta.x * self.speed, delta.y * self.speed);
    }

    pub fn pointer_up(&mut self) {
        self.active = false;
    }

    /// Add raw angles in radians. Pitch saturates at `+/-pitch_limit`.
    pub fn rotate_by(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-self.pitch_limit, self.pitch_limit);
    }

    pub fn reset(&mut self) {
        *self = Self {
            speed: self.speed,
            pitch_limit: self.pitch_limit,
            ..Self::default()
        };
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }
}
