//! Automatic model framing and contact-shadow fitting.
//!
//! Given the bounds of a freshly loaded model, compute the uniform scale and
//! translation that normalize it to a fixed size centered over the origin, plus
//! a camera placement and orbit target that frame it the same way regardless
//! of the asset's native units.

use crate::bounds::Aabb;
use crate::constants::*;
use glam::{Mat4, Quat, Vec3};

/// How the camera distance is chosen after normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraFit {
    /// Always sit `distance` away, independent of the model's proportions.
    Fixed { distance: f32 },
    /// Fit the scaled model's larger screen-facing dimension into the vertical
    /// field of view, padded by `margin`.
    SizeAware { margin: f32 },
}

impl Default for CameraFit {
    fn default() -> Self {
        CameraFit::Fixed {
            distance: REFERENCE_DISTANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramingOptions {
    pub target_size: f32,
    /// Rest the lowest point of the model on y = 0.
    pub grounding: bool,
    pub camera_fit: CameraFit,
    pub fov_y_radians: f32,
    pub elevation: f32,
    pub target_fraction: f32,
    pub target_max_height: f32,
    pub shadow_radius_factor: f32,
}

impl Default for FramingOptions {
    fn default() -> Self {
        Self {
            target_size: TARGET_SIZE,
            grounding: true,
            camera_fit: CameraFit::default(),
            fov_y_radians: FOV_Y_DEGREES.to_radians(),
            elevation: CAMERA_ELEVATION,
            target_fraction: ORBIT_TARGET_FRACTION,
            target_max_height: ORBIT_TARGET_MAX_HEIGHT,
            shadow_radius_factor: SHADOW_RADIUS_FACTOR,
        }
    }
}

/// Output of [`frame_model`]. World position of a model-space point `p` is
/// `p * scale + translation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    pub translation: Vec3,
    pub scale: f32,
    /// Bounds after scaling and translation.
    pub framed_bounds: Aabb,
    pub camera_distance: f32,
    pub camera_position: Vec3,
    pub orbit_target: Vec3,
    pub shadow_radius: f32,
}

impl Framing {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::IDENTITY,
            self.translation,
        )
    }
}

/// Uniform scale that brings the largest dimension to `target_size`.
/// Zero-volume boxes use a denominator of 1.
#[inline]
pub fn normalized_scale(bounds: &Aabb, target_size: f32) -> f32 {
    target_size / bounds.max_dimension_floored()
}

/// Size-aware camera distance for an already scaled model size.
#[inline]
pub fn fit_distance(scaled_size: Vec3, fov_y_radians: f32, margin: f32) -> f32 {
    let half_extent = 0.5 * scaled_size.x.max(scaled_size.y);
    half_extent / (fov_y_radians * 0.5).tan() * margin
}

#[inline]
pub fn shadow_radius(scaled_size: Vec3, factor: f32) -> f32 {
    factor * scaled_size.x.max(scaled_size.z)
}

pub fn frame_model(bounds: &Aabb, opts: &FramingOptions) -> Framing {
    let scale = normalized_scale(bounds, opts.target_size);

    // Center on the origin, then scale about it.
    let mut translation = -bounds.center() * scale;
    let mut framed = bounds.scaled_translated(scale, translation);

    if opts.grounding {
        let lift = Vec3::new(0.0, -framed.min.y, 0.0);
        translation += lift;
        framed = bounds.scaled_translated(scale, translation);
    }

    let scaled_size = framed.size();
    let camera_distance = match opts.camera_fit {
        CameraFit::Fixed { distance } => distance,
        CameraFit::SizeAware { margin } => fit_distance(scaled_size, opts.fov_y_radians, margin),
    };
    let camera_position = Vec3::new(
        camera_distance,
        camera_distance * opts.elevation,
        camera_distance,
    );

    let target_height = (scaled_size.y * opts.target_fraction).min(opts.target_max_height);
    let orbit_target = Vec3::new(0.0, framed.min.y.max(0.0) + target_height, 0.0);

    Framing {
        translation,
        scale,
        framed_bounds: framed,
        camera_distance,
        camera_position,
        orbit_target,
        shadow_radius: shadow_radius(scaled_size, opts.shadow_radius_factor),
    }
}
