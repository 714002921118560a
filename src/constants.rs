// Web front-end constants: DOM ids, input scaling and lighting.
//
// Framing and interaction tuning shared with other front-ends lives in
// `wellaver_core::constants`.

// DOM
pub const CANVAS_ID: &str = "app";
pub const STATUS_ID: &str = "status";

// Backing store resolution
pub const MAX_PIXEL_RATIO: f64 = 2.0;

// Wheel normalization (one notch of a typical mouse wheel)
pub const WHEEL_PIXELS_PER_NOTCH: f32 = 100.0;
pub const WHEEL_LINES_PER_NOTCH: f32 = 3.0;
pub const WHEEL_PAGES_PER_NOTCH: f32 = 1.0;
pub const WHEEL_MAX_NOTCHES: f32 = 5.0; // clamp for trackpad bursts

// Key light (world-space direction toward the light)
pub const KEY_LIGHT_DIR: [f32; 3] = [0.5, 1.0, 0.35];
pub const KEY_LIGHT_COLOR: [f32; 3] = [1.0, 0.96, 0.9];
pub const KEY_LIGHT_INTENSITY: f32 = 2.0;
pub const ENV_INTENSITY: f32 = 1.0;

// Contact shadow decal
pub const SHADOW_RGB: [f32; 3] = [0.0, 0.0, 0.0];
pub const SHADOW_OPACITY: f32 = 0.55;
pub const SHADOW_LIFT: f32 = 0.002; // keeps the decal above the ground disc
