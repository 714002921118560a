use glam::Vec3;

// Framing and interaction tuning shared by every front-end.

// Framing
pub const TARGET_SIZE: f32 = 1.6; // largest model dimension after normalization (world units)
pub const FIT_MARGIN: f32 = 1.2; // head-room multiplier for the size-aware camera distance
pub const REFERENCE_DISTANCE: f32 = 2.2; // fixed-distance camera variant
pub const CAMERA_ELEVATION: f32 = 0.8; // camera height as a fraction of its distance
pub const ORBIT_TARGET_FRACTION: f32 = 0.3; // orbit target height as a fraction of model height
pub const ORBIT_TARGET_MAX_HEIGHT: f32 = 1.0; // clamp for the orbit target height
pub const SHADOW_RADIUS_FACTOR: f32 = 0.55; // contact shadow radius per unit of horizontal extent

// Camera
pub const FOV_Y_DEGREES: f32 = 50.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;
pub const INITIAL_EYE: Vec3 = Vec3::new(2.2, 1.6, 2.2);
pub const INITIAL_TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);

// Orbit controls
pub const ORBIT_DAMPING: f32 = 0.1; // fraction of pending rotation applied per update
pub const ORBIT_ROTATE_SPEED: f32 = 0.005; // radians per pixel
pub const ORBIT_ZOOM_STEP: f32 = 0.95; // distance multiplier per wheel notch
pub const ORBIT_MIN_DISTANCE: f32 = 0.3;
pub const ORBIT_MAX_DISTANCE: f32 = 20.0;
pub const ORBIT_POLAR_EPSILON: f32 = 1e-3; // keeps the camera off the poles

// Drag-only model rotation
pub const DRAG_ROTATE_SPEED: f32 = 0.01; // radians per pixel
pub const DRAG_PITCH_LIMIT_DEGREES: f32 = 30.0;

// Assets
pub const DEFAULT_MODEL_URL: &str = "./avatar.glb";
pub const CACHE_BUST_KEY: &str = "v";

// Environment
pub const PRIMARY_ENV_URL: &str =
    "https://marcofugaro.github.io/threejs-modern-app/assets/venice_sunset_1k.hdr";
pub const FALLBACK_ENV_URL: &str = "./env/studio_small.jpg";
pub const BACKGROUND_RGB: [f32; 3] = [16.0 / 255.0, 16.0 / 255.0, 20.0 / 255.0]; // 0x101014
pub const IRRADIANCE_WIDTH: u32 = 32;
pub const IRRADIANCE_HEIGHT: u32 = 16;
pub const TONE_MAPPING_EXPOSURE: f32 = 1.0;

// Ground disc under the model
pub const GROUND_RADIUS: f32 = 4.0;
pub const GROUND_RGB: [f32; 3] = [17.0 / 255.0, 17.0 / 255.0, 18.0 / 255.0]; // 0x111112
