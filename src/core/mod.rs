pub use wellaver_core::*;

// Shaders bundled as string constants
pub static MODEL_WGSL: &str = include_str!("../../shaders/model.wgsl");
pub static SKY_WGSL: &str = include_str!("../../shaders/sky.wgsl");
pub static GROUND_WGSL: &str = include_str!("../../shaders/ground.wgsl");
