//! Viewer variant options and asset URL helpers.

use crate::constants::{CACHE_BUST_KEY, DEFAULT_MODEL_URL, FIT_MARGIN, REFERENCE_DISTANCE, TONE_MAPPING_EXPOSURE};
use crate::environment::{default_environment_chain, EnvironmentSource};
use crate::framing::{CameraFit, FramingOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionMode {
    /// Pointer drags orbit the camera around the target.
    Orbit,
    /// Camera is fixed; drags rotate the model with clamped pitch.
    DragRotate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub interaction: InteractionMode,
    pub framing: FramingOptions,
    pub default_model_url: String,
    pub environment: Vec<EnvironmentSource>,
    pub exposure: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            interaction: InteractionMode::Orbit,
            framing: FramingOptions::default(),
            default_model_url: DEFAULT_MODEL_URL.to_string(),
            environment: default_environment_chain(),
            exposure: TONE_MAPPING_EXPOSURE,
        }
    }
}

impl ViewerConfig {
    /// Apply one `key=value` query override. Returns `false` (and logs) for
    /// unknown keys or unparsable values; the config is left unchanged then.
    pub fn apply_override(&mut self, key: &str, value: &str) -> bool {
        let ok = match key {
            "mode" => match value {
                "orbit" => {
                    self.interaction = InteractionMode::Orbit;
                    true
                }
                "drag" => {
                    self.interaction = InteractionMode::DragRotate;
                    true
                }
                _ => false,
            },
            "ground" => match value {
                "1" | "true" => {
                    self.framing.grounding = true;
                    true
                }
                "0" | "false" => {
                    self.framing.grounding = false;
                    true
                }
                _ => false,
            },
            "fit" => match value {
                "fixed" => {
                    self.framing.camera_fit = CameraFit::Fixed {
                        distance: REFERENCE_DISTANCE,
                    };
                    true
                }
                "size" => {
                    self.framing.camera_fit = CameraFit::SizeAware { margin: FIT_MARGIN };
                    true
                }
                _ => false,
            },
            "env" if !value.is_empty() => {
                self.environment
                    .insert(0, EnvironmentSource::Equirect(value.to_string()));
                true
            }
            "exposure" => match value.parse::<f32>() {
                Ok(v) if v.is_finite() && v > 0.0 => {
                    self.exposure = v;
                    true
                }
                _ => false,
            },
            _ => false,
        };
        if !ok {
            log::warn!("[config] ignoring override {}={:?}", key, value);
        }
        ok
    }
}

/// The `?model=` value when present and non-empty, else the default path.
pub fn resolve_model_url(query_value: Option<&str>, default_url: &str) -> String {
    match query_value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default_url.to_string(),
    }
}

/// Append `v=<stamp>` so every load bypasses the HTTP cache.
pub fn cache_busted(url: &str, stamp: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{CACHE_BUST_KEY}={stamp}")
}

/// Resolve a URI found inside a model relative to the model's own URL.
/// Absolute URLs and root-relative paths pass through unchanged.
pub fn resolve_relative(base_url: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') || uri.starts_with("data:") {
        return uri.to_string();
    }
    let base = base_url
        .split(['?', '#'])
        .next()
        .unwrap_or(base_url);
    match base.rfind('/') {
        Some(i) => format!("{}{}", &base[..=i], uri),
        None => uri.to_string(),
    }
}
