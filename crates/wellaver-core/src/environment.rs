//! Equirectangular environment maps used as both background and light source.

use crate::constants::{
    BACKGROUND_RGB, FALLBACK_ENV_URL, IRRADIANCE_HEIGHT, IRRADIANCE_WIDTH, PRIMARY_ENV_URL,
};
use crate::error::Result;
use crate::resources::ensure_texture_fits;
use glam::Vec3;
use std::f32::consts::PI;

/// One entry of the environment fallback chain.
#[derive(Clone, Debug, PartialEq)]
pub enum EnvironmentSource {
    /// Equirectangular `.hdr`, `.jpg` or `.png`.
    Equirect(String),
    /// Flat background color; always succeeds.
    Solid([f32; 3]),
}

pub fn default_environment_chain() -> Vec<EnvironmentSource> {
    vec![
        EnvironmentSource::Equirect(PRIMARY_ENV_URL.to_string()),
        EnvironmentSource::Equirect(FALLBACK_ENV_URL.to_string()),
        EnvironmentSource::Solid(BACKGROUND_RGB),
    ]
}

/// Linear-light RGB texels, row-major from the top (+Y) row.
#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 3]>,
}

impl EnvironmentMap {
    /// Decode an HDR or LDR image. LDR inputs are converted from sRGB.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        let is_hdr = matches!(
            img.color(),
            image::ColorType::Rgb32F | image::ColorType::Rgba32F
        );
        let rgb = img.to_rgb32f();
        let (width, height) = rgb.dimensions();
        let texels = rgb
            .pixels()
            .map(|p| {
                if is_hdr {
                    p.0
                } else {
                    [srgb_to_linear(p.0[0]), srgb_to_linear(p.0[1]), srgb_to_linear(p.0[2])]
                }
            })
            .collect();
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn solid(rgb: [f32; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![rgb],
        }
    }

    /// Fails when the map is too large to upload as one texture.
    pub fn ensure_fits(&self, max_dim: u32) -> Result<()> {
        ensure_texture_fits(self.width, self.height, max_dim)
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> [f32; 3] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.texels[(y * self.width + x) as usize]
    }

    /// Mean radiance over the whole map.
    pub fn average(&self) -> [f32; 3] {
        let n = self.texels.len().max(1) as f32;
        let sum = self
            .texels
            .iter()
            .fold(Vec3::ZERO, |acc, t| acc + Vec3::from_array(*t));
        (sum / n).to_array()
    }

    /// Cosine-weighted diffuse irradiance at the default small resolution.
    pub fn prefilter_irradiance(&self) -> EnvironmentMap {
        self.prefilter_irradiance_sized(IRRADIANCE_WIDTH, IRRADIANCE_HEIGHT)
    }

    /// Downsample to `w x h` (box filter, solid-angle weighted), then convolve
    /// each output direction with a clamped cosine lobe over the downsampled
    /// map.
    pub fn prefilter_irradiance_sized(&self, w: u32, h: u32) -> EnvironmentMap {
        let small = self.downsample(w, h);
        let dirs: Vec<(Vec3, f32)> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .map(|(x, y)| (texel_direction(x, y, w, h), texel_solid_angle(y, w, h)))
            .collect();

        let mut texels = Vec::with_capacity((w * h) as usize);
        for &(n, _) in &dirs {
            let mut acc = Vec3::ZERO;
            let mut weight = 0.0;
            for (i, &(d, sa)) in dirs.iter().enumerate() {
                let cos = n.dot(d);
                if cos > 0.0 {
                    acc += Vec3::from_array(small.texels[i]) * cos * sa;
                    weight += cos * sa;
                }
            }
            let v = if weight > 0.0 { acc / weight } else { Vec3::ZERO };
            texels.push(v.to_array());
        }
        EnvironmentMap {
            width: w,
            height: h,
            texels,
        }
    }

    fn downsample(&self, w: u32, h: u32) -> EnvironmentMap {
        let mut texels = Vec::with_capacity((w * h) as usize);
        for oy in 0..h {
            let y0 = oy * self.height / h;
            let y1 = ((oy + 1) * self.height / h).max(y0 + 1);
            for ox in 0..w {
                let x0 = ox * self.width / w;
                let x1 = ((ox + 1) * self.width / w).max(x0 + 1);
                let mut acc = Vec3::ZERO;
                let mut weight = 0.0;
                for y in y0..y1 {
                    let sa = texel_solid_angle(y, self.width, self.height);
                    for x in x0..x1 {
                        acc += Vec3::from_array(self.texel(x, y)) * sa;
                        weight += sa;
                    }
                }
                let v = if weight > 0.0 { acc / weight } else { Vec3::ZERO };
                texels.push(v.to_array());
            }
        }
        EnvironmentMap {
            width: w,
            height: h,
            texels,
        }
    }

    /// Pack as RGBA f32 for upload.
    pub fn to_rgba32f(&self) -> Vec<f32> {
        self.texels
            .iter()
            .flat_map(|t| [t[0], t[1], t[2], 1.0])
            .collect()
    }
}

/// Direction through the center of an equirect texel. `u` wraps around +Y
/// starting at -Z, `v = 0` is straight up.
pub fn texel_direction(x: u32, y: u32, w: u32, h: u32) -> Vec3 {
    let u = (x as f32 + 0.5) / w as f32;
    let v = (y as f32 + 0.5) / h as f32;
    let phi = u * 2.0 * PI - PI;
    let theta = v * PI;
    Vec3::new(theta.sin() * phi.sin(), theta.cos(), -theta.sin() * phi.cos())
}

fn texel_solid_angle(y: u32, w: u32, h: u32) -> f32 {
    let theta = (y as f32 + 0.5) / h as f32 * PI;
    theta.sin() * (2.0 * PI / w as f32) * (PI / h as f32)
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
