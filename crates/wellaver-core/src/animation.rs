//! Node-transform animation playback.
//!
//! Clips animate node translation, rotation and scale. The mixer plays one
//! clip at a time in a loop and writes sampled values over the rest pose.

use crate::asset::Trs;
use glam::{Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Sampled at the keyframe values; tangents are ignored.
    CubicSpline,
}

#[derive(Clone, Debug)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

#[derive(Clone, Debug)]
pub struct Channel {
    pub node: usize,
    pub times: Vec<f32>,
    pub values: ChannelValues,
    pub interpolation: Interpolation,
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: String, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0_f32, f32::max);
        Self {
            name,
            duration,
            channels,
        }
    }

    /// Write this clip's values at time `t` into `locals`.
    pub fn sample_into(&self, t: f32, locals: &mut [Trs]) {
        for ch in &self.channels {
            let Some(local) = locals.get_mut(ch.node) else {
                continue;
            };
            let Some((i0, i1, f)) = keyframe_span(&ch.times, t, ch.interpolation) else {
                continue;
            };
            let stride = if ch.interpolation == Interpolation::CubicSpline { 3 } else { 1 };
            let offset = if stride == 3 { 1 } else { 0 };
            let k0 = i0 * stride + offset;
            let k1 = i1 * stride + offset;
            match &ch.values {
                ChannelValues::Translation(v) => {
                    if let (Some(a), Some(b)) = (v.get(k0), v.get(k1)) {
                        local.translation = a.lerp(*b, f);
                    }
                }
                ChannelValues::Scale(v) => {
                    if let (Some(a), Some(b)) = (v.get(k0), v.get(k1)) {
                        local.scale = a.lerp(*b, f);
                    }
                }
                ChannelValues::Rotation(v) => {
                    if let (Some(a), Some(b)) = (v.get(k0), v.get(k1)) {
                        local.rotation = a.slerp(*b, f).normalize();
                    }
                }
            }
        }
    }
}

/// Surrounding keyframes and blend factor for time `t`. Times before the first
/// key or after the last clamp to the end keys.
fn keyframe_span(times: &[f32], t: f32, interp: Interpolation) -> Option<(usize, usize, f32)> {
    let last = times.len().checked_sub(1)?;
    if t <= times[0] {
        return Some((0, 0, 0.0));
    }
    if t >= times[last] {
        return Some((last, last, 0.0));
    }
    let i1 = times.partition_point(|&k| k <= t);
    let i0 = i1 - 1;
    let span = times[i1] - times[i0];
    let f = match interp {
        Interpolation::Step => 0.0,
        _ if span > 0.0 => (t - times[i0]) / span,
        _ => 0.0,
    };
    Some((i0, i1, f))
}

/// Plays one clip at a time, looping.
#[derive(Clone, Debug)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    current: usize,
    time: f32,
    playing: bool,
    paused: bool,
}

impl AnimationMixer {
    /// `None` when there is nothing to play. Otherwise the first clip starts
    /// from zero.
    pub fn new(clips: Vec<AnimationClip>) -> Option<Self> {
        if clips.is_empty() {
            return None;
        }
        log::info!("[anim] playing '{}' ({:.2}s)", clips[0].name, clips[0].duration);
        Some(Self {
            clips,
            current: 0,
            time: 0.0,
            playing: true,
            paused: false,
        })
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn current_clip(&self) -> &AnimationClip {
        &self.clips[self.current]
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze or resume the clock. A paused clip keeps holding its pose.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Switch clips and restart from zero. Out-of-range indices are ignored.
    pub fn play(&mut self, index: usize) {
        if index < self.clips.len() {
            self.current = index;
            self.time = 0.0;
            self.playing = true;
            self.paused = false;
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        if !self.playing || self.paused {
            return;
        }
        let duration = self.clips[self.current].duration;
        self.time += dt.max(0.0);
        if duration > 0.0 {
            self.time %= duration;
        } else {
            self.time = 0.0;
        }
    }

    pub fn apply(&self, locals: &mut [Trs]) {
        if self.playing {
            self.clips[self.current].sample_into(self.time, locals);
        }
    }
}
