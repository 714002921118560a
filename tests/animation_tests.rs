// Host-side tests for keyframe sampling and clip playback.

use glam::{Quat, Vec3};
use wellaver_core::*;

fn translation_clip(interpolation: Interpolation, values: Vec<Vec3>) -> AnimationClip {
    let times = if interpolation == Interpolation::CubicSpline {
        vec![0.0, 2.0]
    } else {
        vec![0.0, 1.0, 2.0]
    };
    AnimationClip::new(
        "move".to_string(),
        vec![Channel {
            node: 0,
            times,
            values: ChannelValues::Translation(values),
            interpolation,
        }],
    )
}

fn sample(clip: &AnimationClip, t: f32) -> Trs {
    let mut pose = vec![Trs::default()];
    clip.sample_into(t, &mut pose);
    pose[0]
}

#[test]
fn duration_is_the_last_keyframe() {
    let clip = translation_clip(Interpolation::Linear, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    assert_eq!(clip.duration, 2.0);
    assert_eq!(AnimationClip::new("empty".into(), vec![]).duration, 0.0);
}

#[test]
fn linear_interpolates_between_keys() {
    let clip = translation_clip(
        Interpolation::Linear,
        vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 0.0)],
    );
    assert!(sample(&clip, 0.5).translation.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
    assert!(sample(&clip, 1.5).translation.abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-6));
}

#[test]
fn times_outside_the_keys_clamp() {
    let clip = translation_clip(Interpolation::Linear, vec![Vec3::X, Vec3::Y, Vec3::Z]);
    assert_eq!(sample(&clip, -1.0).translation, Vec3::X);
    assert_eq!(sample(&clip, 5.0).translation, Vec3::Z);
}

#[test]
fn step_holds_the_previous_key() {
    let clip = translation_clip(Interpolation::Step, vec![Vec3::X, Vec3::Y, Vec3::Z]);
    assert_eq!(sample(&clip, 0.99).translation, Vec3::X);
    assert_eq!(sample(&clip, 1.0).translation, Vec3::Y);
    assert_eq!(sample(&clip, 1.7).translation, Vec3::Y);
}

#[test]
fn cubic_spline_uses_keyframe_values() {
    // [in-tangent, value, out-tangent] per key
    let big = Vec3::splat(100.0);
    let clip = translation_clip(
        Interpolation::CubicSpline,
        vec![big, Vec3::ZERO, big, big, Vec3::new(0.0, 2.0, 0.0), big],
    );
    assert!(sample(&clip, 1.0).translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
}

#[test]
fn rotation_channels_slerp() {
    let clip = AnimationClip::new(
        "turn".into(),
        vec![Channel {
            node: 0,
            times: vec![0.0, 1.0],
            values: ChannelValues::Rotation(vec![
                Quat::IDENTITY,
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            ]),
            interpolation: Interpolation::Linear,
        }],
    );
    let r = sample(&clip, 0.5).rotation;
    assert!(r.abs_diff_eq(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4), 1e-5));
    // Untouched channels keep the rest pose.
    assert_eq!(sample(&clip, 0.5).scale, Vec3::ONE);
}

#[test]
fn channels_for_missing_nodes_are_skipped() {
    let clip = AnimationClip::new(
        "orphan".into(),
        vec![Channel {
            node: 7,
            times: vec![0.0, 1.0],
            values: ChannelValues::Scale(vec![Vec3::ONE, Vec3::splat(2.0)]),
            interpolation: Interpolation::Linear,
        }],
    );
    assert_eq!(sample(&clip, 0.5), Trs::default());
}

#[test]
fn mixer_needs_a_clip() {
    assert!(AnimationMixer::new(vec![]).is_none());
}

#[test]
fn mixer_loops_the_first_clip() {
    let clip = translation_clip(Interpolation::Linear, vec![Vec3::ZERO, Vec3::X, Vec3::ZERO]);
    let mut mixer = AnimationMixer::new(vec![clip]).expect("clip");
    assert!(mixer.is_playing());
    mixer.update(2.5);
    assert!((mixer.time() - 0.5).abs() < 1e-6);

    let mut pose = vec![Trs::default()];
    mixer.apply(&mut pose);
    assert!(pose[0].translation.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));

    mixer.update(-1.0);
    assert!((mixer.time() - 0.5).abs() < 1e-6);
}

#[test]
fn paused_mixer_holds_its_pose() {
    let clip = translation_clip(Interpolation::Linear, vec![Vec3::ZERO, Vec3::X, Vec3::ZERO]);
    let mut mixer = AnimationMixer::new(vec![clip]).expect("clip");
    mixer.update(0.25);
    mixer.toggle_pause();
    assert!(mixer.is_paused());
    mixer.update(1.0);
    assert!((mixer.time() - 0.25).abs() < 1e-6);

    mixer.toggle_pause();
    mixer.update(0.25);
    assert!((mixer.time() - 0.5).abs() < 1e-6);
}

#[test]
fn play_switches_clip_and_restarts() {
    let a = translation_clip(Interpolation::Linear, vec![Vec3::ZERO, Vec3::X, Vec3::ZERO]);
    let mut b = translation_clip(Interpolation::Step, vec![Vec3::Y, Vec3::Y, Vec3::Y]);
    b.name = "hold".into();
    let mut mixer = AnimationMixer::new(vec![a, b]).expect("clips");
    mixer.update(1.0);
    mixer.toggle_pause();

    mixer.play(1);
    assert_eq!(mixer.current_clip().name, "hold");
    assert_eq!(mixer.time(), 0.0);
    assert!(!mixer.is_paused());

    mixer.play(9);
    assert_eq!(mixer.current_clip().name, "hold");
}

#[test]
fn stopped_mixer_leaves_rest_pose() {
    let clip = translation_clip(Interpolation::Linear, vec![Vec3::X, Vec3::X, Vec3::X]);
    let mut mixer = AnimationMixer::new(vec![clip]).expect("clip");
    mixer.stop();
    let mut pose = vec![Trs::default()];
    mixer.apply(&mut pose);
    assert_eq!(pose[0].translation, Vec3::ZERO);
}
