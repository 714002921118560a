// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;
use wellaver_core::constants as core_constants;

#[test]
#[allow(clippy::assertions_on_constants)]
fn wheel_normalization_is_positive() {
    assert!(WHEEL_PIXELS_PER_NOTCH > 0.0);
    assert!(WHEEL_LINES_PER_NOTCH > 0.0);
    assert!(WHEEL_PAGES_PER_NOTCH > 0.0);
    assert!(WHEEL_MAX_NOTCHES >= 1.0);
    assert!(MAX_PIXEL_RATIO >= 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn lighting_and_shadow_are_in_range() {
    assert!(KEY_LIGHT_INTENSITY > 0.0);
    assert!(ENV_INTENSITY > 0.0);
    assert!(KEY_LIGHT_COLOR.iter().all(|c| (0.0..=1.0).contains(c)));
    assert!(SHADOW_OPACITY > 0.0 && SHADOW_OPACITY <= 1.0);
    assert!(SHADOW_LIFT > 0.0 && SHADOW_LIFT < 0.01);
    assert!(KEY_LIGHT_DIR[1] > 0.0, "key light must shine from above");
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn framing_constants_have_logical_relationships() {
    use core_constants::*;
    assert!(TARGET_SIZE > 0.0);
    assert!(FIT_MARGIN >= 1.0);
    // The framed model fits inside the ground disc.
    assert!(GROUND_RADIUS > TARGET_SIZE);
    assert!(ORBIT_MIN_DISTANCE < REFERENCE_DISTANCE && REFERENCE_DISTANCE < ORBIT_MAX_DISTANCE);
    assert!(ORBIT_TARGET_FRACTION > 0.0 && ORBIT_TARGET_FRACTION < 1.0);
    assert!(ORBIT_DAMPING > 0.0 && ORBIT_DAMPING <= 1.0);
    assert!(Z_NEAR > 0.0 && Z_FAR > ORBIT_MAX_DISTANCE);
    assert!(DRAG_PITCH_LIMIT_DEGREES > 0.0 && DRAG_PITCH_LIMIT_DEGREES < 90.0);
}

#[test]
fn dom_ids_are_distinct() {
    assert_ne!(CANVAS_ID, STATUS_ID);
    assert!(!CANVAS_ID.is_empty());
}
