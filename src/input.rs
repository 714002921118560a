use crate::constants::{
    WHEEL_LINES_PER_NOTCH, WHEEL_MAX_NOTCHES, WHEEL_PAGES_PER_NOTCH, WHEEL_PIXELS_PER_NOTCH,
};
use glam::Vec2;
use web_sys as web;

// WheelEvent.deltaMode values
pub const DOM_DELTA_LINE: u32 = 1;
pub const DOM_DELTA_PAGE: u32 = 2;

/// Pointer position in CSS pixels relative to the canvas' top-left corner.
#[inline]
pub fn pointer_canvas_css(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    Vec2::new(x_css, y_css)
}

/// Convert a wheel delta to notches; positive scrolls away (zoom out).
#[inline]
pub fn wheel_notches(delta_y: f64, delta_mode: u32) -> f32 {
    let per_notch = match delta_mode {
        DOM_DELTA_LINE => WHEEL_LINES_PER_NOTCH,
        DOM_DELTA_PAGE => WHEEL_PAGES_PER_NOTCH,
        _ => WHEEL_PIXELS_PER_NOTCH,
    };
    let n = delta_y as f32 / per_notch;
    if n.is_finite() {
        n.clamp(-WHEEL_MAX_NOTCHES, WHEEL_MAX_NOTCHES)
    } else {
        0.0
    }
}
