#![cfg(target_arch = "wasm32")]
use crate::core::{resolve_model_url, ViewerConfig, ViewerSession};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod core;
mod dom;
mod events;
mod fetch;
mod frame;
mod input;
mod loader;
mod overlay;
mod render;

use constants::CANVAS_ID;

// Query keys forwarded to `ViewerConfig::apply_override`
const OVERRIDE_KEYS: [&str; 5] = ["mode", "ground", "fit", "env", "exposure"];

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

fn config_from_query() -> ViewerConfig {
    let mut config = ViewerConfig::default();
    for key in OVERRIDE_KEYS {
        if let Some(value) = dom::query_param(key) {
            config.apply_override(key, &value);
        }
    }
    config
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("wellaver-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
            if let Some(document) = dom::window_document() {
                overlay::show_error(&document, &format!("Viewer failed to start: {e}"));
            }
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    // Without the mount point there is nothing to draw into.
    let canvas = dom::canvas_by_id(&document, CANVAS_ID)?;

    // Maintain canvas internal pixel size to match CSS size * capped devicePixelRatio
    wire_canvas_resize(&canvas);

    let config = config_from_query();
    let model_url = resolve_model_url(
        dom::query_param("model").as_deref(),
        &config.default_model_url,
    );
    log::info!(
        "[init] model={} mode={:?} grounding={} fit={:?}",
        model_url,
        config.interaction,
        config.framing.grounding,
        config.framing.camera_fit
    );

    let gpu = render::GpuState::new(&canvas).await?;
    let mut session = ViewerSession::new(config);
    session.set_viewport(canvas.width(), canvas.height());
    let viewer = Rc::new(RefCell::new(loader::Viewer {
        session,
        gpu,
        model_url,
    }));

    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        viewer: viewer.clone(),
    });
    events::wire_global_keydown(viewer.clone());

    loader::start_environment_load(&viewer);
    loader::start_model_load(&viewer, &document);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        viewer,
        canvas,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
