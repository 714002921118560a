use super::keymap::{action_for_key, KeyAction};
use crate::loader::{self, Viewer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn handle_global_keydown(ev: &web::KeyboardEvent, viewer: &Rc<RefCell<Viewer>>) {
    if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    let Some(action) = action_for_key(&ev.key()) else {
        return;
    };
    match action {
        KeyAction::ReloadModel => {
            log::info!("[keys] reload");
            if let Some(document) = crate::dom::window_document() {
                loader::start_model_load(viewer, &document);
            }
        }
        KeyAction::ToggleInteraction => {
            viewer.borrow_mut().session.toggle_interaction();
        }
        KeyAction::ToggleAnimation => {
            if let Some(mixer) = viewer.borrow_mut().session.mixer_mut() {
                mixer.toggle_pause();
                log::info!("[keys] animation paused={}", mixer.is_paused());
            }
            ev.prevent_default();
        }
    }
}

pub fn wire_global_keydown(viewer: Rc<RefCell<Viewer>>) {
    if let Some(window) = web::window() {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
                handle_global_keydown(&ev, &viewer);
            }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
