use crate::dom;
use crate::loader::Viewer;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// Long pauses (hidden tab, debugger) should not fast-forward animation.
const MAX_FRAME_DT_SEC: f32 = 0.1;

pub struct FrameContext {
    pub viewer: Rc<RefCell<Viewer>>,
    pub canvas: web::HtmlCanvasElement,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32().min(MAX_FRAME_DT_SEC);
        self.last_instant = now;

        dom::sync_canvas_backing_size(&self.canvas);
        let (width, height) = (self.canvas.width(), self.canvas.height());

        let mut v = self.viewer.borrow_mut();
        let Viewer { session, gpu, .. } = &mut *v;
        gpu.resize_if_needed(width, height);
        session.set_viewport(width, height);
        session.update(dt_sec);

        match gpu.render(session) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[frame] surface lost; reconfiguring");
                gpu.reconfigure();
            }
            Err(e) => log::error!("[frame] render error: {:?}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
