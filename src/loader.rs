use crate::core::{
    first_ok, resolve_relative, srgb_to_linear, EnvironmentMap, EnvironmentSource,
    ExternalResources, LoadOutcome, LoadState, ModelAsset, ViewerError, ViewerSession,
};
use crate::dom;
use crate::fetch::fetch_bytes;
use crate::overlay;
use crate::render::{GpuState, ModelGpu};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// Everything the event handlers and the frame loop share.
pub struct Viewer {
    pub session: ViewerSession<ModelGpu>,
    pub gpu: GpuState,
    /// URL of the model to (re)load, without the cache-busting stamp.
    pub model_url: String,
}

/// Tear down the current model and fetch `viewer.model_url` again.
///
/// The status element shows progress and is hidden once the model is framed.
/// A result that arrives after a newer load started is dropped.
pub fn start_model_load(viewer: &Rc<RefCell<Viewer>>, document: &web::Document) {
    let ticket = {
        let mut v = viewer.borrow_mut();
        let Viewer {
            session,
            gpu,
            model_url,
        } = &mut *v;
        session.begin_load(gpu, model_url, dom::now_ms())
    };
    overlay::show(document, "Loading ...");

    let viewer = viewer.clone();
    let document = document.clone();
    spawn_local(async move {
        let result = fetch_model(&ticket.url).await;
        let mut v = viewer.borrow_mut();
        let Viewer { session, gpu, .. } = &mut *v;
        match session.finish_load(gpu, &ticket, result) {
            LoadOutcome::Framed => {
                log::info!("[load] live resources {:?}", gpu.counts());
                overlay::hide(&document);
            }
            LoadOutcome::Failed => {
                if let LoadState::Failed(msg) = session.state() {
                    overlay::show_error(&document, &format!("Failed to load model: {msg}"));
                }
            }
            LoadOutcome::Stale => {}
        }
    });
}

/// Fetch a GLB or GLTF, plus any buffers and images stored beside it.
async fn fetch_model(url: &str) -> Result<ModelAsset, ViewerError> {
    let bytes = fetch_bytes(url).await?;
    let mut external = ExternalResources::default();
    for uri in ModelAsset::external_uris(&bytes)? {
        let data = fetch_bytes(&resolve_relative(url, &uri)).await?;
        external.insert(uri, data);
    }
    if !external.is_empty() {
        log::info!("[load] fetched {} external resources", external.len());
    }
    ModelAsset::from_slice_with(&bytes, &external)
}

struct LoadedEnvironment {
    env: EnvironmentMap,
    irradiance: EnvironmentMap,
    is_image: bool,
}

async fn load_environment_source(
    source: EnvironmentSource,
    max_texture_dim: u32,
) -> Result<LoadedEnvironment, ViewerError> {
    match source {
        EnvironmentSource::Equirect(url) => {
            let bytes = fetch_bytes(&url).await?;
            let env = EnvironmentMap::decode(&bytes)?;
            // Oversized maps fall through to the next source.
            env.ensure_fits(max_texture_dim)?;
            let irradiance = env.prefilter_irradiance();
            log::info!("[env] decoded {} ({}x{})", url, env.width, env.height);
            Ok(LoadedEnvironment {
                env,
                irradiance,
                is_image: true,
            })
        }
        EnvironmentSource::Solid(rgb) => {
            let env = EnvironmentMap::solid(rgb.map(srgb_to_linear));
            Ok(LoadedEnvironment {
                irradiance: env.clone(),
                env,
                is_image: false,
            })
        }
    }
}

/// Walk the configured environment chain once and bind the first source that
/// loads. The chain normally ends in a solid color, so this only fails when
/// it was configured without one.
pub fn start_environment_load(viewer: &Rc<RefCell<Viewer>>) {
    let (chain, max_dim) = {
        let v = viewer.borrow();
        (v.session.config.environment.clone(), v.gpu.max_texture_dimension())
    };
    let viewer = viewer.clone();
    spawn_local(async move {
        match first_ok(chain, |source| load_environment_source(source, max_dim)).await {
            Ok((i, loaded)) => {
                log::info!("[env] using source #{}", i);
                viewer
                    .borrow_mut()
                    .gpu
                    .set_environment(&loaded.env, &loaded.irradiance, loaded.is_image);
            }
            Err(e) => log::error!("[env] {}", e),
        }
    });
}
