//! Viewer session: one active model, its framing and the load state machine.
//!
//! A load cycle moves `Idle -> Loading -> {Framed | Failed}`. Starting a load
//! releases the previous model's GPU resources before the request goes out,
//! so a failed load leaves the scene empty rather than showing stale state.
//! Each load gets a generation number; a result carrying an older generation
//! is dropped without being attached.

use crate::animation::AnimationMixer;
use crate::asset::{ModelAsset, Trs};
use crate::config::{cache_busted, InteractionMode, ViewerConfig};
use crate::error::{Result, ViewerError};
use crate::framing::{frame_model, Framing};
use crate::orbit::OrbitControls;
use crate::rotation::DragRotation;
use crate::state::Camera;
use glam::{Mat4, Vec2};

/// Uploads decoded models to the renderer and releases them again.
pub trait ModelBackend {
    type Model;

    fn upload(&mut self, asset: &ModelAsset) -> Result<Self::Model>;
    fn release(&mut self, model: Self::Model);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Framed,
    Failed(String),
}

/// Handed out by [`ViewerSession::begin_load`] and returned with the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Framed,
    Failed,
    /// A newer load started meanwhile; the result was discarded.
    Stale,
}

pub struct LoadedModel<M> {
    pub asset: ModelAsset,
    pub gpu: M,
    pub framing: Framing,
    pub pose: Vec<Trs>,
}

pub struct ViewerSession<M> {
    pub config: ViewerConfig,
    pub camera: Camera,
    pub orbit: OrbitControls,
    pub drag: DragRotation,
    state: LoadState,
    generation: u64,
    model: Option<LoadedModel<M>>,
    mixer: Option<AnimationMixer>,
}

impl<M> ViewerSession<M> {
    pub fn new(config: ViewerConfig) -> Self {
        let mut camera = Camera {
            fovy_radians: config.framing.fov_y_radians,
            ..Camera::default()
        };
        let orbit = OrbitControls::default();
        orbit.apply_to(&mut camera);
        Self {
            config,
            camera,
            orbit,
            drag: DragRotation::default(),
            state: LoadState::Idle,
            generation: 0,
            model: None,
            mixer: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn model(&self) -> Option<&LoadedModel<M>> {
        self.model.as_ref()
    }

    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.mixer.as_ref()
    }

    pub fn mixer_mut(&mut self) -> Option<&mut AnimationMixer> {
        self.mixer.as_mut()
    }

    pub fn framing(&self) -> Option<&Framing> {
        self.model.as_ref().map(|m| &m.framing)
    }

    /// Tear down the current model and start a new load cycle.
    pub fn begin_load<B>(&mut self, backend: &mut B, url: &str, stamp: u64) -> LoadTicket
    where
        B: ModelBackend<Model = M>,
    {
        self.teardown(backend);
        self.generation += 1;
        self.state = LoadState::Loading;
        let ticket = LoadTicket {
            generation: self.generation,
            url: cache_busted(url, stamp),
        };
        log::info!("[load] #{} {}", ticket.generation, ticket.url);
        ticket
    }

    /// Attach (or reject) the result of the load identified by `ticket`.
    pub fn finish_load<B>(
        &mut self,
        backend: &mut B,
        ticket: &LoadTicket,
        result: Result<ModelAsset>,
    ) -> LoadOutcome
    where
        B: ModelBackend<Model = M>,
    {
        if ticket.generation != self.generation || self.state != LoadState::Loading {
            log::info!(
                "[load] dropping stale result #{} (current #{})",
                ticket.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }

        let asset = match result {
            Ok(a) => a,
            Err(e) => return self.fail(&ticket.url, e),
        };

        let framing = frame_model(&asset.bounds, &self.config.framing);
        let gpu = match backend.upload(&asset) {
            Ok(g) => g,
            Err(e) => return self.fail(&ticket.url, e),
        };

        self.mixer = AnimationMixer::new(asset.clips.clone());
        self.camera.eye = framing.camera_position;
        self.camera.target = framing.orbit_target;
        self.orbit.set_from_camera(framing.camera_position, framing.orbit_target);
        self.drag.reset();

        log::info!(
            "[load] framed #{}: scale={:.4} distance={:.3} shadow={:.3} clips={}",
            ticket.generation,
            framing.scale,
            framing.camera_distance,
            framing.shadow_radius,
            asset.clips.len()
        );
        let pose = asset.rest_pose();
        self.model = Some(LoadedModel {
            asset,
            gpu,
            framing,
            pose,
        });
        self.state = LoadState::Framed;
        LoadOutcome::Framed
    }

    /// Release the current model, if any, and forget its animation state.
    pub fn teardown<B>(&mut self, backend: &mut B)
    where
        B: ModelBackend<Model = M>,
    {
        self.mixer = None;
        self.drag.reset();
        if let Some(old) = self.model.take() {
            backend.release(old.gpu);
        }
    }

    fn fail(&mut self, url: &str, err: ViewerError) -> LoadOutcome {
        log::error!("[load] {} failed: {}", url, err);
        self.state = LoadState::Failed(err.to_string());
        LoadOutcome::Failed
    }

    /// Per-frame update: animation, orbit damping, camera.
    pub fn update(&mut self, dt: f32) {
        if let (Some(mixer), Some(model)) = (self.mixer.as_mut(), self.model.as_mut()) {
            mixer.update(dt);
            for (pose, node) in model.pose.iter_mut().zip(&model.asset.nodes) {
                *pose = node.local;
            }
            mixer.apply(&mut model.pose);
        }
        if self.config.interaction == InteractionMode::Orbit {
            self.orbit.update();
            self.orbit.apply_to(&mut self.camera);
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        match self.config.interaction {
            InteractionMode::Orbit => self.orbit.pointer_down(pos),
            InteractionMode::DragRotate => self.drag.pointer_down(pos),
        }
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        match self.config.interaction {
            InteractionMode::Orbit => self.orbit.pointer_move(pos),
            InteractionMode::DragRotate => self.drag.pointer_move(pos),
        }
    }

    pub fn pointer_up(&mut self) {
        self.orbit.pointer_up();
        self.drag.pointer_up();
    }

    /// Flip between orbit and drag-rotate. Any drag in progress ends.
    pub fn toggle_interaction(&mut self) -> InteractionMode {
        self.pointer_up();
        self.config.interaction = match self.config.interaction {
            InteractionMode::Orbit => InteractionMode::DragRotate,
            InteractionMode::DragRotate => InteractionMode::Orbit,
        };
        log::info!("[input] interaction {:?}", self.config.interaction);
        self.config.interaction
    }

    pub fn wheel(&mut self, notches: f32) {
        if self.config.interaction == InteractionMode::Orbit {
            self.orbit.zoom(notches);
        }
    }

    /// Framing transform followed by the drag rotation about the orbit target.
    pub fn model_matrix(&self) -> Mat4 {
        let Some(model) = &self.model else {
            return Mat4::IDENTITY;
        };
        let pivot = model.framing.orbit_target;
        Mat4::from_translation(pivot)
            * Mat4::from_quat(self.drag.orientation())
            * Mat4::from_translation(-pivot)
            * model.framing.model_matrix()
    }

    /// World transform of every drawn `(node, mesh)` pair.
    pub fn mesh_transforms(&self) -> Vec<(usize, Mat4)> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        let root = self.model_matrix();
        let world = model.asset.world_matrices(&model.pose);
        model
            .asset
            .mesh_instances()
            .into_iter()
            .map(|(node, mesh)| (mesh, root * world[node]))
            .collect()
    }

    pub fn shadow_radius(&self) -> Option<f32> {
        self.framing().map(|f| f.shadow_radius)
    }
}
