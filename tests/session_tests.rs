// Host-side tests for the viewer session load cycle and resource teardown.

use glam::{Mat4, Quat, Vec2, Vec3};
use wellaver_core::*;

/// Records every handle it hands out in a ledger, like the GPU backend does.
#[derive(Default)]
struct FakeBackend {
    ledger: ResourceLedger,
    fail_upload: bool,
    uploads: usize,
}

struct FakeModel {
    ids: Vec<ResourceId>,
}

impl ModelBackend for FakeBackend {
    type Model = FakeModel;

    fn upload(&mut self, asset: &ModelAsset) -> Result<FakeModel, ViewerError> {
        if self.fail_upload {
            return Err(ViewerError::Backend("out of memory".into()));
        }
        self.uploads += 1;
        let mut ids = Vec::new();
        for _ in asset.meshes.iter().flat_map(|m| &m.primitives) {
            ids.push(self.ledger.register(ResourceKind::Geometry));
        }
        for _ in &asset.materials {
            ids.push(self.ledger.register(ResourceKind::Material));
        }
        for _ in &asset.textures {
            ids.push(self.ledger.register(ResourceKind::Texture));
        }
        Ok(FakeModel { ids })
    }

    fn release(&mut self, model: FakeModel) {
        for id in model.ids {
            assert!(self.ledger.release(id), "released twice");
        }
    }
}

fn triangle(size: Vec3, offset: Vec3) -> CpuPrimitive {
    let h = size * 0.5;
    let positions = vec![
        (offset - h).to_array(),
        (offset + h).to_array(),
        (offset + Vec3::new(h.x, -h.y, h.z)).to_array(),
    ];
    CpuPrimitive {
        positions,
        normals: vec![[0.0, 1.0, 0.0]; 3],
        uvs: vec![[0.0, 0.0]; 3],
        indices: vec![0, 1, 2],
        material: Some(0),
    }
}

/// One node, `primitives` triangles spanning `size`, one material, `textures`
/// textures and the given clips.
fn asset(size: Vec3, primitives: usize, textures: usize, clips: Vec<AnimationClip>) -> ModelAsset {
    let mut a = ModelAsset {
        nodes: vec![SceneNode {
            name: Some("root".into()),
            parent: None,
            children: Default::default(),
            local: Trs::default(),
            mesh: Some(0),
        }],
        roots: vec![0].into(),
        meshes: vec![CpuMesh {
            primitives: (0..primitives)
                .map(|_| triangle(size, Vec3::new(0.0, 3.0, 0.0)))
                .collect(),
        }],
        materials: vec![CpuMaterial::default()],
        textures: (0..textures)
            .map(|_| CpuTexture {
                width: 1,
                height: 1,
                rgba8: vec![255; 4],
            })
            .collect(),
        clips,
        ..Default::default()
    };
    a.bounds = a.compute_bounds(&a.rest_pose());
    a
}

fn spin_clip() -> AnimationClip {
    AnimationClip::new(
        "spin".into(),
        vec![Channel {
            node: 0,
            times: vec![0.0, 2.0],
            values: ChannelValues::Rotation(vec![
                Quat::IDENTITY,
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ]),
            interpolation: Interpolation::Linear,
        }],
    )
}

fn load(
    session: &mut ViewerSession<FakeModel>,
    backend: &mut FakeBackend,
    a: ModelAsset,
) -> LoadOutcome {
    let ticket = session.begin_load(backend, "./avatar.glb", 1);
    session.finish_load(backend, &ticket, Ok(a))
}

#[test]
fn new_session_is_idle() {
    let s: ViewerSession<FakeModel> = ViewerSession::new(ViewerConfig::default());
    assert_eq!(*s.state(), LoadState::Idle);
    assert_eq!(s.generation(), 0);
    assert!(s.model().is_none());
    assert!(s.mixer().is_none());
    assert_eq!(s.model_matrix(), Mat4::IDENTITY);
}

#[test]
fn successful_load_frames_the_model() {
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(ViewerConfig::default());
    let outcome = load(&mut s, &mut backend, asset(Vec3::new(2.0, 4.0, 1.0), 1, 0, vec![]));
    assert_eq!(outcome, LoadOutcome::Framed);
    assert_eq!(*s.state(), LoadState::Framed);

    let framing = *s.framing().expect("framed");
    assert!((framing.scale - 0.4).abs() < 1e-5);
    assert_eq!(s.camera.target, framing.orbit_target);
    assert!(s.camera.eye.abs_diff_eq(framing.camera_position, 1e-4));
    assert_eq!(s.shadow_radius(), Some(framing.shadow_radius));
    assert_eq!(s.mesh_transforms().len(), 1);
}

#[test]
fn swap_leaves_only_the_new_models_resources() {
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(ViewerConfig::default());

    load(&mut s, &mut backend, asset(Vec3::ONE, 3, 2, vec![]));
    assert_eq!(
        backend.ledger.counts(),
        ResourceCounts {
            geometries: 3,
            materials: 1,
            textures: 2
        }
    );

    let b = asset(Vec3::ONE, 1, 1, vec![]);
    let mut alone = FakeBackend::default();
    let mut other = ViewerSession::new(ViewerConfig::default());
    load(&mut other, &mut alone, b.clone());

    load(&mut s, &mut backend, b);
    assert_eq!(backend.ledger.counts(), alone.ledger.counts());
}

#[test]
fn teardown_happens_before_the_request_goes_out() {
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(ViewerConfig::default());
    load(&mut s, &mut backend, asset(Vec3::ONE, 2, 1, vec![spin_clip()]));
    assert!(backend.ledger.counts().total() > 0);

    let _ticket = s.begin_load(&mut backend, "./next.glb", 2);
    assert_eq!(backend.ledger.counts().total(), 0);
    assert_eq!(*s.state(), LoadState::Loading);
    assert!(s.model().is_none());
    assert!(s.mixer().is_none());
}

#[test]
fn failed_load_leaves_scene_empty() {
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(ViewerConfig::default());
    load(&mut s, &mut backend, asset(Vec3::ONE, 2, 0, vec![]));

    let ticket = s.begin_load(&mut backend, "./missing.glb", 3);
    let err = ViewerError::Network {
        url: ticket.url.clone(),
        reason: "HTTP 404 Not Found".into(),
    };
    assert_eq!(s.finish_load(&mut backend, &ticket, Err(err)), LoadOutcome::Failed);
    assert!(matches!(s.state(), LoadState::Failed(msg) if msg.contains("404")));
    assert!(s.model().is_none());
    assert_eq!(backend.ledger.counts().total(), 0);
    assert_eq!(s.shadow_radius(), None);
}

#[test]
fn upload_failure_is_a_failed_load() {
    let mut backend = FakeBackend {
        fail_upload: true,
        ..Default::default()
    };
    let mut s = ViewerSession::new(ViewerConfig::default());
    let outcome = load(&mut s, &mut backend, asset(Vec3::ONE, 1, 0, vec![spin_clip()]));
    assert_eq!(outcome, LoadOutcome::Failed);
    assert!(s.mixer().is_none());
    assert_eq!(backend.ledger.counts().total(), 0);
}

#[test]
fn failed_state_recovers_on_next_load() {
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(ViewerConfig::default());
    let ticket = s.begin_load(&mut backend, "./a.glb", 1);
    s.finish_load(&mut backend, &ticket, Err(ViewerError::NoGeometry));
    assert!(matches!(s.state(), LoadState::Failed(_)));

    assert_eq!(
        load(&mut s, &mut backend, asset(Vec3::ONE, 1, 0, vec![])),
        LoadOutcome::Framed
    );
}

#[test]
fn stale_results_are_never_attached() {
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(ViewerConfig::default());
    let first = s.begin_load(&mut backend, "./a.glb", 1);
    let second = s.begin_load(&mut backend, "./b.glb", 2);
    assert!(second.generation > first.generation);

    let outcome = s.finish_load(&mut backend, &first, Ok(asset(Vec3::ONE, 4, 0, vec![])));
    assert_eq!(outcome, LoadOutcome::Stale);
    assert_eq!(backend.uploads, 0);
    assert!(s.model().is_none());
    assert_eq!(*s.state(), LoadState::Loading);

    let outcome = s.finish_load(&mut backend, &second, Ok(asset(Vec3::ONE, 1, 0, vec![])));
    assert_eq!(outcome, LoadOutcome::Framed);
    assert_eq!(backend.ledger.counts().geometries, 1);

    // A late duplicate of the current ticket is also ignored.
    let outcome = s.finish_load(&mut backend, &second, Ok(asset(Vec3::ONE, 2, 0, vec![])));
    assert_eq!(outcome, LoadOutcome::Stale);
    assert_eq!(backend.ledger.counts().geometries, 1);
}

#[test]
fn tickets_carry_cache_busted_urls() {
    let mut backend = FakeBackend::default();
    let mut s: ViewerSession<FakeModel> = ViewerSession::new(ViewerConfig::default());
    assert_eq!(s.begin_load(&mut backend, "./avatar.glb", 42).url, "./avatar.glb?v=42");
    assert_eq!(
        s.begin_load(&mut backend, "https://cdn.test/m.glb?token=x", 43).url,
        "https://cdn.test/m.glb?token=x&v=43"
    );
}

#[test]
fn mixer_exists_only_for_animated_models() {
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(ViewerConfig::default());
    load(&mut s, &mut backend, asset(Vec3::ONE, 1, 0, vec![]));
    assert!(s.mixer().is_none());
    // Updating a static model is harmless.
    s.update(0.016);

    load(&mut s, &mut backend, asset(Vec3::ONE, 1, 0, vec![spin_clip()]));
    assert!(s.mixer().is_some());
    s.update(1.0);
    let pose = &s.model().expect("loaded").pose;
    let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
    assert!(pose[0].rotation.abs_diff_eq(expected, 1e-4));
}

#[test]
fn drag_mode_rotates_model_about_orbit_target() {
    let config = ViewerConfig {
        interaction: InteractionMode::DragRotate,
        ..ViewerConfig::default()
    };
    let mut backend = FakeBackend::default();
    let mut s = ViewerSession::new(config);
    load(&mut s, &mut backend, asset(Vec3::ONE, 1, 0, vec![]));
    let framing = *s.framing().expect("framed");
    assert_eq!(s.model_matrix(), framing.model_matrix());

    let eye = s.camera.eye;
    s.pointer_down(Vec2::ZERO);
    s.pointer_move(Vec2::new(80.0, 0.0));
    s.pointer_up();
    s.update(0.016);
    assert!(s.drag.yaw > 0.0);
    assert_eq!(s.camera.eye, eye);

    // The pivot is a fixed point of the drag rotation.
    let pivot = framing.orbit_target;
    let m = s.model_matrix() * framing.model_matrix().inverse();
    assert!(m.transform_point3(pivot).abs_diff_eq(pivot, 1e-4));
}

#[test]
fn wheel_zooms_only_in_orbit_mode() {
    let mut s: ViewerSession<FakeModel> = ViewerSession::new(ViewerConfig::default());
    let r = s.orbit.radius;
    s.wheel(2.0);
    assert!(s.orbit.radius > r);

    assert_eq!(s.toggle_interaction(), InteractionMode::DragRotate);
    let r = s.orbit.radius;
    s.wheel(2.0);
    assert_eq!(s.orbit.radius, r);
}

#[test]
fn toggling_interaction_ends_active_drags() {
    let mut s: ViewerSession<FakeModel> = ViewerSession::new(ViewerConfig::default());
    s.pointer_down(Vec2::ZERO);
    assert!(s.orbit.is_dragging());
    s.toggle_interaction();
    assert!(!s.orbit.is_dragging());
    s.pointer_move(Vec2::new(10.0, 0.0));
    assert!(!s.drag.active);
    assert_eq!(s.drag.yaw, 0.0);
}
