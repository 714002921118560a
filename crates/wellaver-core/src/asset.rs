//! CPU-side model assets decoded from GLB/GLTF bytes.
//!
//! Every mesh primitive keeps its own vertex/index arrays so the renderer can
//! upload them one buffer pair at a time. Node transforms are kept as TRS so
//! the animation mixer can overwrite individual channels before world matrices
//! are rebuilt.
//!
//! Design notes
//! - Only triangle-list primitives are kept; points/lines are skipped.
//! - Missing normals fall back to +Y, missing UVs to zero.
//! - Draco-compressed primitives are rejected up front; there is no runtime
//!   decompression here.
//! - Buffers and images may be embedded (GLB chunk, buffer view, data URI) or
//!   live next to the `.gltf`. External files are fetched by the caller and
//!   passed in keyed by URI; see [`ModelAsset::external_uris`].
//! - Node graphs must be forests. Cycles and shared children are rejected.

use crate::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::bounds::Aabb;
use crate::error::{Result, ViewerError};
use crate::resources::ResourceCounts;
use base64::Engine as _;
use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use smallvec::SmallVec;

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Contents of files a `.gltf` references, keyed by the URI as written.
pub type ExternalResources = FnvHashMap<String, Vec<u8>>;

/// Local translation/rotation/scale of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Trs {
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: Option<String>,
    pub parent: Option<usize>,
    pub children: SmallVec<[usize; 4]>,
    pub local: Trs,
    pub mesh: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct CpuPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct CpuMesh {
    pub primitives: Vec<CpuPrimitive>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CpuMaterial {
    pub base_color: [f32; 4],
    /// Index into [`ModelAsset::textures`].
    pub base_color_texture: Option<usize>,
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for CpuMaterial {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            base_color_texture: None,
            metallic: 1.0,
            roughness: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CpuTexture {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

/// A decoded model: scene graph, geometry, materials and animation clips.
#[derive(Clone, Debug, Default)]
pub struct ModelAsset {
    pub nodes: Vec<SceneNode>,
    pub roots: SmallVec<[usize; 4]>,
    pub meshes: Vec<CpuMesh>,
    pub materials: Vec<CpuMaterial>,
    pub textures: Vec<CpuTexture>,
    pub clips: Vec<AnimationClip>,
    /// Rest-pose bounds of all geometry in model space.
    pub bounds: Aabb,
}

impl ModelAsset {
    /// Decode a `.glb` container or a self-contained `.gltf` document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_slice_with(bytes, &ExternalResources::default())
    }

    /// URIs of buffers and images stored in separate files, each listed once.
    /// Empty for GLB files and documents that only use data URIs.
    pub fn external_uris(bytes: &[u8]) -> Result<Vec<String>> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let buffer_uris = gltf.buffers().filter_map(|b| match b.source() {
            gltf::buffer::Source::Uri(uri) => Some(uri),
            gltf::buffer::Source::Bin => None,
        });
        let image_uris = gltf.images().filter_map(|i| match i.source() {
            gltf::image::Source::Uri { uri, .. } => Some(uri),
            gltf::image::Source::View { .. } => None,
        });
        let mut out: Vec<String> = Vec::new();
        for uri in buffer_uris.chain(image_uris) {
            if !uri.starts_with("data:") && !out.iter().any(|u| u == uri) {
                out.push(uri.to_string());
            }
        }
        Ok(out)
    }

    /// Decode with the bytes of every external URI already fetched.
    pub fn from_slice_with(bytes: &[u8], external: &ExternalResources) -> Result<Self> {
        let gltf::Gltf { document: doc, blob } = gltf::Gltf::from_slice(bytes)?;
        if doc.extensions_used().any(|e| e == DRACO_EXTENSION) {
            return Err(ViewerError::UnsupportedExtension(DRACO_EXTENSION.to_string()));
        }
        let buffers = load_buffers(&doc, blob, external)?;

        let nodes = read_nodes(&doc)?;
        let scene = doc.default_scene().or_else(|| doc.scenes().next());
        let roots: SmallVec<[usize; 4]> = match scene {
            Some(s) => s.nodes().map(|n| n.index()).collect(),
            None => (0..nodes.len()).filter(|&i| nodes[i].parent.is_none()).collect(),
        };

        let meshes = doc
            .meshes()
            .map(|m| read_mesh(&m, &buffers))
            .collect::<Vec<_>>();
        let materials = doc.materials().map(|m| read_material(&m)).collect();
        let textures = doc
            .images()
            .map(|img| load_image(&img, &buffers, external))
            .collect::<Result<Vec<_>>>()?;
        let clips = doc
            .animations()
            .map(|a| read_clip(&a, &buffers))
            .collect::<Vec<_>>();

        let mut asset = ModelAsset {
            nodes,
            roots,
            meshes,
            materials,
            textures,
            clips,
            bounds: Aabb::ZERO,
        };
        if asset.triangle_count() == 0 {
            return Err(ViewerError::NoGeometry);
        }
        asset.bounds = asset.compute_bounds(&asset.rest_pose());
        log::debug!(
            "[asset] nodes={} meshes={} materials={} textures={} clips={}",
            asset.nodes.len(),
            asset.meshes.len(),
            asset.materials.len(),
            asset.textures.len(),
            asset.clips.len()
        );
        Ok(asset)
    }

    pub fn rest_pose(&self) -> Vec<Trs> {
        self.nodes.iter().map(|n| n.local).collect()
    }

    /// World matrices for every node given per-node local transforms.
    pub fn world_matrices(&self, locals: &[Trs]) -> Vec<Mat4> {
        let mut world = vec![Mat4::IDENTITY; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> = self.roots.iter().map(|&r| (r, Mat4::IDENTITY)).collect();
        while let Some((idx, parent)) = stack.pop() {
            let local = locals.get(idx).copied().unwrap_or(self.nodes[idx].local);
            let m = parent * local.matrix();
            world[idx] = m;
            for &c in &self.nodes[idx].children {
                stack.push((c, m));
            }
        }
        world
    }

    /// Bounds of every vertex reachable from the scene roots.
    pub fn compute_bounds(&self, locals: &[Trs]) -> Aabb {
        let world = self.world_matrices(locals);
        let mut out: Option<Aabb> = None;
        for (node_idx, mesh_idx) in self.mesh_instances() {
            let m = world[node_idx];
            for prim in &self.meshes[mesh_idx].primitives {
                let points = prim
                    .positions
                    .iter()
                    .map(|p| m.transform_point3(Vec3::from_array(*p)));
                if let Some(b) = Aabb::from_points(points) {
                    out = Some(out.map_or(b, |o| o.union(b)));
                }
            }
        }
        out.unwrap_or(Aabb::ZERO)
    }

    /// `(node, mesh)` pairs for nodes reachable from the roots that carry a mesh.
    pub fn mesh_instances(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if let Some(mesh) = node.mesh {
                out.push((idx, mesh));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn primitive_count(&self) -> usize {
        self.meshes.iter().map(|m| m.primitives.len()).sum()
    }

    /// Handles a backend registers for this asset: one geometry per
    /// primitive, one material per material plus the fallback material, one
    /// texture per image. Shared meshes are uploaded once.
    pub fn gpu_resource_counts(&self) -> ResourceCounts {
        ResourceCounts {
            geometries: self.primitive_count(),
            materials: self.materials.len() + 1,
            textures: self.textures.len(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|m| m.primitives.iter())
            .map(|p| p.indices.len() / 3)
            .sum()
    }
}

fn read_nodes(doc: &gltf::Document) -> Result<Vec<SceneNode>> {
    let mut nodes: Vec<SceneNode> = doc
        .nodes()
        .map(|n| {
            let (t, r, s) = n.transform().decomposed();
            SceneNode {
                name: n.name().map(str::to_string),
                parent: None,
                children: n.children().map(|c| c.index()).collect(),
                local: Trs {
                    translation: Vec3::from_array(t),
                    rotation: Quat::from_array(r).normalize(),
                    scale: Vec3::from_array(s),
                },
                mesh: n.mesh().map(|m| m.index()),
            }
        })
        .collect();
    for i in 0..nodes.len() {
        let children = nodes[i].children.clone();
        for c in children {
            if let Some(child) = nodes.get_mut(c) {
                if let Some(first) = child.parent {
                    return Err(ViewerError::InvalidHierarchy(format!(
                        "node {c} is a child of both {first} and {i}"
                    )));
                }
                child.parent = Some(i);
            }
        }
    }
    // Every node has at most one parent now, so a cycle shows up as a parent
    // chain that never ends.
    for start in 0..nodes.len() {
        let mut cur = start;
        let mut depth = 0;
        while let Some(p) = nodes[cur].parent {
            depth += 1;
            if p == start || depth > nodes.len() {
                return Err(ViewerError::InvalidHierarchy(format!(
                    "node {start} is its own ancestor"
                )));
            }
            cur = p;
        }
    }
    Ok(nodes)
}

fn load_buffers(
    doc: &gltf::Document,
    mut blob: Option<Vec<u8>>,
    external: &ExternalResources,
) -> Result<Vec<Vec<u8>>> {
    doc.buffers()
        .map(|b| {
            let mut data = match b.source() {
                gltf::buffer::Source::Bin => blob.take().ok_or_else(|| {
                    ViewerError::InvalidData("buffer refers to a missing GLB chunk".to_string())
                })?,
                gltf::buffer::Source::Uri(uri) => resolve_uri(uri, external)?,
            };
            if data.len() < b.length() {
                return Err(ViewerError::InvalidData(format!(
                    "buffer {} has {} of {} bytes",
                    b.index(),
                    data.len(),
                    b.length()
                )));
            }
            // accessors may read up to the 4-byte aligned end
            while data.len() % 4 != 0 {
                data.push(0);
            }
            Ok(data)
        })
        .collect()
}

fn resolve_uri(uri: &str, external: &ExternalResources) -> Result<Vec<u8>> {
    if let Some(rest) = uri.strip_prefix("data:") {
        let (_, payload) = rest.split_once(";base64,").ok_or_else(|| {
            ViewerError::InvalidData("data URI is not base64 encoded".to_string())
        })?;
        return base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ViewerError::InvalidData(format!("data URI: {e}")));
    }
    external
        .get(uri)
        .cloned()
        .ok_or_else(|| ViewerError::MissingResource(uri.to_string()))
}

fn load_image(
    img: &gltf::Image<'_>,
    buffers: &[Vec<u8>],
    external: &ExternalResources,
) -> Result<CpuTexture> {
    let decoded = match img.source() {
        gltf::image::Source::View { view, .. } => {
            let start = view.offset();
            let bytes = buffers
                .get(view.buffer().index())
                .and_then(|b| b.get(start..start + view.length()))
                .ok_or_else(|| {
                    ViewerError::InvalidData(format!("image {} view out of range", img.index()))
                })?;
            image::load_from_memory(bytes)?
        }
        gltf::image::Source::Uri { uri, .. } => image::load_from_memory(&resolve_uri(uri, external)?)?,
    };
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(CpuTexture {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

fn read_mesh(mesh: &gltf::Mesh<'_>, buffers: &[Vec<u8>]) -> CpuMesh {
    let mut primitives = Vec::new();
    for prim in mesh.primitives() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = prim.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
        let Some(pos_iter) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = pos_iter.collect();
        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(it) => it.collect(),
            None => vec![[0.0, 1.0, 0.0]; positions.len()],
        };
        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(tc) => tc.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };
        let indices: Vec<u32> = match reader.read_indices() {
            Some(idx) => idx.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if indices.len() < 3 || normals.len() != positions.len() || uvs.len() != positions.len() {
            log::warn!(
                "[asset] skipping malformed primitive in mesh {:?}",
                mesh.name()
            );
            continue;
        }
        primitives.push(CpuPrimitive {
            positions,
            normals,
            uvs,
            indices,
            material: prim.material().index(),
        });
    }
    CpuMesh { primitives }
}

fn read_material(m: &gltf::Material<'_>) -> CpuMaterial {
    let pbr = m.pbr_metallic_roughness();
    CpuMaterial {
        base_color: pbr.base_color_factor(),
        base_color_texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
    }
}

fn read_clip(anim: &gltf::Animation<'_>, buffers: &[Vec<u8>]) -> AnimationClip {
    let mut channels = Vec::new();
    for ch in anim.channels() {
        let reader = ch.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();
        let values = match outputs {
            ReadOutputs::Translations(it) => {
                ChannelValues::Translation(it.map(Vec3::from_array).collect())
            }
            ReadOutputs::Rotations(it) => ChannelValues::Rotation(
                it.into_f32()
                    .map(|q| Quat::from_array(q).normalize())
                    .collect(),
            ),
            ReadOutputs::Scales(it) => ChannelValues::Scale(it.map(Vec3::from_array).collect()),
            ReadOutputs::MorphTargetWeights(_) => continue,
        };
        let interpolation = match ch.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };
        channels.push(Channel {
            node: ch.target().node().index(),
            times,
            values,
            interpolation,
        });
    }
    AnimationClip::new(anim.name().unwrap_or("clip").to_string(), channels)
}
