//! Model pass: per-primitive vertex/index buffers, per-material bind groups
//! and one instance uniform per drawn `(node, mesh)` pair.

use super::helpers;
use super::targets::DEPTH_FORMAT;
use crate::core::{
    ensure_texture_fits, ModelAsset, ResourceId, ResourceKind, ResourceLedger, ViewerError,
};
use glam::Mat4;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 3],
    nrm: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Globals {
    pub(crate) view_proj: [[f32; 4]; 4],
    pub(crate) camera_pos: [f32; 4],
    pub(crate) light_dir: [f32; 4],
    pub(crate) light_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceUniforms {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniforms {
    base_color: [f32; 4],
    params: [f32; 4],
}

pub(crate) struct ModelPipeline {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) globals_bgl: wgpu::BindGroupLayout,
    instance_bgl: wgpu::BindGroupLayout,
    material_bgl: wgpu::BindGroupLayout,
}

pub(crate) fn create_model_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
) -> ModelPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("model_shader"),
        source: wgpu::ShaderSource::Wgsl(crate::core::MODEL_WGSL.into()),
    });
    let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("model_globals_bgl"),
        entries: &[
            helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
            helpers::texture_entry(1),
            helpers::texture_entry(2),
            helpers::sampler_entry(3),
        ],
    });
    let instance_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("model_instance_bgl"),
        entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX)],
    });
    let material_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("model_material_bgl"),
        entries: &[
            helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
            helpers::texture_entry(1),
            helpers::sampler_entry(2),
        ],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("model_pl"),
        bind_group_layouts: &[&globals_bgl, &instance_bgl, &material_bgl],
        push_constant_ranges: &[],
    });
    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("model_pipeline"),
        layout: Some(&pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        // Avatars often ship single-sided cloth; draw both faces.
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    ModelPipeline {
        pipeline,
        globals_bgl,
        instance_bgl,
        material_bgl,
    }
}

struct PrimitiveGpu {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: Option<usize>,
    id: ResourceId,
}

struct MaterialGpu {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    id: ResourceId,
}

struct TextureGpu {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    id: ResourceId,
}

/// Per-node transform slot. Owned by the model, not counted in the ledger.
struct InstanceGpu {
    mesh: usize,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Everything one loaded model owns on the GPU.
pub struct ModelGpu {
    meshes: Vec<Vec<PrimitiveGpu>>,
    materials: Vec<MaterialGpu>,
    /// Used by primitives without a material.
    default_material: MaterialGpu,
    textures: Vec<TextureGpu>,
    instances: Vec<InstanceGpu>,
}

/// Shared inputs every upload binds against.
pub(crate) struct UploadContext<'a> {
    pub(crate) device: &'a wgpu::Device,
    pub(crate) queue: &'a wgpu::Queue,
    pub(crate) pipeline: &'a ModelPipeline,
    pub(crate) white_view: &'a wgpu::TextureView,
    pub(crate) sampler: &'a wgpu::Sampler,
}

pub(crate) fn upload(
    ctx: &UploadContext<'_>,
    ledger: &mut ResourceLedger,
    asset: &ModelAsset,
) -> Result<ModelGpu, ViewerError> {
    let max_dim = ctx.device.limits().max_texture_dimension_2d;
    for t in &asset.textures {
        ensure_texture_fits(t.width, t.height, max_dim)?;
    }

    let textures: Vec<TextureGpu> = asset
        .textures
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let (texture, view) = helpers::create_texture_with_bytes(
                ctx.device,
                ctx.queue,
                &format!("model_tex_{i}"),
                t.width,
                t.height,
                wgpu::TextureFormat::Rgba8UnormSrgb,
                &t.rgba8,
            );
            TextureGpu {
                texture,
                view,
                id: ledger.register(ResourceKind::Texture),
            }
        })
        .collect();

    let materials: Vec<MaterialGpu> = asset
        .materials
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let view = m
                .base_color_texture
                .and_then(|t| textures.get(t))
                .map_or(ctx.white_view, |t| &t.view);
            let uniforms = MaterialUniforms {
                base_color: m.base_color,
                params: [m.metallic, m.roughness, 0.0, 0.0],
            };
            create_material(ctx, ledger, &format!("model_material_{i}"), &uniforms, view)
        })
        .collect();
    let default_material = create_material(
        ctx,
        ledger,
        "model_material_default",
        &MaterialUniforms {
            base_color: [1.0; 4],
            params: [0.0, 1.0, 0.0, 0.0],
        },
        ctx.white_view,
    );

    let meshes: Vec<Vec<PrimitiveGpu>> = asset
        .meshes
        .iter()
        .enumerate()
        .map(|(mi, mesh)| {
            mesh.primitives
                .iter()
                .enumerate()
                .map(|(pi, p)| {
                    let vertices: Vec<Vertex> = p
                        .positions
                        .iter()
                        .zip(&p.normals)
                        .zip(&p.uvs)
                        .map(|((&pos, &nrm), &uv)| Vertex { pos, nrm, uv })
                        .collect();
                    let vertex_buffer =
                        ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("mesh_{mi}_{pi}_vb")),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                    let index_buffer =
                        ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("mesh_{mi}_{pi}_ib")),
                            contents: bytemuck::cast_slice(&p.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        });
                    PrimitiveGpu {
                        vertex_buffer,
                        index_buffer,
                        index_count: p.indices.len() as u32,
                        material: p.material,
                        id: ledger.register(ResourceKind::Geometry),
                    }
                })
                .collect()
        })
        .collect();

    let instances = asset
        .mesh_instances()
        .into_iter()
        .map(|(node, mesh)| {
            let uniform_buffer = helpers::uniform_buffer(
                ctx.device,
                &format!("instance_{node}"),
                std::mem::size_of::<InstanceUniforms>() as u64,
            );
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("instance_bg"),
                layout: &ctx.pipeline.instance_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            InstanceGpu {
                mesh,
                uniform_buffer,
                bind_group,
            }
        })
        .collect();

    Ok(ModelGpu {
        meshes,
        materials,
        default_material,
        textures,
        instances,
    })
}

fn create_material(
    ctx: &UploadContext<'_>,
    ledger: &mut ResourceLedger,
    label: &str,
    uniforms: &MaterialUniforms,
    view: &wgpu::TextureView,
) -> MaterialGpu {
    let uniform_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(uniforms),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: &ctx.pipeline.material_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(ctx.sampler),
            },
        ],
    });
    MaterialGpu {
        uniform_buffer,
        bind_group,
        id: ledger.register(ResourceKind::Material),
    }
}

pub(crate) fn release(ledger: &mut ResourceLedger, model: ModelGpu) {
    for p in model.meshes.into_iter().flatten() {
        p.vertex_buffer.destroy();
        p.index_buffer.destroy();
        ledger.release(p.id);
    }
    for inst in model.instances {
        inst.uniform_buffer.destroy();
    }
    for m in model.materials.into_iter().chain(std::iter::once(model.default_material)) {
        m.uniform_buffer.destroy();
        ledger.release(m.id);
    }
    for t in model.textures {
        t.texture.destroy();
        ledger.release(t.id);
    }
}

impl ModelGpu {
    /// Write instance transforms; `transforms` is in `mesh_instances` order.
    pub(crate) fn write_instances(&self, queue: &wgpu::Queue, transforms: &[(usize, Mat4)]) {
        for (inst, (_, model)) in self.instances.iter().zip(transforms) {
            let u = InstanceUniforms {
                model: model.to_cols_array_2d(),
                normal: model.inverse().transpose().to_cols_array_2d(),
            };
            queue.write_buffer(&inst.uniform_buffer, 0, bytemuck::bytes_of(&u));
        }
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        for inst in &self.instances {
            let Some(primitives) = self.meshes.get(inst.mesh) else {
                continue;
            };
            rpass.set_bind_group(1, &inst.bind_group, &[]);
            for p in primitives.iter().filter(|p| p.index_count > 0) {
                let material = p
                    .material
                    .and_then(|m| self.materials.get(m))
                    .unwrap_or(&self.default_material);
                rpass.set_bind_group(2, &material.bind_group, &[]);
                rpass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
                rpass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..p.index_count, 0, 0..1);
            }
        }
    }
}
