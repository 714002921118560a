use super::helpers;
use super::targets::DEPTH_FORMAT;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DiscUniforms {
    pub(crate) view_proj: [[f32; 4]; 4],
    pub(crate) center_radius: [f32; 4],
    pub(crate) color: [f32; 4],
    pub(crate) mode: [f32; 4],
}

/// One flat disc on the ground plane with its own uniforms.
pub(crate) struct Disc {
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

pub(crate) struct GroundResources {
    /// Opaque floor, writes depth.
    pub(crate) ground_pipeline: wgpu::RenderPipeline,
    /// Blended contact shadow, depth-tested only.
    pub(crate) shadow_pipeline: wgpu::RenderPipeline,
    pub(crate) ground: Disc,
    pub(crate) shadow: Disc,
}

pub(crate) fn create_ground_resources(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
) -> GroundResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("ground_shader"),
        source: wgpu::ShaderSource::Wgsl(crate::core::GROUND_WGSL.into()),
    });
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("disc_bgl"),
        entries: &[helpers::uniform_entry(
            0,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        )],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("disc_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let make_pipeline = |label: &str, blend: Option<wgpu::BlendState>, depth_write: bool| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_disc"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_disc"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        })
    };
    let ground_pipeline = make_pipeline("ground_pipeline", None, true);
    let shadow_pipeline =
        make_pipeline("shadow_pipeline", Some(wgpu::BlendState::ALPHA_BLENDING), false);
    let make_disc = |label: &str| {
        let uniform_buffer =
            helpers::uniform_buffer(device, label, std::mem::size_of::<DiscUniforms>() as u64);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Disc {
            uniform_buffer,
            bind_group,
        }
    };
    GroundResources {
        ground_pipeline,
        shadow_pipeline,
        ground: make_disc("ground_disc"),
        shadow: make_disc("shadow_disc"),
    }
}
