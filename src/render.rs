use crate::constants::{
    ENV_INTENSITY, KEY_LIGHT_COLOR, KEY_LIGHT_DIR, KEY_LIGHT_INTENSITY, SHADOW_LIFT,
    SHADOW_OPACITY, SHADOW_RGB,
};
use crate::core::constants::{BACKGROUND_RGB, GROUND_RADIUS, GROUND_RGB};
use crate::core::{
    srgb_to_linear, EnvironmentMap, ModelAsset, ModelBackend, ResourceCounts, ResourceLedger,
    ViewerError, ViewerSession,
};
use glam::Vec3;
use web_sys as web;

mod ground;
mod helpers;
mod model;
mod sky;
mod targets;
use targets::RenderTargets;

pub use model::ModelGpu;

// ===================== WebGPU state =====================

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,

    model_pipeline: model::ModelPipeline,
    sky: sky::SkyResources,
    ground: ground::GroundResources,
    globals_buffer: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    sky_bg: wgpu::BindGroup,

    // Environment: full-resolution radiance and prefiltered irradiance
    env_tex: wgpu::Texture,
    irr_tex: wgpu::Texture,
    env_is_image: bool,
    env_sampler: wgpu::Sampler,
    material_sampler: wgpu::Sampler,
    _white_tex: wgpu::Texture,
    white_view: wgpu::TextureView,

    ledger: ResourceLedger,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {:?} {}x{}", format, width, height);

        let targets = RenderTargets::new(&device, width, height);
        let model_pipeline = model::create_model_pipeline(&device, format);
        let sky = sky::create_sky_resources(&device, format);
        let ground = ground::create_ground_resources(&device, format);
        let globals_buffer = helpers::uniform_buffer(
            &device,
            "globals",
            std::mem::size_of::<model::Globals>() as u64,
        );

        // Equirect lookups wrap around the horizon
        let env_sampler = helpers::linear_sampler(&device, "env_sampler", wgpu::AddressMode::Repeat);
        let material_sampler =
            helpers::linear_sampler(&device, "material_sampler", wgpu::AddressMode::Repeat);
        let (white_tex, white_view) = helpers::create_texture_with_bytes(
            &device,
            &queue,
            "white_tex",
            1,
            1,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &[255, 255, 255, 255],
        );

        // Until the environment chain resolves, light with the background color.
        let bg = EnvironmentMap::solid(BACKGROUND_RGB.map(srgb_to_linear));
        let (env_tex, env_view) = upload_env(&device, &queue, "env_tex", &bg);
        let (irr_tex, irr_view) = upload_env(&device, &queue, "irr_tex", &bg);
        let globals_bg = create_globals_bind_group(
            &device,
            &model_pipeline,
            &globals_buffer,
            &env_view,
            &irr_view,
            &env_sampler,
        );
        let sky_bg = sky::create_sky_bind_group(&device, &sky, &env_view, &env_sampler);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            model_pipeline,
            sky,
            ground,
            globals_buffer,
            globals_bg,
            sky_bg,
            env_tex,
            irr_tex,
            env_is_image: false,
            env_sampler,
            material_sampler,
            _white_tex: white_tex,
            white_view,
            ledger: ResourceLedger::new(),
            width,
            height,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Replace the environment textures. `is_image` selects tone-mapped
    /// sampling for the background; a solid color is drawn as-is.
    pub fn set_environment(&mut self, env: &EnvironmentMap, irradiance: &EnvironmentMap, is_image: bool) {
        let (env_tex, env_view) = upload_env(&self.device, &self.queue, "env_tex", env);
        let (irr_tex, irr_view) = upload_env(&self.device, &self.queue, "irr_tex", irradiance);
        self.globals_bg = create_globals_bind_group(
            &self.device,
            &self.model_pipeline,
            &self.globals_buffer,
            &env_view,
            &irr_view,
            &self.env_sampler,
        );
        self.sky_bg = sky::create_sky_bind_group(&self.device, &self.sky, &env_view, &self.env_sampler);
        std::mem::replace(&mut self.env_tex, env_tex).destroy();
        std::mem::replace(&mut self.irr_tex, irr_tex).destroy();
        self.env_is_image = is_image;
        let avg = env.average();
        self.clear_color = wgpu::Color {
            r: avg[0] as f64,
            g: avg[1] as f64,
            b: avg[2] as f64,
            a: 1.0,
        };
        log::info!(
            "[env] {}x{} (irradiance {}x{}, image={})",
            env.width,
            env.height,
            irradiance.width,
            irradiance.height,
            is_image
        );
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.reconfigure();
        }
    }

    /// Reconfigure the surface at the current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.config.width = self.width;
        self.config.height = self.height;
        self.surface.configure(&self.device, &self.config);
        self.targets.recreate(&self.device, self.width, self.height);
    }

    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Live model resources.
    pub fn counts(&self) -> ResourceCounts {
        self.ledger.counts()
    }

    pub fn render(&mut self, session: &ViewerSession<ModelGpu>) -> Result<(), wgpu::SurfaceError> {
        let camera = &session.camera;
        let view_proj = camera.view_projection();
        let exposure = session.config.exposure;

        let light_dir = Vec3::from(KEY_LIGHT_DIR).normalize_or_zero();
        let globals = model::Globals {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera.eye.extend(exposure).to_array(),
            light_dir: light_dir.extend(KEY_LIGHT_INTENSITY).to_array(),
            light_color: Vec3::from(KEY_LIGHT_COLOR).extend(ENV_INTENSITY).to_array(),
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        let sky_u = sky::SkyUniforms {
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_pos: camera.eye.extend(exposure).to_array(),
            flags: [if self.env_is_image { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.sky.uniform_buffer, 0, bytemuck::bytes_of(&sky_u));
        let g = GROUND_RGB.map(srgb_to_linear);
        let ground_u = ground::DiscUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            center_radius: [0.0, 0.0, 0.0, GROUND_RADIUS],
            color: [g[0], g[1], g[2], 1.0],
            mode: [0.0; 4],
        };
        self.queue.write_buffer(
            &self.ground.ground.uniform_buffer,
            0,
            bytemuck::bytes_of(&ground_u),
        );
        let shadow_radius = session.shadow_radius();
        if let Some(radius) = shadow_radius {
            let shadow_u = ground::DiscUniforms {
                view_proj: view_proj.to_cols_array_2d(),
                center_radius: [0.0, SHADOW_LIFT, 0.0, radius],
                color: [SHADOW_RGB[0], SHADOW_RGB[1], SHADOW_RGB[2], SHADOW_OPACITY],
                mode: [1.0, 0.0, 0.0, 0.0],
            };
            self.queue.write_buffer(
                &self.ground.shadow.uniform_buffer,
                0,
                bytemuck::bytes_of(&shadow_u),
            );
        }
        let loaded = session.model();
        if let Some(m) = loaded {
            m.gpu.write_instances(&self.queue, &session.mesh_transforms());
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.sky.pipeline);
            rpass.set_bind_group(0, &self.sky_bg, &[]);
            rpass.draw(0..3, 0..1);

            rpass.set_pipeline(&self.ground.ground_pipeline);
            rpass.set_bind_group(0, &self.ground.ground.bind_group, &[]);
            rpass.draw(0..6, 0..1);

            if shadow_radius.is_some() {
                rpass.set_pipeline(&self.ground.shadow_pipeline);
                rpass.set_bind_group(0, &self.ground.shadow.bind_group, &[]);
                rpass.draw(0..6, 0..1);
            }

            if let Some(m) = loaded {
                rpass.set_pipeline(&self.model_pipeline.pipeline);
                rpass.set_bind_group(0, &self.globals_bg, &[]);
                m.gpu.draw(&mut rpass);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl ModelBackend for GpuState {
    type Model = ModelGpu;

    fn upload(&mut self, asset: &ModelAsset) -> Result<ModelGpu, ViewerError> {
        let ctx = model::UploadContext {
            device: &self.device,
            queue: &self.queue,
            pipeline: &self.model_pipeline,
            white_view: &self.white_view,
            sampler: &self.material_sampler,
        };
        let gpu = model::upload(&ctx, &mut self.ledger, asset)?;
        let c = self.ledger.counts();
        if c != asset.gpu_resource_counts() {
            log::warn!(
                "[gpu] live {:?}, expected {:?}",
                c,
                asset.gpu_resource_counts()
            );
        }
        log::info!(
            "[gpu] uploaded {} primitives, {} triangles; live geometries={} materials={} textures={}",
            asset.primitive_count(),
            asset.triangle_count(),
            c.geometries,
            c.materials,
            c.textures
        );
        Ok(gpu)
    }

    fn release(&mut self, model: ModelGpu) {
        model::release(&mut self.ledger, model);
        let c = self.ledger.counts();
        if c.total() != 0 {
            log::warn!("[gpu] {} resources still live after release", c.total());
        }
    }
}

fn upload_env(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    map: &EnvironmentMap,
) -> (wgpu::Texture, wgpu::TextureView) {
    helpers::create_texture_with_bytes(
        device,
        queue,
        label,
        map.width,
        map.height,
        wgpu::TextureFormat::Rgba16Float,
        &helpers::pack_rgba16f(&map.to_rgba32f()),
    )
}

fn create_globals_bind_group(
    device: &wgpu::Device,
    pipeline: &model::ModelPipeline,
    globals: &wgpu::Buffer,
    env_view: &wgpu::TextureView,
    irr_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("globals_bg"),
        layout: &pipeline.globals_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(env_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(irr_view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
