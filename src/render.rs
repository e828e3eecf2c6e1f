use crate::engine::{ModelData, BACKGROUND_SRGB, GROUND_LIGHT_SRGB, KEY_LIGHT_POSITION};
use glam::{Mat4, Vec3};
use web_sys as web;

mod helpers;
mod mesh;

use mesh::{GpuModel, MaterialContext, Vertex};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalUniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    light_color: [f32; 4],
}

/// Which scene object a model upload fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneSlot {
    Violin,
    Bow,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    instance_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    sample_count: u32,
    msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
    depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,

    violin: Option<GpuModel>,
    bow: Option<GpuModel>,

    width: u32,
    height: u32,
    clear_color: wgpu::Color,
    view_proj: Mat4,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        // WebGPU where the browser has it, WebGL2 otherwise
        let instance = wgpu::util::new_instance_with_webgpu_detection(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        })
        .await;
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU or WebGL2 adapter"))?;
        let backend = adapter.get_info().backend;
        let required_limits = if backend == wgpu::Backend::Gl {
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
        } else {
            // Use default limits on web to avoid passing unknown fields to older WebGPU impls
            wgpu::Limits::default()
        };
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits,
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
        let sample_count = helpers::pick_sample_count(&adapter, format);
        log::info!("[render] {:?} backend, {}x MSAA", backend, sample_count);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::engine::SCENE_WGSL.into()),
        });
        let globals_layout = helpers::uniform_layout(&device, "globals_bgl");
        let instance_layout = helpers::uniform_layout(&device, "instance_bgl");
        let material_layout = helpers::material_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_layout"),
            bind_group_layouts: &[&globals_layout, &instance_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let pipeline = helpers::make_scene_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            Vertex::layout(),
            format,
            sample_count,
        );
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("base_color_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = mesh::upload_texture(
            &device,
            &queue,
            "white",
            &crate::engine::TextureData {
                width: 1,
                height: 1,
                rgba: vec![255; 4],
            },
        );

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<GlobalUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let (depth_tex, depth_view) =
            helpers::create_depth_texture(&device, width, height, sample_count);
        let msaa = helpers::create_msaa_target(&device, width, height, format, sample_count);

        let bg = helpers::linear_rgba(BACKGROUND_SRGB);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            globals_bind_group,
            instance_layout,
            material_layout,
            sampler,
            white,
            sample_count,
            msaa,
            depth_tex,
            depth_view,
            violin: None,
            bow: None,
            width,
            height,
            clear_color: wgpu::Color {
                r: bg[0] as f64,
                g: bg[1] as f64,
                b: bg[2] as f64,
                a: 1.0,
            },
            view_proj: Mat4::IDENTITY,
        })
    }

    pub fn upload_model(&mut self, slot: SceneSlot, model: &ModelData, transform: Mat4) {
        let label = match slot {
            SceneSlot::Violin => "violin",
            SceneSlot::Bow => "bow",
        };
        let ctx = MaterialContext {
            device: &self.device,
            queue: &self.queue,
            layout: &self.material_layout,
            sampler: &self.sampler,
            fallback: &self.white,
        };
        let gpu = GpuModel::upload(&ctx, &self.instance_layout, label, model, transform);
        log::info!(
            "[render] uploaded {} ({} meshes, {} triangles, {} textures)",
            label,
            model.meshes.len(),
            model.triangle_count(),
            model.textures.len()
        );
        match slot {
            SceneSlot::Violin => self.violin = Some(gpu),
            SceneSlot::Bow => self.bow = Some(gpu),
        }
    }

    pub fn set_bow_transform(&mut self, transform: Mat4) {
        if let Some(bow) = &self.bow {
            bow.set_transform(&self.queue, transform);
        }
    }

    pub fn set_view_projection(&mut self, view_proj: Mat4) {
        self.view_proj = view_proj;
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            (self.depth_tex, self.depth_view) =
                helpers::create_depth_texture(&self.device, width, height, self.sample_count);
            self.msaa = helpers::create_msaa_target(
                &self.device,
                width,
                height,
                self.config.format,
                self.sample_count,
            );
        }
    }

    /// Reconfigure after the surface was lost or went stale.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let globals = GlobalUniforms {
            view_proj: self.view_proj.to_cols_array_2d(),
            light_dir: Vec3::from_array(KEY_LIGHT_POSITION)
                .normalize()
                .extend(0.0)
                .to_array(),
            sky_color: [1.0, 1.0, 1.0, 1.0],
            ground_color: helpers::linear_rgba(GROUND_LIGHT_SRGB),
            light_color: [1.0, 1.0, 1.0, 1.0],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

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
                color_attachments: &[Some(match &self.msaa {
                    Some((_, msaa_view)) => wgpu::RenderPassColorAttachment {
                        view: msaa_view,
                        resolve_target: Some(&view),
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.clear_color),
                            store: wgpu::StoreOp::Discard,
                        },
                    },
                    None => wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.clear_color),
                            store: wgpu::StoreOp::Store,
                        },
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            for model in [&self.violin, &self.bow].into_iter().flatten() {
                model.draw(&mut rpass);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
