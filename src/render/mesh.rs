use crate::engine::{AlphaMode, MaterialData, ModelData, TextureData};
use glam::{Mat3, Mat4};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct InstanceUniforms {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

impl InstanceUniforms {
    pub(crate) fn from_model(model: Mat4) -> Self {
        let normal = Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose());
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniforms {
    base_color: [f32; 4],
    emissive: [f32; 4],
    // x: alpha mode (0 opaque, 1 mask, 2 blend), y: cutoff, z: unlit
    params: [f32; 4],
}

impl MaterialUniforms {
    fn from_material(m: &MaterialData) -> Self {
        let (mode, cutoff) = match m.alpha {
            AlphaMode::Opaque => (0.0, 0.0),
            AlphaMode::Mask(cutoff) => (1.0, cutoff),
            AlphaMode::Blend => (2.0, 0.0),
        };
        let [r, g, b] = m.emissive;
        Self {
            base_color: m.base_color,
            emissive: [r, g, b, 0.0],
            params: [mode, cutoff, if m.unlit { 1.0 } else { 0.0 }, 0.0],
        }
    }
}

/// Shared GPU objects every material bind group is built from.
pub(crate) struct MaterialContext<'r> {
    pub device: &'r wgpu::Device,
    pub queue: &'r wgpu::Queue,
    pub layout: &'r wgpu::BindGroupLayout,
    pub sampler: &'r wgpu::Sampler,
    /// 1x1 white, bound when a material has no base color texture.
    pub fallback: &'r wgpu::TextureView,
}

pub(crate) fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    tex: &TextureData,
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: tex.width.max(1),
                height: tex.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &tex.rgba,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: wgpu::BindGroup,
}

/// One loaded model: its meshes plus the per-instance transform uniform.
pub(crate) struct GpuModel {
    meshes: Vec<GpuMesh>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuModel {
    pub(crate) fn upload(
        ctx: &MaterialContext<'_>,
        instance_layout: &wgpu::BindGroupLayout,
        label: &str,
        model: &ModelData,
        transform: Mat4,
    ) -> Self {
        let device = ctx.device;
        let textures: Vec<wgpu::TextureView> = model
            .textures
            .iter()
            .map(|t| upload_texture(device, ctx.queue, label, t))
            .collect();

        let meshes = model
            .meshes
            .iter()
            .map(|m| {
                let vertices: Vec<Vertex> = m
                    .positions
                    .iter()
                    .zip(&m.normals)
                    .zip(&m.uvs)
                    .map(|((p, n), uv)| Vertex {
                        position: *p,
                        normal: *n,
                        uv: *uv,
                    })
                    .collect();
                let albedo = m
                    .material
                    .base_color_texture
                    .and_then(|i| textures.get(i))
                    .unwrap_or(ctx.fallback);
                let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::bytes_of(&MaterialUniforms::from_material(&m.material)),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let material = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: ctx.layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: material_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(albedo),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(ctx.sampler),
                        },
                    ],
                });
                GpuMesh {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(&m.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: m.indices.len() as u32,
                    material,
                }
            })
            .collect();

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&InstanceUniforms::from_model(transform)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: instance_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            meshes,
            uniform_buffer,
            bind_group,
        }
    }

    pub(crate) fn set_transform(&self, queue: &wgpu::Queue, transform: Mat4) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&InstanceUniforms::from_model(transform)),
        );
    }

    pub(crate) fn draw<'p>(&self, rpass: &mut wgpu::RenderPass<'p>) {
        rpass.set_bind_group(1, &self.bind_group, &[]);
        for mesh in &self.meshes {
            rpass.set_bind_group(2, &mesh.material, &[]);
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
