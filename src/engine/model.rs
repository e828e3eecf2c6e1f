//! GLB (binary glTF 2.0) parsing into flat, renderer-ready triangle meshes.
//!
//! Node transforms of the default scene are baked into the vertices, so the
//! returned geometry and bounds are in the model's root space: exactly what
//! the layout code scales and positions as one object. Materials are reduced
//! to what the scene shader draws: a base color (factor and texture),
//! emissive color, alpha handling and the unlit flag.

use super::error::EngineError;
use super::geometry::Aabb;
use glam::{Mat3, Mat4, Vec2, Vec3};
use gltf::accessor::DataType;
use gltf::Semantic;
use std::collections::HashMap;

/// Required extensions decoded here rather than by the `gltf` crate.
/// Quantized attributes are dequantized on read; the material ones only
/// refine shading beyond what the scene shader draws.
const LOCALLY_HANDLED_EXTENSIONS: &[&str] = &[
    "KHR_mesh_quantization",
    "KHR_materials_specular",
    "KHR_materials_volume",
    "KHR_materials_variants",
];

/// Decoded image, tightly packed sRGB RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlphaMode {
    Opaque,
    Mask(f32),
    Blend,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    /// Linear RGBA multiplier.
    pub base_color: [f32; 4],
    /// Index into `ModelData::textures`.
    pub base_color_texture: Option<usize>,
    /// Linear RGB, emissive strength already applied.
    pub emissive: [f32; 3],
    pub alpha: AlphaMode,
    pub unlit: bool,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            base_color_texture: None,
            emissive: [0.0; 3],
            alpha: AlphaMode::Opaque,
            unlit: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Base color texture coordinates, texture transform applied. Zero when
    /// the primitive has none.
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material: MaterialData,
}

#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureData>,
    pub bounds: Aabb,
}

impl ModelData {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

/// Parse a GLB container. `label` names the model in errors.
pub fn parse_glb(label: &str, bytes: &[u8]) -> Result<ModelData, EngineError> {
    let glb = gltf::Glb::from_slice(bytes).map_err(gltf::Error::from)?;
    let mut root = gltf::json::Root::from_slice(&glb.json).map_err(gltf::Error::from)?;
    root.extensions_required
        .retain(|ext| !LOCALLY_HANDLED_EXTENSIONS.contains(&ext.as_str()));
    let document = gltf::Document::from_json(root)?;

    let mut buffers: Vec<&[u8]> = Vec::new();
    for buffer in document.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = glb
                    .bin
                    .as_deref()
                    .ok_or_else(|| EngineError::UnsupportedBuffer(label.to_string()))?;
                buffers.push(blob);
            }
            gltf::buffer::Source::Uri(_) => {
                return Err(EngineError::UnsupportedBuffer(label.to_string()))
            }
        }
    }

    let mut loader = Loader {
        label,
        buffers,
        images: HashMap::new(),
        model: ModelData::default(),
    };
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            loader.collect_node(&node, Mat4::IDENTITY);
        }
    }

    let model = loader.model;
    if model.meshes.is_empty() {
        return Err(EngineError::EmptyModel(label.to_string()));
    }
    Ok(model)
}

/// Which UV set feeds the base color texture, and how it is transformed.
struct UvSource {
    set: u32,
    transform: Mat3,
}

struct Loader<'a> {
    label: &'a str,
    buffers: Vec<&'a [u8]>,
    /// glTF image index -> decoded texture slot (`None` when undecodable).
    images: HashMap<usize, Option<usize>>,
    model: ModelData,
}

impl Loader<'_> {
    fn collect_node(&mut self, node: &gltf::Node, parent: Mat4) {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    continue;
                }
                if let Some(data) = self.read_primitive(&primitive, &world) {
                    for p in &data.positions {
                        self.model.bounds.expand_to(Vec3::from_array(*p));
                    }
                    self.model.meshes.push(data);
                }
            }
        }
        for child in node.children() {
            self.collect_node(&child, world);
        }
    }

    fn read_primitive(&mut self, primitive: &gltf::Primitive, world: &Mat4) -> Option<MeshData> {
        let buffers = self.buffers.clone();
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).copied());

        let raw_positions: Vec<[f32; 3]> = match primitive.get(&Semantic::Positions) {
            Some(a) if a.data_type() == DataType::F32 => reader.read_positions()?.collect(),
            Some(a) => read_floats::<3>(&a, &buffers)?,
            None => return None,
        };
        let positions: Vec<Vec3> = raw_positions
            .into_iter()
            .map(|p| world.transform_point3(Vec3::from_array(p)))
            .collect();
        if positions.is_empty() {
            return None;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(ix) => ix.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let indices = indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| (i as usize) < positions.len()))
            .flatten()
            .copied()
            .collect::<Vec<_>>();
        if indices.is_empty() {
            return None;
        }

        let normal_matrix = Mat3::from_mat4(*world).inverse().transpose();
        let raw_normals: Option<Vec<[f32; 3]>> = match primitive.get(&Semantic::Normals) {
            Some(a) if a.data_type() == DataType::F32 => {
                reader.read_normals().map(|ns| ns.collect())
            }
            Some(a) => read_floats::<3>(&a, &buffers),
            None => None,
        };
        let normals: Vec<[f32; 3]> = match raw_normals {
            Some(ns) => ns
                .into_iter()
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero().to_array())
                .collect(),
            None => smooth_normals(&positions, &indices),
        };
        if normals.len() != positions.len() {
            return None;
        }

        let (material, uv_source) = self.read_material(&primitive.material());
        let uvs = uv_source
            .and_then(|src| {
                let uvs = read_uvs(primitive, &reader, src.set, &buffers)?;
                Some(
                    uvs.into_iter()
                        .map(|uv| src.transform.transform_point2(Vec2::from(uv)).to_array())
                        .collect::<Vec<_>>(),
                )
            })
            .filter(|uvs| uvs.len() == positions.len())
            .unwrap_or_else(|| vec![[0.0; 2]; positions.len()]);

        Some(MeshData {
            positions: positions.iter().map(|p| p.to_array()).collect(),
            normals,
            uvs,
            indices,
            material,
        })
    }

    fn read_material(&mut self, material: &gltf::Material) -> (MaterialData, Option<UvSource>) {
        let pbr = material.pbr_metallic_roughness();
        let (base_color, info) = match material.pbr_specular_glossiness() {
            Some(sg) => (sg.diffuse_factor(), sg.diffuse_texture()),
            None => (pbr.base_color_factor(), pbr.base_color_texture()),
        };

        let strength = material.emissive_strength().unwrap_or(1.0);
        let emissive = (Vec3::from_array(material.emissive_factor()) * strength).to_array();
        let alpha = match material.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask(material.alpha_cutoff().unwrap_or(0.5)),
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        };

        let mut data = MaterialData {
            base_color,
            base_color_texture: None,
            emissive,
            alpha,
            unlit: material.unlit(),
        };
        let Some(info) = info else {
            return (data, None);
        };
        data.base_color_texture = self.texture_slot(&info.texture().source());
        if data.base_color_texture.is_none() {
            return (data, None);
        }

        let (set, transform) = match info.texture_transform() {
            Some(t) => (
                t.tex_coord().unwrap_or(info.tex_coord()),
                uv_transform(t.offset(), t.rotation(), t.scale()),
            ),
            None => (info.tex_coord(), Mat3::IDENTITY),
        };
        (data, Some(UvSource { set, transform }))
    }

    fn texture_slot(&mut self, img: &gltf::Image) -> Option<usize> {
        if let Some(slot) = self.images.get(&img.index()) {
            return *slot;
        }
        let slot = decode_image(self.label, img, &self.buffers).map(|tex| {
            self.model.textures.push(tex);
            self.model.textures.len() - 1
        });
        self.images.insert(img.index(), slot);
        slot
    }
}

/// `KHR_texture_transform`: translation * rotation * scale on UV space.
pub fn uv_transform(offset: [f32; 2], rotation: f32, scale: [f32; 2]) -> Mat3 {
    let (s, c) = rotation.sin_cos();
    let rotate = Mat3::from_cols(Vec3::new(c, -s, 0.0), Vec3::new(s, c, 0.0), Vec3::Z);
    Mat3::from_translation(Vec2::from(offset)) * rotate * Mat3::from_scale(Vec2::from(scale))
}

fn decode_image(label: &str, img: &gltf::Image, buffers: &[&[u8]]) -> Option<TextureData> {
    let gltf::image::Source::View { view, .. } = img.source() else {
        log::warn!("[assets] {}: external image {} skipped", label, img.index());
        return None;
    };
    let bytes = buffers
        .get(view.buffer().index())?
        .get(view.offset()..view.offset() + view.length())?;
    match image::load_from_memory(bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            Some(TextureData {
                width: rgba.width(),
                height: rgba.height(),
                rgba: rgba.into_raw(),
            })
        }
        Err(e) => {
            log::warn!("[assets] {}: image {} not decoded: {}", label, img.index(), e);
            None
        }
    }
}

fn read_uvs<'a, 's, F>(
    primitive: &gltf::Primitive,
    reader: &gltf::mesh::Reader<'a, 's, F>,
    set: u32,
    buffers: &[&[u8]],
) -> Option<Vec<[f32; 2]>>
where
    F: Clone + Fn(gltf::Buffer<'a>) -> Option<&'s [u8]>,
{
    let accessor = primitive.get(&Semantic::TexCoords(set))?;
    match accessor.data_type() {
        DataType::F32 | DataType::U8 | DataType::U16 => {
            Some(reader.read_tex_coords(set)?.into_f32().collect())
        }
        _ => read_floats::<2>(&accessor, buffers),
    }
}

/// Read a non-sparse accessor of any component type as floats, applying
/// normalization. Used for quantized attributes the `gltf` readers reject.
fn read_floats<const N: usize>(
    accessor: &gltf::Accessor,
    buffers: &[&[u8]],
) -> Option<Vec<[f32; N]>> {
    if accessor.dimensions().multiplicity() != N || accessor.sparse().is_some() {
        return None;
    }
    let view = accessor.view()?;
    let data = buffers.get(view.buffer().index())?;
    let ty = accessor.data_type();
    let elem = ty.size() * N;
    let stride = view.stride().unwrap_or(elem);
    let start = view.offset() + accessor.offset();
    let normalized = accessor.normalized();

    (0..accessor.count())
        .map(|i| {
            let at = start + i * stride;
            let bytes = data.get(at..at + elem)?;
            let mut out = [0.0; N];
            for (v, chunk) in out.iter_mut().zip(bytes.chunks_exact(ty.size())) {
                *v = decode_component(ty, chunk, normalized);
            }
            Some(out)
        })
        .collect()
}

fn decode_component(ty: DataType, b: &[u8], normalized: bool) -> f32 {
    match ty {
        DataType::I8 => {
            let v = b[0] as i8 as f32;
            if normalized { (v / 127.0).max(-1.0) } else { v }
        }
        DataType::U8 => {
            let v = b[0] as f32;
            if normalized { v / 255.0 } else { v }
        }
        DataType::I16 => {
            let v = i16::from_le_bytes([b[0], b[1]]) as f32;
            if normalized { (v / 32767.0).max(-1.0) } else { v }
        }
        DataType::U16 => {
            let v = u16::from_le_bytes([b[0], b[1]]) as f32;
            if normalized { v / 65535.0 } else { v }
        }
        DataType::U32 => u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32,
        DataType::F32 => f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
    }
}

/// Area-weighted vertex normals for meshes exported without them.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
