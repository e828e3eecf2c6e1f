use super::camera::Camera;
use super::geometry::{Aabb, Plane};
use super::session::SessionParams;
use glam::{Mat4, Vec2, Vec3};

/// Canvas rectangle in client (CSS pixel) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Client coordinates relative to the canvas' top-left corner.
    #[inline]
    pub fn local(&self, client: Vec2) -> Vec2 {
        Vec2::new(client.x - self.left, client.y - self.top)
    }

    /// Client coordinates mapped to normalized device coordinates (+Y up).
    /// `None` while the canvas has no area.
    pub fn to_ndc(&self, client: Vec2) -> Option<Vec2> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let local = self.local(client);
        Some(Vec2::new(
            local.x / self.width * 2.0 - 1.0,
            -(local.y / self.height) * 2.0 + 1.0,
        ))
    }
}

/// Rectangle on the bow plane the bow is allowed to travel in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BowRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl BowRect {
    /// Instrument XY extent with `margin` (fraction of the extent) trimmed
    /// from each side.
    pub fn inset(bounds: &Aabb, margin: f32) -> Self {
        let size = bounds.size();
        let m = Vec2::new(size.x * margin, size.y * margin);
        Self {
            min: bounds.min.truncate() + m,
            max: bounds.max.truncate() - m,
        }
    }

    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.max(self.min.x).min(self.max.x),
            p.y.max(self.min.y).min(self.max.y),
        )
    }
}

/// Where the instrument sits in the world and the bow plane derived from it.
#[derive(Clone, Debug)]
pub struct InstrumentLayout {
    /// Uniform scale applied to the raw model.
    pub scale: f32,
    /// Translation applied after scaling.
    pub translation: Vec3,
    /// World-space bounds of the placed instrument.
    pub bounds: Aabb,
    pub plane: Plane,
    pub plane_z: f32,
    pub rect: BowRect,
}

impl InstrumentLayout {
    /// Place a raw model: re-pivot on its raw center, scale to the target
    /// height, stand it on y = 0 and lower it by the configured drop.
    ///
    /// The pivot offset is not scaled, so for models far from the origin the
    /// result is not centered on X/Z.
    pub fn fit(raw: &Aabb, params: &SessionParams) -> Self {
        let scale = params.instrument_height / raw.size().y.max(params.min_model_height);
        let mut translation = -raw.center();
        let standing = raw.scaled_translated(scale, translation);
        translation.y -= standing.min.y;
        translation.y -= params.instrument_drop;

        let bounds = raw.scaled_translated(scale, translation);
        let center = bounds.center();
        let plane_z = center.z + params.plane_offset_z;
        let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::new(center.x, center.y, plane_z));
        Self {
            scale,
            translation,
            bounds,
            plane,
            plane_z,
            rect: BowRect::inset(&bounds, params.bounds_margin),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Bow target for a pointer at `ndc`: the ray hit on the bow plane with
    /// X/Y clamped to the rectangle and Z pinned to the plane depth.
    pub fn map_pointer(&self, camera: &Camera, ndc: Vec2) -> Option<Vec3> {
        let hit = camera.ray_through_ndc(ndc).intersect_plane(&self.plane)?;
        Some(self.rect.clamp(hit.truncate()).extend(self.plane_z))
    }

    pub fn place_bow(&self, params: &SessionParams) -> BowPlacement {
        let center = self.bounds.center();
        BowPlacement {
            scale: self.scale * params.bow_scale_ratio,
            rest: Vec3::new(
                center.x,
                (self.rect.min.y + self.rect.max.y) * params.bow_rest_height,
                self.plane_z,
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BowPlacement {
    pub scale: f32,
    pub rest: Vec3,
}

impl BowPlacement {
    pub fn model_matrix(&self, position: Vec3) -> Mat4 {
        Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

/// Bow target and the smoothed position actually drawn.
#[derive(Clone, Copy, Debug)]
pub struct BowMotion {
    pub placement: BowPlacement,
    pub target: Vec3,
    pub visual: Vec3,
}

impl BowMotion {
    pub fn at_rest(placement: BowPlacement) -> Self {
        Self {
            placement,
            target: placement.rest,
            visual: placement.rest,
        }
    }

    pub fn snap(&mut self) {
        self.visual = self.target;
    }

    /// Exponential approach: the remaining error shrinks by `1 - smoothing`.
    pub fn step(&mut self, smoothing: f32) -> Vec3 {
        self.visual = self.visual.lerp(self.target, smoothing);
        self.visual
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.placement.model_matrix(self.visual)
    }
}
