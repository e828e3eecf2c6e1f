//! Fixed perspective camera used for both drawing and pointer picking.
//!
//! The camera is positioned once (initially, then framed to the instrument)
//! and never follows input. Picking rays are derived from the same matrices
//! the renderer uses so the bow lands under the pointer.

use super::constants::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_INITIAL_EYE, CAMERA_NEAR};
use super::geometry::{Aabb, Ray};
use glam::{Mat4, Vec2, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Camera at its pre-framing pose, looking down -Z.
    pub fn initial(aspect: f32) -> Self {
        let eye = Vec3::from_array(CAMERA_INITIAL_EYE);
        Self {
            eye,
            target: eye - Vec3::Z,
            up: Vec3::Y,
            aspect: sanitize_aspect(aspect),
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// World-space ray from the eye through a point given in NDC.
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let p = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.eye, (p - self.eye).normalize_or_zero())
    }

    /// Move the camera back along +Z until `bounds` fits the view with the
    /// given margin, looking at its (optionally raised) center.
    pub fn frame_bounds(&mut self, bounds: &Aabb, margin: f32, align_y: f32) {
        let size = bounds.size();
        let center = bounds.center();
        let two_tan = 2.0 * (self.fovy_radians * 0.5).tan();
        let fit_height = size.y * margin / two_tan;
        let fit_width = size.x * margin / two_tan * self.aspect;
        let distance = fit_height.max(fit_width);

        let look = Vec3::new(center.x, center.y + align_y * size.y, center.z);
        self.eye = look + Vec3::Z * distance;
        self.target = look;
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}
