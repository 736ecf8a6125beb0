// Copyright @yucwang 2026

use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::core::error::SceneError;
use crate::core::texture::Texture;
use crate::math::constants::{Float, INFINITY, INV_PI, INV_TWOPI, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::math::warp::{square_to_uniform_spherical_cap, square_to_uniform_spherical_cap_pdf};
use std::sync::Arc;

/// Light arriving from infinitely far away inside a cone around local +z.
/// With `theta_a = 180` it covers the whole sphere and acts as the
/// environment.
pub struct DistantSphereLight {
    radiance: RGBSpectrum,
    cos_theta_max: Float,
    to_world: Transform,
    texture: Option<Arc<dyn Texture>>,
}

impl DistantSphereLight {
    pub fn new(radiance: RGBSpectrum, theta_a: Float, to_world: Transform) -> Result<Self, SceneError> {
        if !(theta_a > 0.0 && theta_a <= 180.0) {
            return Err(SceneError::invalid("theta_a", theta_a, "must lie in (0, 180] degrees"));
        }
        let cos_theta_max = if theta_a >= 180.0 { -1.0 } else { theta_a.to_radians().cos() };
        Ok(Self { radiance, cos_theta_max, to_world, texture: None })
    }

    /// Constant radiance from every direction.
    pub fn environment(radiance: RGBSpectrum) -> Self {
        Self { radiance, cos_theta_max: -1.0, to_world: Transform::default(), texture: None }
    }

    pub fn with_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    fn to_local(&self, wi: &Vector3f) -> Option<Vector3f> {
        let local = self.to_world.inv_apply_vector(*wi);
        let len = local.norm();
        if len > 0.0 { Some(local / len) } else { None }
    }

    fn covers_sphere(&self) -> bool {
        self.cos_theta_max <= -1.0
    }

    // Cap samples land on the boundary up to rounding.
    fn inside_cap(&self, local: &Vector3f) -> bool {
        self.covers_sphere() || local.z >= self.cos_theta_max - 1e-5
    }

    fn radiance_along(&self, local: &Vector3f) -> RGBSpectrum {
        match &self.texture {
            // The texture is stored top row first, so flip v on lookup.
            Some(texture) => {
                let uv = direction_to_equirect(local);
                texture.eval(Vector2f::new(uv.x, 1.0 - uv.y))
            }
            None => self.radiance,
        }
    }
}

/// Equirectangular coordinates of a unit direction, y up.
pub fn direction_to_equirect(d: &Vector3f) -> Vector2f {
    let raw_u = d.x.atan2(-d.z) * INV_TWOPI;
    let u = raw_u - raw_u.floor();
    let v = d.y.max(-1.0).min(1.0).acos() * INV_PI;
    Vector2f::new(u, v)
}

impl Emitter for DistantSphereLight {
    fn eval(&self, record: &EmitterQueryRecord) -> RGBSpectrum {
        match self.to_local(&record.wi) {
            Some(local) if self.inside_cap(&local) => self.radiance_along(&local),
            _ => RGBSpectrum::default(),
        }
    }

    fn sample(&self, record: &mut EmitterQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        let local = square_to_uniform_spherical_cap(sample, self.cos_theta_max);
        let wi = self.to_world.apply_vector(local);
        let len = wi.norm();
        if len <= 0.0 {
            return RGBSpectrum::default();
        }
        record.wi = wi / len;
        record.p = record.ref_p + record.wi;
        record.n = -record.wi;
        record.dist = INFINITY;
        record.pdf = self.pdf(record);
        if record.pdf <= 0.0 || !record.pdf.is_finite() {
            return RGBSpectrum::default();
        }
        self.eval(record) / record.pdf
    }

    fn pdf(&self, record: &EmitterQueryRecord) -> Float {
        match self.to_local(&record.wi) {
            Some(local) if self.inside_cap(&local) => {
                let clamped = Vector3f::new(local.x, local.y, local.z.max(self.cos_theta_max));
                square_to_uniform_spherical_cap_pdf(&clamped, self.cos_theta_max)
            }
            _ => 0.0,
        }
    }
}
