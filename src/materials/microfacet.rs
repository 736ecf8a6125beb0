// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::texture::{lookup_or, Texture};
use crate::math::constants::{Float, INV_PI, Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{
    beckmann_distribution, choose_branch, square_to_beckmann, square_to_beckmann_pdf,
    square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf, Branch,
};
use std::sync::Arc;

pub const DEFAULT_INT_IOR: Float = 1.5046;
pub const DEFAULT_EXT_IOR: Float = 1.000277;

pub fn beckmann_d(m: &Vector3f, alpha: Float) -> Float {
    beckmann_distribution(m, alpha, alpha)
}

/// Rational Smith shadowing for one direction `v` against microfacet normal `m`.
pub fn smith_g1(v: &Vector3f, m: &Vector3f, alpha: Float) -> Float {
    let cos_v = Frame::cos_theta(v);
    if cos_v == 0.0 || v.dot(m) / cos_v <= 0.0 {
        return 0.0;
    }
    let tan_theta = Frame::tan_theta(v).abs();
    if tan_theta == 0.0 {
        return 1.0;
    }
    let b = 1.0 / (alpha * tan_theta);
    if b >= 1.6 {
        return 1.0;
    }
    let b2 = b * b;
    (3.535 * b + 2.181 * b2) / (1.0 + 2.276 * b + 2.577 * b2)
}

pub fn smith_g(wi: &Vector3f, wo: &Vector3f, m: &Vector3f, alpha: Float) -> Float {
    smith_g1(wi, m, alpha) * smith_g1(wo, m, alpha)
}

pub fn reflect(wi: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * wi.dot(m) * m - wi
}

/// Refracts `wi` through a surface with normal `m` on `wi`'s side.
/// `eta` is eta_i / eta_t. `None` on total internal reflection.
pub fn refract(wi: &Vector3f, m: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_i = wi.dot(m).max(-1.0).min(1.0);
    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let wt = -eta * wi + (eta * cos_i - cos_t) * m;
    Some(wt)
}

/// Unpolarized dielectric Fresnel reflectance. A negative `cos_i` means the
/// query comes from the interior side and the indices are swapped.
pub fn fresnel_dielectric(cos_i: Float, ext_ior: Float, int_ior: Float) -> Float {
    if ext_ior == int_ior {
        return 0.0;
    }
    let mut cos_i = cos_i.max(-1.0).min(1.0);
    let entering = cos_i > 0.0;
    let (eta_i, eta_t) = if entering { (ext_ior, int_ior) } else { (int_ior, ext_ior) };
    cos_i = cos_i.abs();

    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let eta = eta_i / eta_t;
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let r_parl = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    0.5 * (r_parl * r_parl + r_perp * r_perp)
}

/// Diffuse base under a Beckmann specular coat.
pub struct MicrofacetBSDF {
    alpha: Float,
    int_ior: Float,
    ext_ior: Float,
    kd: RGBSpectrum,
    kd_texture: Option<Arc<dyn Texture>>,
}

impl Default for MicrofacetBSDF {
    fn default() -> Self {
        Self::new(0.1, DEFAULT_INT_IOR, DEFAULT_EXT_IOR, RGBSpectrum::from_value(0.5))
    }
}

impl MicrofacetBSDF {
    pub fn new(alpha: Float, int_ior: Float, ext_ior: Float, kd: RGBSpectrum) -> Self {
        Self { alpha: alpha.max(1e-4), int_ior, ext_ior, kd, kd_texture: None }
    }

    pub fn with_kd_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.kd_texture = Some(texture);
        self
    }

    // ks keeps kd + ks from exceeding one.
    fn coefficients(&self, uv: &Vector2f) -> (RGBSpectrum, Float) {
        let kd = lookup_or(&self.kd_texture, uv, self.kd);
        let ks = (1.0 - kd.max_coeff()).max(0.0);
        (kd, ks)
    }

    fn half_vector(record: &BSDFQueryRecord) -> Option<Vector3f> {
        let h = record.wi + record.wo;
        let len = h.norm();
        if len <= 0.0 || !len.is_finite() {
            return None;
        }
        Some(h / len)
    }

    fn valid(record: &BSDFQueryRecord) -> bool {
        record.measure == Measure::SolidAngle
            && Frame::cos_theta(&record.wi) > 0.0
            && Frame::cos_theta(&record.wo) > 0.0
    }
}

impl BSDF for MicrofacetBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        if !Self::valid(record) {
            return RGBSpectrum::default();
        }
        let wh = match Self::half_vector(record) {
            Some(wh) => wh,
            None => return RGBSpectrum::default(),
        };
        let (kd, ks) = self.coefficients(&record.uv);

        let cos_i = Frame::cos_theta(&record.wi);
        let cos_o = Frame::cos_theta(&record.wo);
        let d = beckmann_d(&wh, self.alpha);
        let f = fresnel_dielectric(wh.dot(&record.wi), self.ext_ior, self.int_ior);
        let g = smith_g(&record.wi, &record.wo, &wh, self.alpha);
        let specular = ks * d * f * g / (4.0 * cos_i * cos_o);

        kd * INV_PI + RGBSpectrum::from_value(specular)
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if !Self::valid(record) {
            return 0.0;
        }
        let wh = match Self::half_vector(record) {
            Some(wh) => wh,
            None => return 0.0,
        };
        let (_, ks) = self.coefficients(&record.uv);

        let jacobian = 4.0 * wh.dot(&record.wo).abs();
        let specular = if jacobian > 0.0 { square_to_beckmann_pdf(&wh, self.alpha) / jacobian } else { 0.0 };
        ks * specular + (1.0 - ks) * square_to_cosine_hemisphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        if Frame::cos_theta(&record.wi) <= 0.0 {
            return RGBSpectrum::default();
        }
        let (_, ks) = self.coefficients(&record.uv);

        let (branch, u) = choose_branch(ks, sample);
        record.wo = match branch {
            Branch::First => {
                let wh = square_to_beckmann(&u, self.alpha);
                reflect(&record.wi, &wh)
            }
            Branch::Second => square_to_cosine_hemisphere(&u),
        };
        record.measure = Measure::SolidAngle;
        record.eta = 1.0;

        let pdf = self.pdf(record);
        if pdf <= 0.0 || !pdf.is_finite() {
            return RGBSpectrum::default();
        }
        self.eval(record) * Frame::cos_theta(&record.wo) / pdf
    }
}
