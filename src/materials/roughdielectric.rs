// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::error::SceneError;
use crate::core::texture::{lookup_or, Texture};
use crate::materials::microfacet::{
    beckmann_d, fresnel_dielectric, reflect, refract, smith_g, DEFAULT_EXT_IOR, DEFAULT_INT_IOR,
};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{choose_branch, square_to_beckmann, square_to_beckmann_pdf, Branch};
use std::sync::Arc;

/// Rough glass with Beckmann reflection and transmission lobes.
///
/// Transmission keeps Walter's eta_t^2 factor, so refraction carries unit
/// throughput like [`DielectricBSDF`](super::dielectric::DielectricBSDF)
/// and the two agree as alpha goes to zero.
pub struct RoughDielectricBSDF {
    alpha: Float,
    int_ior: Float,
    ext_ior: Float,
    roughness_texture: Option<Arc<dyn Texture>>,
}

impl Default for RoughDielectricBSDF {
    fn default() -> Self {
        Self { alpha: 0.1, int_ior: DEFAULT_INT_IOR, ext_ior: DEFAULT_EXT_IOR, roughness_texture: None }
    }
}

// Directions mirrored so that wi lies in the upper hemisphere, with the
// indices on each side.
struct Oriented {
    wi: Vector3f,
    wo: Vector3f,
    eta_i: Float,
    eta_t: Float,
    flipped: bool,
}

impl RoughDielectricBSDF {
    pub fn new(alpha: Float, int_ior: Float, ext_ior: Float) -> Result<Self, SceneError> {
        if !(int_ior > 0.0) {
            return Err(SceneError::invalid("int_ior", int_ior, "must be positive"));
        }
        if !(ext_ior > 0.0) {
            return Err(SceneError::invalid("ext_ior", ext_ior, "must be positive"));
        }
        Ok(Self { alpha: alpha.max(1e-4), int_ior, ext_ior, roughness_texture: None })
    }

    pub fn with_roughness_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.roughness_texture = Some(texture);
        self
    }

    fn alpha(&self, uv: &Vector2f) -> Float {
        let scale = lookup_or(&self.roughness_texture, uv, RGBSpectrum::one()).luminance();
        (self.alpha * scale).max(1e-4)
    }

    fn orient(&self, wi: &Vector3f, wo: &Vector3f) -> Oriented {
        if Frame::cos_theta(wi) < 0.0 {
            Oriented { wi: -wi, wo: -wo, eta_i: self.int_ior, eta_t: self.ext_ior, flipped: true }
        } else {
            Oriented { wi: *wi, wo: *wo, eta_i: self.ext_ior, eta_t: self.int_ior, flipped: false }
        }
    }

    // Probability of picking the reflection lobe.
    fn reflect_probability(&self, wi: &Vector3f) -> Float {
        fresnel_dielectric(Frame::cos_theta(wi), self.ext_ior, self.int_ior)
    }

    // Microfacet normal joining wi and wo, in the upper hemisphere of the
    // oriented frame. The second value holds the eta_t/eta_i ratio used for
    // the transmission half vector, or 1 for reflection.
    fn half_vector(o: &Oriented) -> Option<(Vector3f, Float, bool)> {
        let reflection = Frame::cos_theta(&o.wo) > 0.0;
        let eta = if reflection { 1.0 } else { o.eta_t / o.eta_i };
        let h = if reflection { o.wi + o.wo } else { -(o.wi + o.wo * eta) };
        let len = h.norm();
        if len <= 0.0 || !len.is_finite() {
            return None;
        }
        let mut m = h / len;
        if m.z < 0.0 {
            m = -m;
        }
        if o.wi.dot(&m) <= 0.0 {
            return None;
        }
        let wo_m = o.wo.dot(&m);
        if (reflection && wo_m <= 0.0) || (!reflection && wo_m >= 0.0) {
            return None;
        }
        Some((m, eta, reflection))
    }

    fn valid(record: &BSDFQueryRecord) -> bool {
        record.measure == Measure::SolidAngle
            && Frame::cos_theta(&record.wi) != 0.0
            && Frame::cos_theta(&record.wo) != 0.0
    }
}

impl BSDF for RoughDielectricBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        if !Self::valid(record) {
            return RGBSpectrum::default();
        }
        let o = self.orient(&record.wi, &record.wo);
        let (m, eta, reflection) = match Self::half_vector(&o) {
            Some(h) => h,
            None => return RGBSpectrum::default(),
        };
        let alpha = self.alpha(&record.uv);
        let cos_i = Frame::cos_theta(&o.wi).abs();
        let cos_o = Frame::cos_theta(&o.wo).abs();
        let d = beckmann_d(&m, alpha);
        let g = smith_g(&o.wi, &o.wo, &m, alpha);
        let f = fresnel_dielectric(o.wi.dot(&m), o.eta_i, o.eta_t);

        let value = if reflection {
            f * d * g / (4.0 * cos_i * cos_o)
        } else {
            let wi_m = o.wi.dot(&m);
            let wo_m = o.wo.dot(&m);
            let denom = wi_m + eta * wo_m;
            if denom.abs() <= 1e-6 {
                return RGBSpectrum::default();
            }
            ((1.0 - f) * d * g * eta * eta * wi_m * wo_m / (cos_i * cos_o * denom * denom)).abs()
        };
        if value.is_finite() { RGBSpectrum::from_value(value) } else { RGBSpectrum::default() }
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if !Self::valid(record) {
            return 0.0;
        }
        let o = self.orient(&record.wi, &record.wo);
        let (m, eta, reflection) = match Self::half_vector(&o) {
            Some(h) => h,
            None => return 0.0,
        };
        let alpha = self.alpha(&record.uv);
        let fr = self.reflect_probability(&record.wi);
        let pdf_m = square_to_beckmann_pdf(&m, alpha);
        let wo_m = o.wo.dot(&m);

        let pdf = if reflection {
            fr * pdf_m / (4.0 * wo_m.abs())
        } else {
            let denom = o.wi.dot(&m) + eta * wo_m;
            (1.0 - fr) * pdf_m * eta * eta * wo_m.abs() / (denom * denom)
        };
        if pdf.is_finite() { pdf } else { 0.0 }
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        if Frame::cos_theta(&record.wi) == 0.0 {
            return RGBSpectrum::default();
        }
        let o = self.orient(&record.wi, &record.wi);
        let alpha = self.alpha(&record.uv);
        let fr = self.reflect_probability(&record.wi);

        let (branch, u) = choose_branch(fr, sample);
        let m = square_to_beckmann(&u, alpha);
        if o.wi.dot(&m) <= 0.0 {
            return RGBSpectrum::default();
        }
        let wo = match branch {
            Branch::First => {
                record.eta = 1.0;
                reflect(&o.wi, &m)
            }
            Branch::Second => {
                let eta = o.eta_i / o.eta_t;
                match refract(&o.wi, &m, eta) {
                    Some(wt) => {
                        record.eta = eta;
                        wt
                    }
                    None => return RGBSpectrum::default(),
                }
            }
        };
        // Reflection stays on wi's side, refraction crosses.
        let crossed = Frame::cos_theta(&wo) < 0.0;
        if crossed != (branch == Branch::Second) || Frame::cos_theta(&wo) == 0.0 {
            return RGBSpectrum::default();
        }
        record.wo = if o.flipped { -wo } else { wo };
        record.measure = Measure::SolidAngle;

        let pdf = self.pdf(record);
        if pdf <= 0.0 || !pdf.is_finite() {
            return RGBSpectrum::default();
        }
        self.eval(record) * Frame::cos_theta(&record.wo).abs() / pdf
    }
}
