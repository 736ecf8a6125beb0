// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::texture::{lookup_or, Texture};
use crate::materials::microfacet::reflect;
use crate::math::constants::{Float, INV_PI, INV_TWOPI, Vector2f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{
    choose_branch, square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf,
    square_to_cosine_power_hemisphere, square_to_cosine_power_hemisphere_pdf, Branch,
};
use std::sync::Arc;

/// Diffuse plus a normalized Blinn lobe around the half vector.
pub struct BlinnPhongBSDF {
    exponent: Float,
    kd: RGBSpectrum,
    ks: Float,
    kd_texture: Option<Arc<dyn Texture>>,
}

impl Default for BlinnPhongBSDF {
    fn default() -> Self {
        Self::new(100.0, RGBSpectrum::from_value(0.5), 1.0)
    }
}

impl BlinnPhongBSDF {
    pub fn new(exponent: Float, kd: RGBSpectrum, ks: Float) -> Self {
        Self { exponent: exponent.max(0.0), kd, ks: ks.max(0.0).min(1.0), kd_texture: None }
    }

    pub fn with_kd_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.kd_texture = Some(texture);
        self
    }

    fn coefficients(&self, uv: &Vector2f) -> (RGBSpectrum, Float) {
        let kd = lookup_or(&self.kd_texture, uv, self.kd);
        (kd, self.ks * (1.0 - kd.max_coeff()).max(0.0))
    }

    fn valid(record: &BSDFQueryRecord) -> bool {
        record.measure == Measure::SolidAngle
            && Frame::cos_theta(&record.wi) > 0.0
            && Frame::cos_theta(&record.wo) > 0.0
    }
}

impl BSDF for BlinnPhongBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        if !Self::valid(record) {
            return RGBSpectrum::default();
        }
        let (kd, ks) = self.coefficients(&record.uv);
        let wh = (record.wi + record.wo).normalize();
        let lobe = (self.exponent + 2.0) * INV_TWOPI * Frame::cos_theta(&wh).max(0.0).powf(self.exponent);
        kd * INV_PI + RGBSpectrum::from_value(ks * lobe)
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if !Self::valid(record) {
            return 0.0;
        }
        let (_, ks) = self.coefficients(&record.uv);
        let wh = (record.wi + record.wo).normalize();
        let jacobian = 4.0 * wh.dot(&record.wo);
        let specular = if jacobian > 0.0 {
            square_to_cosine_power_hemisphere_pdf(&wh, self.exponent) / jacobian
        } else {
            0.0
        };
        ks * specular + (1.0 - ks) * square_to_cosine_hemisphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        if Frame::cos_theta(&record.wi) <= 0.0 {
            return RGBSpectrum::default();
        }
        let (_, ks) = self.coefficients(&record.uv);

        let (branch, u) = choose_branch(ks, sample);
        record.wo = match branch {
            Branch::First => reflect(&record.wi, &square_to_cosine_power_hemisphere(&u, self.exponent)),
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
