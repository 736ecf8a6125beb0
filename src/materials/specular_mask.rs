// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::texture::Texture;
use crate::math::constants::{Float, INV_PI, Vector2f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{
    square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf, square_to_cosine_power_hemisphere,
};
use std::sync::Arc;

/// Texel brightness at or above which the mask selects the glossy lobe.
pub const MASK_THRESHOLD: Float = 0.5;

/// Lambertian where the mask is dark, a glossy mirror where it is bright.
///
/// The glossy lobe reflects `wi` about a half vector drawn from a cosine
/// power lobe and is treated as a discrete event: `eval` and `pdf` are zero
/// there and `sample` returns the `specular` throughput.
pub struct SpecularMaskBSDF {
    albedo: RGBSpectrum,
    specular: RGBSpectrum,
    exponent: Float,
    mask: Option<Arc<dyn Texture>>,
}

impl Default for SpecularMaskBSDF {
    fn default() -> Self {
        Self::new(RGBSpectrum::from_value(0.5), RGBSpectrum::from_value(0.5), 100.0)
    }
}

impl SpecularMaskBSDF {
    pub fn new(albedo: RGBSpectrum, specular: RGBSpectrum, exponent: Float) -> Self {
        Self { albedo, specular, exponent: exponent.max(0.0), mask: None }
    }

    pub fn with_mask(mut self, mask: Arc<dyn Texture>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Without a mask the whole surface is diffuse.
    pub fn is_glossy_at(&self, uv: &Vector2f) -> bool {
        match &self.mask {
            Some(mask) => mask.eval(*uv).max_coeff() >= MASK_THRESHOLD,
            None => false,
        }
    }

    fn diffuse_pair(record: &BSDFQueryRecord) -> bool {
        record.measure == Measure::SolidAngle
            && Frame::cos_theta(&record.wi) > 0.0
            && Frame::cos_theta(&record.wo) > 0.0
    }
}

impl BSDF for SpecularMaskBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        if !Self::diffuse_pair(record) || self.is_glossy_at(&record.uv) {
            return RGBSpectrum::default();
        }
        self.albedo * INV_PI
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if !Self::diffuse_pair(record) || self.is_glossy_at(&record.uv) {
            return 0.0;
        }
        square_to_cosine_hemisphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        if Frame::cos_theta(&record.wi) <= 0.0 {
            return RGBSpectrum::default();
        }
        record.eta = 1.0;

        if !self.is_glossy_at(&record.uv) {
            record.measure = Measure::SolidAngle;
            record.wo = square_to_cosine_hemisphere(sample);
            return self.albedo;
        }

        let wh = square_to_cosine_power_hemisphere(sample, self.exponent);
        record.wo = 2.0 * wh.dot(&record.wi) * wh - record.wi;
        record.measure = Measure::Discrete;
        if Frame::cos_theta(&record.wo) <= 0.0 {
            return RGBSpectrum::default();
        }
        self.specular
    }
}
