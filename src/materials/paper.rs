// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::texture::{lookup_or, Texture};
use crate::math::constants::{Float, INV_PI, Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{choose_branch, square_to_cosine_hemisphere, Branch};
use std::sync::Arc;

/// Thin two-sided sheet: diffuse on either face, with a share of light
/// passing straight through.
pub struct PaperBSDF {
    albedo: RGBSpectrum,
    transparency: Float,
    texture: Option<Arc<dyn Texture>>,
}

impl Default for PaperBSDF {
    fn default() -> Self {
        Self::new(RGBSpectrum::from_value(0.5), 0.5)
    }
}

impl PaperBSDF {
    pub fn new(albedo: RGBSpectrum, transparency: Float) -> Self {
        Self { albedo, transparency: transparency.max(0.0).min(1.0), texture: None }
    }

    pub fn with_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    fn same_side(record: &BSDFQueryRecord) -> bool {
        record.measure == Measure::SolidAngle
            && Frame::cos_theta(&record.wi) * Frame::cos_theta(&record.wo) > 0.0
    }
}

impl BSDF for PaperBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        if !Self::same_side(record) {
            return RGBSpectrum::default();
        }
        lookup_or(&self.texture, &record.uv, self.albedo) * ((1.0 - self.transparency) * INV_PI)
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if !Self::same_side(record) {
            return 0.0;
        }
        (1.0 - self.transparency) * Frame::cos_theta(&record.wo).abs() * INV_PI
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        let cos_i = Frame::cos_theta(&record.wi);
        if cos_i == 0.0 {
            return RGBSpectrum::default();
        }
        record.eta = 1.0;

        let (branch, u) = choose_branch(self.transparency, sample);
        match branch {
            Branch::First => {
                record.wo = -record.wi;
                record.measure = Measure::Discrete;
                RGBSpectrum::one()
            }
            Branch::Second => {
                let wo = square_to_cosine_hemisphere(&u);
                record.wo = if cos_i > 0.0 { wo } else { Vector3f::new(wo.x, wo.y, -wo.z) };
                record.measure = Measure::SolidAngle;
                if self.pdf(record) <= 0.0 {
                    return RGBSpectrum::default();
                }
                lookup_or(&self.texture, &record.uv, self.albedo)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_branches() {
        let paper = PaperBSDF::new(RGBSpectrum::from_value(0.8), 0.25);
        let wi = Vector3f::new(0.0, 0.6, -0.8);

        let mut through = BSDFQueryRecord::new(wi, Vector2f::zeros());
        assert_eq!(paper.sample(&mut through, &Vector2f::new(0.1, 0.5)), RGBSpectrum::one());
        assert_eq!(through.measure, Measure::Discrete);
        assert!((through.wo + wi).norm() < 1e-6);

        let mut diffuse = BSDFQueryRecord::new(wi, Vector2f::zeros());
        let weight = paper.sample(&mut diffuse, &Vector2f::new(0.6, 0.5));
        assert_eq!(diffuse.measure, Measure::SolidAngle);
        assert!(diffuse.wo.z < 0.0);
        assert!((weight[0] - 0.8).abs() < 1e-6);

        let value = paper.eval(&diffuse)[0] * diffuse.wo.z.abs() / paper.pdf(&diffuse);
        assert!((value - 0.8).abs() < 1e-4);
    }
}
