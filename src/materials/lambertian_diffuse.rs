// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::texture::{lookup_or, Texture};
use crate::math::constants::{ Float, INV_PI, Vector2f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf };
use std::sync::Arc;

pub struct LambertianDiffuseBSDF {
    albedo: RGBSpectrum,
    texture: Option<Arc<dyn Texture>>,
}

impl Default for LambertianDiffuseBSDF {
    fn default() -> Self {
        Self::new(RGBSpectrum::from_value(0.5))
    }
}

impl LambertianDiffuseBSDF {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self { albedo, texture: None }
    }

    pub fn with_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    fn albedo(&self, uv: &Vector2f) -> RGBSpectrum {
        lookup_or(&self.texture, uv, self.albedo)
    }

    fn front_facing(record: &BSDFQueryRecord) -> bool {
        record.measure == Measure::SolidAngle
            && Frame::cos_theta(&record.wi) > 0.0
            && Frame::cos_theta(&record.wo) > 0.0
    }
}

impl BSDF for LambertianDiffuseBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        if !Self::front_facing(record) {
            return RGBSpectrum::default();
        }
        self.albedo(&record.uv) * INV_PI
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if !Self::front_facing(record) {
            return 0.0;
        }
        square_to_cosine_hemisphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        if Frame::cos_theta(&record.wi) <= 0.0 {
            return RGBSpectrum::default();
        }

        record.measure = Measure::SolidAngle;
        record.wo = square_to_cosine_hemisphere(sample);
        record.eta = 1.0;
        if Frame::cos_theta(&record.wo) <= 0.0 {
            return RGBSpectrum::default();
        }

        // eval * cos / pdf collapses to the albedo.
        self.albedo(&record.uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector3f;
    use crate::textures::constant::ConstantTexture;

    #[test]
    fn test_diffuse_rejects_backside_and_discrete() {
        let bsdf = LambertianDiffuseBSDF::default();
        let uv = Vector2f::new(0.5, 0.5);
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let down = Vector3f::new(0.0, 0.0, -1.0);

        let ok = BSDFQueryRecord::with_directions(up, up, Measure::SolidAngle, uv);
        assert!((bsdf.eval(&ok)[0] - 0.5 * INV_PI).abs() < 1e-6);

        let back = BSDFQueryRecord::with_directions(up, down, Measure::SolidAngle, uv);
        assert!(bsdf.eval(&back).is_black());
        assert_eq!(bsdf.pdf(&back), 0.0);

        let discrete = BSDFQueryRecord::with_directions(up, up, Measure::Discrete, uv);
        assert!(bsdf.eval(&discrete).is_black());
    }

    #[test]
    fn test_diffuse_texture_fallback() {
        let uv = Vector2f::new(0.2, 0.2);
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let record = BSDFQueryRecord::with_directions(up, up, Measure::SolidAngle, uv);

        let black = LambertianDiffuseBSDF::new(RGBSpectrum::from_value(0.25))
            .with_texture(Arc::new(ConstantTexture::new(RGBSpectrum::default())));
        assert!((black.eval(&record)[1] - 0.25 * INV_PI).abs() < 1e-6);

        let red = LambertianDiffuseBSDF::default()
            .with_texture(Arc::new(ConstantTexture::new(RGBSpectrum::new(1.0, 0.0, 0.0))));
        let value = red.eval(&record);
        assert!((value[0] - INV_PI).abs() < 1e-6);
        assert_eq!(value[1], 0.0);
    }
}
