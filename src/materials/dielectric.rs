// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::error::SceneError;
use crate::materials::microfacet::{fresnel_dielectric, DEFAULT_EXT_IOR, DEFAULT_INT_IOR};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;

/// Smooth glass interface: ideal reflection or refraction.
pub struct DielectricBSDF {
    int_ior: Float,
    ext_ior: Float,
}

impl Default for DielectricBSDF {
    fn default() -> Self {
        Self { int_ior: DEFAULT_INT_IOR, ext_ior: DEFAULT_EXT_IOR }
    }
}

impl DielectricBSDF {
    pub fn new(int_ior: Float, ext_ior: Float) -> Result<Self, SceneError> {
        if !(int_ior > 0.0) {
            return Err(SceneError::invalid("int_ior", int_ior, "must be positive"));
        }
        if !(ext_ior > 0.0) {
            return Err(SceneError::invalid("ext_ior", ext_ior, "must be positive"));
        }
        Ok(Self { int_ior, ext_ior })
    }
}

impl BSDF for DielectricBSDF {
    fn eval(&self, _record: &BSDFQueryRecord) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn pdf(&self, _record: &BSDFQueryRecord) -> Float {
        0.0
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        let cos_i = Frame::cos_theta(&record.wi);
        let fr = fresnel_dielectric(cos_i, self.ext_ior, self.int_ior);
        record.measure = Measure::Discrete;

        if sample.x < fr {
            record.wo = Vector3f::new(-record.wi.x, -record.wi.y, record.wi.z);
            record.eta = 1.0;
            return RGBSpectrum::one();
        }

        let (eta_i, eta_t, n_sign) = if cos_i < 0.0 {
            (self.int_ior, self.ext_ior, -1.0)
        } else {
            (self.ext_ior, self.int_ior, 1.0)
        };
        let eta = eta_i / eta_t;
        let cos_i_abs = cos_i.abs();
        let sin2_t = eta * eta * (1.0 - cos_i_abs * cos_i_abs).max(0.0);
        let cos_t = (1.0 - sin2_t).max(0.0).sqrt();

        record.wo = Vector3f::new(-eta * record.wi.x,
                                  -eta * record.wi.y,
                                  -n_sign * cos_t);
        record.eta = eta;
        RGBSpectrum::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dielectric_is_discrete() {
        let bsdf = DielectricBSDF::default();
        let wi = Vector3f::new(0.2, 0.1, 0.97).normalize();
        let mut record = BSDFQueryRecord::new(wi, Vector2f::zeros());
        let weight = bsdf.sample(&mut record, &Vector2f::new(0.9, 0.3));

        assert_eq!(record.measure, Measure::Discrete);
        assert_eq!(weight, RGBSpectrum::one());
        assert!(record.wo.z < 0.0);
        assert!((record.wo.norm() - 1.0).abs() < 1e-4);
        assert!(bsdf.eval(&record).is_black());
        assert_eq!(bsdf.pdf(&record), 0.0);
    }

    #[test]
    fn test_dielectric_reflects_below_fresnel() {
        let bsdf = DielectricBSDF::default();
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let mut record = BSDFQueryRecord::new(wi, Vector2f::zeros());
        bsdf.sample(&mut record, &Vector2f::new(0.0, 0.5));
        assert!((record.wo - Vector3f::new(-0.6, 0.0, 0.8)).norm() < 1e-6);
        assert_eq!(record.eta, 1.0);
    }

    #[test]
    fn test_matched_indices_pass_straight_through() {
        let bsdf = DielectricBSDF::new(1.0, 1.0).unwrap();
        for wi in [Vector3f::new(0.3, -0.2, 0.93).normalize(),
                   Vector3f::new(-0.5, 0.1, -0.86).normalize()].iter() {
            let mut record = BSDFQueryRecord::new(*wi, Vector2f::zeros());
            bsdf.sample(&mut record, &Vector2f::new(0.0, 0.0));
            assert!((record.wo + *wi).norm() < 1e-5);
        }
    }

    #[test]
    fn test_rejects_bad_ior() {
        assert!(DielectricBSDF::new(-1.0, 1.0).is_err());
        assert!(DielectricBSDF::new(1.5, 0.0).is_err());
    }
}
