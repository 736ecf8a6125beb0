// Copyright @yucwang 2026

use crate::core::error::SceneError;
use crate::core::medium::{Medium, MediumQueryRecord};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, INFINITY, INV_FOURPI, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::square_to_uniform_sphere;

/// Medium with constant coefficients and an isotropic phase function.
pub struct HomogeneousMedium {
    sigma_a: RGBSpectrum,
    sigma_s: RGBSpectrum,
    sigma_t: RGBSpectrum,
    albedo: RGBSpectrum,
    g: Float,
    bounds: Option<AABB>,
}

impl HomogeneousMedium {
    pub fn new(sigma_a: RGBSpectrum, sigma_s: RGBSpectrum, g: Float) -> Result<Self, SceneError> {
        if sigma_a.min_coeff() < 0.0 {
            return Err(SceneError::invalid("sigma_a", sigma_a.min_coeff(), "must be non-negative"));
        }
        if sigma_s.min_coeff() < 0.0 {
            return Err(SceneError::invalid("sigma_s", sigma_s.min_coeff(), "must be non-negative"));
        }
        if !(g.abs() < 1.0) {
            return Err(SceneError::invalid("g", g, "must lie in (-1, 1)"));
        }
        let sigma_t = sigma_a + sigma_s;
        Ok(Self {
            sigma_a,
            sigma_s,
            sigma_t,
            albedo: sigma_s.safe_div(&sigma_t),
            g,
            bounds: None,
        })
    }

    pub fn with_bounds(mut self, bounds: AABB) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn sigma_a(&self) -> RGBSpectrum {
        self.sigma_a
    }

    pub fn sigma_t(&self) -> RGBSpectrum {
        self.sigma_t
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.albedo
    }

    fn sigma_t_min(&self) -> Float {
        self.sigma_t.min_coeff()
    }
}

impl Medium for HomogeneousMedium {
    fn sample(&self, record: &mut MediumQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        record.wo = square_to_uniform_sphere(sample);
        record.phase = INV_FOURPI;
        record.pdf = INV_FOURPI;
        if record.wi.dot(&record.n) < 0.0 {
            record.n = -record.n;
        }
        record.sigma_a = self.sigma_a;
        record.sigma_s = self.sigma_s;
        record.sigma_t = self.sigma_t;
        record.albedo = self.albedo;
        record.g = self.g;
        record.tr = self.transmittance(record.dist);
        RGBSpectrum::one()
    }

    fn eval(&self, _record: &MediumQueryRecord) -> RGBSpectrum {
        RGBSpectrum::from_value(INV_FOURPI)
    }

    fn pdf(&self, _record: &MediumQueryRecord) -> Float {
        INV_FOURPI
    }

    fn sample_free_path(&self, u: Float) -> Float {
        let sigma = self.sigma_t_min();
        if sigma <= 0.0 {
            return INFINITY;
        }
        -(1.0 - u).ln() / sigma
    }

    fn pdf_free_path(&self, record: &MediumQueryRecord) -> Float {
        let sigma = self.sigma_t_min();
        if sigma <= 0.0 {
            return 0.0;
        }
        sigma * (-sigma * record.dist).exp()
    }

    fn survival_free_path(&self, dist: Float) -> Float {
        let sigma = self.sigma_t_min();
        if sigma <= 0.0 {
            return 1.0;
        }
        (-sigma * dist).exp()
    }

    fn transmittance(&self, dist: Float) -> RGBSpectrum {
        self.sigma_t.map(|s| if s > 0.0 { (-s * dist).exp() } else { 1.0 })
    }

    fn sigma_s(&self) -> RGBSpectrum {
        self.sigma_s
    }

    fn is_homogeneous(&self) -> bool {
        true
    }

    fn is_in_medium(&self, p: &Vector3f) -> bool {
        self.bounds.map_or(true, |bounds| bounds.contains(p))
    }

    fn bounds(&self) -> Option<AABB> {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::{IndependentSampler, Sampler};

    fn fog() -> HomogeneousMedium {
        HomogeneousMedium::new(RGBSpectrum::new(0.1, 0.2, 0.3), RGBSpectrum::new(0.5, 0.4, 0.3), 0.0).unwrap()
    }

    #[test]
    fn test_extinction_is_absorption_plus_scattering() {
        let medium = fog();
        for c in 0..3 {
            assert!((medium.sigma_t()[c] - medium.sigma_a()[c] - medium.sigma_s()[c]).abs() < 1e-6);
        }
        assert!((medium.albedo()[0] - 0.5 / 0.6).abs() < 1e-6);

        let clear = HomogeneousMedium::new(RGBSpectrum::zero(), RGBSpectrum::zero(), 0.0).unwrap();
        assert!(clear.albedo().is_black());
        assert!(clear.sample_free_path(0.5).is_infinite());
        assert_eq!(clear.transmittance(10.0), RGBSpectrum::one());
    }

    #[test]
    fn test_transmittance_decreases() {
        let medium = fog();
        let mut previous = medium.transmittance(0.0);
        assert_eq!(previous, RGBSpectrum::one());
        for i in 1..20 {
            let tr = medium.transmittance(i as Float * 0.5);
            for c in 0..3 {
                assert!(tr[c] < previous[c]);
            }
            previous = tr;
        }
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(HomogeneousMedium::new(RGBSpectrum::from_value(-0.1), RGBSpectrum::one(), 0.0).is_err());
        assert!(HomogeneousMedium::new(RGBSpectrum::one(), RGBSpectrum::from_value(-1.0), 0.0).is_err());
        assert!(HomogeneousMedium::new(RGBSpectrum::one(), RGBSpectrum::one(), 1.0).is_err());
    }

    #[test]
    fn test_free_path_chi_squared() {
        let medium = fog();
        let sigma = 0.6;
        let bins = 10;
        let width = 0.5;
        let n = 20_000;
        let mut observed = vec![0usize; bins];
        let mut sampler = IndependentSampler::new(31);
        for _ in 0..n {
            let t = medium.sample_free_path(sampler.next_1d());
            let bin = ((t / width) as usize).min(bins - 1);
            observed[bin] += 1;
        }

        let mut chi2 = 0.0;
        for i in 0..bins {
            let lo = i as Float * width;
            let hi = if i + 1 == bins { INFINITY } else { lo + width };
            let p = (-sigma * lo).exp() - if hi.is_finite() { (-sigma * hi).exp() } else { 0.0 };
            let expected = p * n as Float;
            let diff = observed[i] as Float - expected;
            chi2 += diff * diff / expected;
        }
        // 9 degrees of freedom, well above the 0.999 quantile.
        assert!(chi2 < 30.0, "chi2 = {}", chi2);

        let mut record = MediumQueryRecord::new(None, Vector3f::zeros(), Vector3f::new(0.0, 0.0, 2.0), Vector3f::zeros());
        assert!((medium.pdf_free_path(&record) - sigma * (-sigma * 2.0 as Float).exp()).abs() < 1e-5);
        record.dist = 0.0;
        assert!((medium.pdf_free_path(&record) - sigma).abs() < 1e-5);
    }

    #[test]
    fn test_sample_fills_record() {
        let medium = fog().with_bounds(AABB::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0)));
        let mut record = MediumQueryRecord::new(None, Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0),
                                                Vector3f::new(0.0, 0.0, -1.0));
        let weight = medium.sample(&mut record, &Vector2f::new(0.3, 0.6));
        assert_eq!(weight, RGBSpectrum::one());
        assert!((record.wo.norm() - 1.0).abs() < 1e-5);
        assert!(record.n.z > 0.0);
        assert!((record.tr[0] - (-0.6 as Float).exp()).abs() < 1e-5);
        assert!(medium.is_in_medium(&Vector3f::new(0.5, 0.5, 0.5)));
        assert!(!medium.is_in_medium(&Vector3f::new(0.0, 2.0, 0.0)));
    }
}
