// Copyright @yucwang 2026

pub mod area;
pub mod distant_sphere;
pub mod point;

use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;

use self::area::AreaLight;
use self::distant_sphere::DistantSphereLight;
use self::point::PointLight;

pub enum Light {
    Point(PointLight),
    Area(AreaLight),
    DistantSphere(DistantSphereLight),
}

impl Light {
    fn inner(&self) -> &dyn Emitter {
        match self {
            Light::Point(light) => light,
            Light::Area(light) => light,
            Light::DistantSphere(light) => light,
        }
    }

    /// Lights reached by rays that leave the scene.
    pub fn is_environment(&self) -> bool {
        matches!(self, Light::DistantSphere(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Light::Point(_) => "point",
            Light::Area(_) => "area",
            Light::DistantSphere(_) => "distant_sphere",
        }
    }
}

impl Emitter for Light {
    fn eval(&self, record: &EmitterQueryRecord) -> RGBSpectrum {
        self.inner().eval(record)
    }

    fn sample(&self, record: &mut EmitterQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        self.inner().sample(record, sample)
    }

    fn pdf(&self, record: &EmitterQueryRecord) -> Float {
        self.inner().pdf(record)
    }

    fn is_delta(&self) -> bool {
        self.inner().is_delta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::{IndependentSampler, Sampler};
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::RGBSpectrum;
    use crate::math::transform::Transform;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;
    use std::sync::Arc;

    #[test]
    fn test_sampled_lights_have_positive_density() {
        let lights = vec![
            Light::Point(PointLight::new(Vector3f::new(0.0, 3.0, 0.0), RGBSpectrum::from_value(10.0))),
            Light::Area(AreaLight::from_shape(
                Arc::new(Rectangle::new(Transform::translate(Vector3f::new(0.0, 0.0, 2.0)))),
                RGBSpectrum::from_value(5.0))),
            Light::Area(AreaLight::from_shape(
                Arc::new(Sphere::new(Vector3f::new(0.0, 4.0, 0.0), 0.5)),
                RGBSpectrum::from_value(2.0))),
            Light::DistantSphere(DistantSphereLight::new(
                RGBSpectrum::one(), 30.0, Transform::default()).unwrap()),
        ];
        let mut sampler = IndependentSampler::new(17);
        for light in lights.iter() {
            let mut nonzero = 0;
            for _ in 0..500 {
                let mut record = EmitterQueryRecord::new(Vector3f::new(0.1, 0.0, 0.0));
                let value = light.sample(&mut record, &sampler.next_2d());
                if value.is_black() {
                    continue;
                }
                nonzero += 1;
                let pdf = light.pdf(&record);
                assert!(pdf > 0.0, "{} reported zero density", light.name());
                assert!((pdf - record.pdf).abs() <= 1e-4 * pdf.max(1.0), "{}", light.name());
            }
            assert!(nonzero > 0, "{} never produced light", light.name());
        }
    }

    #[test]
    fn test_area_light_one_sided() {
        let rect: Arc<dyn crate::core::shape::Shape> =
            Arc::new(Rectangle::new(Transform::translate(Vector3f::new(0.0, 0.0, 2.0))));
        let light = AreaLight::from_shape(rect, RGBSpectrum::one());

        // The rectangle faces +z, so only points above it see it.
        let mut below = EmitterQueryRecord::new(Vector3f::zeros());
        assert!(light.sample(&mut below, &Vector2f::new(0.5, 0.5)).is_black());

        let mut above = EmitterQueryRecord::new(Vector3f::new(0.0, 0.0, 3.0));
        let value = light.sample(&mut above, &Vector2f::new(0.5, 0.5));
        // Center of a 2x2 square one unit below: pdf = (1/4) * 1 / 1.
        assert!((above.pdf - 0.25).abs() < 1e-4);
        assert!((value[0] - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_environment_flag() {
        assert!(Light::DistantSphere(DistantSphereLight::environment(RGBSpectrum::one())).is_environment());
        assert!(!Light::Point(PointLight::new(Vector3f::zeros(), RGBSpectrum::one())).is_environment());
    }
}
