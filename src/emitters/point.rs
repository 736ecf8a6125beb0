// Copyright @yucwang 2026

use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::math::constants::{Float, INV_FOURPI, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Isotropic point source. `power` is the total emitted flux.
pub struct PointLight {
    position: Vector3f,
    power: RGBSpectrum,
}

impl PointLight {
    pub fn new(position: Vector3f, power: RGBSpectrum) -> Self {
        Self { position, power }
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }
}

impl Emitter for PointLight {
    fn eval(&self, record: &EmitterQueryRecord) -> RGBSpectrum {
        let dist2 = (self.position - record.ref_p).norm_squared();
        if dist2 <= 0.0 {
            return RGBSpectrum::default();
        }
        self.power * (INV_FOURPI / dist2)
    }

    fn sample(&self, record: &mut EmitterQueryRecord, _sample: &Vector2f) -> RGBSpectrum {
        let delta = self.position - record.ref_p;
        let dist = delta.norm();
        if dist <= 0.0 {
            return RGBSpectrum::default();
        }
        record.p = self.position;
        record.wi = delta / dist;
        record.n = -record.wi;
        record.dist = dist;
        record.pdf = 1.0;
        self.eval(record)
    }

    fn pdf(&self, _record: &EmitterQueryRecord) -> Float {
        1.0
    }

    fn is_delta(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::PI;

    #[test]
    fn test_point_light_inverse_square() {
        let light = PointLight::new(Vector3f::new(0.0, 2.0, 0.0), RGBSpectrum::from_value(4.0 * PI));
        let mut record = EmitterQueryRecord::new(Vector3f::zeros());
        let value = light.sample(&mut record, &Vector2f::zeros());
        assert!((value[0] - 0.25).abs() < 1e-5);
        assert!((record.wi - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        assert!((record.dist - 2.0).abs() < 1e-6);
        assert_eq!(light.pdf(&record), 1.0);
        assert!(light.is_delta());
    }
}
