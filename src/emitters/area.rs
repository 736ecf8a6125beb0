// Copyright @yucwang 2026

use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::core::shape::Shape;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// Uniform emission from the front side of a shape.
pub struct AreaLight {
    shape: Option<Arc<dyn Shape>>,
    radiance: RGBSpectrum,
}

impl AreaLight {
    /// Light not yet attached to a surface. It stays dark until bound.
    pub fn new(radiance: RGBSpectrum) -> Self {
        Self { shape: None, radiance }
    }

    pub fn from_shape(shape: Arc<dyn Shape>, radiance: RGBSpectrum) -> Self {
        Self { shape: Some(shape), radiance }
    }

    pub fn radiance(&self) -> RGBSpectrum {
        self.radiance
    }
}

impl Emitter for AreaLight {
    fn eval(&self, record: &EmitterQueryRecord) -> RGBSpectrum {
        if record.n.dot(&-record.wi) <= 0.0 {
            return RGBSpectrum::default();
        }
        self.radiance
    }

    fn sample(&self, record: &mut EmitterQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        let shape = match &self.shape {
            Some(shape) => shape,
            None => return RGBSpectrum::default(),
        };
        let position = shape.sample_position(sample);
        let delta = position.p - record.ref_p;
        let dist = delta.norm();
        if dist <= 0.0 {
            return RGBSpectrum::default();
        }
        record.p = position.p;
        record.n = position.n;
        record.wi = delta / dist;
        record.dist = dist;
        record.pdf = self.pdf(record);
        if record.pdf <= 0.0 || !record.pdf.is_finite() {
            return RGBSpectrum::default();
        }
        self.eval(record) / record.pdf
    }

    fn pdf(&self, record: &EmitterQueryRecord) -> Float {
        let shape = match &self.shape {
            Some(shape) => shape,
            None => return 0.0,
        };
        let cos = record.n.dot(&-record.wi);
        if cos <= 0.0 {
            return 0.0;
        }
        shape.pdf_position() * record.dist * record.dist / cos
    }
}
