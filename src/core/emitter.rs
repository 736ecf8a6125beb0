// Copyright @yucwang 2026

use crate::emitters::Light;
use crate::math::constants::{Float, INFINITY, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// Exchange record between integrators and emitters.
///
/// `wi` always points from the reference point toward the emitter and
/// `dist` is the distance along it (infinite for distant emitters).
#[derive(Clone)]
pub struct EmitterQueryRecord {
    pub emitter: Option<Arc<Light>>,
    pub ref_p: Vector3f,
    pub p: Vector3f,
    pub n: Vector3f,
    pub pdf: Float,
    pub wi: Vector3f,
    pub dist: Float,
}

impl EmitterQueryRecord {
    /// Sampling mode: only the reference point is known.
    pub fn new(ref_p: Vector3f) -> Self {
        Self {
            emitter: None,
            ref_p,
            p: Vector3f::zeros(),
            n: Vector3f::zeros(),
            pdf: 0.0,
            wi: Vector3f::zeros(),
            dist: 0.0,
        }
    }

    /// Evaluation mode for a surface point already found on an emitter.
    pub fn from_hit(emitter: Arc<Light>, ref_p: Vector3f, p: Vector3f, n: Vector3f) -> Self {
        let delta = p - ref_p;
        let dist = delta.norm();
        let wi = if dist > 0.0 { delta / dist } else { Vector3f::zeros() };
        Self { emitter: Some(emitter), ref_p, p, n, pdf: 0.0, wi, dist }
    }

    /// Evaluation mode for a ray that escaped toward a distant emitter.
    pub fn from_ray(emitter: Arc<Light>, ray: &Ray3f) -> Self {
        Self {
            emitter: Some(emitter),
            ref_p: ray.origin(),
            p: ray.at(1.0),
            n: -ray.dir(),
            pdf: 0.0,
            wi: ray.dir(),
            dist: INFINITY,
        }
    }
}

pub trait Emitter: Send + Sync {
    /// Radiance arriving at `ref_p` from the emitter along `wi`.
    fn eval(&self, record: &EmitterQueryRecord) -> RGBSpectrum;

    /// Fills `p`, `n`, `wi`, `dist` and `pdf` and returns `eval / pdf`.
    fn sample(&self, record: &mut EmitterQueryRecord, sample: &Vector2f) -> RGBSpectrum;

    /// Solid-angle density `sample` uses for the record's direction.
    fn pdf(&self, record: &EmitterQueryRecord) -> Float;

    /// Lights that can only be reached by explicit sampling.
    fn is_delta(&self) -> bool {
        false
    }
}
