// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Measure a BSDF query is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Measure {
    Unknown,
    SolidAngle,
    Discrete,
}

// Both directions live in the local shading frame. `wi` points back
// toward the previous path vertex, `wo` toward the next one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BSDFQueryRecord {
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub eta: Float,
    pub measure: Measure,
    pub uv: Vector2f,
}

impl BSDFQueryRecord {
    /// Query for sampling: only `wi` is known.
    pub fn new(wi: Vector3f, uv: Vector2f) -> Self {
        Self {
            wi,
            wo: Vector3f::zeros(),
            eta: 1.0,
            measure: Measure::Unknown,
            uv,
        }
    }

    /// Query for evaluating a known pair of directions.
    pub fn with_directions(wi: Vector3f, wo: Vector3f, measure: Measure, uv: Vector2f) -> Self {
        Self { wi, wo, eta: 1.0, measure, uv }
    }
}

pub trait BSDF: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// BSDF value for (wi, wo). No cosine factor.
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum;

    /// Solid-angle density of sampling `wo` given `wi`.
    fn pdf(&self, record: &BSDFQueryRecord) -> Float;

    /// Fills `wo`, `measure` and `eta`, and returns the sample weight:
    /// `eval * |cos(wo)| / pdf` for continuous lobes, the lobe throughput for
    /// discrete ones, black on failure.
    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum;
}
