// Copyright @yucwang 2026

use crate::media::ParticipatingMedium;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, INFINITY, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

#[derive(Clone)]
pub struct MediumQueryRecord {
    pub medium: Option<Arc<ParticipatingMedium>>,
    pub ref_p: Vector3f,
    pub p: Vector3f,
    pub n: Vector3f,
    pub pdf: Float,
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub dist: Float,
    pub sigma_a: RGBSpectrum,
    pub sigma_s: RGBSpectrum,
    pub sigma_t: RGBSpectrum,
    pub albedo: RGBSpectrum,
    pub phase: Float,
    pub g: Float,
    pub tr: RGBSpectrum,
}

impl MediumQueryRecord {
    pub fn new(medium: Option<Arc<ParticipatingMedium>>, ref_p: Vector3f, p: Vector3f, n: Vector3f) -> Self {
        let delta = p - ref_p;
        let dist = delta.norm();
        let wi = if dist > 0.0 { delta / dist } else { Vector3f::zeros() };
        Self::blank(medium, ref_p, p, n, wi, dist)
    }

    pub fn from_ray(medium: Option<Arc<ParticipatingMedium>>, ray: &Ray3f) -> Self {
        Self::blank(medium, ray.origin(), ray.at(1.0), -ray.dir(), ray.dir(), INFINITY)
    }

    fn blank(medium: Option<Arc<ParticipatingMedium>>, ref_p: Vector3f, p: Vector3f,
             n: Vector3f, wi: Vector3f, dist: Float) -> Self {
        Self {
            medium,
            ref_p,
            p,
            n,
            pdf: 0.0,
            wi,
            wo: Vector3f::zeros(),
            dist,
            sigma_a: RGBSpectrum::default(),
            sigma_s: RGBSpectrum::default(),
            sigma_t: RGBSpectrum::default(),
            albedo: RGBSpectrum::default(),
            phase: 0.0,
            g: 0.0,
            tr: RGBSpectrum::default(),
        }
    }
}

pub trait Medium: Send + Sync {
    /// Draws an out-scattering direction into `wo` and fills the
    /// coefficients, phase value and transmittance over `dist`.
    /// Returns the phase weight `phase / pdf`.
    fn sample(&self, record: &mut MediumQueryRecord, sample: &Vector2f) -> RGBSpectrum;

    /// Phase-function value for (wi, wo).
    fn eval(&self, record: &MediumQueryRecord) -> RGBSpectrum;

    fn pdf(&self, record: &MediumQueryRecord) -> Float;

    /// Exponential free-flight distance drawn with rate `sigma_t_min`.
    fn sample_free_path(&self, u: Float) -> Float;

    fn pdf_free_path(&self, record: &MediumQueryRecord) -> Float;

    /// Probability that a free flight reaches past `dist`.
    fn survival_free_path(&self, dist: Float) -> Float;

    fn transmittance(&self, dist: Float) -> RGBSpectrum;

    fn sigma_s(&self) -> RGBSpectrum;

    fn is_homogeneous(&self) -> bool;

    fn is_in_medium(&self, p: &Vector3f) -> bool;

    /// Bounds of the owning surface; `None` fills all of space.
    fn bounds(&self) -> Option<AABB>;
}
