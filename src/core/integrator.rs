// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub trait Integrator: Send + Sync {
    /// Radiance estimate arriving along `ray`. Consumes only `sampler`.
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum;

    fn name(&self) -> &'static str;
}
