// Copyright @yucwang 2026

pub mod ao;
pub mod direct;
pub mod path;
pub mod volumetric;

use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceInteraction;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::materials::Material;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

pub const DEFAULT_MAX_DEPTH: u32 = 100;
pub const NEE_TERMINATION_PROBABILITY: Float = 0.1;

/// How paths are terminated early.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RussianRoulette {
    /// Kill with probability `1 - max(throughput)`.
    Throughput,
    /// Kill with a constant probability.
    Fixed(Float),
    Disabled,
}

impl RussianRoulette {
    /// Returns the factor survivors are scaled by, or `None` when the path dies.
    pub fn survive(&self, beta: &RGBSpectrum, sampler: &mut dyn Sampler) -> Option<Float> {
        let q = match self {
            RussianRoulette::Throughput => (1.0 - beta.max_coeff()).max(0.0),
            RussianRoulette::Fixed(q) => q.max(0.0),
            RussianRoulette::Disabled => return Some(1.0),
        };
        if q <= 0.0 {
            return Some(1.0);
        }
        if q >= 1.0 || sampler.next_1d() < q {
            return None;
        }
        Some(1.0 / (1.0 - q))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathConfig {
    pub max_depth: u32,
    pub roulette: RussianRoulette,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, roulette: RussianRoulette::Throughput }
    }
}

impl PathConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_roulette(mut self, roulette: RussianRoulette) -> Self {
        self.roulette = roulette;
        self
    }
}

/// Power heuristic with exponent 2.
pub fn power_heuristic(pdf_a: Float, pdf_b: Float) -> Float {
    let a2 = pdf_a * pdf_a;
    let b2 = pdf_b * pdf_b;
    if !(a2 + b2 > 0.0) || !(a2 + b2).is_finite() {
        return 0.0;
    }
    a2 / (a2 + b2)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IntegratorKind {
    #[value(name = "ao")]
    Ao,
    #[value(name = "direct")]
    Direct,
    #[value(name = "direct_ems")]
    DirectEms,
    #[value(name = "direct_mats")]
    DirectMats,
    #[value(name = "direct_mis")]
    DirectMis,
    #[value(name = "path_mats")]
    PathMats,
    #[value(name = "path_nee")]
    PathNee,
    #[default]
    #[value(name = "path_mis")]
    PathMis,
    #[value(name = "path_vol")]
    PathVol,
    #[value(name = "path_vol2")]
    PathVol2,
}

impl IntegratorKind {
    /// Configuration each estimator runs with unless overridden.
    pub fn default_config(self) -> PathConfig {
        match self {
            IntegratorKind::PathNee => PathConfig::default()
                .with_roulette(RussianRoulette::Fixed(NEE_TERMINATION_PROBABILITY)),
            _ => PathConfig::default(),
        }
    }

    pub fn build(self, config: PathConfig) -> Box<dyn Integrator> {
        match self {
            IntegratorKind::Ao => Box::new(ao::AmbientOcclusion),
            IntegratorKind::Direct => Box::new(direct::DirectIntegrator),
            IntegratorKind::DirectEms => Box::new(direct::DirectEmitterSampling),
            IntegratorKind::DirectMats => Box::new(direct::DirectMaterialSampling),
            IntegratorKind::DirectMis => Box::new(direct::DirectMIS),
            IntegratorKind::PathMats => Box::new(path::PathMaterialSampling::new(config)),
            IntegratorKind::PathNee => Box::new(path::PathNEE::new(config)),
            IntegratorKind::PathMis => Box::new(path::PathMIS::new(config)),
            IntegratorKind::PathVol => Box::new(volumetric::VolumetricPath::new(config)),
            IntegratorKind::PathVol2 => Box::new(volumetric::MeshVolumetricPath::new(config)),
        }
    }
}

/// Material at a hit, or the default diffuse one when nothing is bound.
pub(crate) fn material_at(hit: &SurfaceInteraction) -> Arc<Material> {
    hit.material().cloned().unwrap_or_else(|| Arc::new(Material::default()))
}

/// Radiance the hit surface emits back toward `origin`.
pub(crate) fn emitted(origin: &Vector3f, hit: &SurfaceInteraction) -> RGBSpectrum {
    match hit.emitter() {
        Some(emitter) => {
            let record = EmitterQueryRecord::from_hit(emitter.clone(), *origin, hit.p, hit.geo_frame.n);
            emitter.eval(&record)
        }
        None => RGBSpectrum::default(),
    }
}

/// Shadow-ray test from `p` toward a sampled emitter point.
pub(crate) fn unoccluded(scene: &Scene, hit: &SurfaceInteraction, record: &EmitterQueryRecord) -> bool {
    !scene.ray_intersect_any(&hit.shadow_ray(record.wi, record.dist))
}

pub(crate) fn usable_pdf(pdf: Float) -> bool {
    pdf > 0.0 && pdf.is_finite()
}
