// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceInteraction;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::integrators::{emitted, material_at, power_heuristic, unoccluded, usable_pdf};
use crate::materials::Material;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Light arriving at `hit` from a sampled emitter point, times the BSDF and
/// cosine. Also returns the BSDF density of the light direction. Black when
/// the sample is unusable or occluded.
pub(crate) fn shade_light_sample(scene: &Scene,
                                 hit: &SurfaceInteraction,
                                 material: &Material,
                                 wi_local: &Vector3f,
                                 value: RGBSpectrum,
                                 record: &EmitterQueryRecord) -> (RGBSpectrum, Float) {
    if value.is_black() {
        return (RGBSpectrum::default(), 0.0);
    }
    let wo_local = hit.to_local(&record.wi);
    let query = BSDFQueryRecord::with_directions(*wi_local, wo_local, Measure::SolidAngle, hit.uv);
    let f = material.eval(&query);
    if f.is_black() || !unoccluded(scene, hit, record) {
        return (RGBSpectrum::default(), 0.0);
    }
    (value * f * wo_local.z.abs(), material.pdf(&query))
}

/// What a BSDF-sampled ray from `hit` sees: emitter radiance, its
/// light-sampling density, and the next hit if there is one.
pub(crate) struct Escape {
    pub radiance: RGBSpectrum,
    pub light_pdf: Float,
    pub next: Option<SurfaceInteraction>,
}

pub(crate) fn trace_bsdf_ray(scene: &Scene, ray: &Ray3f) -> Escape {
    match scene.ray_intersect(ray) {
        Some(next) => {
            let (radiance, light_pdf) = match next.emitter() {
                Some(emitter) => {
                    let record = EmitterQueryRecord::from_hit(emitter.clone(), ray.origin(), next.p, next.geo_frame.n);
                    (emitter.eval(&record), scene.pdf_direct(&record))
                }
                None => (RGBSpectrum::default(), 0.0),
            };
            Escape { radiance, light_pdf, next: Some(next) }
        }
        None => match scene.environment_emitter() {
            Some(env) => {
                let record = EmitterQueryRecord::from_ray(env.clone(), ray);
                Escape { radiance: env.eval(&record), light_pdf: scene.pdf_direct(&record), next: None }
            }
            None => Escape { radiance: RGBSpectrum::default(), light_pdf: 0.0, next: None },
        },
    }
}

/// Every non-environment light sampled once per hit.
pub struct DirectIntegrator;

impl Integrator for DirectIntegrator {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let hit = match scene.ray_intersect(ray) {
            Some(hit) => hit,
            None => return scene.eval_environment(ray),
        };

        let mut radiance = emitted(&ray.origin(), &hit);
        let material = material_at(&hit);
        let wi_local = hit.to_local(&-ray.dir());
        for light in scene.lights().iter().filter(|light| !light.is_environment()) {
            let mut record = EmitterQueryRecord::new(hit.p);
            record.emitter = Some(light.clone());
            let value = light.sample(&mut record, &sampler.next_2d());
            let (contribution, _) = shade_light_sample(scene, &hit, &material, &wi_local, value, &record);
            radiance += contribution;
        }
        radiance
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// One emitter sample through the scene's light selection.
pub struct DirectEmitterSampling;

impl Integrator for DirectEmitterSampling {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let hit = match scene.ray_intersect(ray) {
            Some(hit) => hit,
            None => return scene.eval_environment(ray),
        };

        let mut radiance = emitted(&ray.origin(), &hit);
        let material = material_at(&hit);
        let wi_local = hit.to_local(&-ray.dir());
        let (value, record) = scene.sample_direct(&hit.p, &sampler.next_2d());
        radiance += shade_light_sample(scene, &hit, &material, &wi_local, value, &record).0;
        radiance
    }

    fn name(&self) -> &'static str {
        "direct_ems"
    }
}

/// One BSDF sample; counts whatever emitter it lands on.
pub struct DirectMaterialSampling;

impl Integrator for DirectMaterialSampling {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let hit = match scene.ray_intersect(ray) {
            Some(hit) => hit,
            None => return scene.eval_environment(ray),
        };

        let mut radiance = emitted(&ray.origin(), &hit);
        let material = material_at(&hit);
        let mut query = BSDFQueryRecord::new(hit.to_local(&-ray.dir()), hit.uv);
        let weight = material.sample(&mut query, &sampler.next_2d());
        if weight.is_black() {
            return radiance;
        }
        let escape = trace_bsdf_ray(scene, &hit.spawn_ray(hit.to_world(&query.wo)));
        radiance += weight * escape.radiance;
        radiance
    }

    fn name(&self) -> &'static str {
        "direct_mats"
    }
}

/// Emitter and BSDF sampling combined with the power heuristic.
pub struct DirectMIS;

impl Integrator for DirectMIS {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let hit = match scene.ray_intersect(ray) {
            Some(hit) => hit,
            None => return scene.eval_environment(ray),
        };

        let mut radiance = emitted(&ray.origin(), &hit);
        let material = material_at(&hit);
        let wi_local = hit.to_local(&-ray.dir());

        let (value, record) = scene.sample_direct(&hit.p, &sampler.next_2d());
        let (contribution, bsdf_pdf) = shade_light_sample(scene, &hit, &material, &wi_local, value, &record);
        if !contribution.is_black() {
            radiance += contribution * light_sample_weight(scene, &record, bsdf_pdf);
        }

        let mut query = BSDFQueryRecord::new(wi_local, hit.uv);
        let weight = material.sample(&mut query, &sampler.next_2d());
        if weight.is_black() {
            return radiance;
        }
        let escape = trace_bsdf_ray(scene, &hit.spawn_ray(hit.to_world(&query.wo)));
        if !escape.radiance.is_black() {
            radiance += weight * escape.radiance * bsdf_sample_weight(&material, &query, escape.light_pdf);
        }
        radiance
    }

    fn name(&self) -> &'static str {
        "direct_mis"
    }
}

/// MIS weight of an emitter sample. Delta lights cannot be hit by BSDF
/// sampling and keep the full weight.
pub(crate) fn light_sample_weight(scene: &Scene, record: &EmitterQueryRecord, bsdf_pdf: Float) -> Float {
    match &record.emitter {
        Some(emitter) if emitter.is_delta() => 1.0,
        Some(_) => power_heuristic(scene.pdf_direct(record), bsdf_pdf),
        None => 0.0,
    }
}

/// MIS weight of a BSDF sample that reached an emitter.
pub(crate) fn bsdf_sample_weight(material: &Material, query: &BSDFQueryRecord, light_pdf: Float) -> Float {
    if query.measure == Measure::Discrete {
        return 1.0;
    }
    let bsdf_pdf = material.pdf(query);
    if !usable_pdf(bsdf_pdf) {
        return 0.0;
    }
    power_heuristic(bsdf_pdf, light_pdf)
}
