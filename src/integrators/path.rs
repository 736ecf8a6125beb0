// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::core::integrator::Integrator;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::integrators::direct::{light_sample_weight, shade_light_sample};
use crate::integrators::{emitted, material_at, power_heuristic, usable_pdf, PathConfig};
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Path tracing that only follows BSDF samples.
pub struct PathMaterialSampling {
    config: PathConfig,
}

impl PathMaterialSampling {
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }
}

impl Integrator for PathMaterialSampling {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let mut radiance = RGBSpectrum::default();
        let mut beta = RGBSpectrum::one();
        let mut ray = *ray;
        let mut depth = 0;

        loop {
            let hit = match scene.ray_intersect(&ray) {
                Some(hit) => hit,
                None => {
                    radiance += beta * scene.eval_environment(&ray);
                    break;
                }
            };
            radiance += beta * emitted(&ray.origin(), &hit);
            if depth >= self.config.max_depth {
                break;
            }

            let material = material_at(&hit);
            let mut query = BSDFQueryRecord::new(hit.to_local(&-ray.dir()), hit.uv);
            let weight = material.sample(&mut query, &sampler.next_2d());
            if weight.is_black() {
                break;
            }
            beta *= weight;
            match self.config.roulette.survive(&beta, sampler) {
                Some(scale) => beta *= scale,
                None => break,
            }

            ray = hit.spawn_ray(hit.to_world(&query.wo));
            depth += 1;
        }

        radiance
    }

    fn name(&self) -> &'static str {
        "path_mats"
    }
}

/// Path tracing with next-event estimation at every vertex. Emission hit by
/// a BSDF sample only counts after a discrete bounce.
pub struct PathNEE {
    config: PathConfig,
}

impl PathNEE {
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }
}

impl Integrator for PathNEE {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let mut radiance = RGBSpectrum::default();
        let mut beta = RGBSpectrum::one();
        let mut ray = *ray;
        let mut depth = 0;
        let mut count_emission = true;

        loop {
            let hit = match scene.ray_intersect(&ray) {
                Some(hit) => hit,
                None => {
                    if count_emission {
                        radiance += beta * scene.eval_environment(&ray);
                    }
                    break;
                }
            };
            if count_emission {
                radiance += beta * emitted(&ray.origin(), &hit);
            }
            if depth >= self.config.max_depth {
                break;
            }

            let material = material_at(&hit);
            let wi_local = hit.to_local(&-ray.dir());

            let (value, record) = scene.sample_direct(&hit.p, &sampler.next_2d());
            let (direct, _) = shade_light_sample(scene, &hit, &material, &wi_local, value, &record);
            radiance += beta * direct;

            let mut query = BSDFQueryRecord::new(wi_local, hit.uv);
            let weight = material.sample(&mut query, &sampler.next_2d());
            if weight.is_black() {
                break;
            }
            count_emission = query.measure == Measure::Discrete;
            beta *= weight;
            match self.config.roulette.survive(&beta, sampler) {
                Some(scale) => beta *= scale,
                None => break,
            }

            ray = hit.spawn_ray(hit.to_world(&query.wo));
            depth += 1;
        }

        radiance
    }

    fn name(&self) -> &'static str {
        "path_nee"
    }
}

/// Path tracing combining emitter and BSDF sampling at every bounce.
pub struct PathMIS {
    config: PathConfig,
}

impl PathMIS {
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }

    // `None` marks the camera ray or a discrete bounce, which take the full weight.
    fn emission_weight(scene: &Scene, record: &EmitterQueryRecord, bsdf_pdf: Option<Float>) -> Float {
        match bsdf_pdf {
            None => 1.0,
            Some(pdf) => power_heuristic(pdf, scene.pdf_direct(record)),
        }
    }
}

impl Integrator for PathMIS {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let mut radiance = RGBSpectrum::default();
        let mut beta = RGBSpectrum::one();
        let mut ray = *ray;
        let mut depth = 0;
        let mut bsdf_pdf: Option<Float> = None;

        loop {
            let hit = match scene.ray_intersect(&ray) {
                Some(hit) => hit,
                None => {
                    if let Some(env) = scene.environment_emitter() {
                        let record = EmitterQueryRecord::from_ray(env.clone(), &ray);
                        let weight = Self::emission_weight(scene, &record, bsdf_pdf);
                        radiance += beta * env.eval(&record) * weight;
                    }
                    break;
                }
            };
            if let Some(emitter) = hit.emitter() {
                let record = EmitterQueryRecord::from_hit(emitter.clone(), ray.origin(), hit.p, hit.geo_frame.n);
                let le = emitter.eval(&record);
                if !le.is_black() {
                    radiance += beta * le * Self::emission_weight(scene, &record, bsdf_pdf);
                }
            }
            if depth >= self.config.max_depth {
                break;
            }

            let material = material_at(&hit);
            let wi_local = hit.to_local(&-ray.dir());

            let (value, record) = scene.sample_direct(&hit.p, &sampler.next_2d());
            let (direct, light_bsdf_pdf) = shade_light_sample(scene, &hit, &material, &wi_local, value, &record);
            if !direct.is_black() {
                radiance += beta * direct * light_sample_weight(scene, &record, light_bsdf_pdf);
            }

            let mut query = BSDFQueryRecord::new(wi_local, hit.uv);
            let weight = material.sample(&mut query, &sampler.next_2d());
            if weight.is_black() {
                break;
            }
            bsdf_pdf = match query.measure {
                Measure::Discrete => None,
                _ => {
                    let pdf = material.pdf(&query);
                    Some(if usable_pdf(pdf) { pdf } else { 0.0 })
                }
            };
            beta *= weight;
            match self.config.roulette.survive(&beta, sampler) {
                Some(scale) => beta *= scale,
                None => break,
            }

            ray = hit.spawn_ray(hit.to_world(&query.wo));
            depth += 1;
        }

        radiance
    }

    fn name(&self) -> &'static str {
        "path_mis"
    }
}
