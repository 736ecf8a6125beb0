// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, BSDF};
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceInteraction;
use crate::core::medium::{Medium, MediumQueryRecord};
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::integrators::path::PathMIS;
use crate::integrators::{emitted, material_at, usable_pdf, PathConfig};
use crate::math::constants::{Float, INFINITY};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::media::ParticipatingMedium;
use std::sync::Arc;

/// Outcome of flying through a medium segment.
enum Flight {
    /// Scattered at `t` with the given throughput factor.
    Scattered { t: Float, weight: RGBSpectrum, record: MediumQueryRecord },
    /// Reached the end of the segment.
    Passed(RGBSpectrum),
    Absorbed,
}

/// Samples a free flight over `[t0, t1]` of `ray`. On a scatter the
/// out-scattering direction is drawn as well.
fn fly(medium: &Arc<ParticipatingMedium>, ray: &Ray3f, t0: Float, t1: Float, sampler: &mut dyn Sampler) -> Flight {
    let t = t0 + medium.sample_free_path(sampler.next_1d());
    if t < t1 {
        let mut record = MediumQueryRecord::new(Some(medium.clone()), ray.at(t0), ray.at(t), -ray.dir());
        let pdf = medium.pdf_free_path(&record);
        if !usable_pdf(pdf) {
            return Flight::Absorbed;
        }
        let phase_weight = medium.sample(&mut record, &sampler.next_2d());
        let weight = medium.sigma_s() * record.tr * phase_weight / pdf;
        if weight.is_black() {
            return Flight::Absorbed;
        }
        return Flight::Scattered { t, weight, record };
    }

    let length = t1 - t0;
    let survival = medium.survival_free_path(length);
    if !usable_pdf(survival) {
        return Flight::Absorbed;
    }
    let weight = medium.transmittance(length) / survival;
    if weight.is_black() {
        Flight::Absorbed
    } else {
        Flight::Passed(weight)
    }
}

/// Continues a path at a surface: picks the next direction from the BSDF.
/// Returns the throughput factor and the spawned ray.
fn scatter_surface(hit: &SurfaceInteraction, ray: &Ray3f, sampler: &mut dyn Sampler) -> Option<(RGBSpectrum, Ray3f)> {
    let material = material_at(hit);
    let mut query = BSDFQueryRecord::new(hit.to_local(&-ray.dir()), hit.uv);
    let weight = material.sample(&mut query, &sampler.next_2d());
    if weight.is_black() {
        return None;
    }
    Some((weight, hit.spawn_ray(hit.to_world(&query.wo))))
}

/// Volumetric path tracing through a medium filling the scene (or its
/// bounds). Scenes without one are rendered with MIS path tracing.
pub struct VolumetricPath {
    config: PathConfig,
    fallback: PathMIS,
}

impl VolumetricPath {
    pub fn new(config: PathConfig) -> Self {
        Self { config, fallback: PathMIS::new(config) }
    }

    // Part of `ray` inside the medium and in front of the next surface.
    fn segment(medium: &ParticipatingMedium, ray: &Ray3f, surface_t: Float) -> Option<(Float, Float)> {
        let mut clipped = *ray;
        clipped.max_t = clipped.max_t.min(surface_t);
        match medium.bounds() {
            Some(bounds) => bounds.ray_intersect_range(&clipped),
            None => Some((clipped.min_t, clipped.max_t)),
        }
    }
}

impl Integrator for VolumetricPath {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let medium = match scene.medium() {
            Some(medium) => medium.clone(),
            None => return self.fallback.li(scene, sampler, ray),
        };

        let mut radiance = RGBSpectrum::default();
        let mut beta = RGBSpectrum::one();
        let mut ray = *ray;
        let mut depth = 0;

        loop {
            let hit = scene.ray_intersect(&ray);
            let surface_t = hit.as_ref().map_or(INFINITY, |hit| hit.t);

            if let Some((t0, t1)) = Self::segment(&medium, &ray, surface_t) {
                match fly(&medium, &ray, t0, t1, sampler) {
                    Flight::Scattered { t, weight, record } => {
                        beta *= weight;
                        if depth >= self.config.max_depth {
                            break;
                        }
                        match self.config.roulette.survive(&beta, sampler) {
                            Some(scale) => beta *= scale,
                            None => break,
                        }
                        ray = Ray3f::new(ray.at(t), record.wo, None, None).with_time(ray.time);
                        depth += 1;
                        continue;
                    }
                    Flight::Passed(weight) => beta *= weight,
                    Flight::Absorbed => break,
                }
            }

            let hit = match hit {
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

            let (weight, next) = match scatter_surface(&hit, &ray, sampler) {
                Some(next) => next,
                None => break,
            };
            beta *= weight;
            match self.config.roulette.survive(&beta, sampler) {
                Some(scale) => beta *= scale,
                None => break,
            }
            ray = next;
            depth += 1;
        }

        radiance
    }

    fn name(&self) -> &'static str {
        "path_vol"
    }
}

/// Volumetric path tracing through media bound to individual shapes. A ray
/// travels inside a shape's medium when it leaves that shape through its
/// boundary.
pub struct MeshVolumetricPath {
    config: PathConfig,
}

impl MeshVolumetricPath {
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }
}

impl Integrator for MeshVolumetricPath {
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

            let interior = hit.medium()
                .filter(|_| ray.dir().dot(&hit.geo_frame.n) > 0.0)
                .cloned();
            if let Some(medium) = interior {
                match fly(&medium, &ray, 0.0, hit.t, sampler) {
                    Flight::Scattered { t, weight, record } => {
                        beta *= weight;
                        if depth >= self.config.max_depth {
                            break;
                        }
                        match self.config.roulette.survive(&beta, sampler) {
                            Some(scale) => beta *= scale,
                            None => break,
                        }
                        ray = Ray3f::new(ray.at(t), record.wo, None, None).with_time(ray.time);
                        depth += 1;
                        continue;
                    }
                    Flight::Passed(weight) => beta *= weight,
                    Flight::Absorbed => break,
                }
            }

            radiance += beta * emitted(&ray.origin(), &hit);
            if depth >= self.config.max_depth {
                break;
            }

            let (weight, next) = match scatter_surface(&hit, &ray, sampler) {
                Some(next) => next,
                None => break,
            };
            beta *= weight;
            match self.config.roulette.survive(&beta, sampler) {
                Some(scale) => beta *= scale,
                None => break,
            }
            ray = next;
            depth += 1;
        }

        radiance
    }

    fn name(&self) -> &'static str {
        "path_vol2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::IndependentSampler;
    use crate::core::scene::SceneObject;
    use crate::materials::dielectric::DielectricBSDF;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::materials::Material;
    use crate::math::constants::Vector3f;
    use crate::math::transform::Transform;
    use crate::media::homogeneous_medium::HomogeneousMedium;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;

    fn mean(integrator: &dyn Integrator, scene: &Scene, ray: &Ray3f, spp: usize, seed: u64) -> RGBSpectrum {
        let mut sampler = IndependentSampler::new(seed);
        let mut sum = RGBSpectrum::default();
        for _ in 0..spp {
            sum += integrator.li(scene, &mut sampler, ray);
        }
        sum / spp as Float
    }

    fn medium(sigma_a: Float, sigma_s: Float) -> ParticipatingMedium {
        let medium = HomogeneousMedium::new(RGBSpectrum::from_value(sigma_a), RGBSpectrum::from_value(sigma_s), 0.0);
        ParticipatingMedium::Homogeneous(medium.unwrap())
    }

    fn black() -> Material {
        Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::zero()))
    }

    // Emitting wall at z = 2 facing the origin.
    fn wall() -> SceneObject {
        let to_world = Transform::translate(Vector3f::new(0.0, 0.0, 2.0))
            .compose(&Transform::rotate(Vector3f::new(1.0, 0.0, 0.0), 180.0))
            .compose(&Transform::scale(Vector3f::new(10.0, 10.0, 1.0)));
        SceneObject::new(Arc::new(Rectangle::new(to_world)), black()).with_area_light(RGBSpectrum::from_value(4.0))
    }

    #[test]
    fn test_absorbing_fog_attenuates() {
        let mut scene = Scene::new();
        scene.add_object(wall());
        scene.set_medium(medium(0.5, 0.0));
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let value = mean(&VolumetricPath::new(PathConfig::default()), &scene, &ray, 20_000, 3);
        let expected = 4.0 * (-1.0 as Float).exp();
        assert!((value[0] - expected).abs() < 0.02 * 4.0, "{} vs {}", value[0], expected);
    }

    #[test]
    fn test_clear_medium_is_transparent() {
        let mut scene = Scene::new();
        scene.add_object(wall());
        scene.set_medium(medium(0.0, 0.0));
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let value = mean(&VolumetricPath::new(PathConfig::default()), &scene, &ray, 16, 4);
        assert!((value[0] - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_scattering_furnace_keeps_radiance() {
        let mut scene = Scene::new();
        let shell = SceneObject::new(Arc::new(Sphere::inward(Vector3f::zeros(), 1.0)), black())
            .with_area_light(RGBSpectrum::one());
        scene.add_object(shell);
        scene.set_medium(medium(0.0, 1.5));
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.1, 0.7, 0.2), None, None);
        let value = mean(&VolumetricPath::new(PathConfig::default()), &scene, &ray, 2_000, 5);
        assert!((value[0] - 1.0).abs() < 1e-3, "{}", value[0]);
    }

    #[test]
    fn test_smoke_inside_index_matched_sphere() {
        let mut scene = Scene::new();
        scene.add_object(wall());
        let boundary = Material::Dielectric(DielectricBSDF::new(1.0, 1.0).unwrap());
        let smoke = SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, 1.0), 0.5)), boundary)
            .with_medium(medium(1.0, 0.0));
        scene.add_object(smoke);

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let value = mean(&MeshVolumetricPath::new(PathConfig::default()), &scene, &ray, 20_000, 6);
        // One unit of absorbing material along the axis.
        let expected = 4.0 * (-1.0 as Float).exp();
        assert!((value[0] - expected).abs() < 0.02 * 4.0, "{} vs {}", value[0], expected);

        // Outside the sphere the medium does nothing.
        let miss = Ray3f::new(Vector3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let value = mean(&MeshVolumetricPath::new(PathConfig::default()), &scene, &miss, 16, 7);
        assert!((value[0] - 4.0).abs() < 1e-4);
    }
}
