// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::integrators::usable_pdf;
use crate::math::constants::INV_PI;
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf};

/// Ambient occlusion: one cosine-weighted visibility ray per hit.
pub struct AmbientOcclusion;

impl Integrator for AmbientOcclusion {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let hit = match scene.ray_intersect(ray) {
            Some(hit) => hit,
            None => return scene.eval_environment(ray),
        };

        let mut n = hit.geo_frame.n;
        if n.dot(&ray.dir()) > 0.0 {
            n = -n;
        }
        let frame = Frame::from_normal(&n);

        let local = square_to_cosine_hemisphere(&sampler.next_2d());
        let pdf = square_to_cosine_hemisphere_pdf(&local);
        if !usable_pdf(pdf) {
            return RGBSpectrum::default();
        }

        let occluder = hit.spawn_ray(frame.to_world(&local));
        if scene.ray_intersect_any(&occluder) {
            return RGBSpectrum::default();
        }
        // cos / pi over the cosine density.
        let cos_theta = Frame::cos_theta(&local);
        RGBSpectrum::from_value(cos_theta * INV_PI / pdf)
    }

    fn name(&self) -> &'static str {
        "ao"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::IndependentSampler;
    use crate::core::scene::SceneObject;
    use crate::materials::Material;
    use crate::math::constants::Vector3f;
    use crate::math::transform::Transform;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;
    use std::sync::Arc;

    #[test]
    fn test_open_plane_is_unoccluded() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(Arc::new(Rectangle::new(Transform::scale(Vector3f::new(10.0, 10.0, 1.0)))),
                                          Material::default()));
        let mut sampler = IndependentSampler::new(12);
        // Seen from below as well: the visibility ray flips to the viewer's side.
        for origin in [Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0)].iter() {
            let ray = Ray3f::new(*origin, -*origin, None, None);
            for _ in 0..64 {
                let value = AmbientOcclusion.li(&scene, &mut sampler, &ray);
                assert!((value[0] - 1.0).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_closed_sphere_is_occluded() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(Arc::new(Sphere::inward(Vector3f::zeros(), 2.0)), Material::default()));
        let mut sampler = IndependentSampler::new(13);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        for _ in 0..64 {
            assert!(AmbientOcclusion.li(&scene, &mut sampler, &ray).is_black());
        }
    }
}
