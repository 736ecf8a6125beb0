// Copyright @yucwang 2026

use crate::core::interaction::{PositionSample, SurfaceInteraction};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// The square [-1, 1]^2 in the local z = 0 plane, facing local +z.
pub struct Rectangle {
    to_world: Transform,
    normal: Vector3f,
    area: Float,
}

impl Rectangle {
    pub fn new(to_world: Transform) -> Self {
        let dp_du = to_world.apply_vector(Vector3f::new(2.0, 0.0, 0.0));
        let dp_dv = to_world.apply_vector(Vector3f::new(0.0, 2.0, 0.0));
        let cross = dp_du.cross(&dp_dv);
        let area = cross.norm();
        let normal = if area > 0.0 {
            cross / area
        } else {
            to_world.apply_normal(Vector3f::new(0.0, 0.0, 1.0)).normalize()
        };

        Self { to_world, normal, area }
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    // Hit point in world space, its distance along the ray and its uv.
    fn intersect(&self, ray: &Ray3f) -> Option<(Vector3f, Float, Vector2f)> {
        let ray_local = self.to_world.inv_apply_ray(ray);
        let dir = ray_local.dir();
        if dir.z.abs() < EPSILON {
            return None;
        }

        let t_local = -ray_local.origin().z / dir.z;
        let p_local = ray_local.at(t_local);
        if p_local.x.abs() > 1.0 || p_local.y.abs() > 1.0 {
            return None;
        }

        let p_world = self.to_world.apply_point(p_local);
        let t_world = (p_world - ray.origin()).dot(&ray.dir());
        if !ray.test_segment(t_world) {
            return None;
        }
        let uv = Vector2f::new(0.5 * (p_local.x + 1.0), 0.5 * (p_local.y + 1.0));
        Some((p_world, t_world, uv))
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        let corners = [
            Vector3f::new(-1.0, -1.0, 0.0),
            Vector3f::new(-1.0,  1.0, 0.0),
            Vector3f::new( 1.0, -1.0, 0.0),
            Vector3f::new( 1.0,  1.0, 0.0),
        ];
        for corner in &corners {
            let p = self.to_world.apply_point(*corner);
            bbox.expand_by_point(&p);
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceInteraction> {
        let (p, t, uv) = self.intersect(ray)?;
        Some(SurfaceInteraction::new(p, t, uv, self.normal, self.normal))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect(ray).is_some()
    }

    fn sample_position(&self, u: &Vector2f) -> PositionSample {
        let p_local = Vector3f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0, 0.0);
        PositionSample {
            p: self.to_world.apply_point(p_local),
            n: self.normal,
            uv: *u,
            pdf: self.pdf_position(),
        }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_hit_and_area() {
        let rect = Rectangle::new(Transform::translate(Vector3f::new(0.0, 0.0, -1.0))
            .compose(&Transform::scale(Vector3f::new(2.0, 3.0, 1.0))));
        assert!((rect.surface_area() - 24.0).abs() < 1e-4);

        let ray = Ray3f::new(Vector3f::new(1.5, -2.5, 4.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = rect.ray_intersection(&ray).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-4);
        assert!((hit.uv - Vector2f::new(0.875, 1.0 / 12.0)).norm() < 1e-4);
        assert!((hit.geo_frame.n - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        let miss = Ray3f::new(Vector3f::new(2.5, 0.0, 4.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(!rect.ray_intersection_t(&miss));
        let short = Ray3f::new(Vector3f::new(0.0, 0.0, 4.0), Vector3f::new(0.0, 0.0, -1.0), None, Some(4.0));
        assert!(!rect.ray_intersection_t(&short));
    }

    #[test]
    fn test_rectangle_samples_lie_on_surface() {
        let rect = Rectangle::new(Transform::rotate(Vector3f::new(1.0, 0.0, 0.0), 90.0));
        let sample = rect.sample_position(&Vector2f::new(0.25, 0.75));
        assert!(sample.p.y.abs() < 1e-5);
        assert!((sample.pdf - 0.25).abs() < 1e-5);
        assert!((sample.n - Vector3f::new(0.0, -1.0, 0.0)).norm() < 1e-5);
    }
}
