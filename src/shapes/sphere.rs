// Copyright @yucwang 2026

use crate::core::interaction::{PositionSample, SurfaceInteraction};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, INV_PI, INV_TWOPI, PI, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
    flip_normals: bool,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.abs(), flip_normals: false }
    }

    /// Normals point toward the center, e.g. for a closed room.
    pub fn inward(center: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.abs(), flip_normals: true }
    }

    fn normal_at(&self, p: &Vector3f) -> Vector3f {
        let n = (p - self.center) / self.radius;
        if self.flip_normals { -n } else { n }
    }

    fn uv_at(&self, p: &Vector3f) -> Vector2f {
        let d = (p - self.center) / self.radius;
        let phi = d.y.atan2(d.x);
        let phi = if phi < 0.0 { phi + 2.0 * PI } else { phi };
        Vector2f::new(phi * INV_TWOPI, d.z.max(-1.0).min(1.0).acos() * INV_PI)
    }

    fn intersect(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let d = ray.dir();
        let b = oc.dot(&d);
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        if ray.test_segment(near) {
            Some(near)
        } else if ray.test_segment(far) {
            Some(far)
        } else {
            None
        }
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceInteraction> {
        let t = self.intersect(ray)?;
        let p = ray.at(t);
        let n = self.normal_at(&p);
        Some(SurfaceInteraction::new(p, t, self.uv_at(&p), n, n))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect(ray).is_some()
    }

    fn sample_position(&self, u: &Vector2f) -> PositionSample {
        let d = square_to_uniform_sphere(u);
        let p = self.center + d * self.radius;
        PositionSample {
            p,
            n: self.normal_at(&p),
            uv: self.uv_at(&p),
            pdf: self.pdf_position(),
        }
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }
}
