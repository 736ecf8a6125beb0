// Copyright @yucwang 2023

use crate::core::interaction::{ PositionSample, SurfaceInteraction };
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_uniform_triangle;

pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f) -> Self {
        Triangle { p0, p1, p2 }
    }

    pub fn geometric_normal(&self) -> Vector3f {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        edge0.cross(&edge1).normalize()
    }

    // Moller-Trumbore. Returns (t, b1, b2) with p = (1-b1-b2) p0 + b1 p1 + b2 p2.
    fn intersect(&self, ray: &Ray3f) -> Option<(Float, Float, Float)> {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        let pvec = ray.dir().cross(&edge1);
        let det = edge0.dot(&pvec);
        if det.abs() < 1e-8 {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.p0;
        let b1 = tvec.dot(&pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }
        let qvec = tvec.cross(&edge0);
        let b2 = ray.dir().dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = edge1.dot(&qvec) * inv_det;
        if !ray.test_segment(t) {
            return None;
        }
        Some((t, b1, b2))
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p0, self.p1);
        bound.expand_by_point(&self.p2);

        bound
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceInteraction> {
        let (t, b1, b2) = self.intersect(ray)?;
        let n = self.geometric_normal();
        Some(SurfaceInteraction::new(ray.at(t), t, Vector2f::new(b1, b2), n, n))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect(ray).is_some()
    }

    fn sample_position(&self, u: &Vector2f) -> PositionSample {
        let bary = square_to_uniform_triangle(u);
        let (b1, b2) = (bary.x, bary.y);
        PositionSample {
            p: self.p0 * (1.0 - b1 - b2) + self.p1 * b1 + self.p2 * b2,
            n: self.geometric_normal(),
            uv: Vector2f::new(b1, b2),
            pdf: self.pdf_position(),
        }
    }

    fn surface_area(&self) -> Float {
        0.5 * ((self.p1 - self.p0).cross(&(self.p2 - self.p0))).norm()
    }
}
