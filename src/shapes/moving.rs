// Copyright @yucwang 2026

use crate::core::interaction::{PositionSample, SurfaceInteraction};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::AnimatedTransform;
use nalgebra::{Isometry3, Point3};
use std::sync::Arc;

/// A shape carried along a rigid motion; rays pick the pose from their `time`.
pub struct MovingShape {
    shape: Arc<dyn Shape>,
    motion: AnimatedTransform,
}

impl MovingShape {
    pub fn new(shape: Arc<dyn Shape>, motion: AnimatedTransform) -> Self {
        Self { shape, motion }
    }

    fn to_rest(pose: &Isometry3<Float>, ray: &Ray3f) -> Ray3f {
        let o = pose.inverse_transform_point(&Point3::from(ray.origin())).coords;
        let d = pose.inverse_transform_vector(&ray.dir());
        Ray3f::new(o, d, Some(ray.min_t), Some(ray.max_t)).with_time(ray.time)
    }
}

impl Shape for MovingShape {
    // Every pose fits in a ball of the rest bound's reach around its translation.
    fn bounding_box(&self) -> AABB {
        let rest = self.shape.bounding_box();
        let mut reach: Float = 0.0;
        for idx in 0..8 {
            let corner = Vector3f::new(
                if idx & 1 == 0 { rest.p_min.x } else { rest.p_max.x },
                if idx & 2 == 0 { rest.p_min.y } else { rest.p_max.y },
                if idx & 4 == 0 { rest.p_min.z } else { rest.p_max.z },
            );
            reach = reach.max(corner.norm());
        }
        let r = Vector3f::new(reach, reach, reach);
        let mut bbox = AABB::default();
        for pose in [self.motion.start(), self.motion.end()] {
            let c = pose.translation.vector;
            bbox.expand_by_aabb(&AABB::new(c - r, c + r));
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceInteraction> {
        let pose = self.motion.at(ray.time);
        let local = self.shape.ray_intersection(&Self::to_rest(&pose, ray))?;
        let p = pose.transform_point(&Point3::from(local.p)).coords;
        let geo_n = pose.transform_vector(&local.geo_frame.n);
        let sh_n = pose.transform_vector(&local.sh_frame.n);
        Some(SurfaceInteraction::new(p, local.t, local.uv, geo_n, sh_n))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        let pose = self.motion.at(ray.time);
        self.shape.ray_intersection_t(&Self::to_rest(&pose, ray))
    }

    /// Samples the shape at the start of the shutter interval.
    fn sample_position(&self, u: &Vector2f) -> PositionSample {
        let pose = self.motion.start();
        let local = self.shape.sample_position(u);
        PositionSample {
            p: pose.transform_point(&Point3::from(local.p)).coords,
            n: pose.transform_vector(&local.n),
            uv: local.uv,
            pdf: local.pdf,
        }
    }

    fn surface_area(&self) -> Float {
        self.shape.surface_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::transform::Transform;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;
    use nalgebra::{Translation3, UnitQuaternion};

    fn sliding_sphere() -> MovingShape {
        MovingShape::new(Arc::new(Sphere::new(Vector3f::zeros(), 0.5)),
                         AnimatedTransform::translating(Vector3f::zeros(), Vector3f::new(2.0, 0.0, 0.0)))
    }

    #[test]
    fn test_ray_time_selects_pose() {
        let sphere = sliding_sphere();
        let down = Vector3f::new(0.0, 0.0, -1.0);
        let at_start = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), down, None, None);
        let at_end = Ray3f::new(Vector3f::new(2.0, 0.0, 5.0), down, None, None);

        assert!(sphere.ray_intersection_t(&at_start));
        assert!(!sphere.ray_intersection_t(&at_start.with_time(1.0)));
        assert!(sphere.ray_intersection_t(&at_end.with_time(1.0)));
        assert!(!sphere.ray_intersection_t(&at_end));

        let mid = Ray3f::new(Vector3f::new(1.0, 0.0, 5.0), down, None, None).with_time(0.5);
        let hit = sphere.ray_intersection(&mid).unwrap();
        assert!((hit.t - 4.5).abs() < 1e-4);
        assert!((hit.p - Vector3f::new(1.0, 0.0, 0.5)).norm() < 1e-4);
        assert!((hit.geo_frame.n - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-4);
    }

    #[test]
    fn test_rotating_rectangle_normal() {
        let turn = UnitQuaternion::from_axis_angle(&Vector3f::x_axis(), crate::math::constants::PI * 0.5);
        let motion = AnimatedTransform::new(Isometry3::identity(),
                                            Isometry3::from_parts(Translation3::identity(), turn));
        let quad = MovingShape::new(Arc::new(Rectangle::new(Transform::default())), motion);

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None)
            .with_time(0.5);
        let hit = quad.ray_intersection(&ray).unwrap();
        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert!((hit.t - 5.0).abs() < 1e-4);
        assert!((hit.geo_frame.n - Vector3f::new(0.0, -h, h)).norm() < 1e-4);
    }

    #[test]
    fn test_bounds_cover_whole_motion() {
        let sphere = sliding_sphere();
        let bbox = sphere.bounding_box();
        for step in 0..=10 {
            let time = step as Float / 10.0;
            let center = Vector3f::new(2.0 * time, 0.0, 0.0);
            assert!(bbox.contains(&(center + Vector3f::new(0.5, 0.0, 0.0))));
            assert!(bbox.contains(&(center - Vector3f::new(0.0, 0.5, 0.5))));
        }

        let sample = sphere.sample_position(&Vector2f::new(0.3, 0.7));
        assert!((sample.p.norm() - 0.5).abs() < 1e-4);
        assert!((sample.pdf * sphere.surface_area() - 1.0).abs() < 1e-4);
    }
}
