// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, Matrix4f };
use super::ray::Ray3f;
use nalgebra::{ Isometry3, Translation3 };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix: matrix,
               inv_matrix: matrix.try_inverse().unwrap_or(Matrix4f::identity())}
    }

    pub fn translate(t: Vector3f) -> Self {
        Self::new(Matrix4f::new_translation(&t))
    }

    pub fn scale(s: Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(&s))
    }

    /// Rotation of `angle_degrees` around `axis`.
    pub fn rotate(axis: Vector3f, angle_degrees: Float) -> Self {
        let axis = nalgebra::Unit::new_normalize(axis);
        let rotation = nalgebra::Rotation3::from_axis_angle(&axis, angle_degrees.to_radians());
        Self::new(rotation.to_homogeneous())
    }

    /// `self` applied after `other`.
    pub fn compose(&self, other: &Transform) -> Self {
        Self { matrix: self.matrix * other.matrix,
               inv_matrix: other.inv_matrix * self.inv_matrix }
    }

    pub fn inverse(&self) -> Self {
        Self { matrix: self.inv_matrix, inv_matrix: self.matrix }
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        let h = self.matrix * nalgebra::Vector4::new(p.x, p.y, p.z, 1.0);
        Vector3f::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        self.matrix.fixed_slice::<3, 3>(0, 0) * v
    }

    // Normals transform with the inverse transpose: (M^{-1})^T n.
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0).transpose() * n
    }

    pub fn apply_ray(&self, ray: &Ray3f) -> Ray3f {
        let new_p = self.apply_point(ray.origin());
        let new_d = self.apply_vector(ray.dir());

        Ray3f::new(new_p, new_d, Some(ray.min_t), Some(ray.max_t)).with_time(ray.time)
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        self.inverse().apply_point(p)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0) * v
    }

    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        self.inverse().apply_ray(ray)
    }
}

/// Rigid motion between two poses over the shutter interval `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimatedTransform {
    start: Isometry3<Float>,
    end: Isometry3<Float>
}

impl AnimatedTransform {
    pub fn new(start: Isometry3<Float>, end: Isometry3<Float>) -> Self {
        Self { start, end }
    }

    pub fn translating(from: Vector3f, to: Vector3f) -> Self {
        Self::new(Isometry3::translation(from.x, from.y, from.z),
                  Isometry3::translation(to.x, to.y, to.z))
    }

    pub fn start(&self) -> &Isometry3<Float> {
        &self.start
    }

    pub fn end(&self) -> &Isometry3<Float> {
        &self.end
    }

    /// Pose at `time`; translation is lerped and rotation slerped.
    pub fn at(&self, time: Float) -> Isometry3<Float> {
        let t = time.max(0.0).min(1.0);
        let translation = self.start.translation.vector * (1.0 - t) + self.end.translation.vector * t;
        // Nearly equal rotations do not slerp; either endpoint is close enough.
        let rotation = self.start.rotation
            .try_slerp(&self.end.rotation, t, 1e-6)
            .unwrap_or(if t < 0.5 { self.start.rotation } else { self.end.rotation });
        Isometry3::from_parts(Translation3::from(translation), rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_points_and_vectors() {
        let t = Transform::translate(Vector3f::new(1.0, 2.0, 3.0))
            .compose(&Transform::scale(Vector3f::new(2.0, 2.0, 2.0)));
        let p = t.apply_point(Vector3f::new(1.0, 0.0, 0.0));
        assert!((p - Vector3f::new(3.0, 2.0, 3.0)).norm() < 1e-5);

        let v = t.apply_vector(Vector3f::new(1.0, 0.0, 0.0));
        assert!((v - Vector3f::new(2.0, 0.0, 0.0)).norm() < 1e-5);

        let back = t.inv_apply_point(p);
        assert!((back - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_rotation_keeps_normals_unit() {
        let r = Transform::rotate(Vector3f::new(1.0, 0.0, 0.0), 90.0);
        let z = r.apply_vector(Vector3f::new(0.0, 0.0, 1.0));
        assert!((z - Vector3f::new(0.0, -1.0, 0.0)).norm() < 1e-5);

        let n = r.apply_normal(Vector3f::new(0.0, 1.0, 0.0));
        assert!((n.norm() - 1.0).abs() < 1e-5);
        assert!((r.inv_apply_vector(z) - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_animated_transform_interpolates_pose() {
        let motion = AnimatedTransform::translating(Vector3f::zeros(), Vector3f::new(2.0, 0.0, 0.0));
        let mid = motion.at(0.5).transform_point(&nalgebra::Point3::origin());
        assert!((mid.coords - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-5);
        assert_eq!(motion.at(-1.0), *motion.start());
        assert_eq!(motion.at(3.0), *motion.end());

        let turn = nalgebra::UnitQuaternion::from_axis_angle(&Vector3f::x_axis(), crate::math::constants::PI * 0.5);
        let spin = AnimatedTransform::new(Isometry3::identity(),
                                          Isometry3::from_parts(Translation3::identity(), turn));
        let z = spin.at(0.5).transform_vector(&Vector3f::new(0.0, 0.0, 1.0));
        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert!((z - Vector3f::new(0.0, -h, h)).norm() < 1e-5);
    }
}
