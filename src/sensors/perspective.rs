// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    near_clip: Float,
    far_clip: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();
        let aspect = if height > 0 { width as Float / height as Float } else { 1.0 };

        Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            aspect,
            near_clip: 0.0,
            far_clip: std::f32::MAX,
            width,
            height,
        }
    }

    pub fn with_clip(mut self, near_clip: Float, far_clip: Float) -> Self {
        self.near_clip = near_clip.max(0.0);
        self.far_clip = far_clip.max(self.near_clip);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let px = (2.0 * u.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * u.y) * self.tan_half_fov_y;

        let d_camera = Vector3f::new(px, py, 1.0).normalize();
        let dir = (self.right * d_camera.x + self.up * d_camera.y + self.forward * d_camera.z).normalize();

        let inv_z = if d_camera.z != 0.0 { 1.0 / d_camera.z } else { std::f32::MAX };
        let near_t = self.near_clip * inv_z;
        let far_t = if self.far_clip < std::f32::MAX { self.far_clip * inv_z } else { std::f32::MAX };
        let origin = self.origin + dir * near_t;
        let max_t = far_t - near_t;
        Ray3f::new(origin, dir, Some(0.0), Some(max_t))
    }

    fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera[{}x{}, origin {:?}, forward {:?}, fov_y {:.1} deg]",
                self.width, self.height,
                (self.origin.x, self.origin.y, self.origin.z),
                (self.forward.x, self.forward.y, self.forward.z),
                2.0 * self.tan_half_fov_y.atan().to_degrees())
    }
}
