// Copyright 2020 @TwoCookingMice

use super::constants::{EPSILON, Float, Vector3f};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float,
    pub time: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::MAX),
               time: 0.0 }
    }

    /// Secondary ray leaving a surface point, offset by `EPSILON`.
    pub fn spawn(o: Vector3f, d: Vector3f) -> Self {
        Self::new(o, d, Some(EPSILON), None)
    }

    /// Shadow ray toward a point `dist` away, stopping short of it.
    pub fn shadow(o: Vector3f, d: Vector3f, dist: Float) -> Self {
        let max_t = if dist.is_finite() { dist * (1.0 - EPSILON) - EPSILON } else { std::f32::MAX };
        Self::new(o, d, Some(EPSILON), Some(max_t))
    }

    pub fn with_time(mut self, time: Float) -> Self {
        self.time = time;
        self
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn update(&mut self, t: Float) -> bool {
        if t < self.min_t || t > self.max_t {
            false
        } else {
            self.max_t = t;
            true
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::Vector3f;
    use super::{Ray3f};

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let mut ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());
        assert!((ray.dir().norm() - 1.0).abs() < 1e-6);

        let v1 = ray.at(2.0);
        assert!((v1[0] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!((v1[1] - 0.0).abs() < 1e-5);
        assert!((v1[2] - std::f32::consts::SQRT_2).abs() < 1e-5);

        let status1 = ray.update(100.0);
        let status2 = ray.update(105.0);
        assert_eq!(status1, true);
        assert_eq!(status2, false);
    }

    #[test]
    fn test_shadow_ray_stops_short() {
        let ray = Ray3f::shadow(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 2.0);
        assert!(ray.test_segment(1.99));
        assert!(!ray.test_segment(2.0));
        assert!(!ray.test_segment(0.0));

        let far = Ray3f::shadow(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), std::f32::INFINITY);
        assert!(far.test_segment(1e20));
    }
}
