// Copyright @yucwang 2026

use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

pub trait Sensor: Sync {
    /// Primary ray through normalized film position `u` in [0, 1]².
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;
    fn resolution(&self) -> (usize, usize);
    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
