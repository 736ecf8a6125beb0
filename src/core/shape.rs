// Copyright @yucwang 2023

use crate::core::interaction::{ PositionSample, SurfaceInteraction };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f };
use crate::math::ray::Ray3f;

pub trait Shape: Send + Sync {
    fn bounding_box(&self) -> AABB;
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceInteraction>;
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool;
    /// Uniform point with respect to surface area.
    fn sample_position(&self, u: &Vector2f) -> PositionSample;
    fn surface_area(&self) -> Float;

    fn pdf_position(&self) -> Float {
        let area = self.surface_area();
        if area > 0.0 { 1.0 / area } else { 0.0 }
    }
}
