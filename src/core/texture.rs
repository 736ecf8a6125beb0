// Copyright @yucwang 2026

use crate::math::constants::Vector2f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

pub trait Texture: Send + Sync {
    fn eval(&self, uv: Vector2f) -> RGBSpectrum;

    fn describe(&self) -> String {
        String::from("Texture")
    }
}

/// Texel lookup that falls back to `default` when no texture is bound or
/// the texel is exactly black.
pub fn lookup_or(texture: &Option<Arc<dyn Texture>>, uv: &Vector2f, default: RGBSpectrum) -> RGBSpectrum {
    match texture {
        Some(texture) => {
            let texel = texture.eval(*uv);
            if texel.is_black() { default } else { texel }
        }
        None => default,
    }
}
