// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::Vector2f;
use crate::math::spectrum::RGBSpectrum;

/// Same value everywhere. Mostly useful to exercise textured code paths.
pub struct ConstantTexture {
    value: RGBSpectrum,
}

impl ConstantTexture {
    pub fn new(value: RGBSpectrum) -> Self {
        Self { value }
    }
}

impl Texture for ConstantTexture {
    fn eval(&self, _uv: Vector2f) -> RGBSpectrum {
        self.value
    }

    fn describe(&self) -> String {
        format!("ConstantTexture[{:.3}, {:.3}, {:.3}]", self.value[0], self.value[1], self.value[2])
    }
}
