// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use exr::prelude::*;
use image::io::Reader as ImageReader;
use image::GenericImageView;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to open texture {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("failed to decode texture {path}: {source}")]
    Decode { path: String, source: image::ImageError },
    #[error("failed to read exr {path}: {source}")]
    Exr { path: String, source: exr::error::Error },
    #[error("unsupported texture format `{0}`")]
    UnsupportedFormat(String),
    #[error("texture {0} has no pixels")]
    Empty(String),
    #[error("{width}x{height} texture given {len} texels")]
    SizeMismatch { width: usize, height: usize, len: usize },
}

/// Bitmap texture with nearest-texel lookup and repeat wrapping.
/// Row 0 is the top of the image, so v = 1 maps to the first row.
pub struct ImageTexture {
    width: usize,
    height: usize,
    texels: Vec<RGBSpectrum>,
}

fn srgb_to_linear(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

impl ImageTexture {
    pub fn from_texels(width: usize, height: usize, texels: Vec<RGBSpectrum>)
        -> std::result::Result<Self, TextureError> {
        if width * height != texels.len() {
            return Err(TextureError::SizeMismatch { width, height, len: texels.len() });
        }
        Ok(Self { width, height, texels })
    }

    fn black(width: usize, height: usize) -> Self {
        Self { width, height, texels: vec![RGBSpectrum::zero(); width * height] }
    }

    pub fn from_exr(path: &str) -> std::result::Result<Self, TextureError> {
        let image = read()
            .no_deep_data()
            .largest_resolution_level()
            .rgba_channels(
                |resolution, _| {
                    ImageTexture::black(resolution.width(), resolution.height())
                },
                |texture, position, (r, g, b, _a): (f32, f32, f32, f32)| {
                    let index = position.y() * texture.width + position.x();
                    texture.texels[index] = RGBSpectrum::new(r, g, b);
                },
            )
            .first_valid_layer()
            .all_attributes()
            .from_file(path)
            .map_err(|source| TextureError::Exr { path: path.to_string(), source })?;

        let texture = image.layer_data.channel_data.pixels;
        texture.non_empty(path)
    }

    /// Loads an 8-bit or float image through the `image` crate. `srgb`
    /// decodes gamma-encoded values to linear.
    pub fn from_image(path: &str, srgb: bool) -> std::result::Result<Self, TextureError> {
        let img = ImageReader::open(path)
            .map_err(|source| TextureError::Io { path: path.to_string(), source })?
            .decode()
            .map_err(|source| TextureError::Decode { path: path.to_string(), source })?;

        let (width, height) = img.dimensions();
        let rgb = img.to_rgb32f();
        let texels = rgb
            .pixels()
            .map(|p| {
                let texel = RGBSpectrum::new(p[0], p[1], p[2]);
                if srgb { texel.map(srgb_to_linear) } else { texel }
            })
            .collect();

        Self::from_texels(width as usize, height as usize, texels)?.non_empty(path)
    }

    pub fn from_file(path: &str) -> std::result::Result<Self, TextureError> {
        let ext = Path::new(path)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let texture = match ext.as_str() {
            "exr" => Self::from_exr(path)?,
            "jpg" | "jpeg" | "png" => Self::from_image(path, true)?,
            "hdr" => Self::from_image(path, false)?,
            _ => return Err(TextureError::UnsupportedFormat(ext)),
        };
        log::info!("Loaded texture {} ({}x{})", path, texture.width, texture.height);
        Ok(texture)
    }

    fn non_empty(self, path: &str) -> std::result::Result<Self, TextureError> {
        if self.width == 0 || self.height == 0 {
            return Err(TextureError::Empty(path.to_string()));
        }
        Ok(self)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn texel_index(coord: Float, size: usize) -> usize {
        let wrapped = coord.rem_euclid(1.0);
        ((wrapped * size as Float) as usize).min(size - 1)
    }
}

impl Texture for ImageTexture {
    fn eval(&self, uv: Vector2f) -> RGBSpectrum {
        if self.width == 0 || self.height == 0 {
            return RGBSpectrum::default();
        }
        let x = Self::texel_index(uv.x, self.width);
        let y = Self::texel_index(1.0 - uv.y, self.height);
        self.texels[y * self.width + x]
    }

    fn describe(&self) -> String {
        format!("ImageTexture[{}x{}]", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> ImageTexture {
        ImageTexture::from_texels(2, 2, vec![
            RGBSpectrum::new(1.0, 0.0, 0.0), RGBSpectrum::new(0.0, 1.0, 0.0),
            RGBSpectrum::new(0.0, 0.0, 1.0), RGBSpectrum::new(1.0, 1.0, 1.0),
        ]).unwrap()
    }

    #[test]
    fn test_short_texel_buffer_is_rejected() {
        match ImageTexture::from_texels(3, 2, vec![RGBSpectrum::one(); 5]) {
            Err(TextureError::SizeMismatch { width, height, len }) => assert_eq!((width, height, len), (3, 2, 5)),
            _ => panic!("expected a size mismatch"),
        }
    }

    #[test]
    fn test_nearest_lookup_top_row_is_v_one() {
        let tex = checker();
        assert_eq!(tex.eval(Vector2f::new(0.25, 0.75)), RGBSpectrum::new(1.0, 0.0, 0.0));
        assert_eq!(tex.eval(Vector2f::new(0.75, 0.75)), RGBSpectrum::new(0.0, 1.0, 0.0));
        assert_eq!(tex.eval(Vector2f::new(0.25, 0.25)), RGBSpectrum::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_repeat_wrapping() {
        let tex = checker();
        assert_eq!(tex.eval(Vector2f::new(1.25, 0.75)), tex.eval(Vector2f::new(0.25, 0.75)));
        assert_eq!(tex.eval(Vector2f::new(-0.25, -0.25)), tex.eval(Vector2f::new(0.75, 0.75)));
    }

    #[test]
    fn test_srgb_decode() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        match ImageTexture::from_file("texture.tga") {
            Err(TextureError::UnsupportedFormat(ext)) => assert_eq!(ext, "tga"),
            _ => panic!("expected an unsupported format error"),
        }
    }
}
