/* Copyright 2020 @TwoCookingMice */

use crate::math::bitmap::Bitmap;

use exr::prelude::*;

// Write EXR Image to file
pub fn write_exr_to_file(bitmap: &Bitmap, file_path: &str) -> std::result::Result<(), exr::error::Error> {
    log::info!("Starting writing openexr images: {}.", file_path);

    let width = bitmap.width();
    let image = bitmap.raw_copy();
    write_rgb_file(file_path, bitmap.width(), bitmap.height(), |x, y| {
        let (r, g, b) = image[y * width + x];
        (r, g, b)
    })?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}

// Write a tone-mapped 8-bit preview (sRGB, clamped)
pub fn write_ldr_to_file(bitmap: &Bitmap, file_path: &str) -> std::result::Result<(), image::ImageError> {
    log::info!("Starting writing LDR image: {}.", file_path);

    let mut buffer = image::RgbImage::new(bitmap.width() as u32, bitmap.height() as u32);
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        let c = bitmap[(x as usize, y as usize)];
        *pixel = image::Rgb([to_srgb8(c[0]), to_srgb8(c[1]), to_srgb8(c[2])]);
    }
    buffer.save(file_path)?;

    log::info!("LDR image written to: {}.", file_path);
    Ok(())
}

fn to_srgb8(linear: f32) -> u8 {
    let v = if linear.is_finite() { linear.max(0.0).min(1.0) } else { 0.0 };
    let encoded = if v <= 0.0031308 { 12.92 * v } else { 1.055 * v.powf(1.0 / 2.4) - 0.055 };
    (encoded * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::texture::Texture;
    use crate::math::constants::Vector2f;
    use crate::math::spectrum::RGBSpectrum;
    use crate::textures::image::ImageTexture;

    #[test]
    fn test_exr_write_then_load_as_texture() {
        let mut bitmap = Bitmap::new(4, 2);
        bitmap[(1, 0)] = RGBSpectrum::new(0.25, 2.0, 8.0);
        let path = std::env::temp_dir().join("pathweaver_exr_utils_test.exr");
        let path = path.to_string_lossy().to_string();
        write_exr_to_file(&bitmap, &path).unwrap();

        let texture = ImageTexture::from_exr(&path).unwrap();
        assert_eq!(texture.dimensions(), (4, 2));
        // Texel (1, 0): u in [0.25, 0.5), top row is v close to 1.
        let value = texture.eval(Vector2f::new(0.3, 0.9));
        assert!((value[0] - 0.25).abs() < 1e-6);
        assert!((value[2] - 8.0).abs() < 1e-6);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_srgb_encoding() {
        assert_eq!(to_srgb8(0.0), 0);
        assert_eq!(to_srgb8(1.0), 255);
        assert_eq!(to_srgb8(4.0), 255);
        assert_eq!(to_srgb8(f32::NAN), 0);
        assert!(to_srgb8(0.18) > 100);
    }
}
