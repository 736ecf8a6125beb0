// Copyright 2020 @TwoCookingMice

use super::constants::{ Float };
use super::spectrum::RGBSpectrum;

use std::ops;
use std::vec::Vec;

#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<RGBSpectrum>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = RGBSpectrum;

    fn index(&self, index: (usize, usize)) -> &RGBSpectrum {
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut RGBSpectrum {
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_number = width * height;
        Self { data: vec!(RGBSpectrum::default(); pixel_number),
               width: width,
               height: height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major (r, g, b) triples, ready for image writers.
    pub fn raw_copy(&self) -> Vec<(Float, Float, Float)> {
        self.data.iter().map(|c| (c[0], c[1], c[2])).collect()
    }

    pub fn mean(&self) -> RGBSpectrum {
        if self.data.is_empty() {
            return RGBSpectrum::default();
        }
        let mut sum = RGBSpectrum::default();
        for c in self.data.iter() {
            sum += *c;
        }
        sum / self.data.len() as Float
    }
}

/* Test for Bitmap */
#[cfg(test)]
mod tests {
    use super::Bitmap;
    use super::RGBSpectrum;

    #[test]
    fn test_bitmap_basic_functions() {
        let mut bitmap = Bitmap::new(256usize, 256usize);
        assert_eq!(bitmap.width(), 256);
        assert_eq!(bitmap.height(), 256);

        bitmap[(5, 6)] = RGBSpectrum::new(1.0, 0.5, 0.6);
        assert!((bitmap[(5, 6)][0] - 1.0).abs() < 1e-6);
        assert!((bitmap[(2, 6)][0] - 0.0).abs() < 1e-6);

        let raw = bitmap.raw_copy();
        assert_eq!(raw.len(), 256 * 256);
        assert_eq!(raw[5 + 256 * 6], (1.0, 0.5, 0.6));
    }
}
