// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn from_value(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::from_value(1.0)
    }

    pub fn is_black(&self) -> bool {
        for idx in 0..3 {
            if self.rgb[idx] != 0.0f32 {
                return false;
            }
        }

        true
    }

    pub fn is_finite(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    pub fn max_coeff(&self) -> Float {
        self.rgb.x.max(self.rgb.y).max(self.rgb.z)
    }

    pub fn min_coeff(&self) -> Float {
        self.rgb.x.min(self.rgb.y).min(self.rgb.z)
    }

    pub fn luminance(&self) -> Float {
        0.212671 * self.rgb.x + 0.715160 * self.rgb.y + 0.072169 * self.rgb.z
    }

    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self::new(f(self.rgb.x), f(self.rgb.y), f(self.rgb.z))
    }

    pub fn exp(&self) -> Self {
        self.map(|c| c.exp())
    }

    /// Componentwise division that maps x/0 to 0.
    pub fn safe_div(&self, other: &RGBSpectrum) -> Self {
        let mut result = RGBSpectrum::default();
        for idx in 0..3 {
            if other.rgb[idx] != 0.0 {
                result.rgb[idx] = self.rgb[idx] / other.rgb[idx];
            }
        }
        result
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.rgb[index]
    }
}

impl ops::IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, index: usize) -> &mut Float {
        &mut self.rgb[index]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = RGBSpectrum;

    fn add(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: RGBSpectrum) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Sub for RGBSpectrum {
    type Output = RGBSpectrum;

    fn sub(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb - rhs.rgb }
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: RGBSpectrum) {
        self.rgb.component_mul_assign(&rhs.rgb);
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, rhs: Float) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb * rhs }
    }
}

impl ops::Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: rhs.rgb * self }
    }
}

impl ops::MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        self.rgb *= rhs;
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = RGBSpectrum;

    fn div(self, rhs: Float) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb / rhs }
    }
}

impl ops::DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, rhs: Float) {
        self.rgb /= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::RGBSpectrum;

    #[test]
    fn test_spectrum_arithmetic() {
        let a = RGBSpectrum::new(0.5, 1.0, 2.0);
        let b = RGBSpectrum::new(2.0, 0.5, 0.25);

        let prod = a * b;
        assert!((prod[0] - 1.0).abs() < 1e-6);
        assert!((prod[1] - 0.5).abs() < 1e-6);
        assert!((prod[2] - 0.5).abs() < 1e-6);

        let sum = a + b * 2.0;
        assert!((sum[2] - 2.5).abs() < 1e-6);
        assert!((a.max_coeff() - 2.0).abs() < 1e-6);
        assert!((b.min_coeff() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_spectrum_black() {
        assert!(RGBSpectrum::default().is_black());
        assert!(!RGBSpectrum::new(0.0, 0.0, 1e-6).is_black());

        let q = RGBSpectrum::new(1.0, 2.0, 3.0).safe_div(&RGBSpectrum::new(2.0, 0.0, 3.0));
        assert_eq!(q, RGBSpectrum::new(0.5, 0.0, 1.0));
    }
}
