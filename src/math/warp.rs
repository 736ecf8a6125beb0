// Copyright @yucwang 2023

use super::constants::{ INV_FOURPI, INV_PI, INV_TWOPI, PI, Float, Vector2f, Vector3f };

const ONE_MINUS_EPSILON: Float = 1.0 - std::f32::EPSILON;

/// Which side of a two-way mixture a sample landed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Branch {
    First,
    Second,
}

/// Picks `Branch::First` with probability `prob_first` using `sample.x`,
/// then stretches `sample.x` back over [0, 1) for the chosen branch.
pub fn choose_branch(prob_first: Float, sample: &Vector2f) -> (Branch, Vector2f) {
    if prob_first >= 1.0 {
        return (Branch::First, *sample);
    }
    if prob_first <= 0.0 {
        return (Branch::Second, *sample);
    }

    let mut remapped = *sample;
    if sample.x < prob_first {
        remapped.x = (sample.x / prob_first).min(ONE_MINUS_EPSILON);
        (Branch::First, remapped)
    } else {
        remapped.x = ((sample.x - prob_first) / (1.0 - prob_first)).min(ONE_MINUS_EPSILON);
        (Branch::Second, remapped)
    }
}

pub fn square_to_uniform_square(u: &Vector2f) -> Vector2f {
    *u
}

pub fn square_to_uniform_square_pdf(p: &Vector2f) -> Float {
    if p.x >= 0.0 && p.x <= 1.0 && p.y >= 0.0 && p.y <= 1.0 { 1.0 } else { 0.0 }
}

pub fn square_to_uniform_disk(u: &Vector2f) -> Vector2f {
    let r = u.x.sqrt();
    let (sin_phi, cos_phi) = (2.0 * PI * u.y).sin_cos();
    Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn square_to_uniform_disk_pdf(p: &Vector2f) -> Float {
    if p.norm_squared() <= 1.0 { INV_PI } else { 0.0 }
}

pub fn square_to_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn square_to_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let (sin_phi, cos_phi) = (2.0 * PI * u.y).sin_cos();
    Vector3f::new(r * cos_phi, r * sin_phi, z)
}

pub fn square_to_uniform_sphere_pdf(_v: &Vector3f) -> Float {
    INV_FOURPI
}

pub fn square_to_uniform_hemisphere(u: &Vector2f) -> Vector3f {
    let z: Float = u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = 2. * PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn square_to_uniform_hemisphere_pdf(v: &Vector3f) -> Float {
    if v.z > 0.0 { INV_TWOPI } else { 0.0 }
}

/// Uniform direction inside the cone `cos(theta) >= cos_theta_max` around +z.
pub fn square_to_uniform_spherical_cap(u: &Vector2f, cos_theta_max: Float) -> Vector3f {
    let cos_theta_max = cos_theta_max.max(-1.0).min(1.0);
    let z = 1.0 - u.x * (1.0 - cos_theta_max);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let (sin_phi, cos_phi) = (2.0 * PI * u.y).sin_cos();
    Vector3f::new(r * cos_phi, r * sin_phi, z)
}

pub fn square_to_uniform_spherical_cap_pdf(v: &Vector3f, cos_theta_max: Float) -> Float {
    if cos_theta_max >= 1.0 {
        return 0.0;
    }
    if cos_theta_max > -1.0 && v.z < cos_theta_max {
        return 0.0;
    }
    INV_TWOPI / (1.0 - cos_theta_max.max(-1.0))
}

pub fn square_to_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = square_to_uniform_disk_concentric(u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    Vector3f::new(p.x, p.y, z)
}

pub fn square_to_cosine_hemisphere_pdf(v: &Vector3f) -> Float {
    if v.z > 0.0 { v.z * INV_PI } else { 0.0 }
}

pub fn square_to_cosine_power_hemisphere(u: &Vector2f, exponent: Float) -> Vector3f {
    let cos_theta = u.x.powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (sin_phi, cos_phi) = (2.0 * PI * u.y).sin_cos();
    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

pub fn square_to_cosine_power_hemisphere_pdf(v: &Vector3f, exponent: Float) -> Float {
    if v.z <= 0.0 {
        return 0.0;
    }
    (exponent + 1.0) * INV_TWOPI * v.z.powf(exponent)
}

/// Returns barycentrics (b1, b2) of a uniformly distributed triangle point.
pub fn square_to_uniform_triangle(u: &Vector2f) -> Vector2f {
    let su = u.x.sqrt();
    Vector2f::new(1.0 - su, u.y * su)
}

pub fn square_to_uniform_triangle_pdf(p: &Vector2f) -> Float {
    if p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 1.0 { 2.0 } else { 0.0 }
}

/// Anisotropic Beckmann normal distribution D(m).
pub fn beckmann_distribution(m: &Vector3f, alpha_x: Float, alpha_y: Float) -> Float {
    let cos_theta = m.z;
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let cos2 = cos_theta * cos_theta;
    let sin2 = (1.0 - cos2).max(0.0);
    let tan2 = sin2 / cos2;
    let exponent = if sin2 > 0.0 {
        (m.x * m.x / (alpha_x * alpha_x) + m.y * m.y / (alpha_y * alpha_y)) / sin2 * tan2
    } else {
        0.0
    };
    let value = (-exponent).exp() / (PI * alpha_x * alpha_y * cos2 * cos2);
    if value.is_finite() { value } else { 0.0 }
}

pub fn square_to_beckmann(u: &Vector2f, alpha: Float) -> Vector3f {
    let log_sample = (1.0 - u.y).ln();
    let tan2 = if log_sample.is_finite() { -alpha * alpha * log_sample } else { 0.0 };
    let cos_theta = 1.0 / (1.0 + tan2).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (sin_phi, cos_phi) = (2.0 * PI * u.x).sin_cos();
    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

pub fn square_to_beckmann_pdf(m: &Vector3f, alpha: Float) -> Float {
    beckmann_distribution(m, alpha, alpha) * m.z.max(0.0)
}

pub fn square_to_anisotropic_beckmann(u: &Vector2f, alpha_x: Float, alpha_y: Float) -> Vector3f {
    let log_sample = (1.0 - u.y).ln();
    let log_sample = if log_sample.is_finite() { log_sample } else { 0.0 };

    let mut phi = (alpha_y / alpha_x * (2.0 * PI * u.x + 0.5 * PI).tan()).atan();
    if u.x > 0.5 {
        phi += PI;
    }
    let (sin_phi, cos_phi) = phi.sin_cos();
    let inv_alpha2 = cos_phi * cos_phi / (alpha_x * alpha_x) + sin_phi * sin_phi / (alpha_y * alpha_y);
    let tan2 = -log_sample / inv_alpha2;

    let cos_theta = 1.0 / (1.0 + tan2).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

pub fn square_to_anisotropic_beckmann_pdf(m: &Vector3f, alpha_x: Float, alpha_y: Float) -> Float {
    beckmann_distribution(m, alpha_x, alpha_y) * m.z.max(0.0)
}

/// Henyey-Greenstein direction around +z; `g > 0` favors +z.
pub fn square_to_henyey_greenstein(u: &Vector2f, g: Float) -> Vector3f {
    let cos_theta = if g.abs() < 1e-3 {
        1.0 - 2.0 * u.x
    } else {
        let sqr_term = (1.0 - g * g) / (1.0 - g + 2.0 * g * u.x);
        ((1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)).max(-1.0).min(1.0)
    };
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (sin_phi, cos_phi) = (2.0 * PI * u.y).sin_cos();
    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

pub fn square_to_henyey_greenstein_pdf(v: &Vector3f, g: Float) -> Float {
    if g.abs() < 1e-3 {
        return INV_FOURPI;
    }
    let denom = 1.0 + g * g - 2.0 * g * v.z;
    INV_FOURPI * (1.0 - g * g) / (denom * denom.sqrt())
}

/// Statistical helpers shared by the sampling tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::core::sampler::{IndependentSampler, Sampler};

    // Midpoint quadrature of a solid-angle density over the whole sphere.
    pub fn integrate_sphere<F: Fn(&Vector3f) -> Float>(pdf: F) -> Float {
        let n_theta = 400;
        let n_phi = 400;
        let d_theta = PI / n_theta as Float;
        let d_phi = 2.0 * PI / n_phi as Float;
        let mut sum = 0.0f64;
        for i in 0..n_theta {
            let theta = (i as Float + 0.5) * d_theta;
            let (sin_theta, cos_theta) = theta.sin_cos();
            for j in 0..n_phi {
                let phi = (j as Float + 0.5) * d_phi;
                let v = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
                sum += (pdf(&v) * sin_theta * d_theta * d_phi) as f64;
            }
        }
        sum as Float
    }

    // Chi-squared test on a (theta, phi) histogram against the integrated density.
    // Samples returning `None` were rejected; `pdf` may integrate to less
    // than one by exactly the rejected share.
    pub fn chi2_sphere<S, P>(mut sample: S, pdf: P) -> (Float, usize)
        where S: FnMut(&Vector2f) -> Option<Vector3f>, P: Fn(&Vector3f) -> Float {
        let n_theta = 20;
        let n_phi = 20;
        let n_samples = 50_000usize;
        let mut observed = vec![0.0 as Float; n_theta * n_phi];

        let mut sampler = IndependentSampler::new(7);
        for _ in 0..n_samples {
            let v = match sample(&sampler.next_2d()) {
                Some(v) => v,
                None => continue,
            };
            let theta = v.z.max(-1.0).min(1.0).acos();
            let mut phi = v.y.atan2(v.x);
            if phi < 0.0 {
                phi += 2.0 * PI;
            }
            let ti = ((theta / PI * n_theta as Float) as usize).min(n_theta - 1);
            let pi = ((phi / (2.0 * PI) * n_phi as Float) as usize).min(n_phi - 1);
            observed[ti * n_phi + pi] += 1.0;
        }

        let sub = 16;
        let d_theta = PI / n_theta as Float;
        let d_phi = 2.0 * PI / n_phi as Float;
        let mut expected = vec![0.0 as Float; n_theta * n_phi];
        for ti in 0..n_theta {
            for pi in 0..n_phi {
                let mut acc = 0.0;
                for a in 0..sub {
                    let theta = (ti as Float + (a as Float + 0.5) / sub as Float) * d_theta;
                    let (sin_theta, cos_theta) = theta.sin_cos();
                    for b in 0..sub {
                        let phi = (pi as Float + (b as Float + 0.5) / sub as Float) * d_phi;
                        let v = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
                        acc += pdf(&v) * sin_theta;
                    }
                }
                expected[ti * n_phi + pi] = acc * d_theta * d_phi / (sub * sub) as Float * n_samples as Float;
            }
        }

        let mut chi2 = 0.0;
        let mut dof = 0usize;
        let mut pooled_obs = 0.0;
        let mut pooled_exp = 0.0;
        for idx in 0..observed.len() {
            if expected[idx] < 5.0 {
                pooled_obs += observed[idx];
                pooled_exp += expected[idx];
            } else {
                let diff = observed[idx] - expected[idx];
                chi2 += diff * diff / expected[idx];
                dof += 1;
            }
        }
        if pooled_exp >= 5.0 {
            let diff = pooled_obs - pooled_exp;
            chi2 += diff * diff / pooled_exp;
            dof += 1;
        } else {
            assert!(pooled_obs < 10.0, "samples landed where the density vanishes");
        }
        (chi2, dof.saturating_sub(1))
    }

    pub fn assert_chi2_passes(chi2: Float, dof: usize) {
        let threshold = dof as Float + 5.0 * (2.0 * dof as Float).sqrt();
        assert!(chi2 < threshold, "chi2 = {} with {} dof", chi2, dof);
    }
}
