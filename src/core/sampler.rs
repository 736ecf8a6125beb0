// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};
use rand::{distributions::Uniform, prelude::Distribution, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Stream of independent uniforms in [0, 1). One instance per render task.
pub trait Sampler {
    fn next_1d(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_1d();
        let y = self.next_1d();
        Vector2f::new(x, y)
    }
}

pub struct IndependentSampler {
    rng: Xoshiro256StarStar,
    uniform: Uniform<Float>,
}

impl IndependentSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            uniform: Uniform::new(0.0, 1.0),
        }
    }

    /// Restartable stream for one pixel: the same (seed, x, y) replays the same numbers.
    pub fn for_pixel(seed: u64, x: u32, y: u32) -> Self {
        let key = seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ ((y as u64) << 32)
            ^ (x as u64);
        Self::new(key)
    }
}

impl Sampler for IndependentSampler {
    fn next_1d(&mut self) -> Float {
        self.uniform.sample(&mut self.rng)
    }
}
