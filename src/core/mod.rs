// Copyright @yucwang 2021

pub mod bsdf;
pub mod emitter;
pub mod error;
pub mod integrator;
pub mod interaction;
pub mod medium;
pub mod sampler;
pub mod sensor;
pub mod scene;
pub mod shape;
pub mod texture;
