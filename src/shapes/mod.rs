// Copyright @yucwang 2026

pub mod moving;
pub mod rectangle;
pub mod sphere;
pub mod triangle;
