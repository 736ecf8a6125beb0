// Copyright @yucwang 2026

pub mod constant;
pub mod image;
