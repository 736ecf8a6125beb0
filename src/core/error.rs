// Copyright @yucwang 2026

use crate::math::constants::Float;
use crate::textures::image::TextureError;
use thiserror::Error;

/// Fatal configuration problems detected while assembling a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("area emitter must be attached to a shape")]
    UnboundAreaEmitter,
    #[error("only area emitters can be bound to a shape, got {0}")]
    EmitterNotAttachable(&'static str),
    #[error("scene already has an environment emitter")]
    DuplicateEnvironmentEmitter,
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: Float,
        reason: &'static str,
    },
    #[error("invalid texture: {0}")]
    InvalidTexture(String),
}

impl From<TextureError> for SceneError {
    fn from(err: TextureError) -> Self {
        SceneError::InvalidTexture(err.to_string())
    }
}

impl SceneError {
    pub fn invalid(name: &'static str, value: Float, reason: &'static str) -> Self {
        SceneError::InvalidParameter { name, value, reason }
    }
}
