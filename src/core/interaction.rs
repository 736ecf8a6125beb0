// Copyright @yucwang 2023

use crate::emitters::Light;
use crate::materials::Material;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::media::ParticipatingMedium;
use std::sync::Arc;

#[derive(Clone)]
pub struct SurfaceInteraction {
    pub p: Vector3f,
    pub t: Float,
    pub uv: Vector2f,
    pub geo_frame: Frame,
    pub sh_frame: Frame,
    /// Shutter time of the ray that found this point.
    pub time: Float,
    material: Option<Arc<Material>>,
    emitter: Option<Arc<Light>>,
    medium: Option<Arc<ParticipatingMedium>>,
}

/// Point drawn uniformly on a shape's surface.
#[derive(Debug, Copy, Clone)]
pub struct PositionSample {
    pub p: Vector3f,
    pub n: Vector3f,
    pub uv: Vector2f,
    pub pdf: Float,
}

impl SurfaceInteraction {
    pub fn new(p: Vector3f,
               t: Float,
               uv: Vector2f,
               geo_normal: Vector3f,
               sh_normal: Vector3f) -> Self {
        Self { p, t, uv,
               geo_frame: Frame::from_normal(&geo_normal),
               sh_frame: Frame::from_normal(&sh_normal),
               time: 0.0,
               material: None, emitter: None, medium: None }
    }

    pub fn with_bindings(mut self,
                         material: Arc<Material>,
                         emitter: Option<Arc<Light>>,
                         medium: Option<Arc<ParticipatingMedium>>) -> Self {
        self.material = Some(material);
        self.emitter = emitter;
        self.medium = medium;
        self
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    /// Continuation ray along the world direction `d`, at this point's time.
    pub fn spawn_ray(&self, d: Vector3f) -> Ray3f {
        Ray3f::spawn(self.p, d).with_time(self.time)
    }

    pub fn shadow_ray(&self, d: Vector3f, dist: Float) -> Ray3f {
        Ray3f::shadow(self.p, d, dist).with_time(self.time)
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn emitter(&self) -> Option<&Arc<Light>> {
        self.emitter.as_ref()
    }

    pub fn medium(&self) -> Option<&Arc<ParticipatingMedium>> {
        self.medium.as_ref()
    }
}
