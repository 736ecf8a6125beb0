// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::emitter::{Emitter, EmitterQueryRecord};
use crate::core::error::SceneError;
use crate::core::interaction::SurfaceInteraction;
use crate::core::shape::Shape;
use crate::emitters::area::AreaLight;
use crate::emitters::Light;
use crate::materials::Material;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::media::ParticipatingMedium;
use std::sync::Arc;

/// A shape together with everything bound to it.
pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub material: Arc<Material>,
    pub emitter: Option<Arc<Light>>,
    pub medium: Option<Arc<ParticipatingMedium>>,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, material: Material) -> Self {
        Self { shape, material: Arc::new(material), emitter: None, medium: None, name: None }
    }

    /// Shares one material between several objects.
    pub fn with_shared_material(shape: Arc<dyn Shape>, material: Arc<Material>) -> Self {
        Self { shape, material, emitter: None, medium: None, name: None }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_area_light(mut self, radiance: RGBSpectrum) -> Self {
        let light = AreaLight::from_shape(self.shape.clone(), radiance);
        self.emitter = Some(Arc::new(Light::Area(light)));
        self
    }

    /// Binds an emitter to this shape. Only area lights can live on a
    /// surface; they are rebound to this object's shape.
    pub fn with_emitter(self, light: Light) -> Result<Self, SceneError> {
        match light {
            Light::Area(area) => Ok(self.with_area_light(area.radiance())),
            other => Err(SceneError::EmitterNotAttachable(other.name())),
        }
    }

    /// Fills the inside of the shape with `medium`.
    pub fn with_medium(mut self, medium: ParticipatingMedium) -> Self {
        let bounds = self.shape.bounding_box();
        self.medium = Some(Arc::new(medium.bounded(bounds)));
        self
    }
}

#[derive(Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<Arc<Light>>,
    environment: Option<Arc<Light>>,
    medium: Option<Arc<ParticipatingMedium>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: SceneObject) {
        if let Some(emitter) = &object.emitter {
            self.lights.push(emitter.clone());
        }
        log::debug!("Added object {} with {} material{}{}",
                    object.name.as_deref().unwrap_or("<unnamed>"),
                    object.material.name(),
                    if object.emitter.is_some() { ", emitting" } else { "" },
                    if object.medium.is_some() { ", with interior medium" } else { "" });
        self.objects.push(object);
    }

    /// Adds a light that is not tied to any surface.
    pub fn add_emitter(&mut self, light: Light) -> Result<(), SceneError> {
        if let Light::Area(_) = light {
            return Err(SceneError::UnboundAreaEmitter);
        }
        let light = Arc::new(light);
        if light.is_environment() {
            if self.environment.is_some() {
                return Err(SceneError::DuplicateEnvironmentEmitter);
            }
            self.environment = Some(light.clone());
        }
        log::debug!("Added {} emitter", light.name());
        self.lights.push(light);
        Ok(())
    }

    /// Medium filling the whole scene.
    pub fn set_medium(&mut self, medium: ParticipatingMedium) {
        self.medium = Some(Arc::new(medium));
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[Arc<Light>] {
        &self.lights
    }

    pub fn has_environment_emitter(&self) -> bool {
        self.environment.is_some()
    }

    pub fn environment_emitter(&self) -> Option<&Arc<Light>> {
        self.environment.as_ref()
    }

    pub fn has_medium(&self) -> bool {
        self.medium.is_some()
    }

    pub fn medium(&self) -> Option<&Arc<ParticipatingMedium>> {
        self.medium.as_ref()
    }

    pub fn bounds(&self) -> AABB {
        let mut bounds = AABB::default();
        for object in &self.objects {
            bounds.expand_by_aabb(&object.shape.bounding_box());
        }
        bounds
    }

    /// Closest hit along `ray`, carrying the hit object's bindings.
    pub fn ray_intersect(&self, ray: &Ray3f) -> Option<SurfaceInteraction> {
        let mut ray = *ray;
        let mut closest: Option<(usize, SurfaceInteraction)> = None;
        for (idx, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.shape.ray_intersection(&ray) {
                if ray.update(hit.t) {
                    closest = Some((idx, hit));
                }
            }
        }

        closest.map(|(idx, mut hit)| {
            let object = &self.objects[idx];
            hit.time = ray.time;
            hit.with_bindings(object.material.clone(), object.emitter.clone(), object.medium.clone())
        })
    }

    /// Occlusion test for shadow rays.
    pub fn ray_intersect_any(&self, ray: &Ray3f) -> bool {
        self.objects.iter().any(|object| object.shape.ray_intersection_t(ray))
    }

    /// Radiance of the environment seen along an escaping ray.
    pub fn eval_environment(&self, ray: &Ray3f) -> RGBSpectrum {
        match &self.environment {
            Some(env) => env.eval(&EmitterQueryRecord::from_ray(env.clone(), ray)),
            None => RGBSpectrum::default(),
        }
    }

    /// Picks one light uniformly and samples it. The returned value is
    /// already divided by the selection probability.
    pub fn sample_direct(&self, ref_p: &Vector3f, sample: &Vector2f) -> (RGBSpectrum, EmitterQueryRecord) {
        let mut record = EmitterQueryRecord::new(*ref_p);
        let count = self.lights.len();
        if count == 0 {
            return (RGBSpectrum::default(), record);
        }
        let scaled = sample.x * count as Float;
        let index = (scaled as usize).min(count - 1);
        let reused = Vector2f::new((scaled - index as Float).min(1.0 - Float::EPSILON), sample.y);

        let light = &self.lights[index];
        record.emitter = Some(light.clone());
        let value = light.sample(&mut record, &reused);
        (value * count as Float, record)
    }

    /// Density of `record` under `sample_direct`.
    pub fn pdf_direct(&self, record: &EmitterQueryRecord) -> Float {
        match &record.emitter {
            Some(emitter) if !self.lights.is_empty() => emitter.pdf(record) / self.lights.len() as Float,
            _ => 0.0,
        }
    }
}
