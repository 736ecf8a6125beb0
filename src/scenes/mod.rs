// Copyright @yucwang 2026

use crate::core::error::SceneError;
use crate::core::scene::{Scene, SceneObject};
use crate::core::shape::Shape;
use crate::core::texture::Texture;
use crate::emitters::distant_sphere::DistantSphereLight;
use crate::emitters::point::PointLight;
use crate::emitters::Light;
use crate::materials::blinn_phong::BlinnPhongBSDF;
use crate::materials::dielectric::DielectricBSDF;
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::materials::microfacet::MicrofacetBSDF;
use crate::materials::paper::PaperBSDF;
use crate::materials::roughdielectric::RoughDielectricBSDF;
use crate::materials::specular_mask::SpecularMaskBSDF;
use crate::materials::Material;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::{AnimatedTransform, Transform};
use crate::media::homogeneous_medium::HomogeneousMedium;
use crate::media::ParticipatingMedium;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::moving::MovingShape;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;
use crate::shapes::triangle::Triangle;
use crate::textures::image::ImageTexture;
use std::sync::Arc;

/// Built-in scenes selectable from the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DemoScene {
    /// Diffuse box with an area light, a glossy and a glass sphere.
    #[default]
    Cornell,
    /// The box filled with a homogeneous fog.
    Foggy,
    /// A smoke-filled sphere in the box.
    Smoke,
    /// Glass and rough materials under an environment light.
    Glass,
    /// A sphere crossing the box during the exposure, over a checkered glossy floor.
    Motion,
}

impl DemoScene {
    /// Builds the scene and a camera framing it. `environment` replaces
    /// the constant sky of scenes that have one.
    pub fn build(self, width: usize, height: usize, environment: Option<Arc<dyn Texture>>)
        -> Result<(Scene, PerspectiveCamera), SceneError> {
        let scene = match self {
            DemoScene::Cornell => cornell_box()?,
            DemoScene::Foggy => foggy_box()?,
            DemoScene::Smoke => smoke_sphere()?,
            DemoScene::Glass => glass_showcase(environment)?,
            DemoScene::Motion => motion_box()?,
        };
        log::info!("Built {:?} scene: {} objects, {} lights{}",
                   self, scene.objects().len(), scene.lights().len(),
                   if scene.has_medium() { ", global medium" } else { "" });
        Ok((scene, camera_for(self, width, height)))
    }
}

fn camera_for(scene: DemoScene, width: usize, height: usize) -> PerspectiveCamera {
    let (origin, target) = match scene {
        DemoScene::Glass => (Vector3f::new(0.0, 1.2, 4.5), Vector3f::new(0.0, 0.3, 0.0)),
        _ => (Vector3f::new(0.0, 0.0, 3.4), Vector3f::new(0.0, 0.0, 0.0)),
    };
    PerspectiveCamera::new(origin, target, Vector3f::new(0.0, 1.0, 0.0), (40.0 as Float).to_radians(), width, height)
}

fn diffuse(r: Float, g: Float, b: Float) -> Material {
    Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::new(r, g, b)))
}

fn quad(to_world: Transform) -> Arc<dyn Shape> {
    Arc::new(Rectangle::new(to_world))
}

// Walls of the [-1, 1]^3 box, open toward +z, all facing inward.
// The floor is white unless `floor_material` is given.
fn box_walls(scene: &mut Scene, floor_material: Option<Material>) {
    let x = Vector3f::new(1.0, 0.0, 0.0);
    let y = Vector3f::new(0.0, 1.0, 0.0);
    let white = Arc::new(diffuse(0.73, 0.73, 0.73));

    let floor = Transform::translate(Vector3f::new(0.0, -1.0, 0.0)).compose(&Transform::rotate(x, -90.0));
    let ceiling = Transform::translate(Vector3f::new(0.0, 1.0, 0.0)).compose(&Transform::rotate(x, 90.0));
    let back = Transform::translate(Vector3f::new(0.0, 0.0, -1.0));
    let floor_material = floor_material.map(Arc::new).unwrap_or_else(|| white.clone());
    scene.add_object(SceneObject::with_shared_material(quad(floor), floor_material).with_name("floor"));
    for (name, to_world) in [("ceiling", ceiling), ("back", back)].iter() {
        scene.add_object(SceneObject::with_shared_material(quad(*to_world), white.clone()).with_name(name));
    }

    let left = Transform::translate(Vector3f::new(-1.0, 0.0, 0.0)).compose(&Transform::rotate(y, 90.0));
    scene.add_object(SceneObject::new(quad(left), diffuse(0.63, 0.065, 0.05)).with_name("left"));
    let right = Transform::translate(Vector3f::new(1.0, 0.0, 0.0)).compose(&Transform::rotate(y, -90.0));
    scene.add_object(SceneObject::new(quad(right), diffuse(0.14, 0.45, 0.091)).with_name("right"));
}

fn ceiling_light(scene: &mut Scene, radiance: RGBSpectrum) {
    let to_world = Transform::translate(Vector3f::new(0.0, 0.99, 0.0))
        .compose(&Transform::rotate(Vector3f::new(1.0, 0.0, 0.0), 90.0))
        .compose(&Transform::scale(Vector3f::new(0.25, 0.25, 1.0)));
    scene.add_object(SceneObject::new(quad(to_world), diffuse(0.0, 0.0, 0.0))
        .with_area_light(radiance)
        .with_name("light"));
}

pub fn cornell_box() -> Result<Scene, SceneError> {
    let mut scene = Scene::new();
    box_walls(&mut scene, None);
    ceiling_light(&mut scene, RGBSpectrum::new(17.0, 12.0, 4.0));

    let glossy = BlinnPhongBSDF::new(80.0, RGBSpectrum::from_value(0.3), 0.6);
    scene.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(-0.45, -0.65, -0.35), 0.35)),
                                      Material::BlinnPhong(glossy)).with_name("glossy sphere"));
    let glass = DielectricBSDF::new(1.5, 1.0)?;
    scene.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.45, -0.65, 0.2), 0.35)),
                                      Material::Dielectric(glass)).with_name("glass sphere"));

    // A paper sheet leaning on the back wall.
    let sheet = Triangle::new(Vector3f::new(-0.3, -1.0, -0.95),
                              Vector3f::new(0.3, -1.0, -0.95),
                              Vector3f::new(0.0, -0.2, -0.99));
    scene.add_object(SceneObject::new(Arc::new(sheet),
                                      Material::Paper(PaperBSDF::new(RGBSpectrum::new(0.8, 0.75, 0.6), 0.3)))
        .with_name("paper"));
    Ok(scene)
}

pub fn foggy_box() -> Result<Scene, SceneError> {
    let mut scene = Scene::new();
    box_walls(&mut scene, None);
    ceiling_light(&mut scene, RGBSpectrum::new(17.0, 12.0, 4.0));
    let fog = HomogeneousMedium::new(RGBSpectrum::from_value(0.05), RGBSpectrum::new(0.25, 0.3, 0.35), 0.0)?;
    scene.set_medium(ParticipatingMedium::Homogeneous(fog));
    Ok(scene)
}

pub fn smoke_sphere() -> Result<Scene, SceneError> {
    let mut scene = Scene::new();
    box_walls(&mut scene, None);
    ceiling_light(&mut scene, RGBSpectrum::new(17.0, 12.0, 4.0));

    // Index-matched boundary: only the interior medium is visible.
    let boundary = DielectricBSDF::new(1.0, 1.0)?;
    let smoke = HomogeneousMedium::new(RGBSpectrum::from_value(0.4), RGBSpectrum::from_value(2.5), 0.0)?;
    scene.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.0, -0.4, 0.0), 0.55)),
                                      Material::Dielectric(boundary))
        .with_medium(ParticipatingMedium::Homogeneous(smoke))
        .with_name("smoke"));
    Ok(scene)
}

pub fn glass_showcase(environment: Option<Arc<dyn Texture>>) -> Result<Scene, SceneError> {
    let mut scene = Scene::new();
    let ground = Transform::rotate(Vector3f::new(1.0, 0.0, 0.0), -90.0)
        .compose(&Transform::scale(Vector3f::new(6.0, 6.0, 1.0)));
    scene.add_object(SceneObject::new(quad(ground), diffuse(0.5, 0.5, 0.5)).with_name("ground"));

    let smooth = DielectricBSDF::new(1.5, 1.0)?;
    scene.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(-1.1, 0.5, 0.0), 0.5)),
                                      Material::Dielectric(smooth)).with_name("smooth glass"));
    let frosted = RoughDielectricBSDF::new(0.2, 1.5, 1.0)?;
    scene.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.5, 0.0), 0.5)),
                                      Material::MicrofacetDielectric(frosted)).with_name("frosted glass"));
    let plastic = MicrofacetBSDF::new(0.15, 1.5, 1.0, RGBSpectrum::new(0.1, 0.2, 0.5));
    scene.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(1.1, 0.5, 0.0), 0.5)),
                                      Material::Microfacet(plastic)).with_name("plastic"));

    let sky = DistantSphereLight::environment(RGBSpectrum::new(0.6, 0.7, 0.9));
    let sky = match environment {
        Some(texture) => sky.with_texture(texture),
        None => sky,
    };
    scene.add_emitter(Light::DistantSphere(sky))?;
    scene.add_emitter(Light::Point(PointLight::new(Vector3f::new(3.0, 6.0, 4.0), RGBSpectrum::from_value(900.0))))?;
    Ok(scene)
}

pub fn motion_box() -> Result<Scene, SceneError> {
    const CHECKS: usize = 8;
    let mut scene = Scene::new();
    let texels = (0..CHECKS * CHECKS)
        .map(|idx| if (idx / CHECKS + idx % CHECKS) % 2 == 0 { RGBSpectrum::one() } else { RGBSpectrum::zero() })
        .collect();
    let mask = ImageTexture::from_texels(CHECKS, CHECKS, texels)?;
    let floor = SpecularMaskBSDF::new(RGBSpectrum::from_value(0.73), RGBSpectrum::from_value(0.8), 200.0)
        .with_mask(Arc::new(mask));
    box_walls(&mut scene, Some(Material::SpecularMask(floor)));
    ceiling_light(&mut scene, RGBSpectrum::new(17.0, 12.0, 4.0));

    let ball = Arc::new(Sphere::new(Vector3f::zeros(), 0.3));
    let motion = AnimatedTransform::translating(Vector3f::new(-0.5, -0.7, -0.2), Vector3f::new(0.5, -0.2, -0.2));
    scene.add_object(SceneObject::new(Arc::new(MovingShape::new(ball, motion)), diffuse(0.2, 0.3, 0.8))
        .with_name("moving sphere"));
    Ok(scene)
}
