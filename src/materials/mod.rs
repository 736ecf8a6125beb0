// Copyright @yucwang 2026

pub mod blinn_phong;
pub mod dielectric;
pub mod lambertian_diffuse;
pub mod microfacet;
pub mod paper;
pub mod phong;
pub mod roughdielectric;
pub mod specular_mask;

use crate::core::bsdf::{BSDFQueryRecord, BSDF};
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;

use self::blinn_phong::BlinnPhongBSDF;
use self::dielectric::DielectricBSDF;
use self::lambertian_diffuse::LambertianDiffuseBSDF;
use self::microfacet::MicrofacetBSDF;
use self::paper::PaperBSDF;
use self::phong::PhongBSDF;
use self::roughdielectric::RoughDielectricBSDF;
use self::specular_mask::SpecularMaskBSDF;

/// Every surface material the renderer knows about.
pub enum Material {
    Diffuse(LambertianDiffuseBSDF),
    Dielectric(DielectricBSDF),
    BlinnPhong(BlinnPhongBSDF),
    Phong(PhongBSDF),
    Microfacet(MicrofacetBSDF),
    MicrofacetDielectric(RoughDielectricBSDF),
    Paper(PaperBSDF),
    SpecularMask(SpecularMaskBSDF),
}

impl Default for Material {
    fn default() -> Self {
        Material::Diffuse(LambertianDiffuseBSDF::default())
    }
}

impl Material {
    fn inner(&self) -> &dyn BSDF {
        match self {
            Material::Diffuse(bsdf) => bsdf,
            Material::Dielectric(bsdf) => bsdf,
            Material::BlinnPhong(bsdf) => bsdf,
            Material::Phong(bsdf) => bsdf,
            Material::Microfacet(bsdf) => bsdf,
            Material::MicrofacetDielectric(bsdf) => bsdf,
            Material::Paper(bsdf) => bsdf,
            Material::SpecularMask(bsdf) => bsdf,
        }
    }
}

impl BSDF for Material {
    fn name(&self) -> &'static str {
        match self {
            Material::Diffuse(_) => "diffuse",
            Material::Dielectric(_) => "dielectric",
            Material::BlinnPhong(_) => "blinn_phong",
            Material::Phong(_) => "phong",
            Material::Microfacet(_) => "microfacet",
            Material::MicrofacetDielectric(_) => "microfacet_dielectric",
            Material::Paper(_) => "paper",
            Material::SpecularMask(_) => "specular_mask",
        }
    }

    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        self.inner().eval(record)
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        self.inner().pdf(record)
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        self.inner().sample(record, sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bsdf::Measure;
    use crate::core::sampler::{IndependentSampler, Sampler};
    use crate::math::constants::Vector3f;
    use crate::math::warp::testing::{assert_chi2_passes, chi2_sphere};

    // Successful solid-angle samples of `material` for a fixed `wi`.
    fn sampled_direction<'a>(material: &'a Material, wi: Vector3f)
        -> impl FnMut(&Vector2f) -> Option<Vector3f> + 'a {
        move |u| {
            let mut record = BSDFQueryRecord::new(wi, Vector2f::new(0.5, 0.5));
            let weight = material.sample(&mut record, u);
            if weight.is_black() || record.measure != Measure::SolidAngle {
                return None;
            }
            Some(record.wo)
        }
    }

    #[test]
    fn test_sampled_directions_follow_pdf() {
        let tilted = Vector3f::new(0.48, 0.36, 0.8);
        let grazing = Vector3f::new(0.98, 0.0, 0.2).normalize();
        let below = Vector3f::new(0.6, 0.0, -0.8);
        let cases = vec![
            (Material::Diffuse(LambertianDiffuseBSDF::default()), tilted),
            (Material::BlinnPhong(BlinnPhongBSDF::new(20.0, RGBSpectrum::from_value(0.2), 1.0)), tilted),
            (Material::BlinnPhong(BlinnPhongBSDF::new(20.0, RGBSpectrum::from_value(0.2), 1.0)), grazing),
            (Material::Phong(PhongBSDF::new(30.0, RGBSpectrum::from_value(0.2), 1.0)), grazing),
            (Material::Microfacet(MicrofacetBSDF::new(0.3, 1.5, 1.0, RGBSpectrum::from_value(0.2))), tilted),
            (Material::Microfacet(MicrofacetBSDF::new(0.3, 1.5, 1.0, RGBSpectrum::from_value(0.2))), grazing),
            (Material::MicrofacetDielectric(RoughDielectricBSDF::new(0.3, 1.5, 1.0).unwrap()), tilted),
            (Material::MicrofacetDielectric(RoughDielectricBSDF::new(0.5, 1.5, 1.0).unwrap()), grazing),
            (Material::MicrofacetDielectric(RoughDielectricBSDF::new(0.3, 1.5, 1.0).unwrap()), below),
            (Material::Paper(PaperBSDF::default()), below),
            (Material::SpecularMask(SpecularMaskBSDF::default()), tilted),
        ];
        for (material, wi) in cases.iter() {
            let uv = Vector2f::new(0.5, 0.5);
            let (chi2, dof) = chi2_sphere(sampled_direction(material, *wi), |wo| {
                material.pdf(&BSDFQueryRecord::with_directions(*wi, *wo, Measure::SolidAngle, uv))
            });
            assert!(dof > 10, "{} at {:?}: only {} bins populated", material.name(), wi, dof);
            assert_chi2_passes(chi2, dof);
        }
    }

    #[test]
    fn test_reflectance_does_not_exceed_one() {
        let lossless = vec![
            Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::one())),
            Material::Phong(PhongBSDF::new(10.0, RGBSpectrum::from_value(0.5), 1.0)),
            Material::Microfacet(MicrofacetBSDF::new(0.2, 1.5, 1.0, RGBSpectrum::from_value(0.5))),
        ];
        let mut sampler = IndependentSampler::new(99);
        let n = 20_000;
        for material in lossless {
            for wi in [Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.6, 0.0, 0.8)].iter() {
                let mut total = RGBSpectrum::zero();
                for _ in 0..n {
                    let mut record = BSDFQueryRecord::new(*wi, Vector2f::zeros());
                    total += material.sample(&mut record, &sampler.next_2d());
                }
                let albedo = total / n as Float;
                assert!(albedo.max_coeff() < 1.02, "{} reflects {:?}", material.name(), albedo);
            }
        }
    }

    #[test]
    fn test_kd_textures_fall_back_on_black_texels() {
        use crate::textures::constant::ConstantTexture;
        use std::sync::Arc;
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let side = Vector3f::new(0.8, 0.0, 0.6);
        let record = BSDFQueryRecord::with_directions(up, side, Measure::SolidAngle, Vector2f::zeros());
        let red = RGBSpectrum::new(0.6, 0.0, 0.0);

        let plain = BlinnPhongBSDF::new(50.0, RGBSpectrum::from_value(0.2), 1.0);
        let textured = BlinnPhongBSDF::new(50.0, RGBSpectrum::from_value(0.2), 1.0)
            .with_kd_texture(Arc::new(ConstantTexture::new(red)));
        let blacked = BlinnPhongBSDF::new(50.0, RGBSpectrum::from_value(0.2), 1.0)
            .with_kd_texture(Arc::new(ConstantTexture::new(RGBSpectrum::zero())));
        assert_eq!(blacked.eval(&record), plain.eval(&record));
        assert!(textured.eval(&record)[0] > textured.eval(&record)[1]);

        let plain = MicrofacetBSDF::new(0.3, 1.5, 1.0, RGBSpectrum::from_value(0.2));
        let textured = MicrofacetBSDF::new(0.3, 1.5, 1.0, RGBSpectrum::from_value(0.2))
            .with_kd_texture(Arc::new(ConstantTexture::new(red)));
        let blacked = MicrofacetBSDF::new(0.3, 1.5, 1.0, RGBSpectrum::from_value(0.2))
            .with_kd_texture(Arc::new(ConstantTexture::new(RGBSpectrum::zero())));
        assert_eq!(blacked.eval(&record), plain.eval(&record));
        assert!(textured.eval(&record)[0] > textured.eval(&record)[1]);
    }

    #[test]
    fn test_default_material_is_gray_diffuse() {
        let material = Material::default();
        assert_eq!(material.name(), "diffuse");
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let record = BSDFQueryRecord::with_directions(up, up, Measure::SolidAngle, Vector2f::zeros());
        assert!((material.eval(&record)[0] - 0.5 * crate::math::constants::INV_PI).abs() < 1e-6);
    }
}
