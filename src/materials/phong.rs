// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFQueryRecord, Measure, BSDF};
use crate::math::constants::{Float, INV_PI, INV_TWOPI, Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{
    choose_branch, square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf,
    square_to_cosine_power_hemisphere, square_to_cosine_power_hemisphere_pdf, Branch,
};

/// Diffuse plus a normalized Phong lobe around the mirror direction.
pub struct PhongBSDF {
    exponent: Float,
    kd: RGBSpectrum,
    ks: Float,
}

impl Default for PhongBSDF {
    fn default() -> Self {
        Self::new(100.0, RGBSpectrum::from_value(0.5), 1.0)
    }
}

impl PhongBSDF {
    pub fn new(exponent: Float, kd: RGBSpectrum, ks: Float) -> Self {
        let ks = ks.max(0.0).min(1.0) * (1.0 - kd.max_coeff()).max(0.0);
        Self { exponent: exponent.max(0.0), kd, ks }
    }

    fn mirror(wi: &Vector3f) -> Vector3f {
        Vector3f::new(-wi.x, -wi.y, wi.z)
    }

    fn valid(record: &BSDFQueryRecord) -> bool {
        record.measure == Measure::SolidAngle
            && Frame::cos_theta(&record.wi) > 0.0
            && Frame::cos_theta(&record.wo) > 0.0
    }
}

impl BSDF for PhongBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> RGBSpectrum {
        if !Self::valid(record) {
            return RGBSpectrum::default();
        }
        let wr = Self::mirror(&record.wi);
        let lobe = (self.exponent + 2.0) * INV_TWOPI * wr.dot(&record.wo).max(0.0).powf(self.exponent);
        self.kd * INV_PI + RGBSpectrum::from_value(self.ks * lobe)
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if !Self::valid(record) {
            return 0.0;
        }
        let lobe_frame = Frame::from_normal(&Self::mirror(&record.wi));
        let specular = square_to_cosine_power_hemisphere_pdf(&lobe_frame.to_local(&record.wo), self.exponent);
        self.ks * specular + (1.0 - self.ks) * square_to_cosine_hemisphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut BSDFQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        if Frame::cos_theta(&record.wi) <= 0.0 {
            return RGBSpectrum::default();
        }

        let (branch, u) = choose_branch(self.ks, sample);
        record.wo = match branch {
            Branch::First => {
                let lobe_frame = Frame::from_normal(&Self::mirror(&record.wi));
                lobe_frame.to_world(&square_to_cosine_power_hemisphere(&u, self.exponent))
            }
            Branch::Second => square_to_cosine_hemisphere(&u),
        };
        record.measure = Measure::SolidAngle;
        record.eta = 1.0;

        let pdf = self.pdf(record);
        if pdf <= 0.0 || !pdf.is_finite() {
            return RGBSpectrum::default();
        }
        self.eval(record) * Frame::cos_theta(&record.wo) / pdf
    }
}
