// Copyright @yucwang 2026

pub mod homogeneous_medium;

use crate::core::medium::{Medium, MediumQueryRecord};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

use self::homogeneous_medium::HomogeneousMedium;

pub enum ParticipatingMedium {
    Homogeneous(HomogeneousMedium),
}

impl ParticipatingMedium {
    fn inner(&self) -> &dyn Medium {
        match self {
            ParticipatingMedium::Homogeneous(medium) => medium,
        }
    }

    /// Same medium restricted to `bounds`.
    pub fn bounded(self, bounds: AABB) -> Self {
        match self {
            ParticipatingMedium::Homogeneous(medium) => {
                ParticipatingMedium::Homogeneous(medium.with_bounds(bounds))
            }
        }
    }
}

impl Medium for ParticipatingMedium {
    fn sample(&self, record: &mut MediumQueryRecord, sample: &Vector2f) -> RGBSpectrum {
        self.inner().sample(record, sample)
    }

    fn eval(&self, record: &MediumQueryRecord) -> RGBSpectrum {
        self.inner().eval(record)
    }

    fn pdf(&self, record: &MediumQueryRecord) -> Float {
        self.inner().pdf(record)
    }

    fn sample_free_path(&self, u: Float) -> Float {
        self.inner().sample_free_path(u)
    }

    fn pdf_free_path(&self, record: &MediumQueryRecord) -> Float {
        self.inner().pdf_free_path(record)
    }

    fn survival_free_path(&self, dist: Float) -> Float {
        self.inner().survival_free_path(dist)
    }

    fn transmittance(&self, dist: Float) -> RGBSpectrum {
        self.inner().transmittance(dist)
    }

    fn sigma_s(&self) -> RGBSpectrum {
        self.inner().sigma_s()
    }

    fn is_homogeneous(&self) -> bool {
        self.inner().is_homogeneous()
    }

    fn is_in_medium(&self, p: &Vector3f) -> bool {
        self.inner().is_in_medium(p)
    }

    fn bounds(&self) -> Option<AABB> {
        self.inner().bounds()
    }
}
