//! Optical configuration — how optics arguments bind, and their resolved
//! values.
//!
//! [`OpticsSpec`] is the construction-time description (each quantity a
//! [`ParamSpec`]); [`Optics`] is what the forward solver receives once every
//! quantity has been resolved for a particular evaluation.
use crate::model::core::params::ParamSpec;

/// Names of the optical parameters, in registration order.
pub const OPTICS_PARAMETERS: [&str; 3] = ["medium_index", "illum_wavelen", "illum_polarization"];

/// Construction-time optics binding.
///
/// Default: every quantity is read from observation metadata.
#[derive(Debug, Clone, Default)]
pub struct OpticsSpec {
    pub medium_index: ParamSpec,
    pub illum_wavelen: ParamSpec,
    pub illum_polarization: ParamSpec,
}

impl OpticsSpec {
    pub fn new(
        medium_index: ParamSpec, illum_wavelen: ParamSpec, illum_polarization: ParamSpec,
    ) -> Self {
        Self { medium_index, illum_wavelen, illum_polarization }
    }

    /// All three quantities as fixed values.
    pub fn fixed(medium_index: f64, illum_wavelen: f64, illum_polarization: [f64; 2]) -> Self {
        Self {
            medium_index: ParamSpec::fixed(medium_index),
            illum_wavelen: ParamSpec::fixed(illum_wavelen),
            illum_polarization: ParamSpec::fixed(illum_polarization),
        }
    }

    /// `(name, spec)` pairs in registration order.
    pub(crate) fn entries(&self) -> [(&'static str, &ParamSpec); 3] {
        [
            (OPTICS_PARAMETERS[0], &self.medium_index),
            (OPTICS_PARAMETERS[1], &self.illum_wavelen),
            (OPTICS_PARAMETERS[2], &self.illum_polarization),
        ]
    }
}

/// Resolved optics for one forward evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optics {
    pub medium_index: f64,
    pub illum_wavelen: f64,
    pub illum_polarization: [f64; 2],
}

impl Optics {
    /// Wavelength inside the medium.
    pub fn med_wavelen(&self) -> f64 {
        self.illum_wavelen / self.medium_index
    }

    /// Wavenumber inside the medium, `2π / λ_med`.
    pub fn wavevec(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.med_wavelen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn entries_follow_registration_order() {
        let spec = OpticsSpec::fixed(1.33, 0.66, [1.0, 0.0]);

        let names: Vec<_> = spec.entries().iter().map(|(n, _)| *n).collect();

        assert_eq!(names, OPTICS_PARAMETERS.to_vec());
    }

    #[test]
    fn wavevec_uses_wavelength_in_medium() {
        let optics = Optics { medium_index: 1.33, illum_wavelen: 0.66, illum_polarization: [1.0, 0.0] };

        assert_relative_eq!(optics.med_wavelen(), 0.66 / 1.33, epsilon = 1e-15);
        assert_relative_eq!(optics.wavevec(), 2.0 * std::f64::consts::PI * 1.33 / 0.66, epsilon = 1e-12);
    }
}
