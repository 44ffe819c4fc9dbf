//! core — building blocks shared by the noise models.
//!
//! Purpose
//! -------
//! Collect the value types, observation container, parameter contracts,
//! collaborator traits, and configuration enums that the models in
//! [`crate::model::models`] are assembled from.
//!
//! Key behaviors
//! -------------
//! - [`values`]: scalar/array parameter values and caller input forms.
//! - [`params`] and [`priors`]: the prior contract and `statrs`-backed
//!   reference priors.
//! - [`data`]: observations, pixel subsetting, and metadata broadcasting.
//! - [`scattering`]: scatterer template, constraint, and solver traits plus
//!   the [`Prediction`] result.
//! - [`optics`] and [`theory`]: optical configuration and solver selection.
//! - [`validation`]: small input checks.
//!
//! Conventions
//! -----------
//! - Everything here is free of I/O. Logging is limited to `tracing` debug
//!   events when a prediction is rejected.

pub mod data;
pub mod optics;
pub mod params;
pub mod priors;
pub mod scattering;
pub mod theory;
pub mod validation;
pub mod values;

pub use self::data::{Observation, ObservationMetadata, dict_to_array, make_subset_data};
pub use self::optics::{OPTICS_PARAMETERS, Optics, OpticsSpec};
pub use self::params::{ParamSpec, Parameter, Prior};
pub use self::priors::{Gaussian, Uniform};
pub use self::scattering::{Constraint, Prediction, ScattererTemplate, ScatteringSolver};
pub use self::theory::Theory;
pub use self::validation::{validate_noise_sd, validate_value_count};
pub use self::values::{ParValue, ParamMap, ParameterValues};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use holo_inference::model::core::prelude::*;
//
// to import the main core surface in a single line.

pub mod prelude {
    pub use super::data::{Observation, ObservationMetadata};
    pub use super::optics::{Optics, OpticsSpec};
    pub use super::params::{ParamSpec, Parameter, Prior};
    pub use super::priors::{Gaussian, Uniform};
    pub use super::scattering::{Constraint, Prediction, ScattererTemplate, ScatteringSolver};
    pub use super::theory::Theory;
    pub use super::values::{ParValue, ParamMap, ParameterValues};
}
