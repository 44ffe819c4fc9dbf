//! model — Gaussian-noise observation models for hologram inference.
//!
//! Purpose
//! -------
//! Provide the statistical layer between a scattering forward solver and a
//! sampling/optimization driver: given parameter values and observed
//! hologram data, compute the log prior, log likelihood, and log posterior.
//!
//! Key behaviors
//! -------------
//! - [`core`]: parameter values, priors, observations, collaborator traits,
//!   optics and theory configuration.
//! - [`models`]: [`NoiseModel`] and [`AlphaModel`], plus the
//!   [`ObservationModel`] trait.
//! - [`errors`]: [`InferenceError`], [`SolverError`] and
//!   [`ScatteringFailure`] with the `InferenceResult` / `SolverResult`
//!   aliases.
//!
//! Conventions
//! -----------
//! - Log-probabilities are natural logs. `f64::NEG_INFINITY` is the reject
//!   value for infeasible parameters and unscatterable configurations.
//! - Errors are reserved for malformed input and fatal solver failures.
//! - The layer performs no I/O. It emits `tracing` debug events when it
//!   rejects parameters; installing a subscriber is the caller's choice.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    Constraint, Gaussian, Observation, ObservationMetadata, Optics, OpticsSpec, ParValue,
    ParamMap, ParamSpec, Parameter, ParameterValues, Prediction, Prior, ScattererTemplate,
    ScatteringSolver, Theory, Uniform,
};
pub use self::errors::{
    InferenceError, InferenceResult, ScatteringFailure, SolverError, SolverResult,
};
pub use self::models::{AlphaModel, NoiseModel, ObservationModel};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use holo_inference::model::prelude::*;
//
// to import the main model surface in a single line.

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::errors::{
        InferenceError, InferenceResult, ScatteringFailure, SolverError, SolverResult,
    };
    pub use super::models::prelude::*;
}
