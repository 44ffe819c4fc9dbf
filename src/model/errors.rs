//! Errors for noise observation models (input validation, parameter
//! resolution, and forward-solver failures).
//!
//! This module defines the model error type, [`InferenceError`], and the
//! forward-solver error type, [`SolverError`], used across the model layer.
//! Both implement `Display`/`Error`.
//!
//! ## Conventions
//! - **Pixel indices are 0-based** into the flattened observation.
//! - Physically invalid scatterers are *not* errors: the solver reports them
//!   as [`ScatteringFailure`] and the model layer turns them into a
//!   `-∞` log-probability.
//! - Solver crashes outside the recoverable set are carried as
//!   [`SolverError::Fatal`] and surface as [`InferenceError::SolverFailure`].
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};
use statrs::distribution::{NormalError, UniformError};

/// Crate-wide result alias for model operations that may produce
/// [`InferenceError`].
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Result alias for forward-solver calls.
pub type SolverResult<T> = Result<T, SolverError>;

/// Unified error type for noise-model evaluation.
///
/// Covers malformed parameter input, unresolved parameters, observation
/// shape problems, prior construction, and fatal solver errors. Infeasible
/// parameters never produce an error; they produce `f64::NEG_INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Parameter input ----
    /// Positional values do not line up with the declared parameters.
    ParameterCountMismatch { expected: usize, actual: usize },

    /// A parameter could not be resolved from values, fixed values, or data.
    MissingParameter { name: String },

    /// A parameter value has the wrong form (e.g. array where a scalar is needed).
    InvalidParameterValue { name: String, reason: &'static str },

    // ---- Observation ----
    /// An array does not match the number of pixels in the observation.
    ShapeMismatch { name: String, expected: usize, actual: usize },

    /// Pixel subset refers to a pixel outside the observation.
    PixelOutOfRange { pixel: usize, len: usize },

    /// Pixel subset selects nothing.
    EmptyPixelSubset,

    /// Observation construction failed.
    InvalidObservation { reason: &'static str },

    /// Noise standard deviation must be finite and > 0 for every pixel.
    InvalidNoiseSd { index: usize, value: f64 },

    // ---- Configuration ----
    /// Prior distribution rejected its parameters.
    InvalidPrior { reason: String },

    /// Unknown scattering theory name.
    InvalidTheory { name: String },

    // ---- Forward solver ----
    /// Solver failed outside the recoverable set.
    SolverFailure(String),

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Parameter input ----
            InferenceError::ParameterCountMismatch { expected, actual } => {
                write!(f, "Parameter count mismatch: expected {expected} values, got {actual}")
            }
            InferenceError::MissingParameter { name } => {
                write!(
                    f,
                    "Parameter '{name}' is not a free parameter, a fixed value, or observation metadata"
                )
            }
            InferenceError::InvalidParameterValue { name, reason } => {
                write!(f, "Invalid value for parameter '{name}': {reason}")
            }
            // ---- Observation ----
            InferenceError::ShapeMismatch { name, expected, actual } => {
                write!(f, "'{name}' has {actual} elements but the observation has {expected} pixels")
            }
            InferenceError::PixelOutOfRange { pixel, len } => {
                write!(f, "Pixel index {pixel} is out of range for {len} pixels")
            }
            InferenceError::EmptyPixelSubset => {
                write!(f, "Pixel subset is empty")
            }
            InferenceError::InvalidObservation { reason } => {
                write!(f, "Invalid observation: {reason}")
            }
            InferenceError::InvalidNoiseSd { index, value } => {
                write!(f, "noise_sd must be finite and > 0; pixel {index} has value {value}")
            }
            // ---- Configuration ----
            InferenceError::InvalidPrior { reason } => {
                write!(f, "Invalid prior: {reason}")
            }
            InferenceError::InvalidTheory { name } => {
                write!(f, "Unknown scattering theory '{name}'")
            }
            // ---- Forward solver ----
            InferenceError::SolverFailure(msg) => {
                write!(f, "Scattering solver failed: {msg}")
            }
            // ---- Fallback ----
            InferenceError::UnknownError => {
                write!(f, "An unknown error occurred")
            }
        }
    }
}

impl From<anyhow::Error> for InferenceError {
    fn from(err: anyhow::Error) -> Self {
        InferenceError::SolverFailure(err.to_string())
    }
}

impl From<UniformError> for InferenceError {
    fn from(err: UniformError) -> Self {
        InferenceError::InvalidPrior { reason: err.to_string() }
    }
}

impl From<NormalError> for InferenceError {
    fn from(err: NormalError) -> Self {
        InferenceError::InvalidPrior { reason: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<InferenceError> for PyErr {
    fn from(err: InferenceError) -> PyErr {
        PyValueError::new_err(format!("InferenceError: {err}"))
    }
}

/// Recoverable scattering failures.
///
/// These describe configurations the solver cannot evaluate (overlapping
/// spheres, a non-converging multisphere series). The model layer maps them
/// to a `-∞` log-probability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScatteringFailure {
    /// Multisphere series failed to converge.
    Multisphere(String),
    /// Scatterer is physically invalid (negative radius, overlap, ...).
    InvalidScatterer(String),
}

impl std::fmt::Display for ScatteringFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScatteringFailure::Multisphere(msg) => write!(f, "Multisphere failure: {msg}"),
            ScatteringFailure::InvalidScatterer(msg) => write!(f, "Invalid scatterer: {msg}"),
        }
    }
}

/// Error returned by a [`ScatteringSolver`](crate::model::core::ScatteringSolver).
#[derive(Debug)]
pub enum SolverError {
    /// Configuration cannot be scattered; converted to `-∞`.
    Recoverable(ScatteringFailure),
    /// Anything else; propagated to the caller.
    Fatal(anyhow::Error),
}

impl std::error::Error for SolverError {}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::Recoverable(failure) => write!(f, "{failure}"),
            SolverError::Fatal(err) => write!(f, "Fatal solver error: {err}"),
        }
    }
}

impl From<ScatteringFailure> for SolverError {
    fn from(failure: ScatteringFailure) -> Self {
        SolverError::Recoverable(failure)
    }
}

impl From<anyhow::Error> for SolverError {
    fn from(err: anyhow::Error) -> Self {
        SolverError::Fatal(err)
    }
}
