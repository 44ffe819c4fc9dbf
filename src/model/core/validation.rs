//! Validation helpers — reusable checks for packed values and noise levels.
//!
//! Purpose
//! -------
//! Keep the small input checks used by the noise models in one place so the
//! model code can fail fast with structured errors.
//!
//! Conventions
//! -----------
//! - Helpers return [`InferenceResult`] and never panic on invalid inputs.
//! - This module contains no I/O and no logging.
use crate::model::errors::{InferenceError, InferenceResult};
use ndarray::Array1;

/// Check that positional values line up one-to-one with declared parameters.
///
/// # Errors
/// [`InferenceError::ParameterCountMismatch`] when `actual != expected`.
pub fn validate_value_count(expected: usize, actual: usize) -> InferenceResult<()> {
    if expected != actual {
        return Err(InferenceError::ParameterCountMismatch { expected, actual });
    }
    Ok(())
}

/// Check that every broadcast noise standard deviation is finite and > 0.
///
/// # Errors
/// [`InferenceError::InvalidNoiseSd`] pointing at the first offending pixel.
pub fn validate_noise_sd(noise_sd: &Array1<f64>) -> InferenceResult<()> {
    match noise_sd.iter().position(|&s| !s.is_finite() || s <= 0.0) {
        Some(index) => Err(InferenceError::InvalidNoiseSd { index, value: noise_sd[index] }),
        None => Ok(()),
    }
}
