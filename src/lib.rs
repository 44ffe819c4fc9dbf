//! holo_inference — Gaussian-noise observation models for Bayesian
//! hologram inference.
//!
//! Purpose
//! -------
//! Compute the log-probability that a proposed set of scatterer and
//! instrument parameters explains recorded hologram data corrupted by
//! additive Gaussian noise. The crate is the statistical layer between an
//! electromagnetic scattering solver (supplied by the caller) and a
//! sampling or optimization driver (also the caller's).
//!
//! Key behaviors
//! -------------
//! - `lnprior`: feasibility constraints, then the sum of per-parameter
//!   prior log-densities.
//! - `lnlike`: independent per-pixel Gaussian log-likelihood of the residual
//!   between the forward prediction and the data.
//! - `lnposterior`: `lnprior + lnlike`, skipping the solver entirely when the
//!   prior is `-∞`, optionally over a pixel subset (per-pixel noise is
//!   subset along with the data).
//! - Free parameters register in a fixed order: the scatterer template's
//!   own parameters, then free optics, then `noise_sd`, then model-specific
//!   ones such as `alpha`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every evaluation is total over physically meaningful input: infeasible
//!   parameters and recoverable scattering failures return
//!   `f64::NEG_INFINITY` instead of an error.
//! - Every parameter used during evaluation is either supplied, fixed at
//!   construction, or read from observation metadata; there are no silent
//!   physical defaults.
//!
//! Conventions
//! -----------
//! - Arrays are `ndarray` types; observations are flattened pixel vectors
//!   with `n × 2` detector coordinates.
//! - Errors are rich enums ([`model::InferenceError`],
//!   [`model::SolverError`]) with `InferenceResult<T>` / `SolverResult<T>`
//!   aliases.
//!
//! Downstream usage
//! ----------------
//! - Implement [`model::ScattererTemplate`] and [`model::ScatteringSolver`]
//!   for your scattering backend.
//! - Build an [`model::AlphaModel`] and hand `lnposterior` to your sampler.
//! - With the `python-bindings` feature, `holo_inference.Observation` and
//!   `holo_inference.AlphaModel` wrap a Python scatterer callable and solver
//!   object (see `python`).
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds an end-to-end
//!   pipeline test against a closed-form solver.
//! - The Python wrappers and the `InferenceError -> PyErr` conversion are
//!   not covered by Rust tests; they need an embedded interpreter.

#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

pub mod model;
#[cfg(feature = "python-bindings")]
pub mod python;

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _holo_inference<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyObservation>()?;
    m.add_class::<python::PyAlphaModel>()?;
    Ok(())
}
