//! models — Gaussian-noise observation models over a scattering solver.
//!
//! Purpose
//! -------
//! Collect the user-facing observation models (prior, likelihood, posterior
//! evaluation) on top of the building blocks in `model::core`.
//!
//! Key behaviors
//! -------------
//! - [`NoiseModel`] owns the scatterer template, solver, ordered parameters,
//!   fixed values, theory and constraints; it evaluates the prior and raw
//!   scattered fields.
//! - [`ObservationModel`] is the single forward capability the likelihood
//!   depends on; `lnlike` and `lnposterior` are provided on top of it.
//! - [`AlphaModel`] implements [`ObservationModel`] with a scaled hologram.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models are immutable after construction; evaluations take `&self` and
//!   are safe to run concurrently when the template and solver allow it.
//! - Constraint violations and recoverable scattering failures produce
//!   `f64::NEG_INFINITY`, never an error.
//!
//! Downstream usage
//! ----------------
//! - Build a model via `AlphaModel::builder(template, solver)`, then call
//!   `lnposterior(&values, &data, None)` from a sampler or optimizer.
//! - New forward models implement [`ObservationModel`] around a
//!   [`NoiseModel`]; the likelihood code needs no changes.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`noise`] cover registration, packing, prior evaluation,
//!   constraint short-circuiting, parameter resolution and field rejection.
//! - Unit tests in [`alpha`] cover the alpha override, the likelihood
//!   formula, posterior short-circuiting, and pixel subsetting.

pub mod alpha;
pub mod noise;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::alpha::{AlphaModel, AlphaModelBuilder, DEFAULT_ALPHA};
pub use self::noise::{BoxedConstraint, NoiseModel, NoiseModelBuilder};
pub use self::traits::ObservationModel;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::alpha::AlphaModel;
    pub use super::noise::NoiseModel;
    pub use super::traits::ObservationModel;
}
