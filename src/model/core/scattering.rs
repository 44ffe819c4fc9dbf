//! Collaborator contracts — scatterer templates, constraints, and the
//! forward scattering solver.
//!
//! Purpose
//! -------
//! Name the three external capabilities a noise model consumes, and the
//! [`Prediction`] type that carries a forward result or a rejection back to
//! the likelihood code.
//!
//! Key behaviors
//! -------------
//! - [`ScattererTemplate::parameters`] declares the template's free
//!   parameters (radius, position, index, ...) with their priors; models
//!   register them ahead of their own.
//! - [`ScattererTemplate::make_from`] turns a name→value map into a concrete
//!   scatterer.
//! - [`Constraint::check`] accepts or rejects a concrete scatterer.
//! - [`ScatteringSolver`] computes fields and holograms; recoverable failures
//!   come back as [`SolverError::Recoverable`].
//! - [`Prediction::from_solver`] folds a solver result into either a value,
//!   a rejection, or a propagated fatal error.
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers are pure with respect to `&self`; the model shares one solver
//!   across evaluations.
//! - A rejected prediction is the typed form of a `-∞` log-probability.
use crate::model::{
    core::{data::Observation, optics::Optics, params::Parameter, theory::Theory, values::ParamMap},
    errors::{InferenceError, InferenceResult, ScatteringFailure, SolverError, SolverResult},
};
use ndarray::Array1;

/// Parameterized scatterer description.
pub trait ScattererTemplate {
    type Scatterer;

    /// Free parameters of the scatterer, in declaration order.
    fn parameters(&self) -> Vec<Parameter>;

    /// Build a concrete scatterer from parameter values.
    ///
    /// Missing names are the template's to report, normally as
    /// [`InferenceError::MissingParameter`].
    fn make_from(&self, values: &ParamMap) -> InferenceResult<Self::Scatterer>;
}

/// Feasibility predicate over a concrete scatterer.
pub trait Constraint<S>: Send + Sync {
    fn check(&self, scatterer: &S) -> bool;
}

impl<S, F> Constraint<S> for F
where
    F: Fn(&S) -> bool + Send + Sync,
{
    fn check(&self, scatterer: &S) -> bool {
        self(scatterer)
    }
}

/// Forward electromagnetic scattering solver.
///
/// - `calc_field`: scattered field at each pixel of `schema`.
/// - `calc_holo`: recorded hologram intensity, scaled by `scaling`.
pub trait ScatteringSolver {
    type Scatterer;
    type Field;

    fn calc_field(
        &self, schema: &Observation, scatterer: &Self::Scatterer, theory: Theory, optics: &Optics,
    ) -> SolverResult<Self::Field>;

    fn calc_holo(
        &self, schema: &Observation, scatterer: &Self::Scatterer, theory: Theory, scaling: f64,
        optics: &Optics,
    ) -> SolverResult<Array1<f64>>;
}

/// Forward prediction or rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction<T> {
    Computed(T),
    Rejected(ScatteringFailure),
}

impl<T> Prediction<T> {
    /// Fold a solver result: recoverable failures become `Rejected`, fatal
    /// ones propagate as [`InferenceError::SolverFailure`].
    pub fn from_solver(result: SolverResult<T>) -> InferenceResult<Self> {
        match result {
            Ok(value) => Ok(Prediction::Computed(value)),
            Err(SolverError::Recoverable(failure)) => {
                tracing::debug!(%failure, "scattering failure, rejecting parameters");
                Ok(Prediction::Rejected(failure))
            }
            Err(SolverError::Fatal(err)) => Err(InferenceError::from(err)),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Prediction::Rejected(_))
    }

    /// The computed value, if any.
    pub fn computed(self) -> Option<T> {
        match self {
            Prediction::Computed(value) => Some(value),
            Prediction::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_solver_splits_recoverable_and_fatal_failures() {
        let ok: Prediction<f64> = Prediction::from_solver(Ok(1.0)).unwrap();
        let rejected: Prediction<f64> = Prediction::from_solver(Err(SolverError::Recoverable(
            ScatteringFailure::Multisphere("no convergence".to_string()),
        )))
        .unwrap();
        let fatal = Prediction::<f64>::from_solver(Err(SolverError::Fatal(anyhow::anyhow!("oom"))));

        assert_eq!(ok.computed(), Some(1.0));
        assert!(rejected.is_rejected());
        assert_eq!(fatal.unwrap_err(), InferenceError::SolverFailure("oom".to_string()));
    }

    #[test]
    fn closures_are_constraints() {
        let positive = |r: &f64| *r > 0.0;

        assert!(Constraint::<f64>::check(&positive, &0.5));
        assert!(!Constraint::<f64>::check(&positive, &-0.5));
    }
}
