//! NoiseModel — parameters, constraints, and prior for Gaussian-noise
//! observation models.
//!
//! This module holds the state every observation model shares: the
//! scatterer template, the forward solver, the ordered free parameters, the
//! fixed values, the theory selector, and the constraint list. It evaluates
//! the prior and computes raw scattered fields; the hologram forward model
//! and likelihood live on [`ObservationModel`] implementations such as
//! [`AlphaModel`](crate::model::models::alpha::AlphaModel).
//!
//! Key ideas:
//! - Parameters are registered at construction in a fixed order: the
//!   scatterer template's own parameters, then free optical parameters
//!   (`medium_index`, `illum_wavelen`, `illum_polarization`), then
//!   `noise_sd`, then model-specific extras.
//! - A value is resolved from the caller's values first, then from fixed
//!   values, then from observation metadata. Nothing silently defaults.
//! - Constraint violations are a hard `-∞`, never a penalty.
//!
//! [`ObservationModel`]: crate::model::models::traits::ObservationModel
use crate::model::{
    core::{
        data::Observation,
        optics::{Optics, OpticsSpec},
        params::{ParamSpec, Parameter},
        scattering::{Constraint, Prediction, ScattererTemplate, ScatteringSolver},
        theory::Theory,
        validation::validate_value_count,
        values::{ParValue, ParamMap, ParameterValues},
    },
    errors::{InferenceError, InferenceResult},
};
use std::fmt;

/// Boxed constraint over the concrete scatterer produced by `T`.
pub type BoxedConstraint<T> = Box<dyn Constraint<<T as ScattererTemplate>::Scatterer>>;

/// Shared state and prior evaluation for Gaussian-noise observation models.
///
/// # Notes
/// - Immutable after construction; every evaluation takes `&self`.
/// - Each instance owns its own constraint list.
pub struct NoiseModel<T: ScattererTemplate, S> {
    scatterer: T,
    solver: S,
    parameters: Vec<Parameter>,
    fixed: ParamMap,
    theory: Theory,
    constraints: Vec<BoxedConstraint<T>>,
}

impl<T, S> NoiseModel<T, S>
where
    T: ScattererTemplate,
    S: ScatteringSolver<Scatterer = T::Scatterer>,
{
    /// Construct a model and register its parameters.
    ///
    /// # Arguments
    /// - `scatterer`: template materialized from parameter values; its
    ///   [`parameters`](ScattererTemplate::parameters) are registered first.
    /// - `solver`: forward scattering solver.
    /// - `noise_sd`: noise standard deviation; a fixed value is stored as an
    ///   array, a free one is registered as `"noise_sd"`.
    /// - `optics`: how medium index, wavelength and polarization bind.
    /// - `theory`: solver selection.
    /// - `constraints`: feasibility checks applied in `lnprior`.
    pub fn new(
        scatterer: T, solver: S, noise_sd: ParamSpec, optics: OpticsSpec, theory: Theory,
        constraints: Vec<BoxedConstraint<T>>,
    ) -> Self {
        let parameters = scatterer.parameters();
        let mut model = Self {
            scatterer,
            solver,
            parameters,
            fixed: ParamMap::new(),
            theory,
            constraints,
        };
        for (name, spec) in optics.entries() {
            model.use_parameter(spec.clone(), name);
        }
        let noise_sd = match noise_sd {
            ParamSpec::Fixed(value) => ParamSpec::Fixed(value.ensure_array()),
            other => other,
        };
        model.use_parameter(noise_sd, "noise_sd");
        model
    }

    /// Start a builder with every argument at its default.
    pub fn builder(scatterer: T, solver: S) -> NoiseModelBuilder<T, S> {
        NoiseModelBuilder::new(scatterer, solver)
    }

    /// Bind `name` according to `spec`.
    pub(crate) fn use_parameter(&mut self, spec: ParamSpec, name: &str) {
        match spec {
            ParamSpec::Free(prior) => self.parameters.push(Parameter::new(name, prior)),
            ParamSpec::Fixed(value) => {
                self.fixed.insert(name.to_string(), value);
            }
            ParamSpec::FromData => {}
        }
    }

    /// Free parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Values baked in at construction.
    pub fn fixed_values(&self) -> &ParamMap {
        &self.fixed
    }

    pub fn theory(&self) -> Theory {
        self.theory
    }

    pub fn constraints(&self) -> &[BoxedConstraint<T>] {
        &self.constraints
    }

    pub fn scatterer(&self) -> &T {
        &self.scatterer
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Each parameter's prior guess, in declaration order.
    ///
    /// `None` if any prior has no guess.
    pub fn initial_guess(&self) -> Option<Vec<ParValue>> {
        self.parameters.iter().map(|p| p.prior.guess()).collect()
    }

    /// Map values onto parameter names.
    ///
    /// `Positional` values are zipped with the parameters in declaration
    /// order; `Named` values are returned as a copy.
    ///
    /// # Errors
    /// [`InferenceError::ParameterCountMismatch`] if the positional length
    /// differs from the number of parameters.
    pub fn pack(&self, values: &ParameterValues) -> InferenceResult<ParamMap> {
        match values {
            ParameterValues::Positional(vals) => {
                validate_value_count(self.parameters.len(), vals.len())?;
                Ok(self
                    .parameters
                    .iter()
                    .zip(vals)
                    .map(|(p, v)| (p.name.clone(), v.clone()))
                    .collect())
            }
            ParameterValues::Named(map) => Ok(map.clone()),
        }
    }

    /// Log prior of `values`.
    ///
    /// ## Steps
    /// 1. If there are constraints, materialize the scatterer once from the
    ///    packed values and check each constraint; the first failure returns
    ///    `f64::NEG_INFINITY`.
    /// 2. Otherwise sum every parameter's `lnprob` at its value, looked up by
    ///    position or by name.
    ///
    /// ## Errors
    /// - [`InferenceError::ParameterCountMismatch`] for positional values of
    ///   the wrong length.
    /// - [`InferenceError::MissingParameter`] for named values lacking a
    ///   parameter.
    /// - Errors from the scatterer template.
    pub fn lnprior(&self, values: &ParameterValues) -> InferenceResult<f64> {
        if !self.constraints.is_empty() {
            let scatterer = self.scatterer.make_from(&self.pack(values)?)?;
            if let Some(index) = self.constraints.iter().position(|c| !c.check(&scatterer)) {
                tracing::debug!(constraint = index, "constraint violated, prior is -inf");
                return Ok(f64::NEG_INFINITY);
            }
        }

        match values {
            ParameterValues::Positional(vals) => {
                validate_value_count(self.parameters.len(), vals.len())?;
                Ok(self.parameters.iter().zip(vals).map(|(p, v)| p.lnprob(v)).sum())
            }
            ParameterValues::Named(map) => self
                .parameters
                .iter()
                .map(|p| {
                    map.get(&p.name)
                        .map(|v| p.lnprob(v))
                        .ok_or_else(|| InferenceError::MissingParameter { name: p.name.clone() })
                })
                .sum(),
        }
    }

    /// Resolve `name` from `pars`, then fixed values, then `schema` metadata.
    ///
    /// # Errors
    /// [`InferenceError::MissingParameter`] if none of them has it.
    pub fn get_par(
        &self, name: &str, pars: &ParamMap, schema: &Observation,
    ) -> InferenceResult<ParValue> {
        pars.get(name)
            .or_else(|| self.fixed.get(name))
            .cloned()
            .or_else(|| schema.meta.attribute(name))
            .ok_or_else(|| InferenceError::MissingParameter { name: name.to_string() })
    }

    /// Resolve optics and materialize the scatterer for one evaluation.
    pub fn optics_scatterer(
        &self, pars: &ParamMap, schema: &Observation,
    ) -> InferenceResult<(Optics, T::Scatterer)> {
        let medium_index = self.get_par("medium_index", pars, schema)?.as_scalar("medium_index")?;
        let illum_wavelen =
            self.get_par("illum_wavelen", pars, schema)?.as_scalar("illum_wavelen")?;
        let polarization = self.get_par("illum_polarization", pars, schema)?.to_vec();
        let illum_polarization = match polarization.as_slice() {
            &[x, y] => [x, y],
            _ => {
                return Err(InferenceError::InvalidParameterValue {
                    name: "illum_polarization".to_string(),
                    reason: "expected two components",
                });
            }
        };
        let optics = Optics { medium_index, illum_wavelen, illum_polarization };
        let scatterer = self.scatterer.make_from(pars)?;
        Ok((optics, scatterer))
    }

    /// Scattered field for `schema`.
    ///
    /// Recoverable scattering failures give [`Prediction::Rejected`], the
    /// `-∞` sentinel; fatal solver errors propagate.
    pub fn fields(
        &self, pars: &ParamMap, schema: &Observation,
    ) -> InferenceResult<Prediction<S::Field>> {
        let (optics, scatterer) = self.optics_scatterer(pars, schema)?;
        Prediction::from_solver(self.solver.calc_field(schema, &scatterer, self.theory, &optics))
    }
}

impl<T: ScattererTemplate, S> fmt::Debug for NoiseModel<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseModel")
            .field("parameters", &self.parameters)
            .field("fixed", &self.fixed)
            .field("theory", &self.theory)
            .field("constraints", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`NoiseModel`].
///
/// Defaults: `noise_sd` and all optics read from observation metadata,
/// `Theory::Auto`, no constraints.
pub struct NoiseModelBuilder<T: ScattererTemplate, S> {
    scatterer: T,
    solver: S,
    noise_sd: ParamSpec,
    optics: OpticsSpec,
    theory: Theory,
    constraints: Vec<BoxedConstraint<T>>,
}

impl<T, S> NoiseModelBuilder<T, S>
where
    T: ScattererTemplate,
    S: ScatteringSolver<Scatterer = T::Scatterer>,
{
    pub fn new(scatterer: T, solver: S) -> Self {
        Self {
            scatterer,
            solver,
            noise_sd: ParamSpec::FromData,
            optics: OpticsSpec::default(),
            theory: Theory::Auto,
            constraints: Vec::new(),
        }
    }

    pub fn noise_sd(mut self, spec: ParamSpec) -> Self {
        self.noise_sd = spec;
        self
    }

    pub fn optics(mut self, optics: OpticsSpec) -> Self {
        self.optics = optics;
        self
    }

    pub fn medium_index(mut self, spec: ParamSpec) -> Self {
        self.optics.medium_index = spec;
        self
    }

    pub fn illum_wavelen(mut self, spec: ParamSpec) -> Self {
        self.optics.illum_wavelen = spec;
        self
    }

    pub fn illum_polarization(mut self, spec: ParamSpec) -> Self {
        self.optics.illum_polarization = spec;
        self
    }

    pub fn theory(mut self, theory: Theory) -> Self {
        self.theory = theory;
        self
    }

    /// Append a constraint.
    pub fn constraint<C>(mut self, constraint: C) -> Self
    where
        C: Constraint<T::Scatterer> + 'static,
    {
        self.constraints.push(Box::new(constraint));
        self
    }

    pub fn build(self) -> NoiseModel<T, S> {
        NoiseModel::new(
            self.scatterer,
            self.solver,
            self.noise_sd,
            self.optics,
            self.theory,
            self.constraints,
        )
    }

    /// Split into the pieces [`NoiseModel::new`] takes.
    pub(crate) fn into_parts(
        self,
    ) -> (T, S, ParamSpec, OpticsSpec, Theory, Vec<BoxedConstraint<T>>) {
        (self.scatterer, self.solver, self.noise_sd, self.optics, self.theory, self.constraints)
    }
}
