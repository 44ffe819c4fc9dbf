//! AlphaModel — hologram forward model with an intensity scaling factor.
//!
//! This module wires a [`NoiseModel`] to the hologram calculation of the
//! forward solver. The extra parameter `alpha` multiplies the scattered
//! contribution, absorbing detector gain and illumination intensity
//! uncertainty. `alpha` defaults to a fixed `1.0` (no scaling).
//!
//! The Gaussian likelihood and posterior come from [`ObservationModel`];
//! this module only supplies `forward`.
use crate::model::{
    core::{
        data::Observation,
        optics::OpticsSpec,
        params::ParamSpec,
        scattering::{Constraint, Prediction, ScattererTemplate, ScatteringSolver},
        theory::Theory,
        values::ParamMap,
    },
    errors::InferenceResult,
    models::{
        noise::{BoxedConstraint, NoiseModel, NoiseModelBuilder},
        traits::ObservationModel,
    },
};
use ndarray::Array1;
use std::fmt;

/// Default value of `alpha` when it is not given.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Noise model whose forward prediction is a scaled hologram.
pub struct AlphaModel<T: ScattererTemplate, S> {
    base: NoiseModel<T, S>,
}

impl<T, S> AlphaModel<T, S>
where
    T: ScattererTemplate,
    S: ScatteringSolver<Scatterer = T::Scatterer>,
{
    /// Construct via [`NoiseModel::new`], then register `alpha`.
    pub fn new(
        scatterer: T, solver: S, noise_sd: ParamSpec, alpha: ParamSpec, optics: OpticsSpec,
        theory: Theory, constraints: Vec<BoxedConstraint<T>>,
    ) -> Self {
        let mut base = NoiseModel::new(scatterer, solver, noise_sd, optics, theory, constraints);
        base.use_parameter(alpha, "alpha");
        Self { base }
    }

    /// Start a builder; `alpha` defaults to a fixed [`DEFAULT_ALPHA`].
    pub fn builder(scatterer: T, solver: S) -> AlphaModelBuilder<T, S> {
        AlphaModelBuilder {
            inner: NoiseModel::builder(scatterer, solver),
            alpha: ParamSpec::fixed(DEFAULT_ALPHA),
        }
    }

    pub fn base(&self) -> &NoiseModel<T, S> {
        &self.base
    }

    /// Predicted hologram for `schema`.
    ///
    /// ## Behavior
    /// - `alpha`: the explicit override if given, otherwise resolved like any
    ///   other parameter (values, then the fixed default).
    /// - Optics and scatterer are resolved as in [`NoiseModel::fields`].
    /// - A recoverable scattering failure gives [`Prediction::Rejected`].
    ///
    /// ## Errors
    /// - [`InferenceError::MissingParameter`](crate::model::errors::InferenceError::MissingParameter)
    ///   if `alpha` or an optical quantity cannot be resolved.
    /// - Fatal solver errors.
    pub fn forward_with_alpha(
        &self, pars: &ParamMap, schema: &Observation, alpha: Option<f64>,
    ) -> InferenceResult<Prediction<Array1<f64>>> {
        let alpha = match alpha {
            Some(alpha) => alpha,
            None => self.base.get_par("alpha", pars, schema)?.as_scalar("alpha")?,
        };
        let (optics, scatterer) = self.base.optics_scatterer(pars, schema)?;
        tracing::trace!(alpha, theory = %self.base.theory(), pixels = schema.len(), "computing hologram");
        Prediction::from_solver(self.base.solver().calc_holo(
            schema,
            &scatterer,
            self.base.theory(),
            alpha,
            &optics,
        ))
    }
}

impl<T, S> ObservationModel for AlphaModel<T, S>
where
    T: ScattererTemplate,
    S: ScatteringSolver<Scatterer = T::Scatterer>,
{
    type Template = T;
    type Solver = S;

    fn noise_model(&self) -> &NoiseModel<T, S> {
        &self.base
    }

    fn forward(
        &self, pars: &ParamMap, schema: &Observation,
    ) -> InferenceResult<Prediction<Array1<f64>>> {
        self.forward_with_alpha(pars, schema, None)
    }
}

impl<T: ScattererTemplate, S> fmt::Debug for AlphaModel<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaModel").field("base", &self.base).finish()
    }
}

/// Builder for [`AlphaModel`]; wraps [`NoiseModelBuilder`] and adds `alpha`.
pub struct AlphaModelBuilder<T: ScattererTemplate, S> {
    inner: NoiseModelBuilder<T, S>,
    alpha: ParamSpec,
}

impl<T, S> AlphaModelBuilder<T, S>
where
    T: ScattererTemplate,
    S: ScatteringSolver<Scatterer = T::Scatterer>,
{
    pub fn alpha(mut self, spec: ParamSpec) -> Self {
        self.alpha = spec;
        self
    }

    pub fn noise_sd(mut self, spec: ParamSpec) -> Self {
        self.inner = self.inner.noise_sd(spec);
        self
    }

    pub fn optics(mut self, optics: OpticsSpec) -> Self {
        self.inner = self.inner.optics(optics);
        self
    }

    pub fn medium_index(mut self, spec: ParamSpec) -> Self {
        self.inner = self.inner.medium_index(spec);
        self
    }

    pub fn illum_wavelen(mut self, spec: ParamSpec) -> Self {
        self.inner = self.inner.illum_wavelen(spec);
        self
    }

    pub fn illum_polarization(mut self, spec: ParamSpec) -> Self {
        self.inner = self.inner.illum_polarization(spec);
        self
    }

    pub fn theory(mut self, theory: Theory) -> Self {
        self.inner = self.inner.theory(theory);
        self
    }

    pub fn constraint<C>(mut self, constraint: C) -> Self
    where
        C: Constraint<T::Scatterer> + 'static,
    {
        self.inner = self.inner.constraint(constraint);
        self
    }

    pub fn build(self) -> AlphaModel<T, S> {
        let (scatterer, solver, noise_sd, optics, theory, constraints) = self.inner.into_parts();
        AlphaModel::new(scatterer, solver, noise_sd, self.alpha, optics, theory, constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        core::{
            priors::{Gaussian, Uniform},
            values::{ParValue, ParameterValues},
        },
        errors::InferenceError,
        models::test_support::{
            Sphere, SphereTemplate, StubMode, StubSolver, ln_radius_prior, observation,
            stub_hologram,
        },
    };
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::f64::consts::PI;

    type Model = AlphaModel<SphereTemplate, StubSolver>;

    fn sampled_model(mode: StubMode) -> Model {
        AlphaModel::builder(SphereTemplate, StubSolver::new(mode))
            .alpha(ParamSpec::free(Uniform::new(0.1, 1.0).unwrap()))
            .constraint(|s: &Sphere| s.r > 0.0)
            .build()
    }

    #[test]
    fn alpha_registers_after_noise_sd_and_defaults_to_fixed_one() {
        let free = AlphaModel::builder(SphereTemplate, StubSolver::new(StubMode::Normal))
            .noise_sd(ParamSpec::free(Uniform::new(0.0, 1.0).unwrap()))
            .alpha(ParamSpec::free(Uniform::new(0.1, 1.0).unwrap()))
            .build();
        let fixed: Model = AlphaModel::builder(SphereTemplate, StubSolver::new(StubMode::Normal)).build();

        assert_eq!(free.base().parameter_names(), vec!["r", "noise_sd", "alpha"]);
        assert_eq!(fixed.base().parameter_names(), vec!["r"]);
        assert_eq!(fixed.base().fixed_values()["alpha"], ParValue::Scalar(DEFAULT_ALPHA));
    }

    #[test]
    // Purpose
    // -------
    // An explicit alpha wins over the value in the parameter map.
    //
    // Given
    // -----
    // - pars with alpha = 0.7, override alpha = 0.3.
    //
    // Expect
    // ------
    // - The solver receives scaling 0.3 and the prediction scales with it.
    fn explicit_alpha_overrides_mapped_alpha() {
        let model = sampled_model(StubMode::Normal);
        let data = observation(array![[0.0, 0.0]], None);
        let pars = model.pack(&ParameterValues::named([("r", 2.0), ("alpha", 0.7)])).unwrap();

        let pred = model.forward_with_alpha(&pars, &data, Some(0.3)).unwrap();

        assert_eq!(*model.base().solver().last_scaling.lock().unwrap(), Some(0.3));
        let pred = pred.computed().unwrap();
        assert_relative_eq!(pred[0], 0.3, epsilon = 1e-15);
        assert_relative_eq!(pred[1], 0.3 * 3.0, epsilon = 1e-15);
    }

    #[test]
    fn forward_uses_mapped_alpha_then_fixed_default() {
        let sampled = sampled_model(StubMode::Normal);
        let fixed: Model = AlphaModel::builder(SphereTemplate, StubSolver::new(StubMode::Normal)).build();
        let data = observation(array![[0.0]], None);
        let pars = sampled.pack(&ParameterValues::scalars(&[1.0, 0.7])).unwrap();
        let r_only = fixed.pack(&ParameterValues::scalars(&[1.0])).unwrap();

        sampled.forward(&pars, &data).unwrap();
        fixed.forward(&r_only, &data).unwrap();

        assert_eq!(*sampled.base().solver().last_scaling.lock().unwrap(), Some(0.7));
        assert_eq!(*fixed.base().solver().last_scaling.lock().unwrap(), Some(DEFAULT_ALPHA));
    }

    #[test]
    fn forward_rejects_on_scattering_failure() {
        let model = sampled_model(StubMode::Fail(crate::model::errors::ScatteringFailure::Multisphere(
            "series did not converge".to_string(),
        )));
        let data = observation(array![[0.0]], None);
        let pars = model.pack(&ParameterValues::named([("r", 1.0), ("alpha", 0.5)])).unwrap();

        assert!(model.forward(&pars, &data).unwrap().is_rejected());
    }

    #[test]
    // Purpose
    // -------
    // Zero residual with constant noise reduces the likelihood to its
    // normalization term.
    //
    // Expect
    // ------
    // - lnlike == -N/2·ln(2π) - N·ln(σ), N = 6, σ = 0.05.
    fn lnlike_zero_residual_equals_normalization() {
        let sigma = 0.05;
        let model = sampled_model(StubMode::Normal);
        let data = observation(stub_hologram(2, 3, 0.5, 0.8), Some(ParValue::Scalar(sigma)));
        let values = ParameterValues::named([("r", 0.5), ("alpha", 0.8)]);
        let n = 6.0;

        let lnlike = model.lnlike(&values, &data).unwrap();

        assert_relative_eq!(lnlike, -n / 2.0 * (2.0 * PI).ln() - n * sigma.ln(), epsilon = 1e-10);
    }

    #[test]
    fn lnlike_matches_gaussian_formula_with_per_pixel_noise() {
        let model = sampled_model(StubMode::Normal);
        let noise = vec![0.1, 0.2];
        let data = observation(array![[1.5, 1.0]], Some(ParValue::from(noise.clone())));
        // r = 1, alpha = 1: forward = [1, 2]; residuals = [-0.5, 1.0]
        let values = ParameterValues::named([("r", 1.0), ("alpha", 1.0)]);
        let expected = -(2.0 * PI).ln()
            - (0.1_f64.ln() + 0.2_f64.ln())
            - (0.25 / (2.0 * 0.01) + 1.0 / (2.0 * 0.04));

        let lnlike = model.lnlike(&values, &data).unwrap();

        assert_relative_eq!(lnlike, expected, epsilon = 1e-10);
    }

    #[test]
    fn lnlike_is_neg_infinity_when_forward_is_rejected() {
        let model = sampled_model(StubMode::invalid());
        let data = observation(array![[1.0]], Some(ParValue::Scalar(0.1)));

        let lnlike = model.lnlike(&ParameterValues::named([("r", 1.0), ("alpha", 1.0)]), &data);

        assert_eq!(lnlike.unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn lnlike_without_any_noise_source_is_missing_parameter() {
        let model = sampled_model(StubMode::Normal);
        let data = observation(array![[1.0]], None);

        let err = model.lnlike(&ParameterValues::named([("r", 1.0), ("alpha", 1.0)]), &data);

        assert_eq!(err.unwrap_err(), InferenceError::MissingParameter { name: "noise_sd".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // Constraint violation short-circuits the posterior before the solver.
    //
    // Given
    // -----
    // - A solver that panics when called, and r < 0 violating r > 0.
    fn lnposterior_short_circuits_without_calling_solver() {
        let model = sampled_model(StubMode::Forbidden);
        let data = observation(array![[1.0]], Some(ParValue::Scalar(0.1)));
        let values = ParameterValues::named([("r", -1.0), ("alpha", 0.5)]);

        assert_eq!(model.lnprior(&values).unwrap(), f64::NEG_INFINITY);
        assert_eq!(model.lnposterior(&values, &data, None).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn lnposterior_is_lnprior_plus_lnlike_when_feasible() {
        let model = sampled_model(StubMode::Normal);
        let data = observation(array![[1.2, 2.1, 2.9]], Some(ParValue::Scalar(0.1)));
        let values = ParameterValues::named([("r", 1.0), ("alpha", 0.9)]);

        let post = model.lnposterior(&values, &data, None).unwrap();

        let expected = model.lnprior(&values).unwrap() + model.lnlike(&values, &data).unwrap();
        assert_relative_eq!(post, expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // With a pixel subset, the solver sees exactly the selected pixels and
    // the posterior matches the likelihood on the subset.
    fn lnposterior_with_pixels_evaluates_only_the_subset() {
        let model = sampled_model(StubMode::Normal);
        let data = observation(array![[1.2, 2.1, 2.9, 4.2]], Some(ParValue::Scalar(0.1)));
        let values = ParameterValues::named([("r", 1.0), ("alpha", 0.9)]);
        let pixels = [3, 1];

        let post = model.lnposterior(&values, &data, Some(&pixels)).unwrap();

        assert_eq!(model.base().solver().calls(), 1);
        let seen = model.base().solver().last_schema.lock().unwrap().clone().unwrap();
        assert_eq!(seen.values, array![4.2, 2.1]);
        assert_eq!(seen.coords.column(1).to_owned(), array![3.0, 1.0]);
        let subset = crate::model::core::data::make_subset_data(&data, &pixels).unwrap();
        let expected = model.lnprior(&values).unwrap() + model.lnlike(&values, &subset).unwrap();
        assert_relative_eq!(post, expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Positional and named inputs describe the same point once the
    // scatterer's parameters are registered, so the posterior agrees.
    //
    // Expect
    // ------
    // - lnposterior([r, alpha]) == lnposterior({r, alpha}), and the prior
    //   includes the radius prior.
    fn lnposterior_positional_matches_named_with_scatterer_parameters() {
        let model = sampled_model(StubMode::Normal);
        let data = observation(array![[1.2, 2.1, 2.9]], Some(ParValue::Scalar(0.1)));

        let positional = model.lnposterior(&ParameterValues::scalars(&[1.0, 0.9]), &data, None);
        let named = model.lnposterior(
            &ParameterValues::named([("alpha", 0.9), ("r", 1.0)]),
            &data,
            None,
        );

        assert_relative_eq!(positional.unwrap(), named.unwrap(), epsilon = 1e-12);
        let alpha_prior = -(0.9_f64.ln());
        assert_relative_eq!(
            model.lnprior(&ParameterValues::scalars(&[1.0, 0.9])).unwrap(),
            ln_radius_prior() + alpha_prior,
            epsilon = 1e-12
        );
    }

    #[test]
    fn free_noise_sd_from_values_overrides_metadata() {
        let model = AlphaModel::builder(SphereTemplate, StubSolver::new(StubMode::Normal))
            .noise_sd(ParamSpec::free(Gaussian::new(0.1, 0.05).unwrap()))
            .build();
        let data = observation(stub_hologram(1, 2, 1.0, 1.0), Some(ParValue::Scalar(1.0)));
        let pars = model.pack(&ParameterValues::scalars(&[1.0, 0.2])).unwrap();

        let lnlike = model.lnlike_packed(&pars, &data).unwrap();

        assert_relative_eq!(lnlike, -(2.0 * PI).ln() - 2.0 * 0.2_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn non_positive_noise_sd_is_an_error() {
        let model = sampled_model(StubMode::Normal);
        let data = observation(array![[1.0]], Some(ParValue::Scalar(0.0)));

        let err = model.lnlike(&ParameterValues::named([("r", 1.0), ("alpha", 1.0)]), &data);

        assert_eq!(err.unwrap_err(), InferenceError::InvalidNoiseSd { index: 0, value: 0.0 });
    }
}
