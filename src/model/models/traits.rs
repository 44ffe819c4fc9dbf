//! Public evaluation surface shared by every noise model.
//!
//! - [`ObservationModel`]: the trait concrete models implement. A model
//!   supplies its forward prediction; prior, likelihood, and posterior
//!   evaluation are provided on top of it.
//!
//! Convention: all evaluations return log-probabilities. Infeasible
//! parameters and recoverable scattering failures give
//! `Ok(f64::NEG_INFINITY)`; only malformed input or fatal solver errors give
//! `Err`.
use crate::model::{
    core::{
        data::{Observation, dict_to_array, make_subset_data, select_pixels},
        params::Parameter,
        scattering::{Prediction, ScattererTemplate, ScatteringSolver},
        validation::validate_noise_sd,
        values::{ParamMap, ParameterValues},
    },
    errors::{InferenceError, InferenceResult},
    models::noise::NoiseModel,
};
use ndarray::Array1;
use std::f64::consts::PI;

/// Observation model with Gaussian pixel noise.
///
/// Required:
/// - `noise_model(&self) -> &NoiseModel<..>`: the shared parameter,
///   constraint and solver state.
/// - `forward(&ParamMap, &Observation) -> InferenceResult<Prediction<Array1<f64>>>`:
///   predicted pixel values for `schema`, or a rejection.
///
/// Provided:
/// - `pack`, `lnprior`: delegate to [`NoiseModel`].
/// - `lnlike`, `lnlike_packed`, `lnlike_subset`, `lnposterior`: Gaussian
///   likelihood and posterior built on `forward`.
pub trait ObservationModel {
    type Template: ScattererTemplate;
    type Solver: ScatteringSolver<Scatterer = <Self::Template as ScattererTemplate>::Scatterer>;

    // Required methods
    fn noise_model(&self) -> &NoiseModel<Self::Template, Self::Solver>;

    fn forward(
        &self, pars: &ParamMap, schema: &Observation,
    ) -> InferenceResult<Prediction<Array1<f64>>>;

    // Provided methods

    /// Free parameters in declaration order.
    fn parameters(&self) -> &[Parameter] {
        self.noise_model().parameters()
    }

    fn pack(&self, values: &ParameterValues) -> InferenceResult<ParamMap> {
        self.noise_model().pack(values)
    }

    fn lnprior(&self, values: &ParameterValues) -> InferenceResult<f64> {
        self.noise_model().lnprior(values)
    }

    /// Gaussian log-likelihood of `data` given packed parameters.
    ///
    /// With `σ` the per-pixel noise (resolved from `pars`, a fixed value, or
    /// the data's metadata, then broadcast) and `N = data.len()`:
    ///
    /// `ℓ = −N/2·ln(2π) − N·mean(ln σ) − Σ (forward − data)² / (2σ²)`
    ///
    /// A non-positive or non-finite σ supplied in `pars` is an infeasible
    /// proposal and gives `f64::NEG_INFINITY`.
    ///
    /// # Errors
    /// - [`InferenceError::MissingParameter`] if `noise_sd` cannot be resolved.
    /// - [`InferenceError::InvalidNoiseSd`] for non-positive or non-finite σ
    ///   coming from a fixed value or metadata.
    /// - [`InferenceError::ShapeMismatch`] if σ or the forward prediction do
    ///   not match the data.
    fn lnlike_packed(&self, pars: &ParamMap, data: &Observation) -> InferenceResult<f64> {
        self.lnlike_subset(pars, data, None)
    }

    /// [`lnlike_packed`](Self::lnlike_packed) over a pixel subset.
    ///
    /// With `Some(pixels)`, `data` is restricted by [`make_subset_data`] and
    /// a per-pixel `noise_sd`, wherever it was resolved from, is restricted
    /// to the same pixels.
    ///
    /// # Errors
    /// As [`lnlike_packed`](Self::lnlike_packed), plus the pixel errors of
    /// [`make_subset_data`].
    fn lnlike_subset(
        &self, pars: &ParamMap, data: &Observation, pixels: Option<&[usize]>,
    ) -> InferenceResult<f64> {
        let noise = self.noise_model().get_par("noise_sd", pars, data)?;
        let subset;
        let (data, noise) = match pixels {
            Some(pixels) => {
                subset = make_subset_data(data, pixels)?;
                (&subset, select_pixels(&noise, data.len(), pixels))
            }
            None => (data, noise),
        };
        let noise_sd = dict_to_array(data, "noise_sd", &noise)?;
        if let Err(err) = validate_noise_sd(&noise_sd) {
            if pars.contains_key("noise_sd") {
                tracing::debug!(%err, "proposed noise_sd is infeasible, likelihood is -inf");
                return Ok(f64::NEG_INFINITY);
            }
            return Err(err);
        }

        let forward = match self.forward(pars, data)? {
            Prediction::Computed(forward) => forward,
            Prediction::Rejected(_) => return Ok(f64::NEG_INFINITY),
        };
        if forward.len() != data.len() {
            return Err(InferenceError::ShapeMismatch {
                name: "forward".to_string(),
                expected: data.len(),
                actual: forward.len(),
            });
        }

        let n = data.len() as f64;
        let mean_ln_sd = noise_sd.mapv(f64::ln).sum() / n;
        let residual = &forward - &data.values;
        let chi_sq = (&residual * &residual / (2.0 * &noise_sd * &noise_sd)).sum();
        Ok(-n / 2.0 * (2.0 * PI).ln() - n * mean_ln_sd - chi_sq)
    }

    /// Pack `values` and evaluate [`lnlike_packed`](Self::lnlike_packed).
    fn lnlike(&self, values: &ParameterValues, data: &Observation) -> InferenceResult<f64> {
        let pars = self.pack(values)?;
        self.lnlike_packed(&pars, data)
    }

    /// Unnormalized log-posterior, `lnprior + lnlike`.
    ///
    /// A `-∞` prior returns immediately; the forward solver is never called
    /// on parameters the prior forbids. When `pixels` is given, the
    /// likelihood uses only that pixel subset of `data`.
    fn lnposterior(
        &self, values: &ParameterValues, data: &Observation, pixels: Option<&[usize]>,
    ) -> InferenceResult<f64> {
        let lnprior = self.lnprior(values)?;
        if lnprior == f64::NEG_INFINITY {
            return Ok(lnprior);
        }
        let pars = self.pack(values)?;
        let lnlike = self.lnlike_subset(&pars, data, pixels)?;
        Ok(lnprior + lnlike)
    }
}
