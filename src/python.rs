//! python — Python-facing wrappers for observations and the alpha model.
//!
//! Purpose
//! -------
//! Let a Python scattering stack supply the scatterer template and forward
//! solver while prior, likelihood, and posterior evaluation run in Rust.
//!
//! Key behaviors
//! -------------
//! - [`PyObservation`] wraps [`Observation::from_grid`] over a 2-D
//!   `numpy.ndarray` image plus optional metadata.
//! - [`PyAlphaModel`] wraps [`AlphaModel`] over a Python scatterer callable
//!   ([`PyTemplate`]) and a Python solver object ([`PySolver`]).
//! - Python exceptions raised by the solver that are instances of a class
//!   listed in `recoverable` become recoverable scattering failures
//!   (`-inf`); any other exception is fatal and surfaces as `ValueError`.
//!
//! Conventions
//! -----------
//! - Priors are described from Python as `(name, kind, a, b)` tuples with
//!   `kind` in `{"uniform", "gaussian"}`: bounds for `uniform`, `(mu, sd)`
//!   for `gaussian`.
//! - Parameter values are either a sequence of floats (declaration order)
//!   or a `dict` of name → float / array.
//! - Every call into Python re-acquires the GIL; evaluation is not
//!   parallel on the Python side.
use std::sync::Arc;

use ndarray::Array1;
use numpy::{PyReadonlyArray1, PyReadonlyArray2, ToPyArray};
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict},
};

use crate::model::{
    core::{
        data::{Observation, ObservationMetadata},
        optics::{Optics, OpticsSpec},
        params::{ParamSpec, Parameter, Prior},
        priors::{Gaussian, Uniform},
        scattering::{ScattererTemplate, ScatteringSolver},
        theory::Theory,
        values::{ParValue, ParamMap, ParameterValues},
    },
    errors::{InferenceError, InferenceResult, ScatteringFailure, SolverError, SolverResult},
    models::{
        alpha::{AlphaModel, DEFAULT_ALPHA},
        traits::ObservationModel,
    },
};

/// Prior description as passed from Python: `(name, kind, a, b)`.
type PriorSpec = (String, String, f64, f64);

/// Scatterer template backed by a Python callable.
///
/// `make_scatterer(values: dict) -> object` receives every packed value
/// (scalars as `float`, arrays as `numpy.ndarray`) and returns an opaque
/// scatterer handed back to the solver.
pub struct PyTemplate {
    make_scatterer: Py<PyAny>,
    parameters: Vec<Parameter>,
}

impl ScattererTemplate for PyTemplate {
    type Scatterer = Py<PyAny>;

    fn parameters(&self) -> Vec<Parameter> {
        self.parameters.clone()
    }

    fn make_from(&self, values: &ParamMap) -> InferenceResult<Py<PyAny>> {
        Python::with_gil(|py| {
            let dict = param_dict(py, values).map_err(template_error)?;
            self.make_scatterer.bind(py).call1((dict,)).map(Bound::unbind).map_err(template_error)
        })
    }
}

fn template_error(err: PyErr) -> InferenceError {
    InferenceError::SolverFailure(format!("scatterer template failed: {err}"))
}

fn param_dict<'py>(py: Python<'py>, values: &ParamMap) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (name, value) in values {
        match value {
            ParValue::Scalar(v) => dict.set_item(name, *v)?,
            ParValue::Array(a) => dict.set_item(name, a.to_pyarray(py))?,
        }
    }
    Ok(dict)
}

/// Forward solver backed by a Python object.
///
/// Expected methods:
/// - `calc_holo(coords, scatterer, theory, scaling, medium_index,
///   illum_wavelen, polarization) -> array[n]`
/// - `calc_field(coords, scatterer, theory, medium_index, illum_wavelen,
///   polarization) -> array[n]`
pub struct PySolver {
    solver: Py<PyAny>,
    recoverable: Vec<Py<PyAny>>,
}

impl PySolver {
    fn classify(&self, py: Python<'_>, err: PyErr) -> SolverError {
        if self.recoverable.iter().any(|cls| err.is_instance(py, cls.bind(py))) {
            SolverError::Recoverable(ScatteringFailure::InvalidScatterer(err.to_string()))
        } else {
            SolverError::Fatal(err.into())
        }
    }
}

impl ScatteringSolver for PySolver {
    type Scatterer = Py<PyAny>;
    type Field = Array1<f64>;

    fn calc_field(
        &self, schema: &Observation, scatterer: &Py<PyAny>, theory: Theory, optics: &Optics,
    ) -> SolverResult<Array1<f64>> {
        Python::with_gil(|py| {
            let [pol_x, pol_y] = optics.illum_polarization;
            let args = (
                schema.coords.to_pyarray(py),
                scatterer.bind(py),
                theory.to_string(),
                optics.medium_index,
                optics.illum_wavelen,
                (pol_x, pol_y),
            );
            let out =
                self.solver.bind(py).call_method1("calc_field", args).map_err(|e| self.classify(py, e))?;
            extract_f64_vec(&out).map_err(|e| SolverError::Fatal(e.into()))
        })
    }

    fn calc_holo(
        &self, schema: &Observation, scatterer: &Py<PyAny>, theory: Theory, scaling: f64,
        optics: &Optics,
    ) -> SolverResult<Array1<f64>> {
        Python::with_gil(|py| {
            let [pol_x, pol_y] = optics.illum_polarization;
            let args = (
                schema.coords.to_pyarray(py),
                scatterer.bind(py),
                theory.to_string(),
                scaling,
                optics.medium_index,
                optics.illum_wavelen,
                (pol_x, pol_y),
            );
            let out =
                self.solver.bind(py).call_method1("calc_holo", args).map_err(|e| self.classify(py, e))?;
            extract_f64_vec(&out).map_err(|e| SolverError::Fatal(e.into()))
        })
    }
}

/// Read a 1-D float array from a `numpy.ndarray` or any float sequence.
fn extract_f64_vec(obj: &Bound<'_, PyAny>) -> PyResult<Array1<f64>> {
    if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    let vec: Vec<f64> = obj.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray or sequence of float64")
    })?;
    Ok(Array1::from(vec))
}

fn extract_par_value(obj: &Bound<'_, PyAny>) -> PyResult<ParValue> {
    match obj.extract::<f64>() {
        Ok(v) => Ok(ParValue::Scalar(v)),
        Err(_) => extract_f64_vec(obj).map(ParValue::from),
    }
}

fn extract_values(obj: &Bound<'_, PyAny>) -> PyResult<ParameterValues> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = ParamMap::new();
        for (key, value) in dict.iter() {
            map.insert(key.extract::<String>()?, extract_par_value(&value)?);
        }
        return Ok(ParameterValues::Named(map));
    }
    let vals = extract_f64_vec(obj)?;
    Ok(ParameterValues::scalars(&vals.to_vec()))
}

fn build_prior(kind: &str, a: f64, b: f64) -> PyResult<Arc<dyn Prior>> {
    let prior: Arc<dyn Prior> = match kind.to_lowercase().as_str() {
        "uniform" => Arc::new(Uniform::new(a, b)?),
        "gaussian" | "normal" => Arc::new(Gaussian::new(a, b)?),
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid prior kind {other:?} (expected 'uniform' or 'gaussian')"
            )));
        }
    };
    Ok(prior)
}

fn free_spec(spec: Option<(String, f64, f64)>) -> PyResult<Option<ParamSpec>> {
    spec.map(|(kind, a, b)| build_prior(&kind, a, b).map(ParamSpec::Free)).transpose()
}

/// Observation — Python-facing wrapper for a hologram on a regular grid.
///
/// Constructed from Python via
/// `Observation(image, spacing=(1.0, 1.0), noise_sd=None, medium_index=None,
/// illum_wavelen=None, illum_polarization=None)`.
#[pyclass(name = "Observation", module = "holo_inference")]
pub struct PyObservation {
    inner: Observation,
}

#[pymethods]
impl PyObservation {
    #[new]
    #[pyo3(signature = (
        image, spacing = (1.0, 1.0), noise_sd = None, medium_index = None,
        illum_wavelen = None, illum_polarization = None
    ))]
    pub fn new(
        image: PyReadonlyArray2<'_, f64>, spacing: (f64, f64), noise_sd: Option<&Bound<'_, PyAny>>,
        medium_index: Option<f64>, illum_wavelen: Option<f64>,
        illum_polarization: Option<(f64, f64)>,
    ) -> PyResult<Self> {
        let noise_sd = noise_sd.map(extract_par_value).transpose()?;
        let meta = ObservationMetadata::new(
            noise_sd,
            medium_index,
            illum_wavelen,
            illum_polarization.map(|(x, y)| [x, y]),
        );
        let inner = Observation::from_grid(image.as_array().to_owned(), spacing, meta)?;
        Ok(Self { inner })
    }

    /// Number of pixels.
    pub fn __len__(&self) -> usize {
        self.inner.len()
    }
}

/// AlphaModel — Python-facing wrapper for [`AlphaModel`].
///
/// Parameters
/// ----------
/// - `make_scatterer`: callable `dict -> scatterer`.
/// - `parameters`: list of `(name, kind, a, b)` scatterer priors.
/// - `solver`: object with `calc_holo` / `calc_field`.
/// - `noise_sd`: fixed noise (float or per-pixel array); `None` reads it
///   from the observation unless `noise_sd_prior` makes it free.
/// - `alpha` / `alpha_prior`: fixed scaling (default `1.0`) or a free prior.
/// - `theory`: scattering theory name, case-insensitive.
/// - `recoverable`: exception classes treated as recoverable failures.
#[pyclass(name = "AlphaModel", module = "holo_inference")]
pub struct PyAlphaModel {
    inner: AlphaModel<PyTemplate, PySolver>,
}

#[pymethods]
impl PyAlphaModel {
    #[new]
    #[pyo3(signature = (
        make_scatterer, parameters, solver, noise_sd = None, noise_sd_prior = None,
        alpha = None, alpha_prior = None, theory = "auto", recoverable = Vec::new()
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        make_scatterer: Py<PyAny>, parameters: Vec<PriorSpec>, solver: Py<PyAny>,
        noise_sd: Option<&Bound<'_, PyAny>>, noise_sd_prior: Option<(String, f64, f64)>,
        alpha: Option<f64>, alpha_prior: Option<(String, f64, f64)>, theory: &str,
        recoverable: Vec<Py<PyAny>>,
    ) -> PyResult<Self> {
        let parameters = parameters
            .into_iter()
            .map(|(name, kind, a, b)| Ok(Parameter::new(name, build_prior(&kind, a, b)?)))
            .collect::<PyResult<Vec<_>>>()?;
        let noise_sd = match (free_spec(noise_sd_prior)?, noise_sd) {
            (Some(free), _) => free,
            (None, Some(value)) => ParamSpec::Fixed(extract_par_value(value)?),
            (None, None) => ParamSpec::FromData,
        };
        let alpha = free_spec(alpha_prior)?
            .unwrap_or_else(|| ParamSpec::fixed(alpha.unwrap_or(DEFAULT_ALPHA)));
        let theory: Theory = theory.parse()?;

        let inner = AlphaModel::new(
            PyTemplate { make_scatterer, parameters },
            PySolver { solver, recoverable },
            noise_sd,
            alpha,
            OpticsSpec::default(),
            theory,
            Vec::new(),
        );
        Ok(Self { inner })
    }

    /// Free parameter names in declaration order.
    #[getter]
    pub fn parameters(&self) -> Vec<String> {
        self.inner.parameters().iter().map(|p| p.name.clone()).collect()
    }

    pub fn lnprior(&self, values: &Bound<'_, PyAny>) -> PyResult<f64> {
        Ok(self.inner.lnprior(&extract_values(values)?)?)
    }

    pub fn lnlike(&self, values: &Bound<'_, PyAny>, data: PyRef<'_, PyObservation>) -> PyResult<f64> {
        Ok(self.inner.lnlike(&extract_values(values)?, &data.inner)?)
    }

    #[pyo3(signature = (values, data, pixels = None))]
    pub fn lnposterior(
        &self, values: &Bound<'_, PyAny>, data: PyRef<'_, PyObservation>, pixels: Option<Vec<usize>>,
    ) -> PyResult<f64> {
        let values = extract_values(values)?;
        Ok(self.inner.lnposterior(&values, &data.inner, pixels.as_deref())?)
    }
}
