//! Test doubles for the scatterer template and forward solver.
//!
//! `SphereTemplate` builds a one-parameter [`Sphere`] from `"r"`, declared
//! with a `Uniform(0, 10)` prior (`lnprob = -ln 10` inside the support).
//! `StubSolver` returns closed-form predictions and counts its calls:
//! - field: `r · medium_index` at every pixel;
//! - hologram: `scaling · (1 + r · y)` with `y` the second detector
//!   coordinate.
use crate::model::{
    core::{
        data::{Observation, ObservationMetadata},
        optics::Optics,
        params::Parameter,
        priors::Uniform,
        scattering::{ScattererTemplate, ScatteringSolver},
        theory::Theory,
        values::{ParValue, ParamMap},
    },
    errors::{InferenceError, InferenceResult, ScatteringFailure, SolverError, SolverResult},
};
use ndarray::{Array1, Array2};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// Log prior of an in-support radius under [`SphereTemplate`]'s prior.
pub fn ln_radius_prior() -> f64 {
    -(10.0_f64.ln())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub r: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SphereTemplate;

impl ScattererTemplate for SphereTemplate {
    type Scatterer = Sphere;

    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::new("r", Arc::new(Uniform::new(0.0, 10.0).unwrap()))]
    }

    fn make_from(&self, values: &ParamMap) -> InferenceResult<Sphere> {
        let r = values
            .get("r")
            .ok_or_else(|| InferenceError::MissingParameter { name: "r".to_string() })?
            .as_scalar("r")?;
        Ok(Sphere { r })
    }
}

#[derive(Debug, Clone)]
pub enum StubMode {
    Normal,
    Fail(ScatteringFailure),
    Fatal,
    /// Panics if called at all.
    Forbidden,
}

impl StubMode {
    pub fn invalid() -> Self {
        StubMode::Fail(ScatteringFailure::InvalidScatterer("negative radius".to_string()))
    }
}

#[derive(Debug)]
pub struct StubSolver {
    pub mode: StubMode,
    pub calls: AtomicUsize,
    pub last_scaling: Mutex<Option<f64>>,
    pub last_schema: Mutex<Option<Observation>>,
}

impl StubSolver {
    pub fn new(mode: StubMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            last_scaling: Mutex::new(None),
            last_schema: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, schema: &Observation) -> SolverResult<()> {
        match &self.mode {
            StubMode::Forbidden => panic!("forward solver must not be called"),
            StubMode::Fail(failure) => Err(SolverError::Recoverable(failure.clone())),
            StubMode::Fatal => Err(SolverError::Fatal(anyhow::anyhow!("solver crashed"))),
            StubMode::Normal => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                *self.last_schema.lock().unwrap() = Some(schema.clone());
                Ok(())
            }
        }
    }
}

impl ScatteringSolver for StubSolver {
    type Scatterer = Sphere;
    type Field = Array1<f64>;

    fn calc_field(
        &self, schema: &Observation, scatterer: &Sphere, _theory: Theory, optics: &Optics,
    ) -> SolverResult<Array1<f64>> {
        self.record(schema)?;
        Ok(Array1::from_elem(schema.len(), scatterer.r * optics.medium_index))
    }

    fn calc_holo(
        &self, schema: &Observation, scatterer: &Sphere, _theory: Theory, scaling: f64,
        _optics: &Optics,
    ) -> SolverResult<Array1<f64>> {
        self.record(schema)?;
        *self.last_scaling.lock().unwrap() = Some(scaling);
        Ok(schema.coords.column(1).mapv(|y| scaling * (1.0 + scatterer.r * y)))
    }
}

/// Observation on a unit-spaced grid with complete optics metadata.
pub fn observation(image: Array2<f64>, noise_sd: Option<ParValue>) -> Observation {
    let meta = ObservationMetadata::new(noise_sd, Some(1.33), Some(0.66), Some([1.0, 0.0]));
    Observation::from_grid(image, (1.0, 1.0), meta).unwrap()
}

/// Hologram the stub solver predicts for radius `r` and scaling `alpha` on
/// a `rows × cols` unit grid.
pub fn stub_hologram(rows: usize, cols: usize, r: f64, alpha: f64) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(_, j)| alpha * (1.0 + r * j as f64))
}
