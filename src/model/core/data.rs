//! Observation containers for hologram likelihoods.
//!
//! Purpose
//! -------
//! Provide a small, validated container for detector data: flattened pixel
//! values, their detector coordinates, and the instrument metadata that may
//! stand in for model parameters (noise level, medium index, illumination).
//! The same container doubles as the measurement schema handed to the
//! forward solver.
//!
//! Key behaviors
//! -------------
//! - [`Observation`] enforces basic data invariants (non-empty, finite
//!   values, one coordinate row per pixel).
//! - [`ObservationMetadata`] exposes metadata by parameter name so model
//!   parameters can fall back to it.
//! - [`make_subset_data`] restricts an observation to a pixel subset,
//!   carrying per-pixel metadata along.
//! - [`dict_to_array`] broadcasts a scalar or per-pixel value against an
//!   observation.
//!
//! Invariants & assumptions
//! ------------------------
//! - `values.len() == coords.nrows()` and `coords.ncols() == 2`.
//! - Pixels are stored row-major when built from a grid; pixel index
//!   `i * ncols + j` is grid position `(i, j)`.
//! - Per-pixel `noise_sd` metadata, when present as an array, has one entry
//!   per pixel.
//!
//! Conventions
//! -----------
//! - Coordinates are detector-plane positions `(x, y)` in the same length
//!   unit as the illumination wavelength.
//! - This module does no I/O; loading images is the caller's job.
use crate::model::{
    core::values::ParValue,
    errors::{InferenceError, InferenceResult},
};
use ndarray::{Array1, Array2, Axis};

/// Instrument metadata attached to an observation.
///
/// Every field is optional; a model that needs a value the metadata does not
/// carry must receive it as a parameter or fixed value instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationMetadata {
    /// Scalar or per-pixel noise standard deviation.
    pub noise_sd: Option<ParValue>,
    /// Refractive index of the medium.
    pub medium_index: Option<f64>,
    /// Illumination wavelength in vacuum.
    pub illum_wavelen: Option<f64>,
    /// Illumination polarization `(x, y)`.
    pub illum_polarization: Option<[f64; 2]>,
}

impl ObservationMetadata {
    pub fn new(
        noise_sd: Option<ParValue>, medium_index: Option<f64>, illum_wavelen: Option<f64>,
        illum_polarization: Option<[f64; 2]>,
    ) -> Self {
        Self { noise_sd, medium_index, illum_wavelen, illum_polarization }
    }

    /// Metadata value under a parameter name, if present.
    pub fn attribute(&self, name: &str) -> Option<ParValue> {
        match name {
            "noise_sd" => self.noise_sd.clone(),
            "medium_index" => self.medium_index.map(ParValue::Scalar),
            "illum_wavelen" => self.illum_wavelen.map(ParValue::Scalar),
            "illum_polarization" => self.illum_polarization.map(ParValue::from),
            _ => None,
        }
    }
}

/// Flattened detector data plus coordinates and metadata.
///
/// Fields
/// ------
/// - `values`: `Array1<f64>` — one recorded intensity per pixel.
/// - `coords`: `Array2<f64>` — `n × 2` detector positions.
/// - `grid_shape`: `Option<(usize, usize)>` — original `(rows, cols)` when
///   built from a full grid; `None` after subsetting.
/// - `meta`: [`ObservationMetadata`].
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub values: Array1<f64>,
    pub coords: Array2<f64>,
    pub grid_shape: Option<(usize, usize)>,
    pub meta: ObservationMetadata,
}

impl Observation {
    /// Construct from explicit pixel values and coordinates.
    ///
    /// # Errors
    /// - [`InferenceError::InvalidObservation`] if empty, if any value is
    ///   non-finite, or if `coords` is not `n × 2`.
    /// - [`InferenceError::ShapeMismatch`] if array-valued `noise_sd` metadata
    ///   does not have one entry per pixel.
    pub fn new(
        values: Array1<f64>, coords: Array2<f64>, meta: ObservationMetadata,
    ) -> InferenceResult<Self> {
        if values.is_empty() {
            return Err(InferenceError::InvalidObservation { reason: "no pixels" });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidObservation { reason: "non-finite pixel value" });
        }
        if coords.nrows() != values.len() || coords.ncols() != 2 {
            return Err(InferenceError::InvalidObservation {
                reason: "coordinates must be an n x 2 array with one row per pixel",
            });
        }
        if let Some(noise) = &meta.noise_sd {
            if !noise.is_scalar() && noise.len() != 1 && noise.len() != values.len() {
                return Err(InferenceError::ShapeMismatch {
                    name: "noise_sd".to_string(),
                    expected: values.len(),
                    actual: noise.len(),
                });
            }
        }
        Ok(Self { values, coords, grid_shape: None, meta })
    }

    /// Construct from a 2-D detector image on a regular grid.
    ///
    /// Pixel `(i, j)` sits at `(i * spacing.0, j * spacing.1)` and is stored
    /// at flat index `i * ncols + j`.
    pub fn from_grid(
        image: Array2<f64>, spacing: (f64, f64), meta: ObservationMetadata,
    ) -> InferenceResult<Self> {
        let (rows, cols) = image.dim();
        let coords = Array2::from_shape_fn((rows * cols, 2), |(k, axis)| match axis {
            0 => (k / cols) as f64 * spacing.0,
            _ => (k % cols) as f64 * spacing.1,
        });
        let values = Array1::from_iter(image.iter().copied());
        let mut obs = Self::new(values, coords, meta)?;
        obs.grid_shape = Some((rows, cols));
        Ok(obs)
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Restrict `data` to the given pixel indices.
///
/// Coordinates, values, and per-pixel `noise_sd` metadata are selected in
/// the order given; scalar metadata is carried unchanged.
///
/// # Errors
/// - [`InferenceError::EmptyPixelSubset`] if `pixels` is empty.
/// - [`InferenceError::PixelOutOfRange`] for the first index `>= data.len()`.
pub fn make_subset_data(data: &Observation, pixels: &[usize]) -> InferenceResult<Observation> {
    if pixels.is_empty() {
        return Err(InferenceError::EmptyPixelSubset);
    }
    let len = data.len();
    if let Some(&pixel) = pixels.iter().find(|&&p| p >= len) {
        return Err(InferenceError::PixelOutOfRange { pixel, len });
    }

    let values = data.values.select(Axis(0), pixels);
    let coords = data.coords.select(Axis(0), pixels);
    let mut meta = data.meta.clone();
    meta.noise_sd = data.meta.noise_sd.as_ref().map(|noise| select_pixels(noise, len, pixels));
    Ok(Observation { values, coords, grid_shape: None, meta })
}

/// Select `pixels` from a per-pixel value over `len` pixels.
///
/// Values with exactly `len > 1` elements are treated as per-pixel and
/// selected in the order given; anything else (scalars, single elements,
/// other shapes) is returned unchanged for [`dict_to_array`] to judge.
///
/// `pixels` must already be in range, as checked by [`make_subset_data`].
pub(crate) fn select_pixels(value: &ParValue, len: usize, pixels: &[usize]) -> ParValue {
    if len > 1 && value.len() == len {
        ParValue::from(Array1::from(value.to_vec()).select(Axis(0), pixels))
    } else {
        value.clone()
    }
}

/// Broadcast a scalar or per-pixel value against `data`.
///
/// Scalars and 1-element arrays fill every pixel; arrays with one entry per
/// pixel are returned flattened.
///
/// # Errors
/// [`InferenceError::ShapeMismatch`] for arrays of any other length.
pub fn dict_to_array(data: &Observation, name: &str, value: &ParValue) -> InferenceResult<Array1<f64>> {
    let n = data.len();
    match value.len() {
        1 => Ok(Array1::from_elem(n, value.to_vec()[0])),
        m if m == n => Ok(Array1::from(value.to_vec())),
        m => Err(InferenceError::ShapeMismatch { name: name.to_string(), expected: n, actual: m }),
    }
}
