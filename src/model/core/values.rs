//! Parameter values — scalar/array values, name-keyed maps, and caller input.
//!
//! Purpose
//! -------
//! Give every parameter value a single representation regardless of whether
//! it is a scalar (radius, alpha) or array-valued (per-pixel `noise_sd`,
//! two-component polarization), and describe the two ways callers hand
//! values to a model: positionally or keyed by name.
//!
//! Key behaviors
//! -------------
//! - [`ParValue`] holds either an `f64` or an `ArrayD<f64>`; scalars can be
//!   promoted to a 1-element array via [`ParValue::ensure_array`].
//! - [`ParamMap`] is the name→value mapping handed to scatterer templates.
//! - [`ParameterValues`] is the caller-facing input: `Positional` values are
//!   aligned to the model's parameter declaration order, `Named` values are
//!   looked up by parameter name.
//!
//! Conventions
//! -----------
//! - `ParamMap` is a `BTreeMap`, so iteration order is by name, not by
//!   declaration order. Declaration order lives on the model.
use crate::model::errors::{InferenceError, InferenceResult};
use ndarray::{Array1, ArrayD, IxDyn};
use std::collections::BTreeMap;

/// Name→value mapping produced by packing positional values.
pub type ParamMap = BTreeMap<String, ParValue>;

/// A scalar or array-valued parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParValue {
    Scalar(f64),
    Array(ArrayD<f64>),
}

impl ParValue {
    /// Promote to an array; scalars become a 1-element, 1-D array.
    pub fn ensure_array(self) -> ParValue {
        match self {
            ParValue::Scalar(v) => ParValue::Array(ArrayD::from_elem(IxDyn(&[1]), v)),
            arr @ ParValue::Array(_) => arr,
        }
    }

    /// Scalar view of the value.
    ///
    /// A 0-d or 1-element array is accepted as a scalar; anything larger is
    /// [`InferenceError::InvalidParameterValue`] for `name`.
    pub fn as_scalar(&self, name: &str) -> InferenceResult<f64> {
        match self {
            ParValue::Scalar(v) => Ok(*v),
            ParValue::Array(a) => match (a.len(), a.iter().next()) {
                (1, Some(&v)) => Ok(v),
                _ => Err(InferenceError::InvalidParameterValue {
                    name: name.to_string(),
                    reason: "expected a scalar",
                }),
            },
        }
    }

    /// Flattened elements in logical order.
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            ParValue::Scalar(v) => vec![*v],
            ParValue::Array(a) => a.iter().copied().collect(),
        }
    }

    /// Number of elements (1 for scalars).
    pub fn len(&self) -> usize {
        match self {
            ParValue::Scalar(_) => 1,
            ParValue::Array(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for `Scalar` and for 0-d arrays.
    pub fn is_scalar(&self) -> bool {
        match self {
            ParValue::Scalar(_) => true,
            ParValue::Array(a) => a.ndim() == 0,
        }
    }
}

impl From<f64> for ParValue {
    fn from(v: f64) -> Self {
        ParValue::Scalar(v)
    }
}

impl From<ArrayD<f64>> for ParValue {
    fn from(a: ArrayD<f64>) -> Self {
        ParValue::Array(a)
    }
}

impl From<Array1<f64>> for ParValue {
    fn from(a: Array1<f64>) -> Self {
        ParValue::Array(a.into_dyn())
    }
}

impl From<Vec<f64>> for ParValue {
    fn from(v: Vec<f64>) -> Self {
        ParValue::Array(Array1::from_vec(v).into_dyn())
    }
}

impl<const N: usize> From<[f64; N]> for ParValue {
    fn from(v: [f64; N]) -> Self {
        ParValue::from(v.to_vec())
    }
}

/// Parameter values supplied to a model evaluation.
///
/// - `Positional`: one value per free parameter, in declaration order.
/// - `Named`: values keyed by parameter name; extra keys are allowed and
///   passed through to the scatterer template.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValues {
    Positional(Vec<ParValue>),
    Named(ParamMap),
}

impl ParameterValues {
    /// Positional values from plain scalars.
    pub fn scalars(values: &[f64]) -> Self {
        ParameterValues::Positional(values.iter().copied().map(ParValue::Scalar).collect())
    }

    /// Named values from `(name, scalar)` pairs.
    pub fn named<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        ParameterValues::Named(
            pairs.into_iter().map(|(k, v)| (k.to_string(), ParValue::Scalar(v))).collect(),
        )
    }
}

impl From<Vec<f64>> for ParameterValues {
    fn from(values: Vec<f64>) -> Self {
        ParameterValues::scalars(&values)
    }
}

impl From<&[f64]> for ParameterValues {
    fn from(values: &[f64]) -> Self {
        ParameterValues::scalars(values)
    }
}

impl From<Vec<ParValue>> for ParameterValues {
    fn from(values: Vec<ParValue>) -> Self {
        ParameterValues::Positional(values)
    }
}

impl From<ParamMap> for ParameterValues {
    fn from(map: ParamMap) -> Self {
        ParameterValues::Named(map)
    }
}
