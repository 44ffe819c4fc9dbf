//! Reference priors backed by `statrs`.
//!
//! [`Uniform`] and [`Gaussian`] are thin adapters over
//! `statrs::distribution::{Uniform, Normal}` implementing [`Prior`]. Array
//! values are treated as independent draws: the log-density is the sum of
//! the element-wise log-densities.
//!
//! ## Numerics
//! - Out-of-support values give `f64::NEG_INFINITY` (statrs behavior for
//!   `Uniform::ln_pdf`).
//! - Parameters are validated once at construction; statrs errors map to
//!   [`InferenceError::InvalidPrior`].
use crate::model::{
    core::{params::Prior, values::ParValue},
    errors::InferenceResult,
};
use statrs::distribution::{Continuous, Normal, Uniform as StatrsUniform};

fn sum_ln_pdf<D: Continuous<f64, f64>>(dist: &D, value: &ParValue) -> f64 {
    match value {
        ParValue::Scalar(v) => dist.ln_pdf(*v),
        ParValue::Array(a) => a.iter().map(|&v| dist.ln_pdf(v)).sum(),
    }
}

/// Flat prior on `[lower, upper]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub lower: f64,
    pub upper: f64,
    dist: StatrsUniform,
}

impl Uniform {
    /// # Errors
    /// [`InferenceError::InvalidPrior`] unless `lower < upper` and both are finite.
    pub fn new(lower: f64, upper: f64) -> InferenceResult<Self> {
        let dist = StatrsUniform::new(lower, upper)?;
        Ok(Self { lower, upper, dist })
    }
}

impl Prior for Uniform {
    fn lnprob(&self, value: &ParValue) -> f64 {
        sum_ln_pdf(&self.dist, value)
    }

    fn guess(&self) -> Option<ParValue> {
        Some(ParValue::Scalar(0.5 * (self.lower + self.upper)))
    }
}

/// Normal prior with mean `mu` and standard deviation `sd`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    pub mu: f64,
    pub sd: f64,
    dist: Normal,
}

impl Gaussian {
    /// # Errors
    /// [`InferenceError::InvalidPrior`] if `mu` is NaN or `sd` is not finite and > 0.
    pub fn new(mu: f64, sd: f64) -> InferenceResult<Self> {
        let dist = Normal::new(mu, sd)?;
        Ok(Self { mu, sd, dist })
    }
}

impl Prior for Gaussian {
    fn lnprob(&self, value: &ParValue) -> f64 {
        sum_ln_pdf(&self.dist, value)
    }

    fn guess(&self) -> Option<ParValue> {
        Some(ParValue::Scalar(self.mu))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::errors::InferenceError;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn uniform_is_flat_inside_and_neg_infinite_outside() {
        let prior = Uniform::new(0.0, 2.0).unwrap();

        assert_relative_eq!(prior.lnprob(&ParValue::Scalar(0.3)), -(2.0_f64.ln()), epsilon = 1e-12);
        assert_eq!(prior.lnprob(&ParValue::Scalar(-0.1)), f64::NEG_INFINITY);
        assert_eq!(prior.guess(), Some(ParValue::Scalar(1.0)));
    }

    #[test]
    fn uniform_rejects_inverted_bounds() {
        assert!(matches!(Uniform::new(1.0, 0.5), Err(InferenceError::InvalidPrior { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Array values are scored as independent draws.
    //
    // Expect
    // ------
    // - lnprob([x, y]) == lnprob(x) + lnprob(y).
    fn gaussian_sums_over_array_elements() {
        let prior = Gaussian::new(1.0, 0.5).unwrap();
        let single = prior.lnprob(&ParValue::Scalar(1.0));

        let both = prior.lnprob(&ParValue::from([1.0, 1.0]));

        assert_relative_eq!(single, -(0.5_f64.ln()) - 0.5 * (2.0 * PI).ln(), epsilon = 1e-12);
        assert_relative_eq!(both, 2.0 * single, epsilon = 1e-12);
    }

    #[test]
    fn gaussian_rejects_non_positive_sd() {
        assert!(matches!(Gaussian::new(0.0, 0.0), Err(InferenceError::InvalidPrior { .. })));
    }
}
