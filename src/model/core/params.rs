//! Parameters — named priors and how model arguments resolve.
//!
//! Purpose
//! -------
//! Describe the parameter contract the noise models consume: a name plus a
//! log-density over values. The prior framework itself lives outside this
//! crate; models only need [`Prior::lnprob`].
//!
//! Key behaviors
//! -------------
//! - [`Prior`] is the density contract (`lnprob`, optional `guess`).
//! - [`Parameter`] pairs a name with a shared prior.
//! - [`ParamSpec`] says what a model argument is at construction time: a
//!   free parameter, a fixed value, or something read from the observation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Priors are immutable and shareable across threads; models hold them
//!   behind `Arc`.
//! - `lnprob` returns `f64::NEG_INFINITY` outside the prior's support rather
//!   than an error.
use crate::model::core::values::ParValue;
use std::{fmt, sync::Arc};

/// Log-density over parameter values.
pub trait Prior: fmt::Debug + Send + Sync {
    /// Log prior density at `value`.
    fn lnprob(&self, value: &ParValue) -> f64;

    /// A representative starting value, if the prior has one.
    fn guess(&self) -> Option<ParValue> {
        None
    }
}

/// A named free parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub prior: Arc<dyn Prior>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, prior: Arc<dyn Prior>) -> Self {
        Self { name: name.into(), prior }
    }

    /// Log prior density of this parameter at `value`.
    pub fn lnprob(&self, value: &ParValue) -> f64 {
        self.prior.lnprob(value)
    }
}

/// How a model argument is bound at construction.
///
/// - `Free(prior)`: registered as a parameter and sampled over.
/// - `Fixed(value)`: baked into the model; never a parameter.
/// - `FromData`: read from observation metadata at evaluation time.
#[derive(Debug, Clone, Default)]
pub enum ParamSpec {
    Free(Arc<dyn Prior>),
    Fixed(ParValue),
    #[default]
    FromData,
}

impl ParamSpec {
    /// Free parameter with the given prior.
    pub fn free<P: Prior + 'static>(prior: P) -> Self {
        ParamSpec::Free(Arc::new(prior))
    }

    /// Fixed value.
    pub fn fixed(value: impl Into<ParValue>) -> Self {
        ParamSpec::Fixed(value.into())
    }

    pub fn is_free(&self) -> bool {
        matches!(self, ParamSpec::Free(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Flat;

    impl Prior for Flat {
        fn lnprob(&self, _value: &ParValue) -> f64 {
            0.0
        }
    }

    #[test]
    fn parameter_delegates_lnprob_to_prior() {
        let p = Parameter::new("r", Arc::new(Flat));

        assert_eq!(p.name, "r");
        assert_eq!(p.lnprob(&ParValue::Scalar(123.0)), 0.0);
    }

    #[test]
    fn param_spec_defaults_to_from_data() {
        assert!(matches!(ParamSpec::default(), ParamSpec::FromData));
        assert!(ParamSpec::free(Flat).is_free());
        assert!(!ParamSpec::fixed(1.0).is_free());
    }
}
