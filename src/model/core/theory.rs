//! Scattering theory selection.
use crate::model::errors::InferenceError;
use std::{fmt, str::FromStr};

/// Which scattering calculation the solver should use.
///
/// Variants:
/// - `Auto`: let the solver pick based on the scatterer (default).
/// - `Mie`: Lorenz–Mie solution for single spheres.
/// - `Multisphere`: T-matrix superposition for sphere clusters.
/// - `Tmatrix`: general T-matrix for non-spherical scatterers.
/// - `Dda`: discrete dipole approximation.
///
/// Parsing:
/// Implements `FromStr` with case-insensitive names (`"auto"`, `"Mie"`,
/// `"MULTISPHERE"`, ...). Unknown names return
/// [`InferenceError::InvalidTheory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theory {
    #[default]
    Auto,
    Mie,
    Multisphere,
    Tmatrix,
    Dda,
}

impl FromStr for Theory {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Theory::Auto),
            "mie" => Ok(Theory::Mie),
            "multisphere" => Ok(Theory::Multisphere),
            "tmatrix" => Ok(Theory::Tmatrix),
            "dda" => Ok(Theory::Dda),
            _ => Err(InferenceError::InvalidTheory { name: s.to_string() }),
        }
    }
}

impl fmt::Display for Theory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theory::Auto => "auto",
            Theory::Mie => "mie",
            Theory::Multisphere => "multisphere",
            Theory::Tmatrix => "tmatrix",
            Theory::Dda => "dda",
        };
        f.write_str(name)
    }
}
