//! # Encodings of Quadratic Objectives to Weighted Soft Clauses
//!
//! [`quadratic`] turns a [`crate::instances::QuadraticModel`] into a
//! [`crate::instances::WeightedClauseSet`] whose violated weight reproduces
//! the objective. [`precision`] holds the quantization of real coefficients
//! into integer weights.

use thiserror::Error;

pub mod precision;
pub use precision::{auto_precision, quantize, Precision};

pub mod quadratic;
pub use quadratic::{encode, Encoding};

/// Errors from encodings
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EncodeError {
    /// The precision is zero, negative or not finite
    #[error("precision must be positive and finite, got {0}")]
    InvalidPrecision(f64),
    /// A coefficient divided by the precision, or the total clause weight,
    /// does not fit the weight type
    #[error("weight {0} does not fit a clause weight")]
    WeightOverflow(f64),
    /// The model has more variables than can be represented as literals
    #[error("{0} variables exceed the maximum number of literal variables")]
    TooManyVariables(usize),
}

/// Trait for encodings that track statistics.
pub trait EncodeStats {
    /// Gets the number of clauses in the encoding
    fn n_clauses(&self) -> usize;

    /// Gets the number of variables in the encoding
    fn n_vars(&self) -> u32;
}
