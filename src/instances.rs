//! # Model and Instance Representations
//!
//! [`QuadraticModel`] is the input side: a QUBO or Ising objective over a
//! dense range of variable indices. [`WeightedClauseSet`] is the output side:
//! the soft clauses of a weighted partial MaxSAT instance. File IO for the
//! latter lives in [`fio`].

use thiserror::Error;

pub mod fio;

mod model;
pub use model::QuadraticModel;

mod wcnf;
pub use wcnf::{SoftClause, WeightedClauseSet};

/// Errors when building a [`QuadraticModel`]
///
/// These are caller contract violations and are reported before any
/// encoding or file IO happens.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ModelError {
    /// A term references a variable outside of `0..n_vars`
    #[error("variable index {idx} out of range for a model with {n_vars} variables")]
    IdxOutOfRange {
        /// The offending index
        idx: usize,
        /// The number of variables of the model
        n_vars: usize,
    },
    /// A quadratic term over a single variable
    #[error("quadratic term ({0}, {0}) is not over two distinct variables")]
    SelfLoop(usize),
    /// A coefficient that is NaN or infinite
    #[error("coefficient {0} is not finite")]
    NonFinite(f64),
    /// A sample of the wrong length or with values outside of the domain
    #[error("sample does not match the model")]
    InvalidSample,
}
