//! # Exhaustive Reference Solver
//!
//! Enumerates all assignments. Only usable for instances with a handful of
//! variables, mainly as ground truth in tests.

use std::{path::Path, time::Instant};

use thiserror::Error;
use tracing::debug;

use crate::{
    decoding::Sample,
    instances::{QuadraticModel, WeightedClauseSet},
    types::{Assignment, TernaryVal},
};

use super::{check_instance, SolveWcnf};

/// The default maximum number of variables to enumerate
pub const DEFAULT_MAX_VARS: u32 = 20;

/// An instance has too many variables to enumerate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{n_vars} variables exceed the enumeration limit of {limit}")]
pub struct TooManyVariables {
    /// Number of variables of the instance
    pub n_vars: usize,
    /// The enumeration limit
    pub limit: u32,
}

/// A solver trying all assignments of a WCNF instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solver {
    max_vars: u32,
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            max_vars: DEFAULT_MAX_VARS,
        }
    }
}

impl Solver {
    /// Creates a solver enumerating instances with at most `max_vars` variables
    pub fn new(max_vars: u32) -> Self {
        Solver { max_vars }
    }

    /// Finds an assignment of minimal cost and returns it together with the cost
    ///
    /// Among optimal assignments, the one with the smallest binary number
    /// (variable 0 is the lowest bit) is returned.
    pub fn solve_clauses(
        &self,
        clauses: &WeightedClauseSet,
    ) -> Result<(Assignment, u128), TooManyVariables> {
        let n_vars = clauses.n_vars();
        if n_vars > self.max_vars || n_vars >= usize::BITS {
            return Err(TooManyVariables {
                n_vars: n_vars as usize,
                limit: self.max_vars,
            });
        }
        let n_vars = n_vars as usize;
        let mut best: Option<(Assignment, u128)> = None;
        for bits in 0..1usize << n_vars {
            let assign = assignment_from_bits(bits, n_vars);
            let cost = clauses.cost(&assign);
            if best.as_ref().map_or(true, |(_, best_cost)| cost < *best_cost) {
                best = Some((assign, cost));
            }
        }
        // the loop runs at least once
        Ok(best.unwrap_or_default())
    }
}

fn assignment_from_bits(bits: usize, n_vars: usize) -> Assignment {
    Assignment::from(
        (0..n_vars)
            .map(|idx| TernaryVal::from(bits & (1 << idx) != 0))
            .collect::<Vec<_>>(),
    )
}

impl SolveWcnf for Solver {
    fn signature(&self) -> &'static str {
        "exhaustive"
    }

    fn solve_wcnf(&mut self, path: &Path) -> anyhow::Result<Assignment> {
        check_instance(path)?;
        let clauses = WeightedClauseSet::from_dimacs_path(path)?;
        let start = Instant::now();
        let (assign, cost) = self.solve_clauses(&clauses)?;
        debug!(
            "enumerated {} variables, optimal cost {} found in {:?}",
            clauses.n_vars(),
            cost,
            start.elapsed()
        );
        Ok(assign)
    }
}

/// Finds a sample of minimal energy by enumerating all values of a model
///
/// Ties are broken like in [`Solver::solve_clauses`].
///
/// # Errors
///
/// If the model has more than [`DEFAULT_MAX_VARS`] variables.
pub fn ground_state(model: &QuadraticModel) -> Result<Sample, TooManyVariables> {
    let n_vars = model.n_vars();
    if n_vars > DEFAULT_MAX_VARS as usize {
        return Err(TooManyVariables {
            n_vars,
            limit: DEFAULT_MAX_VARS,
        });
    }
    let vartype = model.vartype();
    let mut best: Option<Sample> = None;
    for bits in 0..1usize << n_vars {
        let values: Vec<i8> = (0..n_vars)
            .map(|idx| vartype.from_bool(bits & (1 << idx) != 0))
            .collect();
        let energy = model.energy_unchecked(&values);
        if best.as_ref().map_or(true, |best| energy < best.energy) {
            best = Some(Sample {
                vartype,
                values,
                energy,
            });
        }
    }
    Ok(best.unwrap_or(Sample {
        vartype,
        values: vec![],
        energy: model.offset(),
    }))
}
