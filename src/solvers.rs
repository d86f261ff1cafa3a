//! # Interfaces to MaxSAT Solvers
//!
//! A MaxSAT solver is anything that takes a DIMACS WCNF file and returns an
//! assignment minimizing the violated weight. This crate does not implement
//! MaxSAT search itself. [`external::Solver`] calls a solver executable,
//! [`exhaustive::Solver`] is a brute force reference for tiny instances.
//!
//! ## Implementing a Solver
//!
//! ```
//! use std::path::Path;
//! use qubosat::{solvers::{check_instance, SolveWcnf}, types::Assignment};
//!
//! /// A solver that always sets every variable to false
//! struct AllFalse;
//!
//! impl SolveWcnf for AllFalse {
//!     fn signature(&self) -> &'static str {
//!         "all-false"
//!     }
//!
//!     fn solve_wcnf(&mut self, path: &Path) -> anyhow::Result<Assignment> {
//!         check_instance(path)?;
//!         Ok(Assignment::default())
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Assignment;

pub mod exhaustive;
pub mod external;

/// Trait for solvers of weighted partial MaxSAT instances given as files
pub trait SolveWcnf {
    /// Gets a signature of the solver implementation
    fn signature(&self) -> &'static str;

    /// Solves the DIMACS WCNF instance at `path` and returns the best assignment found
    ///
    /// # Errors
    ///
    /// - [`InstanceNotFound`] if no file exists at `path`, before anything is
    ///   invoked
    /// - any error of the solver, including not finding a solution
    fn solve_wcnf(&mut self, path: &Path) -> anyhow::Result<Assignment>;
}

impl<S: SolveWcnf + ?Sized> SolveWcnf for Box<S> {
    fn signature(&self) -> &'static str {
        (**self).signature()
    }

    fn solve_wcnf(&mut self, path: &Path) -> anyhow::Result<Assignment> {
        (**self).solve_wcnf(path)
    }
}

impl<S: SolveWcnf + ?Sized> SolveWcnf for &mut S {
    fn signature(&self) -> &'static str {
        (**self).signature()
    }

    fn solve_wcnf(&mut self, path: &Path) -> anyhow::Result<Assignment> {
        (**self).solve_wcnf(path)
    }
}

/// The instance file passed to a solver does not exist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("instance file {} not found", .0.display())]
pub struct InstanceNotFound(pub PathBuf);

/// Checks that an instance file exists
pub fn check_instance(path: &Path) -> Result<(), InstanceNotFound> {
    if path.is_file() {
        Ok(())
    } else {
        Err(InstanceNotFound(path.to_path_buf()))
    }
}
