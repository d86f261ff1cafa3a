//! # Sampling Quadratic Models with MaxSAT Solvers
//!
//! The [`Sampler`] runs the full pipeline: it encodes a model, writes the
//! instance to a temporary file, lets a [`SolveWcnf`] solver solve it and
//! decodes the assignment. The temporary file is removed on every exit path.
//!
//! ```
//! use qubosat::{
//!     sampler::{Options, Sampler},
//!     solvers::exhaustive,
//! };
//!
//! let mut sampler = Sampler::new(exhaustive::Solver::default(), Options::default());
//! let sample = sampler
//!     .sample_ising([("a", 1.), ("b", 1.)], [(("a", "b"), -3.)])
//!     .unwrap();
//! assert_eq!(sample.value(&"a"), Some(-1));
//! assert_eq!(sample.value(&"b"), Some(-1));
//! assert_eq!(sample.energy, -5.);
//! ```

use std::{hash::Hash, io, time::Instant};

use tracing::debug;

use crate::{
    decoding::{decode, decode_labeled, LabeledSample, Sample},
    encodings::{encode, EncodeStats, Precision},
    instances::QuadraticModel,
    labels,
    solvers::SolveWcnf,
    types::Assignment,
};

/// Options of a [`Sampler`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Options {
    /// The precision coefficients are quantized with
    pub precision: Precision,
}

/// Samples low energy states of quadratic models with a MaxSAT solver
#[derive(Debug)]
pub struct Sampler<S> {
    solver: S,
    opts: Options,
}

impl<S: SolveWcnf> Sampler<S> {
    /// Creates a sampler
    pub fn new(solver: S, opts: Options) -> Self {
        Sampler { solver, opts }
    }

    /// Gets the options
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Gets the solver
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Consumes the sampler and returns the solver
    pub fn into_solver(self) -> S {
        self.solver
    }

    /// Samples a model
    ///
    /// # Errors
    ///
    /// Encoding errors ([`crate::encodings::EncodeError`]), IO errors writing
    /// the instance and any error of the solver. Nothing is retried.
    pub fn sample(&mut self, model: &QuadraticModel) -> anyhow::Result<Sample> {
        let start = Instant::now();
        let assign = self.solve_model(model)?;
        let sample = decode(&assign, model);
        debug!("sampled energy {} in {:?}", sample.energy, start.elapsed());
        Ok(sample)
    }

    /// Encodes a model into a temporary instance file and solves it
    fn solve_model(&mut self, model: &QuadraticModel) -> anyhow::Result<Assignment> {
        let encoding = encode(model, self.opts.precision)?;
        debug!(
            "sampling {} model with {} variables via {} ({} clauses, precision {})",
            model.vartype(),
            model.n_vars(),
            self.solver.signature(),
            encoding.n_clauses(),
            encoding.precision(),
        );

        let mut writer = io::BufWriter::new(tempfile::NamedTempFile::new()?);
        encoding.clauses().write_dimacs(&mut writer)?;
        let path = writer.into_inner()?.into_temp_path();
        // on errors the temporary file is removed when `path` is dropped
        let assign = self.solver.solve_wcnf(&path)?;
        path.close()?;
        debug!(
            "solver assignment violates clauses of weight {}",
            encoding.clauses().cost(&assign)
        );
        Ok(assign)
    }

    /// Samples a labeled QUBO, entries with two equal labels are linear
    pub fn sample_qubo<L, Q>(&mut self, qubo: Q) -> anyhow::Result<LabeledSample<L>>
    where
        L: Hash + Eq + Clone,
        Q: IntoIterator<Item = ((L, L), f64)>,
    {
        let (model, labels) = labels::from_qubo_labeled(qubo)?;
        self.sample_labeled(&model, &labels)
    }

    /// Samples a labeled Ising model
    pub fn sample_ising<L, H, J>(&mut self, h: H, j: J) -> anyhow::Result<LabeledSample<L>>
    where
        L: Hash + Eq + Clone,
        H: IntoIterator<Item = (L, f64)>,
        J: IntoIterator<Item = ((L, L), f64)>,
    {
        let (model, labels) = labels::from_ising_labeled(h, j)?;
        self.sample_labeled(&model, &labels)
    }

    /// Samples a model and keys the values by labels
    ///
    /// # Errors
    ///
    /// As [`Sampler::sample`], and [`crate::decoding::DecodeError`] if the
    /// label map does not match the model.
    pub fn sample_labeled<L: Hash + Eq + Clone>(
        &mut self,
        model: &QuadraticModel,
        labels: &labels::LabelMap<L>,
    ) -> anyhow::Result<LabeledSample<L>> {
        let assign = self.solve_model(model)?;
        let sample = decode_labeled(&assign, model, labels)?;
        Ok(sample)
    }
}

impl<S: SolveWcnf + Default> Default for Sampler<S> {
    fn default() -> Self {
        Sampler::new(S::default(), Options::default())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{Options, Sampler};
    use crate::{
        encodings::{EncodeError, Precision},
        instances::{QuadraticModel, WeightedClauseSet},
        solvers::{exhaustive, SolveWcnf},
        types::{Assignment, Vartype},
    };

    /// Records the instance path and its content, then fails or answers all-false
    struct Recording {
        fail: bool,
        seen: Option<(PathBuf, WeightedClauseSet)>,
    }

    impl SolveWcnf for Recording {
        fn signature(&self) -> &'static str {
            "recording"
        }

        fn solve_wcnf(&mut self, path: &Path) -> anyhow::Result<Assignment> {
            let clauses = WeightedClauseSet::from_dimacs_path(path)?;
            self.seen = Some((path.to_path_buf(), clauses));
            if self.fail {
                anyhow::bail!("solver crashed");
            }
            Ok(Assignment::default())
        }
    }

    fn model() -> QuadraticModel {
        let mut model = QuadraticModel::new(2, Vartype::Binary);
        model.add_linear(0, -1.).unwrap();
        model.add_linear(1, -1.).unwrap();
        model.add_quadratic(0, 1, 3.).unwrap();
        model
    }

    #[test]
    fn temp_file_removed_on_success() {
        let mut sampler = Sampler::new(
            Recording {
                fail: false,
                seen: None,
            },
            Options::default(),
        );
        let sample = sampler.sample(&model()).unwrap();
        assert_eq!(sample.values, vec![0, 0]);
        assert_eq!(sample.energy, 0.);
        let (path, clauses) = sampler.into_solver().seen.unwrap();
        assert_eq!(clauses.n_vars(), 2);
        assert_eq!(clauses.n_clauses(), 3);
        assert!(!path.exists());
    }

    #[test]
    fn temp_file_removed_on_error() {
        let mut sampler = Sampler::new(
            Recording {
                fail: true,
                seen: None,
            },
            Options::default(),
        );
        let err = sampler.sample(&model()).unwrap_err();
        assert_eq!(err.to_string(), "solver crashed");
        let (path, _) = sampler.into_solver().seen.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn invalid_precision_before_solving() {
        let mut sampler = Sampler::new(
            Recording {
                fail: false,
                seen: None,
            },
            Options {
                precision: Precision::Fixed(-1.),
            },
        );
        let err = sampler.sample(&model()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EncodeError>(),
            Some(&EncodeError::InvalidPrecision(-1.))
        );
        assert!(sampler.solver().seen.is_none());
    }

    #[test]
    fn exhaustive_optimum() {
        let mut sampler: Sampler<exhaustive::Solver> = Sampler::default();
        let sample = sampler.sample(&model()).unwrap();
        assert_eq!(sample.energy, -1.);
        assert_eq!(sample.values, vec![1, 0]);
    }

    #[test]
    fn labeled_qubo() {
        let mut sampler = Sampler::new(
            exhaustive::Solver::default(),
            Options {
                precision: Precision::Auto,
            },
        );
        let sample = sampler
            .sample_qubo([(("x", "x"), 2.), (("y", "y"), -1.), (("x", "y"), -4.)])
            .unwrap();
        assert_eq!(sample.value(&"x"), Some(1));
        assert_eq!(sample.value(&"y"), Some(1));
        assert_eq!(sample.energy, -3.);
    }
}
