//! # qubosat-tools - Command Line Tools for the qubosat Library
//!
//! Shared code of the `qubo2wcnf` and `sample-qubo` binaries: the JSON model
//! file format, precision arguments and logging setup.
//!
//! ## Model Files
//!
//! Models are JSON objects with variables named by strings:
//!
//! ```json
//! {
//!   "vartype": "spin",
//!   "linear": [["a", 1.0], ["b", -0.5]],
//!   "quadratic": [["a", "b", -2.0]],
//!   "offset": 0.25
//! }
//! ```
//!
//! Only `vartype` is required. Repeated terms add up.

use std::{io, path::Path};

use anyhow::Context;
use qubosat::{
    encodings::Precision,
    instances::{ModelError, QuadraticModel},
    labels::LabelMap,
    types::Vartype,
};
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// A quadratic model as stored in a JSON file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelFile {
    /// The variable domain
    pub vartype: Vartype,
    /// Linear terms as `[label, bias]`
    #[serde(default)]
    pub linear: Vec<(String, f64)>,
    /// Quadratic terms as `[label, label, bias]`
    #[serde(default)]
    pub quadratic: Vec<(String, String, f64)>,
    /// Constant energy offset
    #[serde(default)]
    pub offset: f64,
}

impl ModelFile {
    /// Reads a model file from a reader
    pub fn from_reader<R: io::Read>(reader: R) -> anyhow::Result<Self> {
        serde_json::from_reader(io::BufReader::new(reader)).context("error parsing model file")
    }

    /// Reads a model file from a path, or from `stdin` if no path is given
    pub fn read(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("could not open {}", path.display()))?;
                ModelFile::from_reader(file)
            }
            None => ModelFile::from_reader(io::stdin()),
        }
    }

    /// Builds the model and the map from labels to variable indices
    ///
    /// Indices are assigned in order of first appearance, linear terms first.
    pub fn into_model(self) -> Result<(QuadraticModel, LabelMap<String>), ModelError> {
        let mut labels = LabelMap::default();
        let linear: Vec<_> = self
            .linear
            .into_iter()
            .map(|(l, bias)| (labels.insert(l), bias))
            .collect();
        let quadratic: Vec<_> = self
            .quadratic
            .into_iter()
            .map(|(a, b, bias)| (labels.insert(a), labels.insert(b), bias))
            .collect();
        let mut model = QuadraticModel::new(labels.len(), self.vartype);
        for (idx, bias) in linear {
            model.add_linear(idx, bias)?;
        }
        for (i, j, bias) in quadratic {
            model.add_quadratic(i, j, bias)?;
        }
        model.set_offset(self.offset)?;
        Ok((model, labels))
    }
}

/// Resolves the precision command line arguments
pub fn precision_arg(precision: Option<f64>, auto: bool) -> Precision {
    match (precision, auto) {
        (_, true) => Precision::Auto,
        (Some(prec), false) => Precision::Fixed(prec),
        (None, false) => Precision::default(),
    }
}

/// Installs a logger writing to `stderr`
///
/// Verbosity 0 logs warnings, each additional level logs more.
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
