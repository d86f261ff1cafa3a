//! # `qubo2wcnf`
//!
//! A small tool for encoding a QUBO or Ising model in a JSON file as a DIMACS
//! WCNF instance.

use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use qubosat::encodings::{encode, EncodeStats};
use qubosat_tools::{init_logging, precision_arg, ModelFile};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The JSON model file. Reads from `stdin` if not given.
    in_path: Option<PathBuf>,
    /// The DIMACS WCNF output path. Writes to `stdout` if not given.
    out_path: Option<PathBuf>,
    /// The precision to quantize coefficients with
    #[arg(long, conflicts_with = "auto_precision")]
    precision: Option<f64>,
    /// Derive the precision from the largest coefficient
    #[arg(long)]
    auto_precision: bool,
    /// Increase the log level on `stderr`
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let (model, labels) = ModelFile::read(args.in_path.as_deref())?
        .into_model()
        .context("invalid model")?;
    let encoding = encode(&model, precision_arg(args.precision, args.auto_precision))
        .context("error encoding the model")?;
    info!(
        "{} variables, {} clauses, precision {}, energy = {} * cost + {}",
        encoding.n_vars(),
        encoding.n_clauses(),
        encoding.precision(),
        encoding.scale(),
        encoding.offset()
    );
    for (idx, label) in labels.iter().enumerate() {
        info!("variable {} is {label}", idx + 1);
    }

    if let Some(out_path) = args.out_path {
        encoding
            .clauses()
            .write_dimacs_path(out_path)
            .context("error writing the output file")?;
    } else {
        encoding
            .clauses()
            .write_dimacs(&mut io::stdout())
            .context("io error writing to stdout")?;
    };
    Ok(())
}
