//! # `sample-qubo`
//!
//! A small tool for sampling a QUBO or Ising model in a JSON file with a
//! MaxSAT solver. The sample is written to `stdout` as JSON.

use std::{io, path::PathBuf, process::Command};

use anyhow::Context;
use clap::Parser;
use qubosat::{
    sampler::{Options, Sampler},
    solvers::{exhaustive, external, SolveWcnf},
};
use qubosat_tools::{init_logging, precision_arg, ModelFile};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The JSON model file. Reads from `stdin` if not given.
    in_path: Option<PathBuf>,
    /// The MaxSAT solver executable. Enumerates all assignments if not given.
    #[arg(long)]
    solver: Option<PathBuf>,
    /// Additional arguments passed to the solver
    #[arg(long = "solver-arg", allow_hyphen_values = true)]
    solver_args: Vec<String>,
    /// Pass the instance as the first instead of the last solver argument
    #[arg(long)]
    instance_first: bool,
    /// The precision to quantize coefficients with
    #[arg(long, conflicts_with = "auto_precision")]
    precision: Option<f64>,
    /// Derive the precision from the largest coefficient
    #[arg(long)]
    auto_precision: bool,
    /// Maximum number of variables to enumerate without a solver
    #[arg(long, default_value_t = exhaustive::DEFAULT_MAX_VARS)]
    max_enum_vars: u32,
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

    let solver: Box<dyn SolveWcnf> = match args.solver {
        Some(path) => {
            let mut cmd = Command::new(path);
            cmd.args(&args.solver_args);
            let instance_arg = if args.instance_first {
                external::InstanceArg::First
            } else {
                external::InstanceArg::Last
            };
            Box::new(external::Solver::new(
                cmd,
                instance_arg,
                external::OutputVia::pipe(),
                "external",
            ))
        }
        None => Box::new(exhaustive::Solver::new(args.max_enum_vars)),
    };
    let mut sampler = Sampler::new(
        solver,
        Options {
            precision: precision_arg(args.precision, args.auto_precision),
        },
    );

    let sample = sampler
        .sample_labeled(&model, &labels)
        .context("error sampling the model")?;

    serde_json::to_writer_pretty(io::stdout(), &sample).context("io error writing to stdout")?;
    println!();
    Ok(())
}
