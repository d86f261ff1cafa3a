//! # Solver Interface for External Executables
//!
//! Calls a MaxSAT solver executable on an instance file and parses its output
//! in the format of the MaxSAT evaluations (`s`, `o` and `v` lines).

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{self, Command},
    time::Instant,
};

use tracing::debug;

use crate::{instances::fio, types::Assignment};

use super::{check_instance, SolveWcnf};

macro_rules! check_exit_code {
    ($status:expr) => {
        match $status.code() {
            // expected return codes of MaxSAT solvers, the output is what
            // actually tells whether a solution was found
            Some(0 | 10 | 20 | 30) => (),
            Some(x) => anyhow::bail!("solver returned unexpected code {x}"),
            None => anyhow::bail!("solver process terminated by signal"),
        };
    };
}

/// Specifies what argument position the instance is passed to the solver at
///
/// Most solvers expect the instance as the last argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstanceArg {
    /// Pass the instance file path as the first solver argument
    First,
    /// Pass the instance file path as the last argument
    #[default]
    Last,
}

/// Options for how the output of the solver is read
#[derive(Debug, Clone, Default)]
pub struct OutputVia(OutputViaInt);

#[derive(Debug, Clone, Default)]
enum OutputViaInt {
    /// The solver output is written to a file at the given path that is not automatically deleted
    File(PathBuf),
    /// The solver output is read directly through a pipe
    #[default]
    Pipe,
}

impl OutputVia {
    /// Process the solver output via a persistent file at `path`
    #[must_use]
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        OutputVia(OutputViaInt::File(path.as_ref().to_path_buf()))
    }

    /// Process the solver output via a pipe from `<stdout>`
    #[must_use]
    pub fn pipe() -> Self {
        OutputVia(OutputViaInt::Pipe)
    }
}

/// A MaxSAT solver called via an external executable
///
/// This solver will perform a call to the solver executable via [`Command`] and parse the solver
/// output via [`fio::parse_maxsat_solver_output`]
#[derive(Debug)]
pub struct Solver {
    signature: &'static str,
    cmd: Command,
    instance_arg: InstanceArg,
    output: OutputVia,
}

impl Solver {
    /// Initializes a solver with a [`Command`] that is fully set up, except for the input instance
    ///
    /// # Notes
    ///
    /// - If the solver output is processed via a file, compression is _not_ supported
    /// - The command is rebuilt for every call, so the fact that [`Command::env_clear`] was
    ///     called on it is forgotten
    ///
    /// # Example
    ///
    /// ```
    /// use std::process::Command;
    /// use qubosat::solvers::external;
    /// let solver = external::Solver::new(
    ///     Command::new("<path to solver binary>"),
    ///     external::InstanceArg::Last,
    ///     external::OutputVia::pipe(),
    ///     "solver-signature",
    /// );
    /// ```
    /// After this initialization, the `solver` instance can be used with the
    /// [`SolveWcnf`] trait.
    #[must_use]
    pub fn new(
        cmd: Command,
        instance_arg: InstanceArg,
        output: OutputVia,
        signature: &'static str,
    ) -> Self {
        Solver {
            signature,
            cmd,
            instance_arg,
            output,
        }
    }

    /// Initializes a solver passing the instance as last argument and
    /// reading the output through a pipe
    #[must_use]
    pub fn new_default(cmd: Command, signature: &'static str) -> Self {
        Solver::new(cmd, InstanceArg::default(), OutputVia::default(), signature)
    }
}

impl SolveWcnf for Solver {
    fn signature(&self) -> &'static str {
        self.signature
    }

    fn solve_wcnf(&mut self, path: &Path) -> anyhow::Result<Assignment> {
        check_instance(path)?;
        let mut cmd = construct_command_path(&self.cmd, path, self.instance_arg);
        cmd.stdin(process::Stdio::null());
        debug!("calling external solver {:?}", cmd);
        let start = Instant::now();
        let output = match &self.output.0 {
            OutputViaInt::File(out_path) => {
                // NOTE: this currently does not support compression
                cmd.stdout(fs::File::create(out_path)?);
                let exit = cmd.status()?;
                check_exit_code!(exit);
                fio::parse_maxsat_solver_output(io::BufReader::new(fs::File::open(out_path)?))?
            }
            OutputViaInt::Pipe => {
                let mut child = cmd.stdout(process::Stdio::piped()).spawn()?;
                let Some(stdout) = child.stdout.take() else {
                    anyhow::bail!("could not capture solver output");
                };
                let mut stdout = io::BufReader::new(stdout);
                let output = fio::parse_maxsat_solver_output(&mut stdout);
                let exit = child.wait()?;
                // keep pipe open till after child has terminated
                drop(stdout);
                check_exit_code!(exit);
                output?
            }
        };
        debug!(
            "external solver finished with status {:?} and cost {:?} in {:?}",
            output.status,
            output.cost,
            start.elapsed()
        );
        Ok(output.into_solution()?)
    }
}

fn construct_command_path(cmd: &Command, path: &Path, argpos: InstanceArg) -> Command {
    let mut new_cmd = Command::new(cmd.get_program());
    match argpos {
        InstanceArg::First => {
            new_cmd.arg(path).args(cmd.get_args());
        }
        InstanceArg::Last => {
            new_cmd.args(cmd.get_args()).arg(path);
        }
    }
    for (key, val) in cmd.get_envs() {
        if let Some(val) = val {
            new_cmd.env(key, val);
        } else {
            new_cmd.env_remove(key);
        }
    }
    if let Some(dir) = cmd.get_current_dir() {
        new_cmd.current_dir(dir);
    }
    new_cmd
}
