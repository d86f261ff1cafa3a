//! # Module for File IO (Writing and Parsing)
//!
//! WCNF instances are written and parsed in [`dimacs`]. This module itself
//! holds the parser for the output of MaxSAT solvers.

use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};
use thiserror::Error;

use crate::types::{Assignment, InvalidVLine};

pub mod dimacs;

/// Opens a reader for the file at Path.
/// With feature `compression` supports bzip2, gzip and xz compression.
pub(crate) fn open_compressed_uncompressed_read<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::Read>, io::Error> {
    let path = path.as_ref();
    let raw_reader = File::open(path)?;
    #[cfg(feature = "compression")]
    if let Some(ext) = path.extension() {
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("bz2")) {
            return Ok(Box::new(bzip2::read::BzDecoder::new(raw_reader)));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("gz")) {
            return Ok(Box::new(flate2::read::GzDecoder::new(raw_reader)));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("xz")) {
            return Ok(Box::new(xz2::read::XzDecoder::new(raw_reader)));
        }
    }
    Ok(Box::new(raw_reader))
}

/// Opens a writer for the file at Path.
/// With feature `compression` supports bzip2, gzip and xz compression.
pub(crate) fn open_compressed_uncompressed_write<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::Write>, io::Error> {
    let path = path.as_ref();
    let raw_writer = File::create(path)?;
    #[cfg(feature = "compression")]
    if let Some(ext) = path.extension() {
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("bz2")) {
            return Ok(Box::new(io::BufWriter::new(bzip2::write::BzEncoder::new(
                raw_writer,
                bzip2::Compression::fast(),
            ))));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("gz")) {
            return Ok(Box::new(io::BufWriter::new(flate2::write::GzEncoder::new(
                raw_writer,
                flate2::Compression::fast(),
            ))));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("xz")) {
            return Ok(Box::new(io::BufWriter::new(xz2::write::XzEncoder::new(
                raw_writer, 1,
            ))));
        }
    }
    Ok(Box::new(io::BufWriter::new(raw_writer)))
}

/// The status reported in the `s` line of a MaxSAT solver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxSatStatus {
    /// `s OPTIMUM FOUND`
    Optimum,
    /// `s SATISFIABLE`, the solver found a solution but did not prove optimality
    Satisfiable,
    /// `s UNSATISFIABLE`
    Unsatisfiable,
    /// `s UNKNOWN`
    Unknown,
}

/// The parsed output of a MaxSAT solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxSatOutput {
    /// The reported status
    pub status: MaxSatStatus,
    /// The last cost reported in an `o` line
    pub cost: Option<u64>,
    /// The assignment from the `v` lines
    pub assignment: Option<Assignment>,
}

impl MaxSatOutput {
    /// Gets the assignment if the solver found a solution
    pub fn into_solution(self) -> Result<Assignment, MaxSatOutputError> {
        match self.status {
            MaxSatStatus::Optimum | MaxSatStatus::Satisfiable => {
                self.assignment.ok_or(MaxSatOutputError::NoVline)
            }
            MaxSatStatus::Unsatisfiable | MaxSatStatus::Unknown => {
                Err(MaxSatOutputError::NoSolution(self.status))
            }
        }
    }
}

/// Errors in the output of a MaxSAT solver
#[derive(Error, Debug)]
pub enum MaxSatOutputError {
    /// No `s` line
    #[error("no solution line found in the output")]
    NoSline,
    /// No `v` line despite a solution being reported
    #[error("no value line found in the output")]
    NoVline,
    /// Unknown status in the `s` line
    #[error("invalid solution line found in the output: {0}")]
    InvalidSline(String),
    /// The `o` line is not a cost
    #[error("invalid cost line found in the output: {0}")]
    InvalidOline(String),
    /// The `v` line could not be parsed
    #[error(transparent)]
    InvalidVline(#[from] InvalidVLine),
    /// The solver did not report a solution
    #[error("the solver did not report a solution (status {0:?})")]
    NoSolution(MaxSatStatus),
    /// IO error reading the output
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Parses the output of a MaxSAT solver in the MaxSAT evaluation format
///
/// Comment lines (`c`) are skipped. Multiple `v` lines are merged, multiple
/// `o` lines keep the last value.
pub fn parse_maxsat_solver_output<R: BufRead>(reader: R) -> Result<MaxSatOutput, MaxSatOutputError> {
    let mut status = None;
    let mut cost = None;
    let mut solution: Option<Assignment> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();

        if let Some(sline) = line.strip_prefix("s ") {
            let sline = sline.trim();
            status = Some(match sline {
                "OPTIMUM FOUND" => MaxSatStatus::Optimum,
                "SATISFIABLE" => MaxSatStatus::Satisfiable,
                "UNSATISFIABLE" => MaxSatStatus::Unsatisfiable,
                "UNKNOWN" | "INDETERMINATE" => MaxSatStatus::Unknown,
                _ => return Err(MaxSatOutputError::InvalidSline(String::from(sline))),
            });
            continue;
        }

        if let Some(oline) = line.strip_prefix("o ") {
            let val = oline
                .trim()
                .parse()
                .map_err(|_| MaxSatOutputError::InvalidOline(String::from(oline)))?;
            cost = Some(val);
            continue;
        }

        if line == "v" {
            // solution without any variables
            solution.get_or_insert_with(Assignment::default);
            continue;
        }

        if line.starts_with("v ") {
            match &mut solution {
                Some(assign) => assign.extend_from_vline(line)?,
                None => solution = Some(Assignment::from_vline(line)?),
            }
        }
    }

    // without a solution line the output can not be trusted
    let Some(status) = status else {
        return Err(MaxSatOutputError::NoSline);
    };

    Ok(MaxSatOutput {
        status,
        cost,
        assignment: solution,
    })
}
