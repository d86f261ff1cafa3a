//! # Parsing and Writing DIMACS WCNF Files
//!
//! Internal module containing functions for parsing and writing weighted
//! partial MaxSAT instances that consist of soft clauses only.
//!
//! Written files always start with a `p wcnf <n_vars> <n_clauses>` line
//! followed by one `<weight> <lit_1> ... <lit_k> 0` line per clause. The
//! parser is more lenient: it skips comments and empty lines, accepts a top
//! value in the p-line and files without a p-line.
//!
//! ## References
//!
//! - [DIMACS WCNF pre22](https://maxsat-evaluations.github.io/2017/rules.html#input)
//! - [DIMACS WCNF post22](https://maxsat-evaluations.github.io/2022/rules.html#input)

use std::io::{self, BufRead, BufReader, Read, Write};

use itertools::Itertools;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{i64, line_ending, multispace0, multispace1, u64},
    combinator::{all_consuming, map_res, opt, recognize, success},
    error::{Error as NomError, ErrorKind, ParseError},
    multi::separated_list0,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};
use thiserror::Error;

use crate::{
    instances::{SoftClause, WeightedClauseSet},
    types::Lit,
};

/// Errors occuring within the DIMACS parsing module
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid literal in the file
    #[error("invalid literal: {0}")]
    Lit(String),
    /// Invalid ending of a clause
    #[error("invalid clause ending: {0}")]
    ClauseEnding(String),
    /// Invalid or zero weight
    #[error("invalid weight: {0}")]
    Weight(String),
    /// A clause without literals
    #[error("empty clause: {0}")]
    EmptyClause(String),
    /// A hard clause, either marked with `h` or with a weight of at least top
    #[error("hard clauses are not supported: {0}")]
    HardClause(String),
    /// P line value is too large
    #[error("value in p-line too large: {0}")]
    PValTooLarge(u64),
    /// Invalid p line
    #[error("invalid p-line: {0}")]
    PLine(String),
    /// The clause count of the p line does not match the clauses in the file
    #[error("p-line declares {declared} clauses but the file contains {found}")]
    ClauseCount {
        /// Declared in the p-line
        declared: usize,
        /// Found in the body
        found: usize,
    },
    /// IO error reading file
    #[error("IO error: {0}")]
    IO(io::Error),
    /// Base error from nom parsing
    #[error("nom error: {0} ({1:?})")]
    NomError(String, ErrorKind),
    /// Incomplete nom error
    #[error("nom parser requested more data")]
    NomIncomplete,
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Lit(l0), Self::Lit(r0)) => l0 == r0,
            (Self::ClauseEnding(l0), Self::ClauseEnding(r0)) => l0 == r0,
            (Self::Weight(l0), Self::Weight(r0)) => l0 == r0,
            (Self::EmptyClause(l0), Self::EmptyClause(r0)) => l0 == r0,
            (Self::HardClause(l0), Self::HardClause(r0)) => l0 == r0,
            (Self::PValTooLarge(l0), Self::PValTooLarge(r0)) => l0 == r0,
            (Self::PLine(l0), Self::PLine(r0)) => l0 == r0,
            (
                Self::ClauseCount {
                    declared: l0,
                    found: l1,
                },
                Self::ClauseCount {
                    declared: r0,
                    found: r1,
                },
            ) => l0 == r0 && l1 == r1,
            (Self::IO(_), Self::IO(_)) => true,
            (Self::NomError(l0, l1), Self::NomError(r0, r1)) => l0 == r0 && l1 == r1,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl ParseError<&str> for Error {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        Self::NomError(String::from(input), kind)
    }

    fn append(_: &str, _: ErrorKind, other: Self) -> Self {
        // Other error always has precedence. This should prefer more meaningful
        // errors than [`Error::NomError`]
        other
    }
}

/// Internal type of possible preambles
#[derive(PartialEq, Debug)]
enum Preamble {
    Wcnf {
        n_vars: u32,
        n_clauses: usize,
        top: Option<u64>,
    },
    NoPLine {
        first_line: String,
    },
}

/// Parses a WCNF instance from a reader (typically a (compressed) file)
pub fn parse_wcnf<R: Read>(reader: R) -> Result<WeightedClauseSet, Error> {
    let reader = BufReader::new(reader);
    let (mut reader, preamble) = parse_preamble(reader)?;
    let (mut set, declared, top, mut buf) = match preamble {
        Preamble::Wcnf {
            n_vars,
            n_clauses,
            top,
        } => (
            WeightedClauseSet::new(n_vars),
            Some(n_clauses),
            top,
            String::new(),
        ),
        Preamble::NoPLine { first_line } => (WeightedClauseSet::default(), None, None, first_line),
    };
    loop {
        if let (_, Some((weight, lits))) = parse_wcnf_line(&buf).map_err(unwrap_dimacs_error)? {
            if top.is_some_and(|top| weight as u64 >= top) {
                return Err(Error::HardClause(String::from(buf.trim_end())));
            }
            set.add_soft_clause(weight, lits);
        }
        buf.clear();
        if reader.read_line(&mut buf).map_err(Error::IO)? == 0 {
            break;
        }
    }
    if let Some(declared) = declared {
        if declared != set.n_clauses() {
            return Err(Error::ClauseCount {
                declared,
                found: set.n_clauses(),
            });
        }
    }
    Ok(set)
}

fn unwrap_dimacs_error(err: nom::Err<Error>) -> Error {
    match err {
        nom::Err::Incomplete(_) => Error::NomIncomplete,
        nom::Err::Error(e) => e,
        nom::Err::Failure(e) => e,
    }
}

/// Parses preamble and determines type of instance/file format
fn parse_preamble<R: BufRead>(mut reader: R) -> Result<(R, Preamble), Error> {
    loop {
        let mut buf = String::new();
        if reader.read_line(&mut buf).map_err(Error::IO)? == 0 {
            return Ok((
                reader,
                Preamble::NoPLine {
                    first_line: String::new(),
                },
            ));
        }
        if buf.starts_with('c') || buf.trim().is_empty() {
            continue;
        }
        if buf.starts_with('p') {
            let (_, preamble) = parse_p_line(&buf).map_err(unwrap_dimacs_error)?;
            return Ok((reader, preamble));
        }
        return Ok((reader, Preamble::NoPLine { first_line: buf }));
    }
}

/// Parses p line
fn parse_p_line(input: &str) -> IResult<&str, Preamble, Error> {
    let full_p_line = String::from(input.trim_end());
    let (input, _) = tuple::<_, _, NomError<_>, _>((
        terminated(tag("p"), multispace1),
        terminated(tag("wcnf"), multispace1),
    ))(input)
    .map_err(|e| e.map(|_| Error::PLine(full_p_line.clone())))?;
    let (input, (n_vars, _, n_clauses, top, _)) = tuple::<_, _, NomError<_>, _>((
        u64,
        multispace1,
        u64,
        opt(preceded(multispace1, u64)),
        all_consuming(multispace0),
    ))(input)
    .map_err(|e| e.map(|_| Error::PLine(full_p_line)))?;
    let n_vars = match u32::try_from(n_vars) {
        Ok(v) => v,
        Err(_) => return Err(nom::Err::Error(Error::PValTooLarge(n_vars))),
    };
    let n_clauses = match usize::try_from(n_clauses) {
        Ok(v) => v,
        Err(_) => return Err(nom::Err::Error(Error::PValTooLarge(n_clauses))),
    };
    Ok((
        input,
        Preamble::Wcnf {
            n_vars,
            n_clauses,
            top,
        },
    ))
}

/// Parses a WCNF line, either a comment or a weighted clause
fn parse_wcnf_line(input: &str) -> IResult<&str, Option<(usize, Vec<Lit>)>, Error> {
    let (input, _) = multispace0(input)?;
    if input.trim().is_empty() {
        // Tolerate empty lines
        return Ok((input, None));
    }
    if input.starts_with('c') {
        return Ok(("", None));
    }
    if input.starts_with('h') {
        return Err(nom::Err::Error(Error::HardClause(String::from(
            input.trim_end(),
        ))));
    }
    let (rest, (weight, _)) = pair(parse_weight, multispace1)(input)?;
    let (rest, lits) = terminated(separated_list0(multispace1, parse_lit), parse_clause_ending)(rest)?;
    if lits.is_empty() {
        return Err(nom::Err::Error(Error::EmptyClause(String::from(
            input.trim_end(),
        ))));
    }
    Ok((rest, Some((weight, lits))))
}

/// Nuclear parser for a non-zero weight value
fn parse_weight(input: &str) -> IResult<&str, usize, Error> {
    map_res(u64, |w| {
        if w == 0 {
            return Err(());
        }
        usize::try_from(w).map_err(|_| ())
    })(input)
    .map_err(|e| e.map(|e: NomError<&str>| Error::Weight(String::from(e.input))))
}

/// Nuclear parser for literal
fn parse_lit(input: &str) -> IResult<&str, Lit, Error> {
    map_res(i64, Lit::from_dimacs)(input)
        .map_err(|e| e.map(|e: NomError<&str>| Error::Lit(String::from(e.input))))
}

/// Parses the end of a clause
/// A '0' followed by a linebreak, as well as a '0' followed by
/// whitespace or only a linebreak are treated as valid clause endings.
fn parse_clause_ending(input: &str) -> IResult<&str, &str, Error> {
    recognize(pair(
        multispace0,
        alt((
            recognize(all_consuming(success(""))),
            recognize(all_consuming(tag("0"))),
            recognize(terminated(tag("0"), line_ending)),
            recognize(terminated(tag("0"), multispace1)),
            recognize(line_ending),
        )),
    ))(input)
    .map_err(|e| e.map(|e: NomError<&str>| Error::ClauseEnding(String::from(e.input))))
}

/// Writes a clause set as a DIMACS WCNF file
///
/// The p-line is the first line and no comments are written.
pub fn write_wcnf<W: Write>(writer: &mut W, set: &WeightedClauseSet) -> Result<(), io::Error> {
    writeln!(writer, "p wcnf {} {}", set.n_vars(), set.n_clauses())?;
    set.iter().try_for_each(|cl| write_soft_clause(writer, cl))?;
    writer.flush()
}

fn write_soft_clause<W: Write>(writer: &mut W, clause: &SoftClause) -> Result<(), io::Error> {
    writeln!(
        writer,
        "{} {} 0",
        clause.weight(),
        clause.lits().iter().map(|l| l.to_dimacs()).format(" ")
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{
        parse_clause_ending, parse_lit, parse_p_line, parse_wcnf, parse_wcnf_line, parse_weight,
        write_wcnf, Error, Preamble,
    };
    use crate::{dimacs_lit, instances::WeightedClauseSet};

    #[test]
    fn parse_weight_pass() {
        assert_eq!(parse_weight("15 "), Ok((" ", 15)));
        assert_eq!(parse_weight("42 63"), Ok((" 63", 42)));
    }

    #[test]
    fn parse_weight_fail() {
        assert_eq!(
            parse_weight("0 "),
            Err(nom::Err::Error(Error::Weight(String::from("0 "))))
        );
        assert_eq!(
            parse_weight("-2 "),
            Err(nom::Err::Error(Error::Weight(String::from("-2 "))))
        );
        assert_eq!(
            parse_weight("abc "),
            Err(nom::Err::Error(Error::Weight(String::from("abc "))))
        );
    }

    #[test]
    fn parse_lit_pass() {
        assert_eq!(parse_lit("15 "), Ok((" ", dimacs_lit![15])));
        assert_eq!(parse_lit("-42 "), Ok((" ", dimacs_lit![-42])));
        assert_eq!(parse_lit("42 63"), Ok((" 63", dimacs_lit![42])));
    }

    #[test]
    fn parse_lit_fail() {
        assert_eq!(
            parse_lit("abc "),
            Err(nom::Err::Error(Error::Lit(String::from("abc "))))
        );
        assert_eq!(
            parse_lit("0 "),
            Err(nom::Err::Error(Error::Lit(String::from("0 "))))
        );
    }

    #[test]
    fn parse_p_line_pass() {
        assert_eq!(
            parse_p_line("p wcnf 23 42\n"),
            Ok((
                "",
                Preamble::Wcnf {
                    n_vars: 23,
                    n_clauses: 42,
                    top: None,
                }
            ))
        );
        assert_eq!(
            parse_p_line("p wcnf 23 42 52"),
            Ok((
                "",
                Preamble::Wcnf {
                    n_vars: 23,
                    n_clauses: 42,
                    top: Some(52),
                }
            ))
        );
    }

    #[test]
    fn parse_p_line_fail() {
        assert_eq!(
            parse_p_line("p cnf 23 42"),
            Err(nom::Err::Error(Error::PLine(String::from("p cnf 23 42"))))
        );
        assert_eq!(
            parse_p_line("p wcnf ab"),
            Err(nom::Err::Error(Error::PLine(String::from("p wcnf ab"))))
        );
        assert_eq!(
            parse_p_line("p wcnf 1 2 3 4"),
            Err(nom::Err::Error(Error::PLine(String::from("p wcnf 1 2 3 4"))))
        );
    }

    #[test]
    fn parse_clause_ending_pass() {
        assert_eq!(parse_clause_ending("0"), Ok(("", "0")));
        assert_eq!(parse_clause_ending(" 0\n"), Ok(("", " 0\n")));
        assert_eq!(parse_clause_ending("\n"), Ok(("", "\n")));
    }

    #[test]
    fn parse_wcnf_line_pass() {
        assert_eq!(
            parse_wcnf_line("3 1 -2 0\n"),
            Ok(("", Some((3, vec![dimacs_lit![1], dimacs_lit![-2]]))))
        );
        assert_eq!(parse_wcnf_line("c comment\n"), Ok(("", None)));
        assert_eq!(parse_wcnf_line("   \n"), Ok(("", None)));
    }

    #[test]
    fn parse_wcnf_line_fail() {
        assert_eq!(
            parse_wcnf_line("5 0\n"),
            Err(nom::Err::Error(Error::EmptyClause(String::from("5 0"))))
        );
        assert_eq!(
            parse_wcnf_line("h 1 2 0\n"),
            Err(nom::Err::Error(Error::HardClause(String::from("h 1 2 0"))))
        );
    }

    #[test]
    fn parse_wcnf_with_pline() {
        let data = "c header comment\np wcnf 3 2\n10000000 1 0\n5 -2 3 0\n";
        let set = parse_wcnf(Cursor::new(data)).unwrap();
        assert_eq!(set.n_vars(), 3);
        assert_eq!(set.n_clauses(), 2);
        let weights: Vec<usize> = set.iter().map(|cl| cl.weight()).collect();
        assert_eq!(weights, vec![10000000, 5]);
        assert_eq!(set.iter().nth(1).unwrap().lits(), &[dimacs_lit![-2], dimacs_lit![3]]);
    }

    #[test]
    fn parse_wcnf_without_pline() {
        let data = "2 -4 0\nc mid comment\n\n1 1 2 0\n";
        let set = parse_wcnf(Cursor::new(data)).unwrap();
        assert_eq!(set.n_vars(), 4);
        assert_eq!(set.n_clauses(), 2);
    }

    #[test]
    fn parse_wcnf_rejects() {
        let data = "p wcnf 2 3\n1 1 0\n";
        assert_eq!(
            parse_wcnf(Cursor::new(data)),
            Err(Error::ClauseCount {
                declared: 3,
                found: 1
            })
        );
        let data = "p wcnf 2 1 10\n10 1 2 0\n";
        assert_eq!(
            parse_wcnf(Cursor::new(data)),
            Err(Error::HardClause(String::from("10 1 2 0")))
        );
    }

    #[test]
    fn write_parse_wcnf() {
        let mut set = WeightedClauseSet::new(3);
        set.add_soft_clause(10000000, vec![dimacs_lit![1]]);
        set.add_soft_clause(4, vec![dimacs_lit![-1], dimacs_lit![-3]]);

        let mut cursor = Cursor::new(vec![]);
        write_wcnf(&mut cursor, &set).unwrap();
        let written = String::from_utf8(cursor.get_ref().clone()).unwrap();
        assert_eq!(written, "p wcnf 3 2\n10000000 1 0\n4 -1 -3 0\n");

        cursor.set_position(0);
        let parsed = parse_wcnf(cursor).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn write_empty() {
        let mut cursor = Cursor::new(vec![]);
        write_wcnf(&mut cursor, &WeightedClauseSet::new(4)).unwrap();
        assert_eq!(cursor.get_ref().as_slice(), b"p wcnf 4 0\n");
    }
}
