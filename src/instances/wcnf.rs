//! # Weighted Soft Clause Sets

use std::{io, path::Path};

use crate::types::{Assignment, Lit};

use super::fio;

/// A soft clause: the weight is charged if none of the literals is true
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SoftClause {
    weight: usize,
    lits: Vec<Lit>,
}

impl SoftClause {
    /// Creates a soft clause
    ///
    /// # Panics
    ///
    /// If `weight` is zero or `lits` is empty.
    pub fn new(weight: usize, lits: Vec<Lit>) -> Self {
        assert_ne!(weight, 0, "soft clause with zero weight");
        assert!(!lits.is_empty(), "empty soft clause");
        SoftClause { weight, lits }
    }

    /// Gets the weight of the clause
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Gets the literals of the clause
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Checks whether the clause is violated by an assignment
    ///
    /// Variables without a value count as false, the same way the decoder
    /// reads them.
    pub fn is_violated(&self, assign: &Assignment) -> bool {
        !self
            .lits
            .iter()
            .any(|&l| assign.var_value(l.var()).to_bool_with_def(false) == l.is_pos())
    }
}

/// The soft clauses of a weighted partial MaxSAT instance
///
/// Clauses keep the order in which they were added. Clauses with weight zero
/// are never stored.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WeightedClauseSet {
    n_vars: u32,
    clauses: Vec<SoftClause>,
}

impl WeightedClauseSet {
    /// Creates an empty clause set over `n_vars` variables
    pub fn new(n_vars: u32) -> Self {
        WeightedClauseSet {
            n_vars,
            clauses: vec![],
        }
    }

    /// Adds a soft clause. Clauses with weight zero are dropped. The variable
    /// count grows to cover all literals of the clause.
    ///
    /// # Panics
    ///
    /// If `lits` is empty.
    pub fn add_soft_clause(&mut self, weight: usize, lits: Vec<Lit>) {
        if weight == 0 {
            return;
        }
        if let Some(max) = lits.iter().map(Lit::vidx32).max() {
            self.n_vars = std::cmp::max(self.n_vars, max + 1);
        }
        self.clauses.push(SoftClause::new(weight, lits));
    }

    /// Gets the number of variables declared in the header
    pub fn n_vars(&self) -> u32 {
        self.n_vars
    }

    /// Gets the number of clauses
    pub fn n_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Checks whether the set has no clauses
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterates over the clauses in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, SoftClause> {
        self.clauses.iter()
    }

    /// The sum of all clause weights
    pub fn weight_sum(&self) -> u128 {
        self.clauses.iter().map(|cl| cl.weight() as u128).sum()
    }

    /// The total weight of the clauses violated by an assignment
    pub fn cost(&self, assign: &Assignment) -> u128 {
        self.clauses
            .iter()
            .filter(|cl| cl.is_violated(assign))
            .map(|cl| cl.weight() as u128)
            .sum()
    }

    /// Parses a set from a DIMACS WCNF reader
    pub fn from_dimacs<R: io::Read>(reader: R) -> Result<Self, fio::dimacs::Error> {
        fio::dimacs::parse_wcnf(reader)
    }

    /// Parses a set from a DIMACS WCNF file. With feature `compression`,
    /// supports bzip2, gzip and xz compression, detected by the file
    /// extension.
    pub fn from_dimacs_path<P: AsRef<Path>>(path: P) -> Result<Self, fio::dimacs::Error> {
        let reader = fio::open_compressed_uncompressed_read(path).map_err(fio::dimacs::Error::IO)?;
        fio::dimacs::parse_wcnf(reader)
    }

    /// Writes the set as a DIMACS WCNF file to a writer
    pub fn write_dimacs<W: io::Write>(&self, writer: &mut W) -> Result<(), io::Error> {
        fio::dimacs::write_wcnf(writer, self)
    }

    /// Writes the set as a DIMACS WCNF file to a path. With feature
    /// `compression`, supports bzip2, gzip and xz compression, detected by
    /// the file extension.
    pub fn write_dimacs_path<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let mut writer = fio::open_compressed_uncompressed_write(path)?;
        self.write_dimacs(&mut writer)
    }
}

impl<'a> IntoIterator for &'a WeightedClauseSet {
    type Item = &'a SoftClause;

    type IntoIter = std::slice::Iter<'a, SoftClause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}
