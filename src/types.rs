//! # Common Types for Encoding and Decoding
//!
//! Common types used throughout the library to guarantee type safety.

use std::{fmt, ops};

use thiserror::Error;

/// The hash map to use throughout the library
#[cfg(feature = "fxhash")]
pub type RsHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fxhash"))]
pub type RsHashMap<K, V> = std::collections::HashMap<K, V>;

/// The variable domain a quadratic model is written over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Vartype {
    /// Variables take values in `{0, 1}`
    #[default]
    Binary,
    /// Variables take values in `{-1, +1}`
    Spin,
}

impl Vartype {
    /// The value a variable takes in this domain when its boolean variable is true
    #[inline]
    pub fn true_value(self) -> i8 {
        1
    }

    /// The value a variable takes in this domain when its boolean variable is false
    #[inline]
    pub fn false_value(self) -> i8 {
        match self {
            Vartype::Binary => 0,
            Vartype::Spin => -1,
        }
    }

    /// Maps a boolean value to the domain
    ///
    /// # Examples
    ///
    /// ```
    /// use qubosat::types::Vartype;
    ///
    /// assert_eq!(Vartype::Binary.from_bool(false), 0);
    /// assert_eq!(Vartype::Spin.from_bool(false), -1);
    /// assert_eq!(Vartype::Spin.from_bool(true), 1);
    /// ```
    #[inline]
    pub fn from_bool(self, val: bool) -> i8 {
        if val {
            self.true_value()
        } else {
            self.false_value()
        }
    }

    /// Checks whether a value belongs to the domain
    #[inline]
    pub fn contains(self, val: i8) -> bool {
        val == self.true_value() || val == self.false_value()
    }

    /// Converts a value of this domain into the corresponding value of `target`
    #[inline]
    pub fn convert(self, val: i8, target: Vartype) -> i8 {
        target.from_bool(val == self.true_value())
    }
}

impl fmt::Display for Vartype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vartype::Binary => write!(f, "binary"),
            Vartype::Spin => write!(f, "spin"),
        }
    }
}

/// Type representing boolean variables of an encoded instance. Variable
/// indexing starts from 0 and the maximum index is `(u32::MAX - 1) / 2`,
/// since literals are represented as a single `u32` as well. In DIMACS files,
/// variable `idx` is written as `idx + 1`.
#[derive(Hash, Eq, PartialEq, PartialOrd, Clone, Copy, Ord, Debug)]
#[repr(transparent)]
pub struct Var {
    idx: u32,
}

impl Var {
    /// The maximum index that can be represented.
    pub const MAX_IDX: u32 = (u32::MAX - 1) / 2;

    /// Creates a new variables with a given index.
    /// Indices start from 0.
    /// Panics if `idx > Var::MAX_IDX`.
    pub fn new(idx: u32) -> Var {
        if idx > Var::MAX_IDX {
            panic!("variable index too high")
        }
        Var { idx }
    }

    /// Creates a new variables with a given index.
    /// Returns `Err(TypeError::IdxTooHigh(idx, Var::MAX_IDX)` if
    /// `idx > Var::MAX_IDX`.
    pub fn new_with_error(idx: u32) -> Result<Var, TypeError> {
        if idx > Var::MAX_IDX {
            return Err(TypeError::IdxTooHigh(idx, Var::MAX_IDX));
        }
        Ok(Var { idx })
    }

    /// Creates a literal that is not negated.
    ///
    /// # Examples
    ///
    /// ```
    /// use qubosat::types::{Var, Lit};
    ///
    /// let var = Var::new(5);
    /// let lit = Lit::positive(5);
    ///
    /// assert_eq!(lit, var.pos_lit());
    /// ```
    #[inline]
    pub fn pos_lit(self) -> Lit {
        Lit::new_unchecked(self.idx, false)
    }

    /// Creates a negated literal.
    #[inline]
    pub fn neg_lit(self) -> Lit {
        Lit::new_unchecked(self.idx, true)
    }

    /// Creates the literal of this variable that is true iff the variable is assigned `val`
    #[inline]
    pub fn lit(self, val: bool) -> Lit {
        Lit::new_unchecked(self.idx, !val)
    }

    /// Returns the index of the variable. This is a `usize` to enable easier
    /// indexing of data structures like vectors, even though the internal
    /// representation of a variable is `u32`. For the 32 bit index use
    /// [`Var::idx32`].
    #[inline]
    pub fn idx(&self) -> usize {
        self.idx as usize
    }

    /// Returns the 32 bit index of the variable.
    #[inline]
    pub fn idx32(&self) -> u32 {
        self.idx
    }

    /// Converts the variable to its 1-based DIMACS integer
    pub fn to_dimacs(self) -> u64 {
        u64::from(self.idx) + 1
    }
}

/// Variables can be printed with the [`Display`](std::fmt::Display) trait
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.idx)
    }
}

/// More easily creates variables. Mainly used in tests.
///
/// # Examples
///
/// ```
/// use qubosat::{var, types::Var};
///
/// assert_eq!(var![42], Var::new(42));
/// ```
#[macro_export]
macro_rules! var {
    ($v:expr) => {
        $crate::types::Var::new($v)
    };
}

/// Type representing literals, possibly negated boolean variables.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
#[repr(transparent)]
pub struct Lit {
    /// Literal representation is `idx << 1` with the last bit representing
    /// whether the literal is negated or not. This way the two literals of a
    /// variable sort next to each other.
    lidx: u32,
}

impl Lit {
    /// Represents a literal in memory
    #[inline]
    fn represent(idx: u32, negated: bool) -> u32 {
        (idx << 1) + u32::from(negated)
    }

    /// Creates a new (negated or not) literal with a given index.
    /// Panics if `idx > Var::MAX_IDX`.
    pub fn new(idx: u32, negated: bool) -> Lit {
        if idx > Var::MAX_IDX {
            panic!("variable index too high")
        }
        Lit {
            lidx: Lit::represent(idx, negated),
        }
    }

    /// Creates a new (negated or not) literal with a given index.
    /// Returns `Err(TypeError::IdxTooHigh(idx, Var::MAX_IDX)` if
    /// `idx > Var::MAX_IDX`.
    pub fn new_with_error(idx: u32, negated: bool) -> Result<Lit, TypeError> {
        if idx > Var::MAX_IDX {
            return Err(TypeError::IdxTooHigh(idx, Var::MAX_IDX));
        }
        Ok(Lit {
            lidx: Lit::represent(idx, negated),
        })
    }

    #[inline]
    fn new_unchecked(idx: u32, negated: bool) -> Lit {
        Lit {
            lidx: Lit::represent(idx, negated),
        }
    }

    /// Creates a new positive literal with a given index.
    /// Panics if `idx > Var::MAX_IDX`.
    #[inline]
    pub fn positive(idx: u32) -> Lit {
        Lit::new(idx, false)
    }

    /// Creates a new negated literal with a given index.
    /// Panics if `idx > Var::MAX_IDX`.
    #[inline]
    pub fn negative(idx: u32) -> Lit {
        Lit::new(idx, true)
    }

    /// Creates a literal from a signed DIMACS integer. Returns an error if
    /// the value is zero or the index too high.
    ///
    /// # Examples
    ///
    /// ```
    /// use qubosat::types::Lit;
    ///
    /// assert_eq!(Lit::from_dimacs(3).unwrap(), Lit::positive(2));
    /// assert_eq!(Lit::from_dimacs(-1).unwrap(), Lit::negative(0));
    /// assert!(Lit::from_dimacs(0).is_err());
    /// ```
    pub fn from_dimacs(val: i64) -> Result<Lit, TypeError> {
        if val == 0 {
            return Err(TypeError::DimacsZero);
        }
        let negated = val < 0;
        let idx = u32::try_from(val.unsigned_abs() - 1)
            .map_err(|_| TypeError::IdxTooHigh(u32::MAX, Var::MAX_IDX))?;
        Lit::new_with_error(idx, negated)
    }

    /// Gets the variable index of the literal
    #[inline]
    pub fn vidx(&self) -> usize {
        (self.lidx >> 1) as usize
    }

    /// Gets the 32bit variable index of the literal
    #[inline]
    pub fn vidx32(&self) -> u32 {
        self.lidx >> 1
    }

    /// Gets the variables that the literal corresponds to.
    #[inline]
    pub fn var(&self) -> Var {
        Var {
            idx: self.vidx32(),
        }
    }

    /// True if the literal is positive.
    #[inline]
    pub fn is_pos(&self) -> bool {
        (self.lidx & 1u32) == 0
    }

    /// True if the literal is negated.
    #[inline]
    pub fn is_neg(&self) -> bool {
        (self.lidx & 1u32) == 1
    }

    /// Converts the literal to its signed DIMACS integer. The DIMACS
    /// literal will have idx+1 and be negative if the literal is negated.
    pub fn to_dimacs(self) -> i64 {
        let idx = self.var().to_dimacs() as i64;
        if self.is_neg() {
            -idx
        } else {
            idx
        }
    }
}

/// Trait implementation allowing for negating literals with the `!` operator.
impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            lidx: self.lidx ^ 1u32,
        }
    }
}

/// Trait implementation allowing for negating literals with the unary `-` operator.
impl ops::Neg for Lit {
    type Output = Lit;

    #[inline]
    fn neg(self) -> Lit {
        !self
    }
}

/// Literals can be printed with the [`Display`](std::fmt::Display) trait
impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.is_neg() {
            true => write!(f, "~x{}", self.vidx()),
            false => write!(f, "x{}", self.vidx()),
        }
    }
}

/// More easily creates literals. Mainly used in tests.
///
/// # Examples
///
/// ```
/// use qubosat::{lit, types::Lit};
///
/// assert_eq!(lit![42], Lit::positive(42));
/// assert_eq!(!lit![42], Lit::negative(42));
/// ```
#[macro_export]
macro_rules! lit {
    ($l:expr) => {
        $crate::types::Lit::positive($l)
    };
}

/// More easily creates literals with DIMACS indexing (starts from 1) and
/// negation (negative value is negation). Mainly used in tests.
///
/// # Examples
///
/// ```
/// use qubosat::{lit, dimacs_lit, types::Lit};
///
/// assert_eq!(dimacs_lit![42], lit![41]);
/// assert_eq!(dimacs_lit![-42], !lit![41]);
/// ```
#[macro_export]
macro_rules! dimacs_lit {
    ($l:expr) => {
        $crate::types::Lit::from_dimacs($l).unwrap()
    };
}

/// Ternary value assigned to a literal or variable, including possible "don't care"
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TernaryVal {
    /// Positive assignment.
    True,
    /// Negative assignment.
    False,
    /// The solver did not report a value for the variable.
    DontCare,
}

impl TernaryVal {
    /// Converts a [`TernaryVal`] to a bool with a default value for "don't cares"
    pub fn to_bool_with_def(self, def: bool) -> bool {
        match self {
            TernaryVal::True => true,
            TernaryVal::False => false,
            TernaryVal::DontCare => def,
        }
    }
}

impl fmt::Display for TernaryVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TernaryVal::True => write!(f, "1"),
            TernaryVal::False => write!(f, "0"),
            TernaryVal::DontCare => write!(f, "_"),
        }
    }
}

impl fmt::Debug for TernaryVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bool> for TernaryVal {
    fn from(value: bool) -> Self {
        if value {
            return TernaryVal::True;
        }
        TernaryVal::False
    }
}

/// Type representing an assignment of variables, as returned by a MaxSAT solver.
#[derive(Clone, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Assignment {
    assignment: Vec<TernaryVal>,
}

impl Assignment {
    /// Get the value that the solution assigns to a variable.
    /// If the variable is not included in the solution, will return `TernaryVal::DontCare`.
    pub fn var_value(&self, var: Var) -> TernaryVal {
        if var.idx() >= self.assignment.len() {
            TernaryVal::DontCare
        } else {
            self.assignment[var.idx()]
        }
    }

    /// Same as [`Assignment::var_value`], but for literals.
    pub fn lit_value(&self, lit: Lit) -> TernaryVal {
        if lit.is_neg() {
            match self.var_value(lit.var()) {
                TernaryVal::DontCare => TernaryVal::DontCare,
                TernaryVal::True => TernaryVal::False,
                TernaryVal::False => TernaryVal::True,
            }
        } else {
            self.var_value(lit.var())
        }
    }

    /// Assigns a variable in the assignment
    pub fn assign_var(&mut self, var: Var, val: TernaryVal) {
        if self.assignment.len() < var.idx() + 1 {
            self.assignment.resize(var.idx() + 1, TernaryVal::DontCare);
        }
        self.assignment[var.idx()] = val;
    }

    /// Assigns a literal to true
    pub fn assign_lit(&mut self, lit: Lit) {
        self.assign_var(lit.var(), TernaryVal::from(lit.is_pos()))
    }

    /// Get the maximum variable in the assignment
    pub fn max_var(&self) -> Option<Var> {
        if self.assignment.is_empty() {
            None
        } else {
            Some(var![self.assignment.len() as u32 - 1])
        }
    }

    /// The number of variables covered by the assignment
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    /// Checks whether the assignment covers no variable
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Parses and saves the literals of a value line of a solver output
    ///
    /// Value lines either list signed DIMACS literals, optionally terminated
    /// by `0`, or give a single string of `0`/`1` characters, one per
    /// variable, as in the MaxSAT evaluation output format since 2020.
    ///
    /// A bit string is only recognized as the first value line of an empty
    /// assignment. A literal line consisting of a single multi-digit token
    /// of zeros and ones, e.g., `v 10`, is therefore read as a bit string
    /// there. Such a line must be terminated by `0` to be read as literals.
    pub fn extend_from_vline(&mut self, line: &str) -> Result<(), InvalidVLine> {
        let line = line
            .strip_prefix('v')
            .ok_or_else(|| InvalidVLine::InvalidTag(line.chars().next().unwrap_or(' ')))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(InvalidVLine::EmptyLine);
        }
        if self.assignment.is_empty()
            && tokens.len() == 1
            && tokens[0].len() > 1
            && tokens[0].bytes().all(|b| b == b'0' || b == b'1')
        {
            // bit-string format
            for (idx, b) in tokens[0].bytes().enumerate() {
                let var = Var::new_with_error(idx as u32)?;
                self.assign_var(var, TernaryVal::from(b == b'1'));
            }
            return Ok(());
        }
        for token in tokens {
            let val: i64 = token
                .parse()
                .map_err(|_| InvalidVLine::InvalidLiteral(token.to_string()))?;
            if val == 0 {
                break;
            }
            let lit = Lit::from_dimacs(val)?;
            let tv = TernaryVal::from(lit.is_pos());
            match self.var_value(lit.var()) {
                TernaryVal::DontCare => self.assign_var(lit.var(), tv),
                old if old == tv => (),
                _ => return Err(InvalidVLine::ConflictingAssignment(lit.var())),
            }
        }
        Ok(())
    }

    /// Creates an assignment from a solver value line
    pub fn from_vline(line: &str) -> Result<Self, InvalidVLine> {
        let mut assignment = Assignment::default();
        assignment.extend_from_vline(line)?;
        Ok(assignment)
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.assignment
            .iter()
            .try_for_each(|tv| write!(f, "{}", tv))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromIterator<Lit> for Assignment {
    fn from_iter<T: IntoIterator<Item = Lit>>(iter: T) -> Self {
        let mut assignment = Assignment::default();
        iter.into_iter().for_each(|l| assignment.assign_lit(l));
        assignment
    }
}

impl From<Vec<TernaryVal>> for Assignment {
    fn from(assignment: Vec<TernaryVal>) -> Self {
        Self { assignment }
    }
}

/// Errors related to types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TypeError {
    /// The requested index is too high.
    /// Contains the requested and the maximum index.
    #[error("index {0} is too high (maximum {1})")]
    IdxTooHigh(u32, u32),
    /// DIMACS literal is zero
    #[error("zero is an invalid DIMACS literal")]
    DimacsZero,
}

/// Errors in a solver value line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidVLine {
    /// The line does not start with `v`
    #[error("the value line does not start with 'v' but '{0}'")]
    InvalidTag(char),
    /// A token is not an integer
    #[error("invalid literal in value line: {0}")]
    InvalidLiteral(String),
    /// The same variable is given both polarities
    #[error("the solver assigned variable {0} different values")]
    ConflictingAssignment(Var),
    /// The line holds no values
    #[error("empty value line")]
    EmptyLine,
    /// A literal does not form a valid variable
    #[error(transparent)]
    Type(#[from] TypeError),
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use super::{Assignment, InvalidVLine, Lit, TernaryVal, Var, Vartype};

    #[test]
    fn var_index() {
        let idx = 5;
        let var = Var::new(idx);
        assert_eq!(var.idx(), idx as usize);
        assert_eq!(var.idx32(), idx);
        assert_eq!(var.to_dimacs(), 6);
    }

    #[test]
    fn var_lits() {
        let var = Var::new(5);
        assert_eq!(var.pos_lit(), Lit::positive(5));
        assert_eq!(var.neg_lit(), Lit::negative(5));
        assert_eq!(var.lit(true), var.pos_lit());
        assert_eq!(var.lit(false), var.neg_lit());
        assert_eq!(Lit::negative(5).var(), var);
    }

    #[test]
    fn lit_representation() {
        let lidx = Lit::represent(5, true);
        assert_eq!(lidx, 0b1011);
    }

    #[test]
    fn lit_negation() {
        let lit1 = Lit::positive(0);
        let lit2 = !lit1;
        assert!(lit2.is_neg());
        assert_eq!(lit1.var(), lit2.var());
        assert_eq!(-lit2, lit1);
    }

    #[test]
    fn dimacs_lit_idx_plus_one() {
        let lit = Lit::positive(5);
        assert_eq!(lit.to_dimacs(), 6);
        assert_eq!((!lit).to_dimacs(), -6);
        assert_eq!(Lit::from_dimacs(-6).unwrap(), !lit);
    }

    #[test]
    fn vartype_values() {
        assert_eq!(Vartype::Binary.from_bool(true), 1);
        assert_eq!(Vartype::Binary.from_bool(false), 0);
        assert_eq!(Vartype::Spin.from_bool(true), 1);
        assert_eq!(Vartype::Spin.from_bool(false), -1);
        assert!(Vartype::Spin.contains(-1));
        assert!(!Vartype::Binary.contains(-1));
        assert_eq!(Vartype::Spin.convert(-1, Vartype::Binary), 0);
        assert_eq!(Vartype::Binary.convert(1, Vartype::Spin), 1);
    }

    #[test]
    fn sol_lit_val() {
        let sol = Assignment::from(vec![
            TernaryVal::True,
            TernaryVal::False,
            TernaryVal::DontCare,
        ]);
        assert_eq!(sol.lit_value(Lit::negative(0)), TernaryVal::False);
        assert_eq!(sol.lit_value(Lit::positive(0)), TernaryVal::True);
        assert_eq!(sol.lit_value(Lit::negative(1)), TernaryVal::True);
        assert_eq!(sol.lit_value(Lit::positive(2)), TernaryVal::DontCare);
        assert_eq!(sol.lit_value(Lit::positive(7)), TernaryVal::DontCare);
    }

    #[test]
    fn vline_literals() {
        let sol = Assignment::from_vline("v 1 -2 4 0").unwrap();
        assert_eq!(
            sol,
            Assignment::from(vec![
                TernaryVal::True,
                TernaryVal::False,
                TernaryVal::DontCare,
                TernaryVal::True,
            ])
        );
    }

    #[test]
    fn vline_bitstring() {
        let sol = Assignment::from_vline("v 0110").unwrap();
        assert_eq!(
            sol,
            Assignment::from(vec![
                TernaryVal::False,
                TernaryVal::True,
                TernaryVal::True,
                TernaryVal::False,
            ])
        );
    }

    #[test]
    fn vline_bitstring_only_first() {
        let mut sol = Assignment::from_vline("v 1 -2").unwrap();
        sol.extend_from_vline("v 10").unwrap();
        assert_eq!(sol.len(), 10);
        assert_eq!(sol.var_value(Var::new(9)), TernaryVal::True);
        assert_eq!(sol.var_value(Var::new(2)), TernaryVal::DontCare);

        let sol = Assignment::from_vline("v 10").unwrap();
        assert_eq!(
            sol,
            Assignment::from(vec![TernaryVal::True, TernaryVal::False])
        );

        let sol = Assignment::from_vline("v 10 0").unwrap();
        assert_eq!(sol.len(), 10);
        assert_eq!(sol.var_value(Var::new(9)), TernaryVal::True);
    }

    #[test]
    fn vline_errors() {
        assert_eq!(Assignment::from_vline("v "), Err(InvalidVLine::EmptyLine));
        assert_eq!(
            Assignment::from_vline("v 1 -1 0"),
            Err(InvalidVLine::ConflictingAssignment(Var::new(0)))
        );
        assert_eq!(
            Assignment::from_vline("v 1 x 0"),
            Err(InvalidVLine::InvalidLiteral(String::from("x")))
        );
    }

    #[test]
    fn sol_from_lits() {
        let true_sol = Assignment::from(vec![
            TernaryVal::True,
            TernaryVal::DontCare,
            TernaryVal::False,
        ]);
        let sol = Assignment::from_iter(vec![lit![0], !lit![2]]);
        assert_eq!(true_sol, sol);
    }

    #[test]
    fn lit_mem_size() {
        assert_eq!(size_of::<Lit>(), size_of::<u32>());
        assert_eq!(size_of::<TernaryVal>(), 1);
    }
}
