//! # Quadratic Objective Encoding
//!
//! Encodes a QUBO or Ising model as soft clauses. Model variable `i` is
//! boolean variable `i`, written as DIMACS variable `i + 1`. A true boolean
//! variable is binary value `1` and spin value `+1`.
//!
//! For a quantized coefficient `v`, the clauses are
//!
//! | Term | Domain | `v > 0` | `v < 0` |
//! | --- | --- | --- | --- |
//! | linear `i` | both | `(-i)` | `(i)` |
//! | quadratic `(i, j)` | binary | `(-i, -j)` | `(i, j)`, `(-i, j)`, `(i, -j)` |
//! | quadratic `(i, j)` | spin | `(i, j)`, `(-i, -j)` | `(i, -j)`, `(-i, j)` |
//!
//! each with weight `|v|`. All terms are collected in a [`ClauseAccumulator`]
//! first, which merges clauses on the same variables and cancels opposing
//! weights before anything is emitted.
//!
//! The violated weight `cost` of an assignment relates to the quantized
//! energy as `energy = k * cost + offset` with `k = 1` for binary and `k = 2`
//! for spin models. The offset is kept in the [`Encoding`].

use std::time::Instant;

use tracing::{debug, trace};

use crate::{
    instances::{QuadraticModel, WeightedClauseSet},
    types::{Lit, RsHashMap, Var, Vartype},
};

use super::{quantize, EncodeError, EncodeStats, Precision};

/// Polarity weights of the four clauses over a variable pair `(a, b)`, in the
/// order `(a, b)`, `(a, -b)`, `(-a, b)`, `(-a, -b)`
type PairWeights = [usize; 4];

fn pair_slot(a: Lit, b: Lit) -> usize {
    (usize::from(a.is_neg()) << 1) | usize::from(b.is_neg())
}

fn add_weight(acc: &mut usize, weight: usize) -> Result<(), EncodeError> {
    *acc = acc
        .checked_add(weight)
        .ok_or(EncodeError::WeightOverflow(*acc as f64 + weight as f64))?;
    Ok(())
}

/// Collects weighted unit and binary clauses and cancels redundant weight
///
/// Exactly one of the clauses `(x)` and `(-x)` is violated by any
/// assignment, the same holds for the four polarities of a binary clause
/// over the same variables. Subtracting the smallest weight of such a group
/// from all its members therefore changes the cost of every assignment by
/// the same constant. [`ClauseAccumulator::finish`] does this and reports the
/// removed constant.
#[derive(Debug, Default)]
pub struct ClauseAccumulator {
    n_vars: u32,
    /// `(weight of (x), weight of (-x))` per variable
    units: Vec<(Var, [usize; 2])>,
    unit_idx: RsHashMap<Var, usize>,
    pairs: Vec<((Var, Var), PairWeights)>,
    pair_idx: RsHashMap<(Var, Var), usize>,
}

impl ClauseAccumulator {
    /// Creates an accumulator whose clause set declares at least `n_vars` variables
    pub fn new(n_vars: u32) -> Self {
        ClauseAccumulator {
            n_vars,
            ..Default::default()
        }
    }

    /// Adds weight to the unit clause `(lit)`
    pub fn add_unit(&mut self, lit: Lit, weight: usize) -> Result<(), EncodeError> {
        if weight == 0 {
            return Ok(());
        }
        let var = lit.var();
        let idx = *self.unit_idx.entry(var).or_insert_with(|| {
            self.units.push((var, [0; 2]));
            self.units.len() - 1
        });
        add_weight(&mut self.units[idx].1[usize::from(lit.is_neg())], weight)
    }

    /// Adds weight to the binary clause `(a, b)`
    ///
    /// # Panics
    ///
    /// If both literals are over the same variable.
    pub fn add_pair(&mut self, a: Lit, b: Lit, weight: usize) -> Result<(), EncodeError> {
        assert_ne!(a.var(), b.var(), "binary clause over a single variable");
        if weight == 0 {
            return Ok(());
        }
        let (a, b) = if a.var() < b.var() { (a, b) } else { (b, a) };
        let key = (a.var(), b.var());
        let idx = *self.pair_idx.entry(key).or_insert_with(|| {
            self.pairs.push((key, [0; 4]));
            self.pairs.len() - 1
        });
        add_weight(&mut self.pairs[idx].1[pair_slot(a, b)], weight)
    }

    /// Cancels redundant weight and emits the remaining clauses
    ///
    /// Unit clauses come first, then binary clauses, each in the order their
    /// variables were first added. Returns the clause set and the constant
    /// weight that was removed from every assignment's cost.
    pub fn finish(self) -> (WeightedClauseSet, u128) {
        let mut clauses = WeightedClauseSet::new(self.n_vars);
        let mut removed: u128 = 0;
        for (var, [w_pos, w_neg]) in self.units {
            let min = std::cmp::min(w_pos, w_neg);
            removed += min as u128;
            if w_pos > w_neg {
                clauses.add_soft_clause(w_pos - min, vec![var.pos_lit()]);
            } else if w_neg > w_pos {
                clauses.add_soft_clause(w_neg - min, vec![var.neg_lit()]);
            } else {
                trace!("unit clauses on {var} cancel out");
            }
        }
        for ((a, b), weights) in self.pairs {
            let min = weights.iter().copied().min().unwrap_or(0);
            removed += min as u128;
            for (slot, &weight) in weights.iter().enumerate() {
                // slot bits encode the negation of a and b
                let lits = vec![a.lit(slot & 2 == 0), b.lit(slot & 1 == 0)];
                clauses.add_soft_clause(weight - min, lits);
            }
        }
        (clauses, removed)
    }
}

/// The soft clauses of an encoded quadratic model
///
/// Besides the clauses, an encoding keeps what is needed to map a clause cost
/// back to an energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    clauses: WeightedClauseSet,
    precision: f64,
    vartype: Vartype,
    offset: i64,
    model_offset: f64,
}

impl Encoding {
    /// Gets the clause set
    pub fn clauses(&self) -> &WeightedClauseSet {
        &self.clauses
    }

    /// Takes the clause set out of the encoding
    pub fn into_clauses(self) -> WeightedClauseSet {
        self.clauses
    }

    /// The precision the coefficients were quantized with
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// The domain of the encoded model
    pub fn vartype(&self) -> Vartype {
        self.vartype
    }

    /// The constant `offset` in `energy = k * cost + offset`, in quantized
    /// units and not including the model offset
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// The factor `k` in `energy = k * cost + offset`
    pub fn scale(&self) -> i64 {
        match self.vartype {
            Vartype::Binary => 1,
            Vartype::Spin => 2,
        }
    }

    /// The quantized energy, without the model offset, of an assignment with
    /// violated weight `cost`
    pub fn quantized_energy(&self, cost: u128) -> i128 {
        i128::from(self.scale()) * cost as i128 + i128::from(self.offset)
    }

    /// Approximates the model energy of an assignment with violated weight
    /// `cost`, including the model offset
    pub fn approx_energy(&self, cost: u128) -> f64 {
        self.quantized_energy(cost) as f64 * self.precision + self.model_offset
    }
}

impl EncodeStats for Encoding {
    fn n_clauses(&self) -> usize {
        self.clauses.n_clauses()
    }

    fn n_vars(&self) -> u32 {
        self.clauses.n_vars()
    }
}

/// Encodes a quadratic model as weighted soft clauses
///
/// Terms whose coefficient rounds to zero are dropped.
///
/// # Errors
///
/// - [`EncodeError::InvalidPrecision`] for a non-positive or non-finite precision
/// - [`EncodeError::WeightOverflow`] if a quantized weight does not fit or the
///   weights of all clauses sum to more than [`i64::MAX`]
/// - [`EncodeError::TooManyVariables`] if variable indices exceed [`Var::MAX_IDX`]
///
/// # Examples
///
/// ```
/// use qubosat::{
///     encodings::{encode, Precision},
///     instances::QuadraticModel,
///     types::Vartype,
/// };
///
/// let mut model = QuadraticModel::new(1, Vartype::Binary);
/// model.add_linear(0, -10.).unwrap();
/// let encoding = encode(&model, Precision::Fixed(1e-6)).unwrap();
///
/// let mut wcnf = vec![];
/// encoding.clauses().write_dimacs(&mut wcnf).unwrap();
/// assert_eq!(String::from_utf8(wcnf).unwrap(), "p wcnf 1 1\n10000000 1 0\n");
/// ```
pub fn encode(model: &QuadraticModel, precision: Precision) -> Result<Encoding, EncodeError> {
    let start = Instant::now();
    let precision = precision.resolve(model)?;
    let vartype = model.vartype();
    let n_vars = u32::try_from(model.n_vars())
        .ok()
        .filter(|&n| n == 0 || n - 1 <= Var::MAX_IDX)
        .ok_or(EncodeError::TooManyVariables(model.n_vars()))?;
    let mut acc = ClauseAccumulator::new(n_vars);
    let mut offset: i128 = 0;

    // the checks above guarantee that all indices are valid variables
    let var = |idx: usize| Var::new(idx as u32);
    let weight = |v: i64| {
        usize::try_from(v.unsigned_abs()).map_err(|_| EncodeError::WeightOverflow(v as f64))
    };

    for (idx, coeff) in model.iter_linear() {
        let v = quantize(coeff, precision)?;
        if v == 0 {
            continue;
        }
        // the clause is violated in the state the coefficient penalizes
        acc.add_unit(var(idx).lit(v < 0), weight(v)?)?;
        offset += match vartype {
            Vartype::Binary => i128::from(v.min(0)),
            Vartype::Spin => -i128::from(v.unsigned_abs()),
        };
    }

    for ((i, j), coeff) in model.iter_quadratic() {
        let v = quantize(coeff, precision)?;
        if v == 0 {
            continue;
        }
        let w = weight(v)?;
        let (vi, vj) = (var(i), var(j));
        match (vartype, v > 0) {
            (Vartype::Binary, true) => acc.add_pair(vi.neg_lit(), vj.neg_lit(), w)?,
            (Vartype::Binary, false) => {
                acc.add_pair(vi.pos_lit(), vj.pos_lit(), w)?;
                acc.add_pair(vi.neg_lit(), vj.pos_lit(), w)?;
                acc.add_pair(vi.pos_lit(), vj.neg_lit(), w)?;
                offset += i128::from(v);
            }
            (Vartype::Spin, true) => {
                acc.add_pair(vi.pos_lit(), vj.pos_lit(), w)?;
                acc.add_pair(vi.neg_lit(), vj.neg_lit(), w)?;
                offset -= i128::from(v);
            }
            (Vartype::Spin, false) => {
                acc.add_pair(vi.pos_lit(), vj.neg_lit(), w)?;
                acc.add_pair(vi.neg_lit(), vj.pos_lit(), w)?;
                offset += i128::from(v);
            }
        }
    }

    let (clauses, removed) = acc.finish();
    let total = clauses.weight_sum();
    if total > i64::MAX as u128 {
        return Err(EncodeError::WeightOverflow(total as f64));
    }
    let scale: i128 = match vartype {
        Vartype::Binary => 1,
        Vartype::Spin => 2,
    };
    let offset = offset + scale * removed as i128;
    let offset = i64::try_from(offset).map_err(|_| EncodeError::WeightOverflow(offset as f64))?;

    debug!(
        "encoded {} model with {} variables into {} clauses (precision {}, cancelled weight {}) in {:?}",
        vartype,
        clauses.n_vars(),
        clauses.n_clauses(),
        precision,
        removed,
        start.elapsed()
    );

    Ok(Encoding {
        clauses,
        precision,
        vartype,
        offset,
        model_offset: model.offset(),
    })
}
