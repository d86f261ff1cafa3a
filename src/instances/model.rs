//! # Quadratic Models
//!
//! QUBO and Ising objectives over the variable indices `0..n_vars`.

use std::collections::BTreeMap;

use crate::types::Vartype;

use super::ModelError;

/// A quadratic objective over binary or spin variables
///
/// The energy of a sample `v` is
/// `offset + sum_i linear[i] * v[i] + sum_{i<j} quadratic[i, j] * v[i] * v[j]`.
/// Quadratic terms are stored once per unordered variable pair, adding a term
/// for a pair that already exists increases its coefficient.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct QuadraticModel {
    vartype: Vartype,
    linear: Vec<f64>,
    /// Keys are ordered `(i, j)` with `i < j`
    quadratic: BTreeMap<(usize, usize), f64>,
    offset: f64,
}

fn check_finite(val: f64) -> Result<f64, ModelError> {
    if val.is_finite() {
        Ok(val)
    } else {
        Err(ModelError::NonFinite(val))
    }
}

impl QuadraticModel {
    /// Creates a model with `n_vars` variables and all coefficients zero
    pub fn new(n_vars: usize, vartype: Vartype) -> Self {
        QuadraticModel {
            vartype,
            linear: vec![0.; n_vars],
            quadratic: BTreeMap::new(),
            offset: 0.,
        }
    }

    /// Creates a binary model from QUBO coefficients keyed by variable pairs
    ///
    /// Diagonal entries `(i, i)` are linear coefficients. The number of
    /// variables is one more than the highest index appearing in `qubo`.
    ///
    /// # Examples
    ///
    /// ```
    /// use qubosat::instances::QuadraticModel;
    ///
    /// let model = QuadraticModel::from_qubo([((0, 0), -1.), ((0, 1), 2.), ((1, 0), 1.)]).unwrap();
    /// assert_eq!(model.n_vars(), 2);
    /// assert_eq!(model.linear(0), -1.);
    /// assert_eq!(model.quadratic(1, 0), 3.);
    /// ```
    pub fn from_qubo<Q>(qubo: Q) -> Result<Self, ModelError>
    where
        Q: IntoIterator<Item = ((usize, usize), f64)>,
    {
        let terms: Vec<_> = qubo.into_iter().collect();
        let n_vars = terms
            .iter()
            .map(|&((i, j), _)| std::cmp::max(i, j) + 1)
            .max()
            .unwrap_or(0);
        let mut model = QuadraticModel::new(n_vars, Vartype::Binary);
        for ((i, j), bias) in terms {
            if i == j {
                model.add_linear(i, bias)?;
            } else {
                model.add_quadratic(i, j, bias)?;
            }
        }
        Ok(model)
    }

    /// Creates a spin model from linear fields `h` and couplings `j`
    ///
    /// The number of variables is one more than the highest index appearing
    /// in either argument.
    pub fn from_ising<H, J>(h: H, j: J) -> Result<Self, ModelError>
    where
        H: IntoIterator<Item = (usize, f64)>,
        J: IntoIterator<Item = ((usize, usize), f64)>,
    {
        let h: Vec<_> = h.into_iter().collect();
        let j: Vec<_> = j.into_iter().collect();
        let n_vars = h
            .iter()
            .map(|&(i, _)| i + 1)
            .chain(j.iter().map(|&((a, b), _)| std::cmp::max(a, b) + 1))
            .max()
            .unwrap_or(0);
        let mut model = QuadraticModel::new(n_vars, Vartype::Spin);
        for (i, bias) in h {
            model.add_linear(i, bias)?;
        }
        for ((a, b), bias) in j {
            model.add_quadratic(a, b, bias)?;
        }
        Ok(model)
    }

    /// Gets the variable domain of the model
    pub fn vartype(&self) -> Vartype {
        self.vartype
    }

    /// Gets the number of variables
    pub fn n_vars(&self) -> usize {
        self.linear.len()
    }

    /// Gets the number of stored quadratic terms
    pub fn n_quadratic(&self) -> usize {
        self.quadratic.len()
    }

    /// Checks whether the model has no variables
    pub fn is_empty(&self) -> bool {
        self.linear.is_empty()
    }

    /// Gets the constant energy offset
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Sets the constant energy offset
    pub fn set_offset(&mut self, offset: f64) -> Result<(), ModelError> {
        self.offset = check_finite(offset)?;
        Ok(())
    }

    /// Appends a new variable and returns its index
    pub fn add_variable(&mut self) -> usize {
        self.linear.push(0.);
        self.linear.len() - 1
    }

    fn check_idx(&self, idx: usize) -> Result<(), ModelError> {
        if idx >= self.n_vars() {
            return Err(ModelError::IdxOutOfRange {
                idx,
                n_vars: self.n_vars(),
            });
        }
        Ok(())
    }

    /// Adds `bias` to the linear coefficient of variable `idx`
    pub fn add_linear(&mut self, idx: usize, bias: f64) -> Result<(), ModelError> {
        self.check_idx(idx)?;
        self.linear[idx] += check_finite(bias)?;
        Ok(())
    }

    /// Adds `bias` to the coefficient of the pair `{i, j}`
    pub fn add_quadratic(&mut self, i: usize, j: usize, bias: f64) -> Result<(), ModelError> {
        self.check_idx(i)?;
        self.check_idx(j)?;
        if i == j {
            return Err(ModelError::SelfLoop(i));
        }
        let bias = check_finite(bias)?;
        let key = if i < j { (i, j) } else { (j, i) };
        *self.quadratic.entry(key).or_insert(0.) += bias;
        Ok(())
    }

    /// Gets the linear coefficient of a variable
    ///
    /// # Panics
    ///
    /// If `idx` is out of range.
    pub fn linear(&self, idx: usize) -> f64 {
        self.linear[idx]
    }

    /// Gets the coefficient of the pair `{i, j}`, zero if no term exists
    pub fn quadratic(&self, i: usize, j: usize) -> f64 {
        let key = if i < j { (i, j) } else { (j, i) };
        self.quadratic.get(&key).copied().unwrap_or(0.)
    }

    /// Iterates over the linear coefficients in index order
    pub fn iter_linear(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.linear.iter().copied().enumerate()
    }

    /// Iterates over the quadratic terms, ordered by `(i, j)` with `i < j`
    pub fn iter_quadratic(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.quadratic.iter().map(|(&key, &bias)| (key, bias))
    }

    /// The largest absolute linear or quadratic coefficient, ignoring the offset
    pub fn max_abs_coefficient(&self) -> f64 {
        self.linear
            .iter()
            .chain(self.quadratic.values())
            .fold(0., |max: f64, c| max.max(c.abs()))
    }

    /// Evaluates the energy of a sample given in the model's domain
    pub fn energy(&self, sample: &[i8]) -> Result<f64, ModelError> {
        if sample.len() != self.n_vars() || !sample.iter().all(|&v| self.vartype.contains(v)) {
            return Err(ModelError::InvalidSample);
        }
        Ok(self.energy_unchecked(sample))
    }

    /// Evaluates the energy of a sample already known to match the model
    pub(crate) fn energy_unchecked(&self, sample: &[i8]) -> f64 {
        let lin: f64 = self
            .linear
            .iter()
            .zip(sample)
            .map(|(&bias, &v)| bias * f64::from(v))
            .sum();
        let quad: f64 = self
            .quadratic
            .iter()
            .map(|(&(i, j), &bias)| bias * f64::from(sample[i]) * f64::from(sample[j]))
            .sum();
        self.offset + lin + quad
    }

    /// Converts the model to an equivalent model over `target`
    ///
    /// Energies are preserved: a sample converted with
    /// [`Vartype::convert`] has the same energy in both models.
    pub fn to_vartype(&self, target: Vartype) -> QuadraticModel {
        match (self.vartype, target) {
            (Vartype::Binary, Vartype::Binary) | (Vartype::Spin, Vartype::Spin) => self.clone(),
            (Vartype::Binary, Vartype::Spin) => {
                // x = (s + 1) / 2
                let mut linear: Vec<f64> = self.linear.iter().map(|a| a / 2.).collect();
                let mut offset = self.offset + self.linear.iter().sum::<f64>() / 2.;
                let mut quadratic = BTreeMap::new();
                for (&(i, j), &b) in &self.quadratic {
                    linear[i] += b / 4.;
                    linear[j] += b / 4.;
                    offset += b / 4.;
                    quadratic.insert((i, j), b / 4.);
                }
                QuadraticModel {
                    vartype: Vartype::Spin,
                    linear,
                    quadratic,
                    offset,
                }
            }
            (Vartype::Spin, Vartype::Binary) => {
                // s = 2x - 1
                let mut linear: Vec<f64> = self.linear.iter().map(|h| 2. * h).collect();
                let mut offset = self.offset - self.linear.iter().sum::<f64>();
                let mut quadratic = BTreeMap::new();
                for (&(i, j), &coupling) in &self.quadratic {
                    linear[i] -= 2. * coupling;
                    linear[j] -= 2. * coupling;
                    offset += coupling;
                    quadratic.insert((i, j), 4. * coupling);
                }
                QuadraticModel {
                    vartype: Vartype::Binary,
                    linear,
                    quadratic,
                    offset,
                }
            }
        }
    }
}
