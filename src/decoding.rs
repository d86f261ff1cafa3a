//! # Decoding Solver Assignments
//!
//! Maps the boolean assignment returned by a MaxSAT solver back to values of
//! the model domain. A true variable is `1` in binary and `+1` in spin
//! models; false and unassigned variables are `0` and `-1` respectively.

use std::hash::Hash;

use thiserror::Error;

use crate::{
    instances::QuadraticModel,
    labels::LabelMap,
    types::{Assignment, TernaryVal, Var, Vartype},
};

/// A variable assignment of a quadratic model together with its energy
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// The domain of the values
    pub vartype: Vartype,
    /// One value per model variable
    pub values: Vec<i8>,
    /// The energy of the values, including the model offset
    pub energy: f64,
}

impl Sample {
    /// Maps the values to another domain, keeping the energy
    ///
    /// The energy stays valid for the model converted with
    /// [`QuadraticModel::to_vartype`].
    pub fn change_vartype(self, target: Vartype) -> Sample {
        let values = self
            .values
            .iter()
            .map(|&v| self.vartype.convert(v, target))
            .collect();
        Sample {
            vartype: target,
            values,
            energy: self.energy,
        }
    }
}

/// A sample whose values are keyed by caller labels
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledSample<L> {
    /// The domain of the values
    pub vartype: Vartype,
    /// Label and value per model variable, in index order
    pub values: Vec<(L, i8)>,
    /// The energy of the values, including the model offset
    pub energy: f64,
}

impl<L: PartialEq> LabeledSample<L> {
    /// Gets the value of a label
    pub fn value(&self, label: &L) -> Option<i8> {
        self.values
            .iter()
            .find_map(|(l, v)| if l == label { Some(*v) } else { None })
    }
}

/// Errors when decoding
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The label map does not cover exactly the model variables
    #[error("label map has {labels} labels but the model has {n_vars} variables")]
    LabelMismatch {
        /// Number of labels
        labels: usize,
        /// Number of model variables
        n_vars: usize,
    },
}

/// Decodes a solver assignment into a sample of the model
///
/// Assigned variables beyond the model are ignored. The energy is evaluated
/// on the original, unquantized model.
///
/// # Examples
///
/// ```
/// use qubosat::{
///     decoding::decode, instances::QuadraticModel, lit, types::{Assignment, Vartype},
/// };
///
/// let model = QuadraticModel::from_ising([(0, 1.), (1, -1.)], [((0, 1), 0.5)]).unwrap();
/// let assign = Assignment::from_iter([!lit![0], lit![1], lit![2]]);
/// let sample = decode(&assign, &model);
/// assert_eq!(sample.values, vec![-1, 1]);
/// assert_eq!(sample.energy, -2.5);
/// ```
pub fn decode(assign: &Assignment, model: &QuadraticModel) -> Sample {
    let vartype = model.vartype();
    let values: Vec<i8> = (0..model.n_vars())
        .map(|idx| {
            let val = u32::try_from(idx)
                .ok()
                .and_then(|idx| Var::new_with_error(idx).ok())
                .map_or(TernaryVal::DontCare, |var| assign.var_value(var))
                .to_bool_with_def(false);
            vartype.from_bool(val)
        })
        .collect();
    // one in-domain value per variable
    let energy = model.energy_unchecked(&values);
    Sample {
        vartype,
        values,
        energy,
    }
}

/// Decodes a solver assignment and keys the values by caller labels
///
/// # Errors
///
/// [`DecodeError::LabelMismatch`] if the label map size differs from the
/// number of model variables.
pub fn decode_labeled<L: Hash + Eq + Clone>(
    assign: &Assignment,
    model: &QuadraticModel,
    labels: &LabelMap<L>,
) -> Result<LabeledSample<L>, DecodeError> {
    if labels.len() != model.n_vars() {
        return Err(DecodeError::LabelMismatch {
            labels: labels.len(),
            n_vars: model.n_vars(),
        });
    }
    let sample = decode(assign, model);
    Ok(labels.relabel(sample))
}

#[cfg(test)]
mod tests {
    use super::{decode, decode_labeled, DecodeError, Sample};
    use crate::{
        instances::QuadraticModel,
        labels::LabelMap,
        lit,
        types::{Assignment, TernaryVal, Vartype},
    };

    #[test]
    fn decode_binary() {
        let mut model = QuadraticModel::new(3, Vartype::Binary);
        model.add_linear(0, -10.).unwrap();
        model.add_quadratic(1, 2, 2.).unwrap();
        let assign = Assignment::from_iter([lit![0], !lit![1], lit![2]]);
        let sample = decode(&assign, &model);
        assert_eq!(sample.vartype, Vartype::Binary);
        assert_eq!(sample.values, vec![1, 0, 1]);
        assert_eq!(sample.energy, -10.);
    }

    #[test]
    fn dont_care_is_false() {
        let model = QuadraticModel::new(3, Vartype::Spin);
        let assign = Assignment::from(vec![TernaryVal::True, TernaryVal::DontCare]);
        let sample = decode(&assign, &model);
        assert_eq!(sample.values, vec![1, -1, -1]);
        let sample = decode(&Assignment::default(), &model);
        assert_eq!(sample.values, vec![-1, -1, -1]);
    }

    #[test]
    fn energy_includes_offset() {
        let mut model = QuadraticModel::new(1, Vartype::Binary);
        model.add_linear(0, 2.).unwrap();
        model.set_offset(-0.5).unwrap();
        let sample = decode(&Assignment::from_iter([lit![0]]), &model);
        assert_eq!(sample.energy, 1.5);
    }

    #[test]
    fn change_vartype() {
        let sample = Sample {
            vartype: Vartype::Spin,
            values: vec![-1, 1, 1],
            energy: 3.,
        };
        let binary = sample.clone().change_vartype(Vartype::Binary);
        assert_eq!(binary.values, vec![0, 1, 1]);
        assert_eq!(binary.energy, 3.);
        assert_eq!(binary.change_vartype(Vartype::Spin), sample);
    }

    #[test]
    fn labeled() {
        let (model, labels) =
            crate::labels::from_qubo_labeled([(("a", "a"), -1.), (("a", "b"), 2.)]).unwrap();
        let assign = Assignment::from_iter([lit![0], !lit![1]]);
        let sample = decode_labeled(&assign, &model, &labels).unwrap();
        assert_eq!(sample.values, vec![("a", 1), ("b", 0)]);
        assert_eq!(sample.value(&"b"), Some(0));
        assert_eq!(sample.value(&"c"), None);
        assert_eq!(sample.energy, -1.);
    }

    #[test]
    fn label_mismatch() {
        let model = QuadraticModel::new(2, Vartype::Binary);
        let labels = LabelMap::from_labels(["x"]);
        assert_eq!(
            decode_labeled(&Assignment::default(), &model, &labels),
            Err(DecodeError::LabelMismatch {
                labels: 1,
                n_vars: 2
            })
        );
    }
}
