//! # Variable Labels
//!
//! Models are built over the dense indices `0..n_vars`. A [`LabelMap`] maps
//! arbitrary caller labels to these indices and back.

use std::hash::Hash;

use crate::{
    decoding::{LabeledSample, Sample},
    instances::{ModelError, QuadraticModel},
    types::RsHashMap,
};

/// A bijection between labels and the indices `0..len`
///
/// Indices are handed out in the order labels first appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap<L: Hash + Eq + Clone> {
    labels: Vec<L>,
    indices: RsHashMap<L, usize>,
}

impl<L: Hash + Eq + Clone> Default for LabelMap<L> {
    fn default() -> Self {
        LabelMap {
            labels: vec![],
            indices: RsHashMap::default(),
        }
    }
}

impl<L: Hash + Eq + Clone> LabelMap<L> {
    /// Creates a map from labels, duplicates map to their first index
    pub fn from_labels<I: IntoIterator<Item = L>>(labels: I) -> Self {
        let mut map = LabelMap::default();
        labels.into_iter().for_each(|l| {
            map.insert(l);
        });
        map
    }

    /// Gets the index of a label, assigning the next free index to new labels
    pub fn insert(&mut self, label: L) -> usize {
        if let Some(&idx) = self.indices.get(&label) {
            return idx;
        }
        let idx = self.labels.len();
        self.indices.insert(label.clone(), idx);
        self.labels.push(label);
        idx
    }

    /// Gets the index of a label
    pub fn index(&self, label: &L) -> Option<usize> {
        self.indices.get(label).copied()
    }

    /// Gets the label of an index
    pub fn label(&self, idx: usize) -> Option<&L> {
        self.labels.get(idx)
    }

    /// The number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Checks whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over the labels in index order
    pub fn iter(&self) -> std::slice::Iter<'_, L> {
        self.labels.iter()
    }

    /// Keys the values of a sample by label
    ///
    /// # Panics
    ///
    /// If the sample has more values than there are labels.
    pub fn relabel(&self, sample: Sample) -> LabeledSample<L> {
        assert!(
            sample.values.len() <= self.len(),
            "sample has more values than there are labels"
        );
        LabeledSample {
            vartype: sample.vartype,
            values: self.labels.iter().cloned().zip(sample.values).collect(),
            energy: sample.energy,
        }
    }
}

/// Builds a binary model from labeled QUBO coefficients
///
/// Entries with two equal labels are linear coefficients.
///
/// # Examples
///
/// ```
/// use qubosat::labels::from_qubo_labeled;
///
/// let (model, labels) =
///     from_qubo_labeled([(("x", "y"), 2.), (("y", "y"), -1.), (("z", "z"), 1.)]).unwrap();
/// assert_eq!(model.n_vars(), 3);
/// assert_eq!(labels.index(&"y"), Some(1));
/// assert_eq!(model.linear(1), -1.);
/// ```
pub fn from_qubo_labeled<L, Q>(qubo: Q) -> Result<(QuadraticModel, LabelMap<L>), ModelError>
where
    L: Hash + Eq + Clone,
    Q: IntoIterator<Item = ((L, L), f64)>,
{
    let mut labels = LabelMap::default();
    let terms: Vec<_> = qubo
        .into_iter()
        .map(|((a, b), bias)| ((labels.insert(a), labels.insert(b)), bias))
        .collect();
    let mut model = QuadraticModel::from_qubo(terms)?;
    // labels without any term still get a variable
    while model.n_vars() < labels.len() {
        model.add_variable();
    }
    Ok((model, labels))
}

/// Builds a spin model from labeled fields `h` and couplings `j`
pub fn from_ising_labeled<L, H, J>(h: H, j: J) -> Result<(QuadraticModel, LabelMap<L>), ModelError>
where
    L: Hash + Eq + Clone,
    H: IntoIterator<Item = (L, f64)>,
    J: IntoIterator<Item = ((L, L), f64)>,
{
    let mut labels = LabelMap::default();
    let h: Vec<_> = h
        .into_iter()
        .map(|(l, bias)| (labels.insert(l), bias))
        .collect();
    let j: Vec<_> = j
        .into_iter()
        .map(|((a, b), bias)| ((labels.insert(a), labels.insert(b)), bias))
        .collect();
    let mut model = QuadraticModel::from_ising(h, j)?;
    while model.n_vars() < labels.len() {
        model.add_variable();
    }
    Ok((model, labels))
}
