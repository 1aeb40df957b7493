//! Failing error patterns.

use crate::QsatError;
use crate::model::ErrorModel;
use crate::solver::Assignment;
use bitvec::prelude::*;

/// Set of active error mechanisms, bit `i` standing for mechanism `i`.
///
/// Stored in the same byte layout as Stim `.b8` records, so a witness can be
/// written out and read back without repacking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Witness {
    active: BitVec<u8, Lsb0>,
}

impl Witness {
    /// Restricts a satisfying assignment to the error variables.
    pub fn from_assignment(assignment: &Assignment, num_errors: usize) -> Self {
        let active = (0..num_errors)
            .map(|i| assignment.value(ErrorModel::error_var(i)))
            .collect();
        Self { active }
    }

    pub fn from_bits(active: BitVec<u8, Lsb0>) -> Self {
        Self { active }
    }

    /// Witness activating exactly the listed mechanisms.
    ///
    /// # Arguments
    ///
    /// * `num_errors` - Number of error mechanisms in the model.
    /// * `indices` - Active mechanisms. Repeats are harmless.
    ///
    /// # Returns
    ///
    /// `ErrorIndexOutOfRange` for the first index at or past `num_errors`.
    pub fn from_indices(num_errors: usize, indices: &[usize]) -> Result<Self, QsatError> {
        let mut active = bitvec![u8, Lsb0; 0; num_errors];
        for &index in indices {
            if index >= num_errors {
                return Err(QsatError::ErrorIndexOutOfRange { index, num_errors });
            }
            active.set(index, true);
        }
        Ok(Self { active })
    }

    pub fn as_bits(&self) -> &BitSlice<u8, Lsb0> {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active_errors(&self) -> Vec<usize> {
        self.active.iter_ones().collect()
    }

    pub fn weight(&self) -> usize {
        self.active.count_ones()
    }

    /// Detectors and observables flipped an odd number of times.
    pub fn syndrome(&self, model: &ErrorModel) -> Syndrome {
        let mut detectors = bitvec![u64, Lsb0; 0; model.num_detectors() as usize];
        let mut observables = bitvec![u64, Lsb0; 0; model.num_observables() as usize];
        for i in self.active.iter_ones() {
            let Some(mechanism) = model.mechanisms().get(i) else {
                continue;
            };
            for &d in &mechanism.detectors {
                let flipped = detectors[d as usize];
                detectors.set(d as usize, !flipped);
            }
            for &l in &mechanism.observables {
                let flipped = observables[l as usize];
                observables.set(l as usize, !flipped);
            }
        }
        Syndrome {
            flipped_detectors: detectors.iter_ones().map(|d| d as u32).collect(),
            flipped_observables: observables.iter_ones().map(|l| l as u32).collect(),
        }
    }

    /// Confirms that the witness is an undetected logical error of weight at
    /// most `max_errors`.
    pub fn verify(&self, model: &ErrorModel, max_errors: usize) -> Result<Syndrome, QsatError> {
        if self.active.len() != model.num_errors() {
            return Err(QsatError::WitnessRejected(format!(
                "witness covers {} errors but the model has {}",
                self.active.len(),
                model.num_errors()
            )));
        }
        let weight = self.weight();
        if weight > max_errors {
            return Err(QsatError::WitnessRejected(format!(
                "{weight} active errors exceed the budget of {max_errors}"
            )));
        }

        let syndrome = self.syndrome(model);
        if let Some(d) = syndrome.flipped_detectors.first() {
            return Err(QsatError::WitnessRejected(format!(
                "detector D{d} is flipped ({} detectors in total)",
                syndrome.flipped_detectors.len()
            )));
        }
        if syndrome.flipped_observables.is_empty() {
            return Err(QsatError::WitnessRejected(
                "no logical observable is flipped".into(),
            ));
        }
        Ok(syndrome)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Syndrome {
    pub flipped_detectors: Vec<u32>,
    pub flipped_observables: Vec<u32>,
}

impl Syndrome {
    pub fn is_undetected_logical(&self) -> bool {
        self.flipped_detectors.is_empty() && !self.flipped_observables.is_empty()
    }
}
