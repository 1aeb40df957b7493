//! Detector error model representation.
//!
//! An error model lists independent error mechanisms together with the
//! detectors and logical observables each one flips. Mechanism `i` maps to
//! Boolean variable `i + 1` in every encoding. The model is validated once
//! on construction and never mutated afterwards.

use crate::QsatError;
use crate::constraint::VarId;
use core::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// A single elementary fault and the parity checks it flips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorMechanism {
    /// Detector indices flipped by this error.
    pub detectors: Vec<u32>,

    /// Logical observable indices flipped by this error.
    pub observables: Vec<u32>,

    /// Occurrence probability, when the source model provides one.
    ///
    /// Carried for reporting only. The satisfiability encoding treats every
    /// mechanism as equally likely.
    pub probability: Option<f64>,
}

impl ErrorMechanism {
    pub fn new(detectors: Vec<u32>, observables: Vec<u32>) -> Self {
        Self {
            detectors,
            observables,
            probability: None,
        }
    }

    pub fn with_probability(mut self, p: f64) -> Self {
        self.probability = Some(p);
        self
    }
}

/// Spatial coordinate usable as an ordered map key.
///
/// Ordering and equality follow `f64::total_cmp`, so `-0.0` and `0.0` are
/// distinct keys and NaN sorts after every finite value.
#[derive(Clone, Copy, Debug)]
pub struct Coord(pub f64);

impl PartialEq for Coord {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Coord {}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Validated detector error model.
#[derive(Clone, Debug, Default)]
pub struct ErrorModel {
    num_detectors: u32,
    num_observables: u32,
    mechanisms: Vec<ErrorMechanism>,
    detector_groups: BTreeMap<Coord, BTreeSet<u32>>,
}

impl ErrorModel {
    /// Builds a model and checks every referenced index against the declared
    /// counts.
    ///
    /// # Errors
    ///
    /// `DetectorOutOfRange` / `ObservableOutOfRange` when an effect list
    /// references an undeclared index, `DuplicateTarget` when an effect list
    /// repeats an index.
    pub fn new(
        num_detectors: u32,
        num_observables: u32,
        mechanisms: Vec<ErrorMechanism>,
    ) -> Result<Self, QsatError> {
        for (error, mechanism) in mechanisms.iter().enumerate() {
            let mut seen = BTreeSet::new();
            for &detector in &mechanism.detectors {
                if detector >= num_detectors {
                    return Err(QsatError::DetectorOutOfRange {
                        error,
                        detector,
                        num_detectors,
                    });
                }
                if !seen.insert(detector) {
                    return Err(QsatError::DuplicateTarget {
                        error,
                        target: format!("D{detector}"),
                    });
                }
            }

            seen.clear();
            for &observable in &mechanism.observables {
                if observable >= num_observables {
                    return Err(QsatError::ObservableOutOfRange {
                        error,
                        observable,
                        num_observables,
                    });
                }
                if !seen.insert(observable) {
                    return Err(QsatError::DuplicateTarget {
                        error,
                        target: format!("L{observable}"),
                    });
                }
            }
        }

        Ok(Self {
            num_detectors,
            num_observables,
            mechanisms,
            detector_groups: BTreeMap::new(),
        })
    }

    /// Attaches the x-coordinate grouping of detectors.
    ///
    /// Groups only feed the optional connectivity constraints. Detector ids
    /// that no error references simply never match a category.
    pub fn with_detector_groups(mut self, groups: BTreeMap<Coord, BTreeSet<u32>>) -> Self {
        self.detector_groups = groups;
        self
    }

    pub fn num_errors(&self) -> usize {
        self.mechanisms.len()
    }

    pub fn num_detectors(&self) -> u32 {
        self.num_detectors
    }

    pub fn num_observables(&self) -> u32 {
        self.num_observables
    }

    pub fn mechanisms(&self) -> &[ErrorMechanism] {
        &self.mechanisms
    }

    pub fn detector_groups(&self) -> &BTreeMap<Coord, BTreeSet<u32>> {
        &self.detector_groups
    }

    /// Decision variable of error mechanism `index`.
    #[inline]
    pub fn error_var(index: usize) -> VarId {
        index as VarId + 1
    }

    /// Error variables flipping each detector, in detector then error order.
    pub fn detector_effects(&self) -> Vec<Vec<VarId>> {
        let mut effects = vec![Vec::new(); self.num_detectors as usize];
        for (i, mechanism) in self.mechanisms.iter().enumerate() {
            for &d in &mechanism.detectors {
                effects[d as usize].push(Self::error_var(i));
            }
        }
        effects
    }

    /// Error variables flipping each observable, in observable then error order.
    pub fn observable_effects(&self) -> Vec<Vec<VarId>> {
        let mut effects = vec![Vec::new(); self.num_observables as usize];
        for (i, mechanism) in self.mechanisms.iter().enumerate() {
            for &l in &mechanism.observables {
                effects[l as usize].push(Self::error_var(i));
            }
        }
        effects
    }
}
