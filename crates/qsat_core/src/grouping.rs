//! Classification of error mechanisms by the x-coordinates they connect.
//!
//! A logical error in a surface-code memory experiment has to cross every
//! detector column between the two boundaries. Errors that flip one detector
//! (boundary errors) or two detectors in different columns (horizontal
//! errors) are bucketed by the sorted x-coordinates they touch. Errors between
//! two detectors of the same column are vertical and belong to no category.

use crate::constraint::VarId;
use crate::model::{Coord, ErrorModel};
use std::collections::{BTreeMap, HashMap};

/// Sorted x-coordinates touched by the errors of one category.
pub type CategoryKey = Vec<Coord>;

/// Error variables per category, keyed and iterated in sorted order.
pub type Categories = BTreeMap<CategoryKey, Vec<VarId>>;

/// Buckets the error mechanisms of `model` by x-coordinate category.
///
/// A mechanism qualifies when it flips exactly one detector with a known
/// x-coordinate, or exactly two detectors whose x-coordinates are known and
/// differ. Everything else, including hyperedge errors, is left out.
pub fn categorize(model: &ErrorModel) -> Categories {
    let mut x_of: HashMap<u32, Vec<Coord>> = HashMap::new();
    for (&x, detectors) in model.detector_groups() {
        for &d in detectors {
            x_of.entry(d).or_default().push(x);
        }
    }

    let mut categories = Categories::new();
    for (i, mechanism) in model.mechanisms().iter().enumerate() {
        if !matches!(mechanism.detectors.len(), 1 | 2) {
            continue;
        }

        let mut xs: Vec<Coord> = mechanism
            .detectors
            .iter()
            .filter_map(|d| x_of.get(d))
            .flatten()
            .copied()
            .collect();
        xs.sort();
        xs.dedup();

        let qualifies = match (mechanism.detectors.len(), xs.len()) {
            (1, 1) => true,
            (2, 2) => true,
            _ => false,
        };
        if qualifies {
            categories
                .entry(xs)
                .or_default()
                .push(ErrorModel::error_var(i));
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorMechanism;
    use std::collections::BTreeSet;

    fn columns(groups: &[(f64, &[u32])]) -> BTreeMap<Coord, BTreeSet<u32>> {
        groups
            .iter()
            .map(|&(x, ds)| (Coord(x), ds.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn boundary_and_horizontal_errors_are_categorized() {
        // columns: x=0 {D0, D2}, x=1 {D1, D3}
        let model = ErrorModel::new(
            4,
            1,
            vec![
                ErrorMechanism::new(vec![0], vec![0]),
                ErrorMechanism::new(vec![0, 1], vec![]),
                ErrorMechanism::new(vec![0, 2], vec![]),
                ErrorMechanism::new(vec![3], vec![]),
                ErrorMechanism::new(vec![2, 3], vec![]),
                ErrorMechanism::new(vec![0, 1, 3], vec![]),
                ErrorMechanism::new(vec![], vec![0]),
            ],
        )
        .unwrap()
        .with_detector_groups(columns(&[(0.0, &[0, 2]), (1.0, &[1, 3])]));

        let categories = categorize(&model);
        let keys: Vec<&CategoryKey> = categories.keys().collect();
        assert_eq!(
            keys,
            vec![
                &vec![Coord(0.0)],
                &vec![Coord(0.0), Coord(1.0)],
                &vec![Coord(1.0)],
            ]
        );
        assert_eq!(categories[&vec![Coord(0.0)]], vec![1]);
        assert_eq!(categories[&vec![Coord(0.0), Coord(1.0)]], vec![2, 5]);
        assert_eq!(categories[&vec![Coord(1.0)]], vec![4]);
    }

    #[test]
    fn detectors_without_coordinates_are_ignored() {
        let model = ErrorModel::new(
            3,
            0,
            vec![
                ErrorMechanism::new(vec![2], vec![]),
                ErrorMechanism::new(vec![0, 2], vec![]),
            ],
        )
        .unwrap()
        .with_detector_groups(columns(&[(4.0, &[0])]));

        assert!(categorize(&model).is_empty());
    }

    #[test]
    fn no_groups_means_no_categories() {
        let model = ErrorModel::new(1, 1, vec![ErrorMechanism::new(vec![0], vec![0])]).unwrap();
        assert!(categorize(&model).is_empty());
    }
}
