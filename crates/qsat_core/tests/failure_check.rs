use proptest::prelude::*;
use qsat_core::{
    CardinalityMethod, Coord, EncodingConfig, ErrorMechanism, ErrorModel, Outcome, QsatError,
    VarisatBackend, Witness, XorEncoding, check_budget, minimum_weight,
};
use std::collections::{BTreeMap, BTreeSet};

fn two_error_model() -> ErrorModel {
    ErrorModel::new(
        1,
        1,
        vec![
            ErrorMechanism::new(vec![0], vec![0]),
            ErrorMechanism::new(vec![0], vec![]),
        ],
    )
    .unwrap()
}

/// Phenomenological repetition code: `d` data qubits, `rounds` rounds, one
/// logical observable on the left boundary.
fn repetition_code(d: u32, rounds: u32) -> ErrorModel {
    let per_round = d - 1;
    let det = |i: u32, t: u32| t * per_round + i;
    let mut mechanisms = Vec::new();
    for t in 0..rounds {
        for q in 0..d {
            let mut dets = Vec::new();
            if q > 0 {
                dets.push(det(q - 1, t));
            }
            if q < d - 1 {
                dets.push(det(q, t));
            }
            let obs = if q == 0 { vec![0] } else { vec![] };
            mechanisms.push(ErrorMechanism::new(dets, obs));
        }
        if t + 1 < rounds {
            for i in 0..per_round {
                mechanisms.push(ErrorMechanism::new(vec![det(i, t), det(i, t + 1)], vec![]));
            }
        }
    }

    let mut groups: BTreeMap<Coord, BTreeSet<u32>> = BTreeMap::new();
    for t in 0..rounds {
        for i in 0..per_round {
            groups
                .entry(Coord((2 * i + 1) as f64))
                .or_default()
                .insert(det(i, t));
        }
    }
    ErrorModel::new(per_round * rounds, 1, mechanisms)
        .unwrap()
        .with_detector_groups(groups)
}

fn cnf_configs() -> Vec<EncodingConfig> {
    let mut configs = Vec::new();
    for xor_encoding in [XorEncoding::ChainTseitin, XorEncoding::TreeTseitin] {
        for cardinality in [CardinalityMethod::Totalizer, CardinalityMethod::SequentialCounter] {
            for brute_force_limit in [0, 1, 3] {
                configs.push(EncodingConfig {
                    xor_encoding,
                    brute_force_limit,
                    cardinality,
                    connectivity: false,
                });
            }
        }
    }
    configs
}

#[test]
fn two_errors_break_the_toy_model() {
    let report = check_budget(
        &two_error_model(),
        &EncodingConfig::default(),
        2,
        VarisatBackend::new(),
    )
    .unwrap();
    match report.outcome {
        Outcome::Breakable(w) => assert_eq!(w.active_errors(), vec![0, 1]),
        Outcome::Tolerant => panic!("expected a failing pattern"),
    }
    assert!(!report.degenerate);
}

#[test]
fn zero_budget_is_tolerated() {
    for config in cnf_configs() {
        let report = check_budget(&two_error_model(), &config, 0, VarisatBackend::new()).unwrap();
        assert_eq!(report.outcome, Outcome::Tolerant);
    }
}

#[test]
fn model_without_observable_effects_is_tolerant_at_any_budget() {
    let model = ErrorModel::new(
        2,
        1,
        vec![
            ErrorMechanism::new(vec![0], vec![]),
            ErrorMechanism::new(vec![0, 1], vec![]),
            ErrorMechanism::new(vec![1], vec![]),
        ],
    )
    .unwrap();
    for k in 0..=4 {
        let report = check_budget(&model, &EncodingConfig::default(), k, VarisatBackend::new()).unwrap();
        assert_eq!(report.outcome, Outcome::Tolerant);
        assert!(report.degenerate);
    }
}

#[test]
fn native_xor_needs_an_xor_backend() {
    let config = EncodingConfig {
        xor_encoding: XorEncoding::NativeXor,
        ..EncodingConfig::default()
    };
    let err = check_budget(&two_error_model(), &config, 2, VarisatBackend::new()).unwrap_err();
    assert!(matches!(err, QsatError::XorUnsupported { backend: "varisat" }));
}

#[test]
fn repetition_code_distance_is_its_length() {
    for d in [2, 3, 5] {
        let model = repetition_code(d, 3);
        for config in cnf_configs() {
            let below = check_budget(&model, &config, d as usize - 1, VarisatBackend::new()).unwrap();
            assert_eq!(below.outcome, Outcome::Tolerant, "d={d} {config:?}");

            let at = check_budget(&model, &config, d as usize, VarisatBackend::new()).unwrap();
            let witness = at.witness().expect("distance-weight error exists");
            assert_eq!(witness.weight(), d as usize);
        }
    }
}

#[test]
fn connectivity_keeps_the_minimum_weight_on_repetition_codes() {
    let model = repetition_code(4, 3);
    let plain = minimum_weight(&model, &EncodingConfig::default(), VarisatBackend::new)
        .unwrap()
        .unwrap();
    let connected = EncodingConfig {
        connectivity: true,
        ..EncodingConfig::default()
    };
    let pruned = minimum_weight(&model, &connected, VarisatBackend::new)
        .unwrap()
        .unwrap();
    assert_eq!(plain.weight, 4);
    assert_eq!(pruned.weight, 4);
    assert!(pruned.witness.verify(&model, 4).is_ok());
}

#[test]
fn minimum_weight_of_a_model_without_logical_errors_is_none() {
    let model = ErrorModel::new(1, 1, vec![ErrorMechanism::new(vec![0], vec![0])]).unwrap();
    let found = minimum_weight(&model, &EncodingConfig::default(), VarisatBackend::new).unwrap();
    assert!(found.is_none());
}

/// Lightest undetected logical error by exhaustive subset search.
fn reference_minimum(model: &ErrorModel) -> Option<usize> {
    let n = model.num_errors();
    (0u32..(1 << n))
        .filter(|mask| {
            let active: Vec<usize> = (0..n).filter(|i| mask >> i & 1 == 1).collect();
            Witness::from_indices(n, &active)
                .unwrap()
                .syndrome(model)
                .is_undetected_logical()
        })
        .map(|mask| mask.count_ones() as usize)
        .min()
}

fn arb_model() -> impl Strategy<Value = ErrorModel> {
    (1u32..=4, 1u32..=2).prop_flat_map(|(nd, no)| {
        let detectors: Vec<u32> = (0..nd).collect();
        let observables: Vec<u32> = (0..no).collect();
        let mechanism = (
            proptest::sample::subsequence(detectors, 0..=nd as usize),
            proptest::sample::subsequence(observables, 0..=no as usize),
        )
            .prop_map(|(d, l)| ErrorMechanism::new(d, l));
        proptest::collection::vec(mechanism, 0..=7)
            .prop_map(move |mechanisms| ErrorModel::new(nd, no, mechanisms).unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn verdict_matches_exhaustive_search(model in arb_model(), k in 0usize..=7) {
        let expected = reference_minimum(&model).is_some_and(|w| w <= k);
        for config in cnf_configs() {
            let report = check_budget(&model, &config, k, VarisatBackend::new()).unwrap();
            prop_assert_eq!(report.is_sat(), expected, "{:?}", config);
        }
    }

    #[test]
    fn linear_search_finds_the_reference_minimum(model in arb_model()) {
        let found = minimum_weight(&model, &EncodingConfig::default(), VarisatBackend::new).unwrap();
        prop_assert_eq!(found.map(|m| m.weight), reference_minimum(&model));
    }
}
