//! Minimum-weight logical error search.
//!
//! SAT-UNSAT linear search: solve with the loosest useful budget, then keep
//! asking for a pattern strictly lighter than the best one found. Every step
//! is an independent build on a fresh back end.

use crate::QsatError;
use crate::check::{Outcome, check_budget};
use crate::config::EncodingConfig;
use crate::model::ErrorModel;
use crate::solver::SolverBackend;
use crate::witness::Witness;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinimumWeight {
    pub weight: usize,
    pub witness: Witness,
    pub solver_calls: usize,
}

/// Smallest number of errors forming an undetected logical error.
///
/// Starts from the full error count and lowers the budget to one below the
/// last witness weight until the check comes back tolerant.
///
/// # Arguments
///
/// * `model` - Error model to search
/// * `config` - Encoding used for every check
/// * `backend_factory` - Builds a fresh back end for each solver call
///
/// # Returns
///
/// The lightest verified witness and the number of solver calls, or `None`
/// when the model admits no logical error at all.
pub fn minimum_weight<B, F>(
    model: &ErrorModel,
    config: &EncodingConfig,
    mut backend_factory: F,
) -> Result<Option<MinimumWeight>, QsatError>
where
    B: SolverBackend,
    F: FnMut() -> B,
{
    let mut best: Option<Witness> = None;
    let mut budget = model.num_errors();
    let mut solver_calls = 0;

    loop {
        let report = check_budget(model, config, budget, backend_factory())?;
        solver_calls += 1;
        match report.outcome {
            Outcome::Breakable(witness) => {
                let weight = witness.weight();
                debug!(budget, weight, "found logical error");
                best = Some(witness);
                if weight == 0 {
                    break;
                }
                budget = weight - 1;
            }
            Outcome::Tolerant => break,
        }
    }

    Ok(best.map(|witness| MinimumWeight {
        weight: witness.weight(),
        witness,
        solver_calls,
    }))
}
