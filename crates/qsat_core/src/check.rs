//! Single failure check at a fixed error budget.

use crate::QsatError;
use crate::builder::{EncodingStats, ModelBuilder};
use crate::config::EncodingConfig;
use crate::model::ErrorModel;
use crate::parity::XorEncoding;
use crate::solver::{SolverBackend, Verdict};
use crate::witness::Witness;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Some pattern of at most `max_errors` errors is an undetected logical error.
    Breakable(Witness),
    /// No such pattern exists.
    Tolerant,
}

#[derive(Clone, Debug)]
pub struct CheckReport {
    pub outcome: Outcome,
    pub max_errors: usize,
    pub stats: EncodingStats,
    pub build_time: Duration,
    pub solve_time: Duration,
    /// The model has no observable any error can flip.
    pub degenerate: bool,
}

impl CheckReport {
    pub fn is_sat(&self) -> bool {
        matches!(self.outcome, Outcome::Breakable(_))
    }

    pub fn witness(&self) -> Option<&Witness> {
        match &self.outcome {
            Outcome::Breakable(w) => Some(w),
            Outcome::Tolerant => None,
        }
    }
}

/// Decides whether `model` can be broken with at most `max_errors` errors.
///
/// A satisfying assignment is restricted to the error variables and verified
/// against the model before it is returned.
///
/// # Arguments
///
/// * `model` - Validated error model
/// * `config` - Parity and cardinality encodings
/// * `max_errors` - Error budget `k`
/// * `backend` - Fresh back end. It receives exactly one constraint set
///
/// # Returns
///
/// A report holding the outcome, the encoding size and the build and solve
/// times.
///
/// # Errors
///
/// `XorUnsupported` when a native-XOR configuration meets a CNF-only back
/// end, `WitnessRejected` when the back end returns an assignment that does
/// not describe an undetected logical error, plus any build or solver error.
pub fn check_budget<B: SolverBackend>(
    model: &ErrorModel,
    config: &EncodingConfig,
    max_errors: usize,
    mut backend: B,
) -> Result<CheckReport, QsatError> {
    if config.xor_encoding == XorEncoding::NativeXor && !backend.supports_xor() {
        return Err(QsatError::XorUnsupported {
            backend: backend.name(),
        });
    }

    let start = Instant::now();
    let encoded = ModelBuilder::new(model, *config)?.build(max_errors)?;
    backend.load(&encoded.constraints)?;
    let build_time = start.elapsed();

    let start = Instant::now();
    let verdict = backend.solve()?;
    let solve_time = start.elapsed();

    let outcome = match verdict {
        Verdict::Satisfiable(assignment) => {
            let witness = Witness::from_assignment(&assignment, encoded.num_errors);
            witness.verify(model, max_errors)?;
            Outcome::Breakable(witness)
        }
        Verdict::Unsatisfiable => Outcome::Tolerant,
    };

    info!(
        backend = backend.name(),
        method = %config.xor_encoding,
        max_errors,
        vars = encoded.stats.num_vars,
        clauses = encoded.stats.num_clauses,
        sat = matches!(outcome, Outcome::Breakable(_)),
        build_ms = build_time.as_secs_f64() * 1e3,
        solve_ms = solve_time.as_secs_f64() * 1e3,
        "check finished"
    );

    Ok(CheckReport {
        outcome,
        max_errors,
        stats: encoded.stats,
        build_time,
        solve_time,
        degenerate: encoded.degenerate,
    })
}
