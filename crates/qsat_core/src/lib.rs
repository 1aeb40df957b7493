//! Core encoding of surface-code failure checks as Boolean satisfiability.
//!
//! This crate answers one question about a detector error model: can at most
//! `k` error mechanisms leave every detector unflipped while flipping at least
//! one logical observable? The question is translated into CNF (or native XOR
//! constraints) made of three parts: even parity on every detector, odd parity
//! on at least one observable, and a cardinality bound on the active errors.
//! The resulting constraint set is handed to a SAT back end through a narrow
//! adapter trait.

/// Cardinality constraints bounding the number of active error variables.
///
/// Provides the at-most-k capability consumed by the model builder. Two
/// encodings are available: a totalizer (balanced unary adder tree) and a
/// sequential counter. Both draw auxiliary variables from the build's pool.
pub mod cardinality;

/// Orchestration of a complete failure check.
///
/// Builds the constraint set for an error budget, runs it through a solver
/// back end, and verifies any witness against the error model before
/// reporting it to the caller.
pub mod check;

/// Encoding configuration shared by the builder and the command line.
///
/// Selects the parity strategy, the brute-force arity threshold, the
/// cardinality encoding, and whether connectivity side constraints are added.
pub mod config;

/// Clause and native-XOR containers.
///
/// Defines signed literals, XOR constraints, and the ordered constraint set
/// produced by a single model build. Insertion order is preserved so that
/// repeated builds yield identical variable numbering.
pub mod constraint;

/// Spatial grouping of error mechanisms by detector x-coordinate.
///
/// Classifies errors into categories keyed by the sorted x-coordinates of the
/// detectors they flip. Used only for the optional connectivity constraints.
pub mod grouping;

/// Detector error model representation.
///
/// Holds the error mechanisms, the detectors and observables they flip, and
/// the optional coordinate grouping of detectors. Validated once on
/// construction and read-only afterwards.
pub mod model;

/// Assembly of the full failure-check constraint set.
///
/// Runs the parity encoder over every detector and observable, introduces
/// the observable-triggered auxiliaries, adds the connectivity constraints
/// when enabled, and finishes with the cardinality bound.
pub mod builder;

/// Parity (XOR) constraint encodings.
///
/// Encodes `XOR(literals) = target` as brute-force blocking clauses, as a
/// chain of Tseitin XOR gates, as a balanced Tseitin tree, or as a native XOR
/// constraint for back ends that support one.
pub mod parity;

/// Monotonic allocator of Boolean variable identifiers.
///
/// The single source of fresh variables for one model build. Detects overflow
/// of the identifier space instead of wrapping.
pub mod pool;

/// Minimum-weight logical error search.
///
/// Finds the smallest number of error mechanisms that produce an undetected
/// logical error by tightening the cardinality bound until the model becomes
/// unsatisfiable.
pub mod search;

/// Solver back-end adapter.
///
/// A narrow capability interface over SAT engines plus the adapter for the
/// pure-Rust varisat solver.
pub mod solver;

/// Failing error patterns extracted from satisfying assignments.
///
/// A witness is a bit vector over the error mechanisms. It can be checked
/// against the error model to confirm that it is undetected and flips a
/// logical observable.
pub mod witness;

pub use builder::{EncodedModel, EncodingStats, ModelBuilder};
pub use check::{CheckReport, Outcome, check_budget};
pub use config::{CardinalityMethod, EncodingConfig};
pub use constraint::{Clause, ConstraintSet, Lit, VarId, XorConstraint};
pub use model::{Coord, ErrorMechanism, ErrorModel};
pub use parity::{ParityEncoder, XorEncoding};
pub use pool::VarPool;
pub use search::{MinimumWeight, minimum_weight};
pub use solver::{Assignment, SolverBackend, VarisatBackend, Verdict};
pub use witness::{Syndrome, Witness};

use thiserror::Error;

/// Error types returned while validating, encoding, or solving a model.
///
/// Every failure is detected synchronously during a single build or solve
/// pass and propagated to the caller unchanged. The encoding is deterministic,
/// so none of these are worth retrying with the same input.
#[derive(Debug, Error)]
pub enum QsatError {
    /// An error mechanism references a detector outside the declared range.
    ///
    /// Raised while constructing an `ErrorModel`, before any constraint is
    /// emitted, so no partial constraint set ever escapes.
    #[error("error {error} flips detector D{detector} but only {num_detectors} detectors are declared")]
    DetectorOutOfRange {
        error: usize,
        detector: u32,
        num_detectors: u32,
    },

    /// An error mechanism references an observable outside the declared range.
    #[error("error {error} flips observable L{observable} but only {num_observables} observables are declared")]
    ObservableOutOfRange {
        error: usize,
        observable: u32,
        num_observables: u32,
    },

    /// An error mechanism lists the same detector or observable twice.
    ///
    /// Effect lists are sets. A repeated target would silently cancel inside
    /// the parity encoding, so it is rejected instead.
    #[error("error {error} lists target {target} more than once")]
    DuplicateTarget { error: usize, target: String },

    /// The variable identifier space would overflow.
    ///
    /// Identifiers are stored as signed 32-bit DIMACS literals. Running past
    /// the limit is a fatal configuration error and aborts the build.
    #[error("variable pool exhausted: requested {requested} variables past id {next_free}, limit is {limit}")]
    VariablePoolExhausted {
        next_free: u64,
        requested: u64,
        limit: u32,
    },

    /// An unrecognized parity or cardinality strategy tag.
    #[error("unsupported encoding method `{0}`")]
    UnsupportedEncodingMethod(String),

    /// The configured brute-force arity would emit an impractical clause count.
    #[error("brute-force limit {limit} exceeds the maximum of {max}")]
    BruteForceLimitTooLarge { limit: usize, max: usize },

    /// Native XOR constraints were handed to a back end without XOR support.
    #[error("solver back end `{backend}` does not accept native XOR constraints")]
    XorUnsupported { backend: &'static str },

    /// A clause references a variable that was never declared to the back end.
    #[error("literal references variable {var} but only {declared} variables are declared")]
    InvalidLiteral { var: VarId, declared: u32 },

    /// The external solving engine reported a failure.
    #[error("solver failure: {0}")]
    Solver(String),

    /// A witness names an error mechanism the model does not have.
    #[error("error index {index} is out of range for a model with {num_errors} errors")]
    ErrorIndexOutOfRange { index: usize, num_errors: usize },

    /// A satisfying assignment did not describe an undetected logical error.
    #[error("witness rejected: {0}")]
    WitnessRejected(String),
}
