//! Assembly of the failure-check constraint set.
//!
//! The constraint set built for error budget `k` is satisfiable exactly when
//! some set of at most `k` error mechanisms leaves every detector with even
//! parity and flips at least one logical observable.
//!
//! Emission order is fixed: detector parities by detector index, observable
//! parities by observable index, the observable disjunction, connectivity
//! clauses, and finally the cardinality bound.

use crate::QsatError;
use crate::config::EncodingConfig;
use crate::constraint::{ConstraintSet, Lit, VarId};
use crate::grouping;
use crate::model::ErrorModel;
use crate::parity::ParityEncoder;
use crate::pool::VarPool;
use tracing::{debug, warn};

/// Size breakdown of an encoded model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodingStats {
    /// Total variables, error variables included.
    pub num_vars: u32,
    pub num_clauses: usize,
    pub num_xors: usize,
    /// Detectors with a non-empty effect list.
    pub detector_constraints: usize,
    /// Observables with a non-empty effect list.
    pub observable_constraints: usize,
    /// Gate outputs allocated by the parity encoder.
    pub parity_aux: u32,
    /// Observable-triggered auxiliaries.
    pub observable_aux: u32,
    /// Auxiliaries allocated by the cardinality encoder.
    pub cardinality_aux: u32,
    /// Number of non-empty x-coordinate categories used for connectivity.
    pub categories: usize,
    pub connectivity_clauses: usize,
}

/// Constraint set for one error budget plus the bookkeeping to read it back.
#[derive(Clone, Debug)]
pub struct EncodedModel {
    pub constraints: ConstraintSet,
    pub num_errors: usize,
    pub max_errors: usize,
    /// `(observable index, triggered auxiliary)` for every non-empty observable.
    pub observable_vars: Vec<(u32, VarId)>,
    /// No observable can ever flip, so the constraint set holds the empty clause.
    pub degenerate: bool,
    pub stats: EncodingStats,
}

impl EncodedModel {
    /// Decision variables of the error mechanisms, `1..=num_errors`.
    pub fn error_vars(&self) -> impl Iterator<Item = VarId> {
        (0..self.num_errors).map(ErrorModel::error_var)
    }
}

/// Builds failure-check constraint sets for a fixed model and configuration.
pub struct ModelBuilder<'a> {
    model: &'a ErrorModel,
    config: EncodingConfig,
    parity: ParityEncoder,
}

impl<'a> ModelBuilder<'a> {
    /// Validates the configuration against the model.
    pub fn new(model: &'a ErrorModel, config: EncodingConfig) -> Result<Self, QsatError> {
        Ok(Self {
            model,
            config,
            parity: config.parity_encoder()?,
        })
    }

    pub fn config(&self) -> &EncodingConfig {
        &self.config
    }

    /// Encodes "the code fails with at most `max_errors` active errors".
    pub fn build(&self, max_errors: usize) -> Result<EncodedModel, QsatError> {
        self.build_with_limit(max_errors, VarPool::MAX_VAR)
    }

    /// Same as `build`, with an explicit ceiling on variable identifiers.
    pub fn build_with_limit(
        &self,
        max_errors: usize,
        var_limit: u32,
    ) -> Result<EncodedModel, QsatError> {
        let model = self.model;
        let num_errors = model.num_errors();
        let mut pool = VarPool::with_limit(num_errors, var_limit)?;
        let mut out = ConstraintSet::new();
        out.declare_vars(pool.num_allocated());
        let mut stats = EncodingStats::default();

        for effects in model.detector_effects() {
            if effects.is_empty() {
                continue;
            }
            self.parity.encode(&effects, false, &mut pool, &mut out)?;
            stats.detector_constraints += 1;
        }
        let after_detectors = pool.num_allocated();
        debug!(
            detectors = stats.detector_constraints,
            aux = after_detectors - num_errors as u32,
            clauses = out.num_clauses(),
            "encoded detector parities"
        );

        // XOR(effects, aux) = 0  <=>  aux = XOR(effects)
        let mut observable_vars = Vec::new();
        for (index, mut effects) in model.observable_effects().into_iter().enumerate() {
            if effects.is_empty() {
                continue;
            }
            let triggered = pool.fresh()?;
            effects.push(triggered);
            self.parity.encode(&effects, false, &mut pool, &mut out)?;
            observable_vars.push((index as u32, triggered));
        }
        stats.observable_constraints = observable_vars.len();
        stats.observable_aux = observable_vars.len() as u32;
        stats.parity_aux = pool.num_allocated() - num_errors as u32 - stats.observable_aux;

        // An empty disjunction is the empty clause, so a model without any
        // flippable observable is unsatisfiable by construction.
        let degenerate = observable_vars.is_empty();
        if degenerate {
            warn!("no observable is flipped by any error; the model is trivially unsatisfiable");
        }
        out.add_clause(observable_vars.iter().map(|&(_, v)| Lit::pos(v)).collect());

        if self.config.connectivity {
            let categories = grouping::categorize(model);
            stats.categories = categories.len();
            for &(_, triggered) in &observable_vars {
                for members in categories.values() {
                    let mut clause = Vec::with_capacity(members.len() + 1);
                    clause.push(Lit::neg(triggered));
                    clause.extend(members.iter().map(|&v| Lit::pos(v)));
                    out.add_clause(clause);
                    stats.connectivity_clauses += 1;
                }
            }
            debug!(
                categories = stats.categories,
                clauses = stats.connectivity_clauses,
                "added connectivity constraints"
            );
        }

        let before_cardinality = pool.num_allocated();
        let error_vars: Vec<VarId> = (0..num_errors).map(ErrorModel::error_var).collect();
        self.config
            .cardinality
            .encoder()
            .encode_at_most(&error_vars, max_errors, &mut pool, &mut out)?;
        stats.cardinality_aux = pool.num_allocated() - before_cardinality;

        out.declare_vars(pool.num_allocated());
        stats.num_vars = out.num_vars();
        stats.num_clauses = out.num_clauses();
        stats.num_xors = out.num_xors();
        debug!(
            vars = stats.num_vars,
            clauses = stats.num_clauses,
            xors = stats.num_xors,
            cardinality_aux = stats.cardinality_aux,
            "model encoded"
        );

        Ok(EncodedModel {
            constraints: out,
            num_errors,
            max_errors,
            observable_vars,
            degenerate,
            stats,
        })
    }
}
