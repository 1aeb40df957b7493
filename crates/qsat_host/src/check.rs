//! Single-model commands: budget check, minimum weight, and witness replay.

use crate::backend::SolverKind;
use anyhow::{Context, Result, bail};
use qsat_core::{EncodingConfig, ErrorModel, Outcome, Witness, check_budget, minimum_weight};
use qsat_io::{load_dem_file, load_witnesses, write_witness};
use std::path::Path;
use std::time::Instant;
use tracing::info;

fn load_model(dem_path: &Path) -> Result<ErrorModel> {
    let start = Instant::now();
    let model = load_dem_file(dem_path)?;
    info!(
        path = %dem_path.display(),
        errors = model.num_errors(),
        detectors = model.num_detectors(),
        observables = model.num_observables(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
        "loaded model"
    );
    Ok(model)
}

fn describe(witness: &Witness, model: &ErrorModel) -> String {
    let syndrome = witness.syndrome(model);
    format!(
        "errors {:?} flip observables {:?}",
        witness.active_errors(),
        syndrome.flipped_observables
    )
}

/// Runs one failure check and prints the verdict.
///
/// # Arguments
///
/// * `dem_path` - Detector error model to load
/// * `max_errors` - Error budget `k`
/// * `config` - Parity and cardinality encodings
/// * `solver` - Back end that decides the constraint set
/// * `witness_out` - Where to write the failing pattern, if one is found
pub fn run_check(
    dem_path: &Path,
    max_errors: usize,
    config: &EncodingConfig,
    solver: SolverKind,
    witness_out: Option<&Path>,
) -> Result<()> {
    let model = load_model(dem_path)?;
    let report = check_budget(&model, config, max_errors, solver.backend())
        .context("Failure check failed")?;

    println!(
        "Encoding: {} (base_len {}, {}{}) on {}",
        config.xor_encoding,
        config.brute_force_limit,
        config.cardinality,
        if config.connectivity { ", connectivity" } else { "" },
        solver
    );
    println!(
        "Variables: {}, Clauses: {}",
        report.stats.num_vars, report.stats.num_clauses
    );
    println!("Build time: {:.4} s", report.build_time.as_secs_f64());
    println!("Check time: {:.4} s", report.solve_time.as_secs_f64());

    match &report.outcome {
        Outcome::Breakable(witness) => {
            println!("SAT: {} errors can cause an undetected logical error", max_errors);
            println!("Witness: {}", describe(witness, &model));
            if let Some(path) = witness_out {
                write_witness(path, witness)?;
                println!("Witness written to {}", path.display());
            }
        }
        Outcome::Tolerant => {
            if report.degenerate {
                println!("UNSAT: no error flips a logical observable");
            } else {
                println!("UNSAT: the code tolerates any {} errors", max_errors);
            }
        }
    }
    Ok(())
}

pub fn run_min_weight(
    dem_path: &Path,
    config: &EncodingConfig,
    solver: SolverKind,
    witness_out: Option<&Path>,
) -> Result<()> {
    let model = load_model(dem_path)?;
    let start = Instant::now();
    let found = minimum_weight(&model, config, || solver.backend())
        .context("Minimum weight search failed")?;
    let elapsed = start.elapsed();

    match found {
        Some(min) => {
            println!("Minimum weight: {}", min.weight);
            println!("Witness: {}", describe(&min.witness, &model));
            println!("Solver calls: {}", min.solver_calls);
            if let Some(path) = witness_out {
                write_witness(path, &min.witness)?;
                println!("Witness written to {}", path.display());
            }
        }
        None => println!("No undetected logical error exists"),
    }
    println!("Time: {:.4} s", elapsed.as_secs_f64());
    Ok(())
}

pub fn run_verify(dem_path: &Path, errors_path: &Path, max_errors: Option<usize>) -> Result<()> {
    let model = load_model(dem_path)?;
    let witnesses = load_witnesses(errors_path, model.num_errors())?;

    let mut rejected = 0;
    for (i, witness) in witnesses.iter().enumerate() {
        let budget = max_errors.unwrap_or_else(|| witness.weight());
        match witness.verify(&model, budget) {
            Ok(_) => println!("Pattern {}: OK, {}", i, describe(witness, &model)),
            Err(e) => {
                rejected += 1;
                println!("Pattern {}: {}", i, e);
            }
        }
    }

    println!("Verified: {}/{}", witnesses.len() - rejected, witnesses.len());
    if rejected > 0 {
        bail!("{rejected} of {} patterns are not undetected logical errors", witnesses.len());
    }
    Ok(())
}
