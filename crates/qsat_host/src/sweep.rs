use crate::backend::SolverKind;
use crate::stats::TimingStats;
use anyhow::{Context, Result};
use qsat_core::{CardinalityMethod, EncodingConfig, ErrorModel, XorEncoding, check_budget};
use qsat_io::load_dem_file;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub struct SweepPlan {
    pub dems: Vec<PathBuf>,
    pub max_errors: Vec<usize>,
    pub methods: Vec<XorEncoding>,
    pub base_lens: Vec<usize>,
    pub cardinality: CardinalityMethod,
    pub connectivity: bool,
    pub solver: SolverKind,
}

/// One CSV row of a sweep, times in seconds.
#[derive(Debug, Serialize)]
pub struct SweepRow {
    pub dem: String,
    pub max_error: usize,
    pub xor_encoding_method: String,
    pub base_len: usize,
    pub num_vars: u32,
    pub num_clauses: usize,
    pub build_time: f64,
    pub check_time: f64,
    pub sat: bool,
}

struct Job<'a> {
    dem: &'a Path,
    model: &'a ErrorModel,
    max_errors: usize,
    config: EncodingConfig,
    solver: SolverKind,
}

impl SweepPlan {
    fn jobs<'a>(&'a self, models: &'a [ErrorModel]) -> Vec<Job<'a>> {
        let mut jobs = Vec::new();
        for (dem, model) in self.dems.iter().zip(models) {
            for &max_errors in &self.max_errors {
                for &xor_encoding in &self.methods {
                    for &brute_force_limit in &self.base_lens {
                        jobs.push(Job {
                            dem,
                            model,
                            max_errors,
                            config: EncodingConfig {
                                xor_encoding,
                                brute_force_limit,
                                cardinality: self.cardinality,
                                connectivity: self.connectivity,
                            },
                            solver: self.solver,
                        });
                    }
                }
            }
        }
        jobs
    }
}

fn run_job(job: &Job<'_>) -> Result<(SweepRow, Duration)> {
    let report = check_budget(job.model, &job.config, job.max_errors, job.solver.backend())
        .with_context(|| {
            format!(
                "{} with k={} method={} base_len={}",
                job.dem.display(),
                job.max_errors,
                job.config.xor_encoding,
                job.config.brute_force_limit
            )
        })?;
    let row = SweepRow {
        dem: job.dem.display().to_string(),
        max_error: job.max_errors,
        xor_encoding_method: job.config.xor_encoding.to_string(),
        base_len: job.config.brute_force_limit,
        num_vars: report.stats.num_vars,
        num_clauses: report.stats.num_clauses,
        build_time: report.build_time.as_secs_f64(),
        check_time: report.solve_time.as_secs_f64(),
        sat: report.is_sat(),
    };
    Ok((row, report.build_time + report.solve_time))
}

/// Runs every job of `plan` in parallel.
///
/// # Arguments
///
/// * `plan` - Budgets and encodings to cross with every model
/// * `models` - Loaded models, one per entry of `plan.dems`
///
/// # Returns
///
/// CSV rows in plan order together with the per-job build and check times.
/// The first failing job aborts the sweep.
pub fn execute(plan: &SweepPlan, models: &[ErrorModel]) -> Result<(Vec<SweepRow>, TimingStats)> {
    let jobs = plan.jobs(models);
    let results: Vec<(SweepRow, Duration)> = jobs.par_iter().map(run_job).collect::<Result<_>>()?;

    let mut stats = TimingStats::new();
    let rows = results
        .into_iter()
        .map(|(row, elapsed)| {
            stats.update(elapsed);
            row
        })
        .collect();
    Ok((rows, stats))
}

/// Writes `rows` as CSV with a header line.
pub fn write_csv(rows: &[SweepRow], out: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run_sweep(plan: &SweepPlan, out: &Path) -> Result<()> {
    let models = plan
        .dems
        .iter()
        .map(|path| {
            println!("Loading model from {}...", path.display());
            load_dem_file(path)
        })
        .collect::<Result<Vec<_>>>()?;

    let total = plan.dems.len() * plan.max_errors.len() * plan.methods.len() * plan.base_lens.len();
    println!("Starting sweep of {} checks (Parallel - Rayon)...", total);
    let start = Instant::now();
    let (rows, stats) = execute(plan, &models)?;
    let seconds = start.elapsed().as_secs_f64();

    let sat = rows.iter().filter(|r| r.sat).count();
    println!("Results");
    println!("Time: {:.4} s", seconds);
    println!("SAT: {}/{}", sat, rows.len());
    stats.print_report("Build + check time");

    write_csv(&rows, out)?;
    println!("Wrote {}", out.display());
    Ok(())
}
