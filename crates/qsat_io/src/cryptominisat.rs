//! External CryptoMiniSat back end.
//!
//! CryptoMiniSat runs Gaussian elimination over native XOR constraints, which
//! makes it the back end for `native_xor` builds. Constraints are buffered in
//! memory, written to a temporary extended-DIMACS file at solve time, and the
//! `s`/`v` lines printed by the solver are read back into an assignment.

use crate::dimacs::write_dimacs_file;
use qsat_core::{Assignment, ConstraintSet, Lit, QsatError, SolverBackend, VarId, Verdict, XorConstraint};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::debug;

/// Binary looked up on `PATH` when no explicit path is configured.
pub const CRYPTOMINISAT_BINARY: &str = "cryptominisat5";

#[derive(Clone, Debug)]
pub struct CryptoMiniSatConfig {
    /// Path to the solver binary.
    pub path: Option<PathBuf>,
    /// Passed as `--threads`.
    pub threads: usize,
}

impl Default for CryptoMiniSatConfig {
    fn default() -> Self {
        Self {
            path: None,
            threads: 1,
        }
    }
}

/// Adapter over a `cryptominisat5` process. Accepts native XOR constraints.
pub struct CryptoMiniSatBackend {
    config: CryptoMiniSatConfig,
    pending: ConstraintSet,
    declared: u32,
}

impl Default for CryptoMiniSatBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoMiniSatBackend {
    pub fn new() -> Self {
        Self::with_config(CryptoMiniSatConfig::default())
    }

    pub fn with_config(config: CryptoMiniSatConfig) -> Self {
        Self {
            config,
            pending: ConstraintSet::new(),
            declared: 0,
        }
    }

    /// Resolves the solver binary, preferring the configured path.
    ///
    /// # Returns
    ///
    /// The binary path, or `QsatError::Solver` when none is configured and
    /// `cryptominisat5` is not on `PATH`.
    pub fn locate(&self) -> Result<PathBuf, QsatError> {
        self.config
            .path
            .clone()
            .or_else(|| which::which(CRYPTOMINISAT_BINARY).ok())
            .ok_or_else(|| QsatError::Solver(format!("{CRYPTOMINISAT_BINARY} not found on PATH")))
    }

    pub fn is_available(&self) -> bool {
        self.locate().is_ok()
    }

    fn check_var(&self, var: VarId) -> Result<(), QsatError> {
        if var == 0 || var > self.declared {
            return Err(QsatError::InvalidLiteral {
                var,
                declared: self.declared,
            });
        }
        Ok(())
    }
}

impl SolverBackend for CryptoMiniSatBackend {
    fn name(&self) -> &'static str {
        "cryptominisat"
    }

    fn supports_xor(&self) -> bool {
        true
    }

    fn declare_variables(&mut self, count: u32) {
        self.declared = self.declared.max(count);
        self.pending.declare_vars(self.declared);
    }

    fn add_clause(&mut self, clause: &[Lit]) -> Result<(), QsatError> {
        for lit in clause {
            self.check_var(lit.var())?;
        }
        self.pending.add_clause(clause.to_vec());
        Ok(())
    }

    fn add_xor(&mut self, xor: &XorConstraint) -> Result<(), QsatError> {
        for &var in &xor.vars {
            self.check_var(var)?;
        }
        self.pending.add_xor(xor.clone());
        Ok(())
    }

    fn solve(&mut self) -> Result<Verdict, QsatError> {
        let binary = self.locate()?;
        let dir = TempDir::new().map_err(|e| QsatError::Solver(format!("failed to create temp dir: {e}")))?;
        let cnf = dir.path().join("problem.cnf");
        write_dimacs_file(&cnf, &self.pending, &[]).map_err(|e| QsatError::Solver(format!("{e:#}")))?;

        debug!(
            binary = %binary.display(),
            vars = self.pending.num_vars(),
            clauses = self.pending.num_clauses(),
            xors = self.pending.num_xors(),
            "running external solver"
        );
        let output = Command::new(&binary)
            .arg("--verb=0")
            .arg(format!("--threads={}", self.config.threads.max(1)))
            .arg(&cnf)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| QsatError::Solver(format!("failed to run {}: {e}", binary.display())))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(
            exit_code = ?output.status.code(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "external solver finished"
        );
        parse_output(&stdout, output.status.code(), self.declared)
    }
}

/// Reads the verdict from the solver's standard output.
///
/// # Arguments
///
/// * `stdout` - Everything the solver printed
/// * `exit_code` - Process exit status. `10` and `20` stand for SAT and UNSAT
///   when no `s` line is present
/// * `num_vars` - Declared variable count. Model literals past it are dropped
///
/// # Returns
///
/// The verdict, or `QsatError::Solver` when the solver gave up or printed
/// something unreadable.
fn parse_output(stdout: &str, exit_code: Option<i32>, num_vars: u32) -> Result<Verdict, QsatError> {
    for line in stdout.lines() {
        match line.trim() {
            "s SATISFIABLE" => return extract_model(stdout, num_vars).map(Verdict::Satisfiable),
            "s UNSATISFIABLE" => return Ok(Verdict::Unsatisfiable),
            "s INDETERMINATE" | "s UNKNOWN" => {
                return Err(QsatError::Solver(format!("{CRYPTOMINISAT_BINARY} returned no verdict")));
            }
            _ => {}
        }
    }

    match exit_code {
        Some(10) => extract_model(stdout, num_vars).map(Verdict::Satisfiable),
        Some(20) => Ok(Verdict::Unsatisfiable),
        code => Err(QsatError::Solver(format!(
            "could not parse {CRYPTOMINISAT_BINARY} output (exit code {code:?})"
        ))),
    }
}

/// Collects the `v` lines into an assignment. Unlisted variables read false.
fn extract_model(stdout: &str, num_vars: u32) -> Result<Assignment, QsatError> {
    let mut assignment = Assignment::new(num_vars);
    let mut seen = false;
    for line in stdout.lines() {
        let Some(values) = line.trim().strip_prefix("v ") else {
            continue;
        };
        seen = true;
        for token in values.split_whitespace() {
            let lit: i64 = token
                .parse()
                .map_err(|_| QsatError::Solver(format!("malformed model literal `{token}`")))?;
            let var = lit.unsigned_abs();
            if lit != 0 && var <= u64::from(num_vars) {
                assignment.set(var as VarId, lit > 0);
            }
        }
    }
    if !seen {
        return Err(QsatError::Solver("satisfiable answer without a model".into()));
    }
    Ok(assignment)
}
