//! Solver back-end selection for the command line.

use qsat_core::{QsatError, SolverBackend, VarisatBackend};
use qsat_io::CryptoMiniSatBackend;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverKind {
    /// In-process varisat. CNF only.
    #[default]
    Varisat,
    /// External `cryptominisat5`. Accepts native XOR.
    CryptoMiniSat,
}

impl SolverKind {
    pub fn backend(self) -> Box<dyn SolverBackend> {
        match self {
            SolverKind::Varisat => Box::new(VarisatBackend::new()),
            SolverKind::CryptoMiniSat => Box::new(CryptoMiniSatBackend::new()),
        }
    }
}

impl FromStr for SolverKind {
    type Err = QsatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "varisat" => Ok(SolverKind::Varisat),
            "cryptominisat" | "cms" => Ok(SolverKind::CryptoMiniSat),
            other => Err(QsatError::Solver(format!("unknown solver `{other}`"))),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolverKind::Varisat => "varisat",
            SolverKind::CryptoMiniSat => "cryptominisat",
        })
    }
}
