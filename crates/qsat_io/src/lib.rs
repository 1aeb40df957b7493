//! I/O utilities for failure-check inputs and outputs.
//!
//! Provides functions for reading detector error models (.dem files), for
//! reading and writing failing error patterns (.b8 files), and for exporting
//! constraint sets in DIMACS form so they can be handed to external solvers,
//! including the CryptoMiniSat back end for native XOR builds.

/// CryptoMiniSat process adapter.
///
/// A solver back end that accepts native XOR constraints by handing the
/// extended DIMACS export to an external `cryptominisat5` binary.
pub mod cryptominisat;

/// DIMACS export of constraint sets.
///
/// Writes plain CNF clauses and, for native XOR builds, CryptoMiniSat
/// extended `x` lines.
pub mod dimacs;

/// Error pattern files in Stim .b8 format.
///
/// Reads bit-packed records into witnesses and writes witnesses back out, one
/// record per pattern, least significant bit first.
pub mod loader;

/// Parser for detector error models in Stim DEM format.
///
/// Expands `repeat` blocks, applies `shift_detectors` offsets, and builds a
/// validated `ErrorModel` together with the x-coordinate grouping of the
/// declared detectors.
pub mod parser;

pub use cryptominisat::{CryptoMiniSatBackend, CryptoMiniSatConfig};
pub use dimacs::{write_dimacs, write_dimacs_file};
pub use loader::{load_b8_file, load_witnesses, write_witness};
pub use parser::{load_dem_file, parse_dem};
