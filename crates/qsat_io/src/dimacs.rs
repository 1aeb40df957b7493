//! DIMACS CNF export.
//!
//! Native XOR constraints are written as CryptoMiniSat `x` lines. An `x`
//! line asserts odd parity, so an even-parity constraint is written with its
//! first variable negated.

use anyhow::{Context, Result};
use qsat_core::{ConstraintSet, XorConstraint};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn write_xor<W: Write>(out: &mut W, xor: &XorConstraint) -> std::io::Result<()> {
    out.write_all(b"x")?;
    for (i, &var) in xor.vars.iter().enumerate() {
        if i == 0 && !xor.parity {
            write!(out, "-{var} ")?;
        } else {
            write!(out, "{var} ")?;
        }
    }
    writeln!(out, "0")
}

/// Writes `set` in DIMACS format.
///
/// # Arguments
///
/// * `set` - Clauses and native XOR constraints to export
/// * `comments` - Lines written first, each prefixed with `c `
/// * `out` - Destination
///
/// # Returns
///
/// Any I/O error from `out`. The header counts clauses and `x` lines
/// together, as CryptoMiniSat expects.
pub fn write_dimacs<W: Write>(set: &ConstraintSet, comments: &[String], out: &mut W) -> Result<()> {
    for comment in comments {
        writeln!(out, "c {comment}")?;
    }
    writeln!(
        out,
        "p cnf {} {}",
        set.num_vars(),
        set.num_clauses() + set.num_xors()
    )?;
    for clause in set.clauses() {
        for lit in clause {
            write!(out, "{lit} ")?;
        }
        writeln!(out, "0")?;
    }
    for xor in set.xors() {
        write_xor(out, xor)?;
    }
    Ok(())
}

/// Creates `path` and writes `set` to it through a buffered writer.
///
/// # Arguments
///
/// * `path` - File to create or truncate
/// * `set` - Constraint set to export
/// * `comments` - Leading `c` lines
pub fn write_dimacs_file<P: AsRef<Path>>(path: P, set: &ConstraintSet, comments: &[String]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create DIMACS file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_dimacs(set, comments, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsat_core::Lit;

    #[test]
    fn clauses_and_xor_lines() {
        let mut set = ConstraintSet::new();
        set.add_clause(vec![Lit::pos(1), Lit::neg(2)]);
        set.add_clause(Vec::new());
        set.add_xor(XorConstraint {
            vars: vec![1, 2, 3],
            parity: false,
        });
        set.add_xor(XorConstraint {
            vars: vec![4],
            parity: true,
        });

        let mut out = Vec::new();
        write_dimacs(&set, &["budget 2".to_string()], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "c budget 2\np cnf 4 4\n1 -2 0\n0\nx-1 2 3 0\nx4 0\n"
        );
    }
}
