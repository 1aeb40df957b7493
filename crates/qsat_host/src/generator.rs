//! Benchmark model generator.
//!
//! Writes phenomenological repetition-code memory experiments as detector
//! error models. Data qubit `q` in round `t` flips the two neighbouring
//! parity checks of that round (one at the boundaries); a faulty measurement
//! of check `i` between rounds `t` and `t + 1` flips the same check in both
//! rounds. Only data errors on qubit 0 flip the logical observable, so the
//! lightest undetected logical error is a full row of `distance` data errors.

use anyhow::{Result, bail};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the model to any sink. Detector `i` of round `t` has index
/// `t * (distance - 1) + i` and coordinates `(2i + 1, t)`.
pub fn write_repetition_dem<W: Write>(out: &mut W, distance: u32, rounds: u32, p: f64) -> Result<()> {
    if distance < 2 {
        bail!("distance must be at least 2, got {distance}");
    }
    if rounds == 0 {
        bail!("at least one round is required");
    }
    if !(0.0..=1.0).contains(&p) {
        bail!("error probability {p} is outside [0, 1]");
    }

    let checks = distance - 1;
    let det = |i: u32, t: u32| t * checks + i;

    writeln!(out, "# repetition code d={} rounds={} p={}", distance, rounds, p)?;
    for t in 0..rounds {
        for q in 0..distance {
            write!(out, "error({})", p)?;
            if q > 0 {
                write!(out, " D{}", det(q - 1, t))?;
            }
            if q < checks {
                write!(out, " D{}", det(q, t))?;
            }
            if q == 0 {
                write!(out, " L0")?;
            }
            writeln!(out)?;
        }
        if t + 1 < rounds {
            for i in 0..checks {
                writeln!(out, "error({}) D{} D{}", p, det(i, t), det(i, t + 1))?;
            }
        }
    }
    for t in 0..rounds {
        for i in 0..checks {
            writeln!(out, "detector({}, {}) D{}", 2 * i + 1, t, det(i, t))?;
        }
    }
    writeln!(out, "logical_observable L0")?;
    Ok(())
}

pub fn generate_repetition_dem(path: &Path, distance: u32, rounds: u32, p: f64) -> Result<()> {
    println!(
        "Generating distance {} repetition code, {} rounds (p={})...",
        distance, rounds, p
    );
    let mut out = BufWriter::new(File::create(path)?);
    write_repetition_dem(&mut out, distance, rounds, p)?;
    out.flush()?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsat_core::{EncodingConfig, VarisatBackend, minimum_weight};
    use qsat_io::parse_dem;

    fn generated(distance: u32, rounds: u32) -> String {
        let mut out = Vec::new();
        write_repetition_dem(&mut out, distance, rounds, 0.01).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn layout_of_a_small_model() {
        let model = parse_dem(&generated(3, 2)).unwrap();
        // 3 data errors per round, 2 measurement errors between the rounds
        assert_eq!(model.num_errors(), 8);
        assert_eq!(model.num_detectors(), 4);
        assert_eq!(model.num_observables(), 1);
        assert_eq!(model.detector_groups().len(), 2);
        assert_eq!(model.mechanisms()[3].detectors, vec![0, 2]);
    }

    #[test]
    fn minimum_weight_equals_distance() {
        for distance in [2, 3, 4] {
            let model = parse_dem(&generated(distance, 3)).unwrap();
            for connectivity in [false, true] {
                let config = EncodingConfig {
                    connectivity,
                    ..EncodingConfig::default()
                };
                let min = minimum_weight(&model, &config, VarisatBackend::new)
                    .unwrap()
                    .unwrap();
                assert_eq!(min.weight, distance as usize);
            }
        }
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let mut sink = Vec::new();
        assert!(write_repetition_dem(&mut sink, 1, 3, 0.1).is_err());
        assert!(write_repetition_dem(&mut sink, 3, 0, 0.1).is_err());
        assert!(write_repetition_dem(&mut sink, 3, 3, 1.5).is_err());
    }
}
