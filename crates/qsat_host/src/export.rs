use anyhow::Result;
use qsat_core::{EncodingConfig, ModelBuilder};
use qsat_io::{load_dem_file, write_dimacs_file};
use std::path::Path;

pub fn run_export(dem_path: &Path, max_errors: usize, config: &EncodingConfig, out: &Path) -> Result<()> {
    let model = load_dem_file(dem_path)?;
    let encoded = ModelBuilder::new(&model, *config)?.build(max_errors)?;

    let observables = encoded
        .observable_vars
        .iter()
        .map(|(l, v)| format!("L{l}={v}"))
        .collect::<Vec<_>>()
        .join(" ");
    let comments = vec![
        format!("model {}", dem_path.display()),
        format!(
            "max_errors {} method {} base_len {} cardinality {}",
            max_errors, config.xor_encoding, config.brute_force_limit, config.cardinality
        ),
        format!("error variables 1..={}", encoded.num_errors),
        format!("observable variables {observables}"),
    ];
    write_dimacs_file(out, &encoded.constraints, &comments)?;

    println!(
        "Wrote {} variables, {} clauses, {} xors to {}",
        encoded.stats.num_vars,
        encoded.stats.num_clauses,
        encoded.stats.num_xors,
        out.display()
    );
    Ok(())
}
