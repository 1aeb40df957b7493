use anyhow::{Context, Result, bail};
use bitvec::prelude::*;
use qsat_core::Witness;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Loads a Stim .b8 file (bit-packed records, LSB first).
pub fn load_b8_file<P: AsRef<Path>>(path: P) -> Result<BitVec<u8, Lsb0>> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open .b8 file {}", path.display()))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    // Stim packs each record little endian, padded to whole bytes
    Ok(BitVec::<u8, Lsb0>::from_vec(buffer))
}

/// Splits raw .b8 data into records of `bits_per_record` bits.
///
/// # Arguments
///
/// * `raw_bits` - Contents of a .b8 file
/// * `bits_per_record` - Payload bits per record, one per error mechanism
///
/// # Returns
///
/// One bit vector per record. Each record starts on a byte boundary, so the
/// padding bits that fill out its last byte are dropped. A trailing partial
/// record is ignored, and zero-width records yield nothing.
pub fn split_records(raw_bits: &BitSlice<u8, Lsb0>, bits_per_record: usize) -> Vec<BitVec<u8, Lsb0>> {
    let stride_bits = bits_per_record.div_ceil(8) * 8;
    if stride_bits == 0 {
        return Vec::new();
    }

    raw_bits
        .chunks_exact(stride_bits)
        .map(|record| record[..bits_per_record].to_bitvec())
        .collect()
}

/// Loads every error pattern stored in a .b8 file.
///
/// # Arguments
///
/// * `path` - File to read
/// * `num_errors` - Number of error mechanisms in the model
///
/// # Returns
///
/// One witness per record. Fails when the file size is not a whole number
/// of records or when the file holds no record at all.
pub fn load_witnesses<P: AsRef<Path>>(path: P, num_errors: usize) -> Result<Vec<Witness>> {
    let path = path.as_ref();
    let raw = load_b8_file(path)?;
    let stride_bits = num_errors.div_ceil(8) * 8;
    if stride_bits > 0 && raw.len() % stride_bits != 0 {
        bail!(
            "{}: {} bytes is not a whole number of {}-error records",
            path.display(),
            raw.len() / 8,
            num_errors
        );
    }
    let records = split_records(&raw, num_errors);
    if records.is_empty() {
        bail!("{}: no error pattern records", path.display());
    }
    Ok(records.into_iter().map(Witness::from_bits).collect())
}

/// Writes one error pattern as a single .b8 record, zero-padded to a byte.
pub fn write_witness<P: AsRef<Path>>(path: P, witness: &Witness) -> Result<()> {
    let path = path.as_ref();
    let mut bits = witness.as_bits().to_bitvec();
    bits.resize(witness.len().div_ceil(8) * 8, false);

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create .b8 file {}", path.display()))?;
    file.write_all(bits.as_raw_slice())?;
    Ok(())
}
