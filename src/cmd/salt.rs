// ============================================================================
// src/cmd/salt.rs – random salt generation
// ============================================================================

use anyhow::{bail, Result};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::algorithm::HashAlgorithm;
use crate::ui::UX;

/// Fresh salt from the OS RNG.
pub fn generate_salt(len: usize) -> Vec<u8> {
    let mut salt = vec![0u8; len];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Print a hex salt. Length defaults to the hash output size.
pub fn run_salt(ui: &UX, algorithm: HashAlgorithm, length: Option<usize>) -> Result<()> {
    let len = length.unwrap_or(algorithm.output_len());
    if len == 0 {
        bail!("salt length must be positive");
    }
    if len < algorithm.output_len() {
        ui.warn(&format!(
            "{len}-byte salt is shorter than the {}-byte {algorithm} output.",
            algorithm.output_len()
        ));
    }
    println!("{}", hex::encode(generate_salt(len)));
    Ok(())
}
