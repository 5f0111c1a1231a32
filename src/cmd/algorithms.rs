// ============================================================================
// src/cmd/algorithms.rs – list the supported PRFs
// ============================================================================

use crate::algorithm::HashAlgorithm;

pub fn run_algorithms() {
    println!("{:<12} {:>5}  {}", "ALGORITHM", "HLEN", "MAX DERIVED BYTES");
    for alg in HashAlgorithm::ALL {
        println!(
            "{:<12} {:>5}  {}",
            alg.name(),
            alg.output_len(),
            alg.max_derived_len()
        );
    }
}
