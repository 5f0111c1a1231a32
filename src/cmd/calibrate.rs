// ============================================================================
// src/cmd/calibrate.rs – pick an iteration count for a time budget
// ============================================================================

use anyhow::{bail, Result};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::algorithm::HashAlgorithm;
use crate::kdf::{self, block_count};
use crate::ui::UX;

const PROBE_START: u32 = 1_000;
const PROBE_MIN_ELAPSED: Duration = Duration::from_millis(50);
const PROBE_MAX: u32 = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub algorithm: HashAlgorithm,
    pub output_len: usize,
    pub probe_iterations: u32,
    pub probe_elapsed: Duration,
    pub iterations: u32,
}

/// Scale a single-block probe to `blocks` blocks within `target`.
/// Never returns less than 1.
pub fn suggest_iterations(
    probe_iterations: u32,
    probe_elapsed: Duration,
    target: Duration,
    blocks: u64,
) -> u32 {
    let probe_ns = probe_elapsed.as_nanos().max(1);
    let per_block = target.as_nanos() / u128::from(blocks.max(1));
    let scaled = per_block * u128::from(probe_iterations) / probe_ns;
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Time one-block derivations, doubling the iteration count until the
/// measurement is long enough to trust.
pub fn calibrate(algorithm: HashAlgorithm, output_len: usize, target: Duration) -> Result<Calibration> {
    if target.is_zero() {
        bail!("calibration target must be positive");
    }
    kdf::validate(algorithm, 1, output_len)?;

    let salt = vec![0u8; algorithm.output_len()];
    let mut iterations = PROBE_START;
    let elapsed = loop {
        let start = Instant::now();
        kdf::derive(algorithm, b"calibration", &salt, iterations, algorithm.output_len())?;
        let elapsed = start.elapsed();
        debug!(%algorithm, iterations, ?elapsed, "calibration probe");
        if elapsed >= PROBE_MIN_ELAPSED || iterations >= PROBE_MAX {
            break elapsed;
        }
        iterations *= 2;
    };

    Ok(Calibration {
        algorithm,
        output_len,
        probe_iterations: iterations,
        probe_elapsed: elapsed,
        iterations: suggest_iterations(
            iterations,
            elapsed,
            target,
            block_count(algorithm, output_len),
        ),
    })
}

pub fn run_calibrate(ui: &UX, algorithm: HashAlgorithm, output_len: usize, target_ms: u64) -> Result<()> {
    ui.phase(&format!("Calibrating {algorithm} for {target_ms} ms"));
    let cal = calibrate(algorithm, output_len, Duration::from_millis(target_ms))?;
    ui.data_panel(
        "Probe",
        &[
            ("iterations", cal.probe_iterations.to_string()),
            ("elapsed", format!("{:?}", cal.probe_elapsed)),
            ("blocks", block_count(algorithm, output_len).to_string()),
        ],
    );
    println!("{}", cal.iterations);
    ui.success(&format!(
        "Use --iterations {} for roughly {target_ms} ms per derivation.",
        cal.iterations
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_scales_linearly() {
        let n = suggest_iterations(1_000, Duration::from_millis(10), Duration::from_millis(500), 1);
        assert_eq!(n, 50_000);
    }

    #[test]
    fn suggestion_accounts_for_blocks() {
        let one = suggest_iterations(1_000, Duration::from_millis(10), Duration::from_millis(400), 1);
        let four = suggest_iterations(1_000, Duration::from_millis(10), Duration::from_millis(400), 4);
        assert_eq!(one, 4 * four);
    }

    #[test]
    fn suggestion_is_clamped() {
        assert_eq!(
            suggest_iterations(1, Duration::from_secs(10), Duration::from_nanos(1), 1),
            1
        );
        assert_eq!(
            suggest_iterations(u32::MAX, Duration::from_nanos(1), Duration::from_secs(100), 1),
            u32::MAX
        );
    }

    #[test]
    fn calibrate_rejects_bad_inputs() {
        assert!(calibrate(HashAlgorithm::Sha256, 32, Duration::ZERO).is_err());
        assert!(calibrate(HashAlgorithm::Sha256, 0, Duration::from_millis(1)).is_err());
    }

    #[test]
    fn calibrate_produces_positive_count() {
        let cal = calibrate(HashAlgorithm::Sha1, 20, Duration::from_millis(5)).unwrap();
        assert!(cal.iterations >= 1);
        assert!(cal.probe_iterations >= PROBE_START);
    }
}
