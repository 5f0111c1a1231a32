// ============================================================================
// src/error.rs – typed failures of the key-derivation core
// ============================================================================

use thiserror::Error;

use crate::algorithm::HashAlgorithm;

/// Everything that can stop a derivation. Every variant is raised before any
/// HMAC work starts, so a failed call never yields partial key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KdfError {
    #[error("unknown hash algorithm: {name:?}")]
    UnknownAlgorithm { name: String },

    #[error("iteration count must be at least 1 (got {iterations})")]
    InvalidIterationCount { iterations: u32 },

    #[error("derived key length must be at least 1 byte (got {requested})")]
    InvalidOutputLength { requested: usize },

    #[error(
        "derived key too long: {algorithm} can produce at most {max} bytes but {requested} were requested"
    )]
    OutputTooLong {
        algorithm: HashAlgorithm,
        requested: usize,
        max: u64,
    },
}

pub type Result<T> = std::result::Result<T, KdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_long_message_carries_all_diagnostics() {
        let err = KdfError::OutputTooLong {
            algorithm: HashAlgorithm::Sha1,
            requested: 99,
            max: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("sha1"));
        assert!(msg.contains("99"));
        assert!(msg.contains("42"));
    }
}
