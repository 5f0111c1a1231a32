// ============================================================================
// src/kdf.rs – PBKDF2 (RFC 8018 §5.2) over any supported HMAC
// ============================================================================

use hmac::digest::{KeyInit, Output};
use hmac::Mac;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

use crate::algorithm::{keyed, with_hmac, HashAlgorithm};
use crate::error::{KdfError, Result};

/// Iteration count used when the caller does not choose one.
pub const DEFAULT_ITERATIONS: u32 = 600_000;
/// Derived key length used when the caller does not choose one.
pub const DEFAULT_OUTPUT_LEN: usize = 32;

/// Check derivation parameters without doing any hashing.
///
/// The RFC length bound is checked first so an oversized request reports the
/// algorithm, the requested length and the maximum together.
pub fn validate(algorithm: HashAlgorithm, iterations: u32, output_len: usize) -> Result<()> {
    let max = algorithm.max_derived_len();
    if output_len as u64 > max {
        return Err(KdfError::OutputTooLong {
            algorithm,
            requested: output_len,
            max,
        });
    }
    if iterations < 1 {
        return Err(KdfError::InvalidIterationCount { iterations });
    }
    if output_len < 1 {
        return Err(KdfError::InvalidOutputLength {
            requested: output_len,
        });
    }
    Ok(())
}

/// Number of `hLen`-byte blocks needed for `output_len` bytes.
pub fn block_count(algorithm: HashAlgorithm, output_len: usize) -> u64 {
    (output_len as u64).div_ceil(algorithm.output_len() as u64)
}

/// Total HMAC evaluations a derivation performs: `iterations * blocks`.
pub fn hmac_invocations(algorithm: HashAlgorithm, iterations: u32, output_len: usize) -> u64 {
    u64::from(iterations) * block_count(algorithm, output_len)
}

/// Derive `output_len` bytes from `password` and `salt`.
///
/// ```
/// use pbkdf2_forge::{derive, HashAlgorithm};
///
/// let key = derive(HashAlgorithm::Sha256, b"password", b"salt", 2, 32).unwrap();
/// assert_eq!(
///     hex::encode(key),
///     "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43"
/// );
/// ```
pub fn derive(
    algorithm: HashAlgorithm,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_len: usize,
) -> Result<Vec<u8>> {
    validate(algorithm, iterations, output_len)?;

    debug!(
        %algorithm,
        iterations,
        output_len,
        blocks = block_count(algorithm, output_len),
        "deriving key"
    );
    let start = Instant::now();

    let mut out = vec![0u8; output_len];
    with_hmac!(algorithm, M => pbkdf2::<M>(password, salt, iterations, &mut out));

    debug!(%algorithm, elapsed = ?start.elapsed(), "key derived");
    Ok(out)
}

/// Fill `out` with PBKDF2 output. Parameters are already validated, so the
/// block count fits the 32-bit counter.
fn pbkdf2<M: Mac + KeyInit + Clone>(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
    let prf = keyed::<M>(password);
    let h_len = <M as hmac::digest::OutputSizeUser>::output_size();

    for (counter, chunk) in (1..=u32::MAX).zip(out.chunks_mut(h_len)) {
        let block = pbkdf2_block(&prf, salt, iterations, counter);
        chunk.copy_from_slice(&block[..chunk.len()]);
        trace!(counter, "block done");
    }
}

/// `F(P, S, c, i) = U_1 ^ U_2 ^ ... ^ U_c`.
fn pbkdf2_block<M: Mac + Clone>(prf: &M, salt: &[u8], iterations: u32, counter: u32) -> Output<M> {
    let mut mac = prf.clone();
    mac.update(salt);
    mac.update(&counter.to_be_bytes());
    let mut u = mac.finalize().into_bytes();
    let mut result = u.clone();

    for _ in 1..iterations {
        let mut mac = prf.clone();
        mac.update(&u);
        u = mac.finalize().into_bytes();
        for (r, b) in result.iter_mut().zip(u.iter()) {
            *r ^= b;
        }
    }

    result
}

/// A reusable PBKDF2 parameter set.
///
/// ```
/// use pbkdf2_forge::{HashAlgorithm, Pbkdf2};
///
/// let params = Pbkdf2::new(HashAlgorithm::Sha1)
///     .with_salt(b"salt")
///     .with_iterations(1)
///     .with_output_len(20);
/// let key = params.derive(b"password").unwrap();
/// assert_eq!(hex::encode(key), "0c60c80f961f0e71f3a9b524af6012062fe037a6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbkdf2 {
    pub algorithm: HashAlgorithm,
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,
    pub iterations: u32,
    pub output_len: usize,
}

impl Default for Pbkdf2 {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl Pbkdf2 {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            salt: Vec::new(),
            iterations: DEFAULT_ITERATIONS,
            output_len: DEFAULT_OUTPUT_LEN,
        }
    }

    pub fn with_salt(mut self, salt: impl AsRef<[u8]>) -> Self {
        self.salt = salt.as_ref().to_vec();
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_output_len(mut self, output_len: usize) -> Self {
        self.output_len = output_len;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate(self.algorithm, self.iterations, self.output_len)
    }

    pub fn derive(&self, password: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        derive(
            self.algorithm,
            password.as_ref(),
            &self.salt,
            self.iterations,
            self.output_len,
        )
    }

    pub fn hmac_invocations(&self) -> u64 {
        hmac_invocations(self.algorithm, self.iterations, self.output_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straight-line RFC 8018 reference built only on the HMAC collaborator.
    fn reference(alg: HashAlgorithm, p: &[u8], s: &[u8], c: u32, dk_len: usize) -> Vec<u8> {
        let mut dk = Vec::new();
        let mut i = 1u32;
        while dk.len() < dk_len {
            let mut msg = s.to_vec();
            msg.extend_from_slice(&i.to_be_bytes());
            let mut u = alg.hmac(p, &msg);
            let mut t = u.clone();
            for _ in 2..=c {
                u = alg.hmac(p, &u);
                t.iter_mut().zip(&u).for_each(|(a, b)| *a ^= b);
            }
            dk.extend_from_slice(&t);
            i += 1;
        }
        dk.truncate(dk_len);
        dk
    }

    #[test]
    fn matches_collaborator_reference_for_every_algorithm() {
        for alg in HashAlgorithm::ALL {
            let len = alg.output_len() * 2 + 3;
            let got = derive(alg, b"pw", b"NaCl", 3, len).unwrap();
            assert_eq!(got, reference(alg, b"pw", b"NaCl", 3, len), "{alg}");
        }
    }

    #[test]
    fn derive_is_deterministic() {
        let a = derive(HashAlgorithm::Sha512, b"password", b"salt", 10, 100).unwrap();
        let b = derive(HashAlgorithm::Sha512, b"password", b"salt", 10, 100).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn output_has_exact_requested_length() {
        for len in [1, 5, 31, 32, 33, 64, 65, 200] {
            let key = derive(HashAlgorithm::Sha256, b"p", b"s", 2, len).unwrap();
            assert_eq!(key.len(), len);
        }
    }

    #[test]
    fn shorter_output_is_prefix_of_longer() {
        let short = derive(HashAlgorithm::Sha1, b"p", b"s", 5, 17).unwrap();
        let long = derive(HashAlgorithm::Sha1, b"p", b"s", 5, 57).unwrap();
        assert_eq!(&long[..17], &short[..]);
    }

    #[test]
    fn blocks_are_not_repeated() {
        let key = derive(HashAlgorithm::Sha256, b"p", b"s", 1, 64).unwrap();
        assert_ne!(key[..32], key[32..]);
    }

    #[test]
    fn iteration_count_changes_output() {
        let one = derive(HashAlgorithm::Sha256, b"p", b"s", 1, 32).unwrap();
        let two = derive(HashAlgorithm::Sha256, b"p", b"s", 2, 32).unwrap();
        assert_ne!(one, two);
    }

    #[test]
    fn empty_password_and_salt_are_allowed() {
        let key = derive(HashAlgorithm::Sha256, b"", b"", 1, 16).unwrap();
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn zero_iterations_rejected() {
        assert_eq!(
            derive(HashAlgorithm::Sha256, b"p", b"s", 0, 32),
            Err(KdfError::InvalidIterationCount { iterations: 0 })
        );
    }

    #[test]
    fn zero_length_rejected() {
        assert_eq!(
            derive(HashAlgorithm::Sha256, b"p", b"s", 1, 0),
            Err(KdfError::InvalidOutputLength { requested: 0 })
        );
    }

    #[test]
    fn length_bound_is_inclusive() {
        for alg in HashAlgorithm::ALL {
            let max = alg.max_derived_len() as usize;
            assert_eq!(validate(alg, 1, max), Ok(()));
            assert_eq!(
                validate(alg, 1, max + 1),
                Err(KdfError::OutputTooLong {
                    algorithm: alg,
                    requested: max + 1,
                    max: max as u64,
                })
            );
        }
    }

    #[test]
    fn too_long_reported_before_other_failures() {
        let over = HashAlgorithm::Md5.max_derived_len() as usize + 1;
        assert!(matches!(
            validate(HashAlgorithm::Md5, 0, over),
            Err(KdfError::OutputTooLong { .. })
        ));
    }

    #[test]
    fn too_long_derive_fails_without_allocating() {
        let over = HashAlgorithm::Sha1.max_derived_len() as usize + 1;
        assert!(matches!(
            derive(HashAlgorithm::Sha1, b"p", b"s", 1, over),
            Err(KdfError::OutputTooLong { .. })
        ));
    }

    #[test]
    fn cost_accounting() {
        assert_eq!(block_count(HashAlgorithm::Sha256, 32), 1);
        assert_eq!(block_count(HashAlgorithm::Sha256, 33), 2);
        assert_eq!(block_count(HashAlgorithm::Sha1, 64), 4);
        assert_eq!(hmac_invocations(HashAlgorithm::Sha1, 1000, 64), 4000);
    }

    #[test]
    fn params_derive_matches_free_function() {
        let params = Pbkdf2::new(HashAlgorithm::Sha384)
            .with_salt("pepper")
            .with_iterations(7)
            .with_output_len(50);
        assert_eq!(
            params.derive("hunter2").unwrap(),
            derive(HashAlgorithm::Sha384, b"hunter2", b"pepper", 7, 50).unwrap()
        );
        assert_eq!(params.hmac_invocations(), 14);
    }

    #[test]
    fn params_serialize_with_hex_salt() {
        let params = Pbkdf2::default().with_salt([0xde_u8, 0xad]);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"salt\":\"dead\""));
        assert!(json.contains("\"algorithm\":\"sha256\""));
        let back: Pbkdf2 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
