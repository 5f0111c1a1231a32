// ============================================================================
// src/algorithm.rs – hash selector table and HMAC collaborator
// ============================================================================

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::Mac;
use serde::{Deserialize, Serialize};

use crate::error::KdfError;

/// Runs `$body` with `$mac` bound to the concrete HMAC type for `$alg`.
///
/// Keeps the selector-to-type mapping in one exhaustive match so the HMAC
/// collaborator and the derivation loop can never disagree on it.
macro_rules! with_hmac {
    ($alg:expr, $mac:ident => $body:expr) => {
        match $alg {
            $crate::algorithm::HashAlgorithm::Md4 => {
                type $mac = ::hmac::Hmac<::md4::Md4>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Md5 => {
                type $mac = ::hmac::Hmac<::md5::Md5>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha1 => {
                type $mac = ::hmac::Hmac<::sha1::Sha1>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha224 => {
                type $mac = ::hmac::Hmac<::sha2::Sha224>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha256 => {
                type $mac = ::hmac::Hmac<::sha2::Sha256>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha384 => {
                type $mac = ::hmac::Hmac<::sha2::Sha384>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha512 => {
                type $mac = ::hmac::Hmac<::sha2::Sha512>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha3_224 => {
                type $mac = ::hmac::Hmac<::sha3::Sha3_224>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha3_256 => {
                type $mac = ::hmac::Hmac<::sha3::Sha3_256>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha3_384 => {
                type $mac = ::hmac::Hmac<::sha3::Sha3_384>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Sha3_512 => {
                type $mac = ::hmac::Hmac<::sha3::Sha3_512>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Keccak224 => {
                type $mac = ::hmac::Hmac<::sha3::Keccak224>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Keccak256 => {
                type $mac = ::hmac::Hmac<::sha3::Keccak256>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Keccak384 => {
                type $mac = ::hmac::Hmac<::sha3::Keccak384>;
                $body
            }
            $crate::algorithm::HashAlgorithm::Keccak512 => {
                type $mac = ::hmac::Hmac<::sha3::Keccak512>;
                $body
            }
        }
    };
}

pub(crate) use with_hmac;

/// Hash functions PBKDF2 can be keyed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    Md4,
    Md5,
    Sha1,
    Sha224,
    /// SHA-256; the default PRF.
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    /// Original Keccak padding (pre-FIPS 202), as used by Ethereum.
    Keccak224,
    Keccak256,
    Keccak384,
    Keccak512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 15] = [
        HashAlgorithm::Md4,
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
        HashAlgorithm::Sha3_224,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Sha3_384,
        HashAlgorithm::Sha3_512,
        HashAlgorithm::Keccak224,
        HashAlgorithm::Keccak256,
        HashAlgorithm::Keccak384,
        HashAlgorithm::Keccak512,
    ];

    /// Digest size in bytes (`hLen`).
    pub const fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Md4 | HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 | HashAlgorithm::Sha3_224 | HashAlgorithm::Keccak224 => 28,
            HashAlgorithm::Sha256 | HashAlgorithm::Sha3_256 | HashAlgorithm::Keccak256 => 32,
            HashAlgorithm::Sha384 | HashAlgorithm::Sha3_384 | HashAlgorithm::Keccak384 => 48,
            HashAlgorithm::Sha512 | HashAlgorithm::Sha3_512 | HashAlgorithm::Keccak512 => 64,
        }
    }

    /// Largest derivable key, `(2^32 - 1) * hLen` bytes.
    pub const fn max_derived_len(self) -> u64 {
        u32::MAX as u64 * self.output_len() as u64
    }

    /// Canonical lowercase name, also used in config files.
    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md4 => "md4",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha3_224 => "sha3-224",
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Sha3_384 => "sha3-384",
            HashAlgorithm::Sha3_512 => "sha3-512",
            HashAlgorithm::Keccak224 => "keccak-224",
            HashAlgorithm::Keccak256 => "keccak-256",
            HashAlgorithm::Keccak384 => "keccak-384",
            HashAlgorithm::Keccak512 => "keccak-512",
        }
    }

    /// Compute `HMAC(key, message)`; the result is always `output_len()` bytes.
    pub fn hmac(self, key: &[u8], message: &[u8]) -> Vec<u8> {
        with_hmac!(self, M => mac::<M>(key, message))
    }
}

/// Key a fresh HMAC instance. HMAC pads or hashes the key to the block size,
/// so every key length is accepted.
pub(crate) fn keyed<M: Mac + KeyInit>(key: &[u8]) -> M {
    match <M as KeyInit>::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    }
}

fn mac<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = keyed::<M>(key);
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = KdfError;

    /// Case-insensitive; `-` and `_` separators are optional
    /// (`SHA-256`, `sha3_512` and `keccak256` all parse).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let alg = match folded.as_str() {
            "md4" => HashAlgorithm::Md4,
            "md5" => HashAlgorithm::Md5,
            "sha1" => HashAlgorithm::Sha1,
            "sha224" => HashAlgorithm::Sha224,
            "sha256" => HashAlgorithm::Sha256,
            "sha384" => HashAlgorithm::Sha384,
            "sha512" => HashAlgorithm::Sha512,
            "sha3224" => HashAlgorithm::Sha3_224,
            "sha3256" => HashAlgorithm::Sha3_256,
            "sha3384" => HashAlgorithm::Sha3_384,
            "sha3512" => HashAlgorithm::Sha3_512,
            "keccak224" => HashAlgorithm::Keccak224,
            "keccak256" => HashAlgorithm::Keccak256,
            "keccak384" => HashAlgorithm::Keccak384,
            "keccak512" => HashAlgorithm::Keccak512,
            _ => {
                return Err(KdfError::UnknownAlgorithm {
                    name: s.to_string(),
                })
            }
        };
        Ok(alg)
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = KdfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(alg: HashAlgorithm) -> Self {
        alg.name().to_string()
    }
}
