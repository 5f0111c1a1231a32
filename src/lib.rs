// ============================================================================
// src/lib.rs – PBKDF2 Forge library root
// ============================================================================
//! PBKDF2 (RFC 8018 §5.2) over a fixed table of HMAC hash functions.
//!
//! ```
//! use pbkdf2_forge::{derive, HashAlgorithm};
//!
//! let key = derive(HashAlgorithm::Sha256, b"password", b"salt", 4096, 32)?;
//! assert_eq!(key.len(), 32);
//! # Ok::<(), pbkdf2_forge::KdfError>(())
//! ```

pub mod algorithm;
pub mod cmd;
pub mod config;
pub mod error;
pub mod kdf;
pub mod ui;
pub mod util;

pub use algorithm::HashAlgorithm;
pub use error::KdfError;
pub use kdf::{derive, validate, Pbkdf2};
