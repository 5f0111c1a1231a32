// ============================================================================
// src/cmd/mod.rs – command subsystem root
// ============================================================================
pub mod algorithms; // pbkdf2-forge algorithms
pub mod calibrate; // pbkdf2-forge calibrate
pub mod config; // pbkdf2-forge config init
pub mod derive; // pbkdf2-forge derive
pub mod salt; // pbkdf2-forge salt

pub use derive::DeriveOptions;
