// ============================================================================
// src/config.rs – strict config loader
// ============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithm::HashAlgorithm;
use crate::kdf::{self, DEFAULT_ITERATIONS, DEFAULT_OUTPUT_LEN};

/// Environment variable naming the config file to load when `--config` is absent.
pub const CONFIG_ENV: &str = "PBKDF2_FORGE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeriveCfg {
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Derived key length in bytes.
    #[serde(default = "default_length")]
    pub length: usize,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_length() -> usize {
    DEFAULT_OUTPUT_LEN
}

impl Default for DeriveCfg {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            iterations: default_iterations(),
            length: default_length(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lowercase hex on one line
    #[default]
    Hex,
    /// Raw key bytes
    Raw,
    /// JSON object with parameters and hex key
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputCfg {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalibrateCfg {
    /// Wall-clock budget for one derivation, in milliseconds.
    #[serde(default = "default_target_ms")]
    pub target_ms: u64,
}

fn default_target_ms() -> u64 {
    500
}

impl Default for CalibrateCfg {
    fn default() -> Self {
        Self {
            target_ms: default_target_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub derive: DeriveCfg,
    #[serde(default)]
    pub output: OutputCfg,
    #[serde(default)]
    pub calibrate: CalibrateCfg,
}

impl Config {
    pub fn load<P: AsRef<Path>>(p: P) -> Result<Self> {
        let s = fs::read_to_string(&p)
            .with_context(|| format!("read config: {}", p.as_ref().display()))?;
        let is_toml = p
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let cfg: Self = if is_toml {
            toml::from_str(&s).context("toml parse")?
        } else {
            serde_yaml::from_str(&s).context("yaml parse")?
        };
        cfg.validate()
            .with_context(|| format!("invalid config: {}", p.as_ref().display()))?;
        Ok(cfg)
    }

    /// Load `explicit` if given, else the file named by `$PBKDF2_FORGE_CONFIG`,
    /// else built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        kdf::validate(
            self.derive.algorithm,
            self.derive.iterations,
            self.derive.length,
        )?;
        if self.calibrate.target_ms == 0 {
            anyhow::bail!("calibrate.target_ms must be positive");
        }
        Ok(())
    }
}
