// ============================================================================
// src/cmd/derive.rs – derive a key from a password and emit it
// ============================================================================

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::algorithm::HashAlgorithm;
use crate::config::{Config, OutputFormat};
use crate::kdf::Pbkdf2;
use crate::ui::UX;
use crate::util::atomic::atomic_write_key;
use crate::util::input::{read_password, read_salt, PasswordSource, SaltSource};

/// Flags for `derive`; `None` falls back to the config file.
#[derive(Debug, Clone, Default)]
pub struct DeriveOptions {
    pub algorithm: Option<HashAlgorithm>,
    pub iterations: Option<u32>,
    pub length: Option<usize>,
    pub salt: Option<String>,
    pub salt_hex: Option<String>,
    pub salt_file: Option<PathBuf>,
    pub password_env: Option<String>,
    pub password_stdin: bool,
    pub confirm: bool,
    pub format: Option<OutputFormat>,
    pub out: Option<PathBuf>,
    pub force: bool,
}

impl DeriveOptions {
    fn salt_source(&self) -> Result<SaltSource<'_>> {
        match (&self.salt, &self.salt_hex, &self.salt_file) {
            (Some(s), None, None) => Ok(SaltSource::Text(s)),
            (None, Some(h), None) => Ok(SaltSource::Hex(h)),
            (None, None, Some(p)) => Ok(SaltSource::File(p)),
            (None, None, None) => Err(anyhow!(
                "a salt is required (--salt, --salt-hex or --salt-file)"
            )),
            _ => Err(anyhow!(
                "--salt, --salt-hex and --salt-file are mutually exclusive"
            )),
        }
    }

    fn password_source(&self) -> PasswordSource {
        if let Some(var) = &self.password_env {
            PasswordSource::Env(var.clone())
        } else if self.password_stdin {
            PasswordSource::Stdin
        } else {
            PasswordSource::Prompt {
                confirm: self.confirm,
            }
        }
    }

    /// Merge flags over config defaults.
    pub fn params(&self, cfg: &Config, salt: Vec<u8>) -> Pbkdf2 {
        Pbkdf2::new(self.algorithm.unwrap_or(cfg.derive.algorithm))
            .with_salt(salt)
            .with_iterations(self.iterations.unwrap_or(cfg.derive.iterations))
            .with_output_len(self.length.unwrap_or(cfg.derive.length))
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    algorithm: HashAlgorithm,
    iterations: u32,
    length: usize,
    salt: String,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

/// Encode a derived key for output.
pub fn render(format: OutputFormat, params: &Pbkdf2, key: &[u8]) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Hex => Ok(format!("{}\n", hex::encode(key)).into_bytes()),
        OutputFormat::Raw => Ok(key.to_vec()),
        OutputFormat::Json => {
            let report = JsonReport {
                algorithm: params.algorithm,
                iterations: params.iterations,
                length: params.output_len,
                salt: hex::encode(&params.salt),
                key: hex::encode(key),
                note: (params.salt.len() < params.algorithm.output_len())
                    .then_some("salt shorter than hash output"),
            };
            let mut s = serde_json::to_string_pretty(&report).context("serialize JSON")?;
            s.push('\n');
            Ok(s.into_bytes())
        }
    }
}

/// Tell the operator when the salt is shorter than the hash output.
/// The status line honours `--quiet`; the tracing event stays at debug.
fn report_short_salt(ui: &UX, params: &Pbkdf2) -> bool {
    let h_len = params.algorithm.output_len();
    if params.salt.len() >= h_len {
        return false;
    }
    debug!(
        salt_len = params.salt.len(),
        h_len,
        "salt shorter than hash output"
    );
    ui.warn(&format!(
        "Salt is {} bytes; {h_len} bytes ({} output size) is recommended.",
        params.salt.len(),
        params.algorithm
    ));
    true
}

pub fn run_derive(ui: &UX, cfg: &Config, opts: &DeriveOptions) -> Result<()> {
    let salt = read_salt(&opts.salt_source()?)?;
    let params = opts.params(cfg, salt);
    params.validate()?;

    report_short_salt(ui, &params);

    let password = read_password(&opts.password_source())?;

    ui.phase("Forging key");
    ui.data_panel(
        "Parameters",
        &[
            ("algorithm", params.algorithm.to_string()),
            ("iterations", params.iterations.to_string()),
            ("length", format!("{} bytes", params.output_len)),
            ("hmac calls", params.hmac_invocations().to_string()),
        ],
    );

    let key = params.derive(&*password)?;
    info!(algorithm = %params.algorithm, length = key.len(), "derivation complete");

    let format = opts.format.unwrap_or(cfg.output.format);
    let bytes = render(format, &params, &key)?;

    match &opts.out {
        Some(path) => {
            atomic_write_key(path, &bytes, opts.force)?;
            ui.success(&format!("Key written to {}", path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes).context("write key to stdout")?;
            stdout.flush().context("flush stdout")?;
            ui.success("Key forged.");
        }
    }
    Ok(())
}
