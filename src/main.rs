// ============================================================================
// src/main.rs – pbkdf2-forge command line
// ============================================================================

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pbkdf2_forge::cmd::{algorithms, calibrate, config as config_cmd, derive, salt};
use pbkdf2_forge::config::{Config, OutputFormat};
use pbkdf2_forge::ui::UX;
use pbkdf2_forge::HashAlgorithm;

#[derive(Parser, Debug)]
#[command(name = "pbkdf2-forge", version, about = "PBKDF2 key derivation (RFC 8018)")]
struct Cli {
    /// Config file (TOML, or YAML for any other extension)
    /// (falls back to $PBKDF2_FORGE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress status output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive a key; the result goes to stdout or --out
    Derive {
        #[arg(short, long)]
        algorithm: Option<HashAlgorithm>,
        #[arg(short, long)]
        iterations: Option<u32>,
        /// Derived key length in bytes
        #[arg(short, long)]
        length: Option<usize>,
        /// Salt as literal text
        #[arg(long, group = "salt_input")]
        salt: Option<String>,
        /// Salt as hex
        #[arg(long, group = "salt_input")]
        salt_hex: Option<String>,
        /// Salt read raw from a file
        #[arg(long, group = "salt_input")]
        salt_file: Option<PathBuf>,
        /// Read the password from this environment variable
        #[arg(long, group = "password_input")]
        password_env: Option<String>,
        /// Read the password from the first line of stdin
        #[arg(long, group = "password_input")]
        password_stdin: bool,
        /// Ask twice when prompting
        #[arg(long)]
        confirm: bool,
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Write the key to this file (mode 0400) instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Overwrite --out if it exists
        #[arg(long)]
        force: bool,
    },
    /// Print a random hex salt
    Salt {
        #[arg(short, long)]
        algorithm: Option<HashAlgorithm>,
        /// Salt length in bytes (default: hash output size)
        #[arg(short, long)]
        length: Option<usize>,
    },
    /// List supported hash algorithms
    Algorithms,
    /// Suggest an iteration count for a time budget
    Calibrate {
        #[arg(short, long)]
        algorithm: Option<HashAlgorithm>,
        #[arg(short, long)]
        length: Option<usize>,
        /// Target milliseconds per derivation
        #[arg(short, long)]
        target_ms: Option<u64>,
    },
    /// Config file helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write the default config
    Init {
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ui = UX::new(cli.quiet);

    if let Err(err) = run(cli, &ui) {
        ui.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli, ui: &UX) -> Result<()> {
    let config_path = cli.config;
    let load_config = || Config::resolve(config_path.as_deref());

    match cli.command {
        Command::Derive {
            algorithm,
            iterations,
            length,
            salt,
            salt_hex,
            salt_file,
            password_env,
            password_stdin,
            confirm,
            format,
            out,
            force,
        } => {
            let opts = derive::DeriveOptions {
                algorithm,
                iterations,
                length,
                salt,
                salt_hex,
                salt_file,
                password_env,
                password_stdin,
                confirm,
                format,
                out,
                force,
            };
            derive::run_derive(ui, &load_config()?, &opts)
        }
        Command::Salt { algorithm, length } => {
            let cfg = load_config()?;
            salt::run_salt(ui, algorithm.unwrap_or(cfg.derive.algorithm), length)
        }
        Command::Algorithms => {
            algorithms::run_algorithms();
            Ok(())
        }
        Command::Calibrate {
            algorithm,
            length,
            target_ms,
        } => {
            let cfg = load_config()?;
            calibrate::run_calibrate(
                ui,
                algorithm.unwrap_or(cfg.derive.algorithm),
                length.unwrap_or(cfg.derive.length),
                target_ms.unwrap_or(cfg.calibrate.target_ms),
            )
        }
        Command::Config {
            action: ConfigAction::Init { path, force },
        } => config_cmd::run_config_init(ui, &path, force),
    }
}
