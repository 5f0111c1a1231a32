// ============================================================================
// src/cmd/config.rs – write a starter config file
// ============================================================================

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::ui::UX;
use crate::util::atomic::atomic_write_toml;

pub fn run_config_init(ui: &UX, path: &Path, force: bool) -> Result<()> {
    atomic_write_toml(path, &Config::default(), force)?;
    info!(path = %path.display(), "default config written");
    ui.success(&format!("Config written to {}", path.display()));
    Ok(())
}
