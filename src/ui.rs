// ============================================================================
// src/ui.rs – operator-facing status lines (stderr only)
// ============================================================================

use console::Style;

/// Status output for the CLI. Everything goes to stderr so stdout carries
/// nothing but key material.
#[derive(Debug, Clone, Copy, Default)]
pub struct UX {
    pub quiet: bool,
}

impl UX {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn phase(&self, title: &str) {
        if self.quiet {
            return;
        }
        let style = Style::new().color256(202).bold();
        eprintln!("{}", style.apply_to(format!("▸ {title}")));
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {msg}", Style::new().cyan().apply_to("[info]"));
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {msg}", Style::new().green().bold().apply_to("[ ok ]"));
        }
    }

    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {msg}", Style::new().yellow().bold().apply_to("[warn]"));
        }
    }

    /// Errors are shown even in quiet mode.
    pub fn error(&self, msg: &str) {
        eprintln!("{} {msg}", Style::new().red().bold().apply_to("[fail]"));
    }

    /// Aligned key/value table.
    pub fn data_panel(&self, title: &str, rows: &[(&str, String)]) {
        if self.quiet {
            return;
        }
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        let key_style = Style::new().dim();
        eprintln!("{}", Style::new().bold().apply_to(title));
        for (key, value) in rows {
            eprintln!("  {:<width$}  {value}", key_style.apply_to(key), width = width);
        }
    }
}
