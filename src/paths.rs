//! Centralized path definitions for configuration files.
//!
//! Functions accept `&Path` so they work for the daemon, the CLI and tests
//! alike.

use std::path::{Path, PathBuf};

// ── Application identity ─────────────────────────────────────────

pub const APP_ID: &str = "propresenter-control";

// ── Leaf filenames ───────────────────────────────────────────────

pub const SETTINGS_FILE: &str = "settings.json";

// ── Config-dir functions (take config_dir) ───────────────────────

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

/// Default config directory: `$XDG_CONFIG_HOME/<app>` or `~/.config/<app>`,
/// falling back to the working directory.
pub fn default_config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_ID);
    }
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".config").join(APP_ID);
    }
    PathBuf::from(".").join(APP_ID)
}
