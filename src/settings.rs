use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DriverError;

// ── Connection settings ──────────────────────────────────────────

/// Connection settings stored in the config directory.
///
/// The password is read from `settings.json` but never written back to logs
/// or inspection surfaces (see [`ConnectionInfo`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub version: u32,
    #[serde(default = "default_host")]
    pub host: String,
    /// Remote-control socket port.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    /// Host for the REST link. None = same as `host`.
    #[serde(default)]
    pub link_host: Option<String>,
    #[serde(default = "default_link_port")]
    pub link_port: u16,
    /// Firmware generation assumed until the remote reports its own.
    #[serde(default = "default_major_version")]
    pub major_version: u32,
    /// Instance label used in `$(label:name)` variable references.
    #[serde(default = "default_variable_prefix")]
    pub variable_prefix: String,
}

const SETTINGS_VERSION: u32 = 1;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    20652
}

fn default_link_port() -> u16 {
    1025
}

fn default_major_version() -> u32 {
    7
}

fn default_variable_prefix() -> String {
    "propresenter".to_string()
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            host: default_host(),
            port: default_port(),
            password: String::new(),
            link_host: None,
            link_port: default_link_port(),
            major_version: default_major_version(),
            variable_prefix: default_variable_prefix(),
        }
    }
}

impl ConnectionSettings {
    pub fn socket_url(&self) -> String {
        format!("ws://{}:{}/remote", self.host, self.port)
    }

    pub fn link_base_url(&self) -> String {
        let host = self.link_host.as_deref().unwrap_or(&self.host);
        format!("http://{host}:{}", self.link_port)
    }
}

/// Redacted view of the settings (no password).
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub has_password: bool,
    pub link_base_url: String,
    pub major_version: u32,
}

impl ConnectionInfo {
    #[must_use]
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            has_password: !settings.password.is_empty(),
            link_base_url: settings.link_base_url(),
            major_version: settings.major_version,
        }
    }
}

/// Load settings from the config directory. Returns None if no settings file
/// exists or it cannot be parsed.
pub fn load_settings(config_dir: &Path) -> Option<ConnectionSettings> {
    let path = crate::paths::settings_path(config_dir);
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable settings file");
            None
        }
    }
}

/// Save settings to the config directory (write to a sibling temp file, then
/// rename over the target).
pub fn save_settings(config_dir: &Path, settings: &ConnectionSettings) -> Result<(), DriverError> {
    fs::create_dir_all(config_dir)?;
    let path = crate::paths::settings_path(config_dir);
    let json = serde_json::to_string_pretty(settings).map_err(|e| DriverError::Settings {
        message: e.to_string(),
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

// ── Command-line overrides ──────────────────────────────────────

/// Connection flags shared by both binaries. Flags win over the file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConnectionArgs {
    /// Config directory holding settings.json
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Remote host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Remote-control socket port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// REST link port
    #[arg(long, global = true)]
    pub link_port: Option<u16>,
}

impl ConnectionArgs {
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir
            .clone()
            .unwrap_or_else(crate::paths::default_config_dir)
    }

    /// Settings from the config directory (or defaults) with flags applied.
    pub fn resolve(&self) -> ConnectionSettings {
        let mut settings = load_settings(&self.config_dir()).unwrap_or_default();
        self.apply(&mut settings);
        settings
    }

    pub fn apply(&self, settings: &mut ConnectionSettings) {
        if let Some(host) = &self.host {
            settings.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(link_port) = self.link_port {
            settings.link_port = link_port;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let dir = std::env::temp_dir().join("propresenter_test_settings");
        let _ = std::fs::remove_dir_all(&dir);

        let settings = ConnectionSettings {
            host: "10.0.0.5".into(),
            password: "secret".into(),
            ..ConnectionSettings::default()
        };
        save_settings(&dir, &settings).unwrap();

        let loaded = load_settings(&dir).expect("should load");
        assert_eq!(loaded.host, "10.0.0.5");
        assert_eq!(loaded.port, 20652);
        assert_eq!(loaded.password, "secret");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings: ConnectionSettings =
            serde_json::from_value(serde_json::json!({ "version": 1, "host": "stage-pc" })).unwrap();
        assert_eq!(settings.link_port, 1025);
        assert_eq!(settings.major_version, 7);
        assert_eq!(settings.socket_url(), "ws://stage-pc:20652/remote");
        assert_eq!(settings.link_base_url(), "http://stage-pc:1025");
    }

    #[test]
    fn test_info_hides_password() {
        let settings = ConnectionSettings {
            password: "secret".into(),
            ..ConnectionSettings::default()
        };
        let json = serde_json::to_string(&ConnectionInfo::from_settings(&settings)).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"has_password\":true"));
    }

    #[test]
    fn test_flags_override_file() {
        let args = ConnectionArgs {
            host: Some("booth".into()),
            link_port: Some(1030),
            ..ConnectionArgs::default()
        };
        let mut settings = ConnectionSettings {
            port: 5000,
            ..ConnectionSettings::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.host, "booth");
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.link_port, 1030);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = std::env::temp_dir().join("propresenter_test_no_settings");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(load_settings(&dir).is_none());
    }
}
