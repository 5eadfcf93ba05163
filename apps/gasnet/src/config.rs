//! # Configuration
//!
//! Optional TOML configuration. Every key has a default, so a missing
//! default file is not an error; a file named explicitly with `--config`
//! must exist.
//!
//! ```toml
//! data_file = "gasnet.txt"
//! audit_log = "gasnet.log"
//! json = false
//! ```

use gasnet_core::GasnetError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "gasnet.toml";

/// Data file used when neither the CLI nor the config names one.
pub const DEFAULT_DATA_FILE: &str = "gasnet.txt";

/// Audit log used when neither the CLI nor the config names one.
pub const DEFAULT_AUDIT_LOG: &str = "gasnet.log";

/// Settings read from the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Snapshot file holding pipes and stations.
    pub data_file: PathBuf,

    /// Append-only audit log. Audit lines still reach the console when this
    /// file cannot be opened.
    pub audit_log: PathBuf,

    /// Print command output as JSON.
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
            json: false,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, GasnetError> {
        toml::from_str(content)
            .map_err(|e| GasnetError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, GasnetError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GasnetError::ConfigError(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Load `explicit` if given, else `gasnet.toml` if present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, GasnetError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").expect("parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = Config::from_toml("data_file = \"net/data.txt\"\n").expect("parse");
        assert_eq!(config.data_file, PathBuf::from("net/data.txt"));
        assert_eq!(config.audit_log, PathBuf::from(DEFAULT_AUDIT_LOG));
        assert!(!config.json);
    }

    #[test]
    fn unknown_key_rejected() {
        let result = Config::from_toml("colour = true\n");
        assert!(matches!(result, Err(GasnetError::ConfigError(_))));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = Config::discover(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(GasnetError::ConfigError(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gasnet.toml");
        std::fs::write(&path, "json = true\naudit_log = \"audit.txt\"\n").expect("write");

        let config = Config::load(&path).expect("load");
        assert!(config.json);
        assert_eq!(config.audit_log, PathBuf::from("audit.txt"));
    }
}
