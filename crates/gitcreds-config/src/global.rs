//! Global configuration for gitcreds
//!
//! Located at `~/.config/gitcreds/config.toml`

use crate::{ConfigError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global gitcreds configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub defaults: DefaultsConfig,
}

/// Default settings, overridden by command line flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Path to the git auth config (gitAuth.yaml)
    pub auth_config: Option<String>,
    /// Directory holding secrets, either volume mounts or secret manifests
    pub secrets_dir: Option<String>,
    /// Namespace secrets are looked up in
    pub namespace: String,
    /// Tokens are scoped per GitHub App owner
    pub github_app_mode: bool,
    /// Restrict the auth config to servers of this git kind
    pub git_kind: Option<String>,
    /// Where the credentials file is written
    pub output_file: Option<String>,
    /// Write the second (https) line even when the URL already uses https
    pub duplicate_https: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            auth_config: None,
            secrets_dir: None,
            namespace: "jx".to_string(),
            github_app_mode: false,
            git_kind: None,
            output_file: None,
            // Existing consumers of the credentials file expect the second line
            duplicate_https: true,
        }
    }
}

impl GlobalConfig {
    /// Load global configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            "Loaded config from {:?}: github_app_mode={}",
            path,
            config.defaults.github_app_mode
        );

        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "gitcreds").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.defaults.namespace, "jx");
        assert!(config.defaults.duplicate_https);
        assert!(!config.defaults.github_app_mode);
        assert!(config.defaults.auth_config.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[defaults]
auth_config = "/secrets/gitAuth.yaml"
namespace = "ci"
github_app_mode = true
git_kind = "github"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.defaults.auth_config,
            Some("/secrets/gitAuth.yaml".to_string())
        );
        assert_eq!(config.defaults.namespace, "ci");
        assert!(config.defaults.github_app_mode);
        assert_eq!(config.defaults.git_kind, Some("github".to_string()));
        // Unset keys keep their defaults
        assert!(config.defaults.duplicate_https);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.defaults.namespace, "jx");
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[defaults\nnamespace =").unwrap();

        let err = GlobalConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseError { .. }));
    }
}
