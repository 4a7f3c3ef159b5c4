//! Git auth configuration
//!
//! The auth configuration lists Git servers and the user identities that can
//! authenticate against each of them. It is normally written by the pipeline
//! tooling as `gitAuth.yaml`; JSON is accepted as well.

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Git auth configuration: an ordered list of servers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub servers: Vec<ServerAuthConfig>,
    /// Informational; server identity selection only uses `currentuser`
    #[serde(rename = "defaultusername", alias = "default_username")]
    pub default_username: String,
    /// URL of the server selected by default
    #[serde(rename = "currentserver", alias = "current_server")]
    pub current_server: String,
    #[serde(rename = "pipelineusername", alias = "pipeline_username")]
    pub pipeline_username: String,
    #[serde(rename = "pipelineserver", alias = "pipeline_server")]
    pub pipeline_server: String,
}

/// A Git host entry and its identities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerAuthConfig {
    pub url: String,
    pub users: Vec<UserAuth>,
    pub name: String,
    /// Git kind, e.g. "github", "gitlab", "bitbucketserver"
    pub kind: String,
    /// Username of the identity used when no owner filter is active
    #[serde(rename = "currentuser", alias = "current_user")]
    pub current_user: String,
}

/// One identity for a server. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAuth {
    pub username: String,
    #[serde(rename = "apitoken", alias = "api_token", alias = "apiToken")]
    pub api_token: String,
    #[serde(rename = "bearertoken", alias = "bearer_token", alias = "bearerToken")]
    pub bearer_token: String,
    pub password: String,
    #[serde(
        rename = "githubAppOwner",
        alias = "github_app_owner",
        alias = "githubappowner"
    )]
    pub github_app_owner: String,
}

impl AuthConfig {
    /// Load an auth config file.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config: Self = if is_json {
            serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            Self::from_yaml(&content).map_err(|e| ConfigError::YamlParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        tracing::debug!(
            "Loaded auth config from {:?}: {} server(s)",
            path,
            config.servers.len()
        );

        Ok(config)
    }

    /// Parse an auth config from YAML text. An empty document yields an empty config.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Keep only servers of the given git kind.
    ///
    /// Servers without a kind are kept, since the kind is only a hint.
    pub fn retain_kind(&mut self, kind: &str) {
        self.servers
            .retain(|s| s.kind.is_empty() || s.kind.eq_ignore_ascii_case(kind));
    }
}

impl ServerAuthConfig {
    /// The identity selected for this server when no owner filter is active.
    ///
    /// Picks the user named by `current_user`, falling back to the first user.
    pub fn current_auth(&self) -> Option<&UserAuth> {
        if !self.current_user.is_empty() {
            if let Some(user) = self
                .users
                .iter()
                .find(|u| u.username == self.current_user)
            {
                return Some(user);
            }
        }
        self.users.first()
    }
}
