//! Error types for gitcreds-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] gitcreds_config::ConfigError),

    #[error("No git auth config found")]
    ConfigurationMissing,

    #[error("Invalid git service URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Missing option: --{0}")]
    MissingOption(String),

    #[error("Secret error: {0}")]
    Secret(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    pub(crate) fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
