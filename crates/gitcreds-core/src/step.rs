//! The credentials pipeline step
//!
//! Picks the secret path or the auth config path, resolves the credentials
//! and writes the git-credentials file.

use crate::{
    default_output_path_from_env, resolve_auth_config, resolve_secret, write_credentials_file,
    CoreError, CredentialLineSet, CurrentIdentity, HttpsMirror, Result, SecretCredentials,
    SecretStore,
};
use gitcreds_config::{AuthConfig, ConfigError};
use std::path::{Path, PathBuf};

/// Environment variable overriding the credentials secret name
pub const CREDENTIALS_FROM_SECRET_ENV: &str = "GITCREDS_CREDENTIALS_FROM_SECRET";

/// Options of a credentials step run
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
    /// Output file, defaults to the XDG git credentials location
    pub output_file: Option<PathBuf>,
    /// Only use identities scoped to this GitHub App owner
    pub github_app_owner: Option<String>,
    /// Only use servers of this git kind
    pub git_kind: Option<String>,
    /// Read credentials from this secret instead of the auth config
    pub credentials_secret: Option<String>,
    /// Namespace of the credentials secret
    pub namespace: String,
    pub github_app_mode: bool,
    pub https_mirror: HttpsMirror,
}

impl StepOptions {
    fn owner(&self) -> Option<&str> {
        self.github_app_owner.as_deref().filter(|o| !o.is_empty())
    }

    fn secret_name(&self) -> Option<&str> {
        self.credentials_secret.as_deref().filter(|s| !s.is_empty())
    }
}

/// Where credentials are read from
pub struct CredentialSources<'a> {
    pub secrets: Option<&'a dyn SecretStore>,
    pub auth_config: Option<AuthConfig>,
    pub current_identity: &'a dyn CurrentIdentity,
}

/// What a step run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Written { path: PathBuf, lines: usize },
    /// GitHub App mode without an owner: there is nothing to generate
    Skipped,
}

/// Load an auth config, treating a missing file as no config
pub fn load_auth_config(path: Option<&Path>) -> Result<Option<AuthConfig>> {
    let Some(path) = path else {
        return Ok(None);
    };
    match AuthConfig::load_from(path) {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::NotFound(p)) => {
            tracing::debug!("No auth config at {:?}", p);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve the credential lines without writing them.
///
/// Returns `None` when GitHub App mode is on and no owner was given.
pub async fn generate(
    options: &StepOptions,
    sources: CredentialSources<'_>,
) -> Result<Option<CredentialLineSet>> {
    if let Some(name) = options.secret_name() {
        let store = sources
            .secrets
            .ok_or_else(|| CoreError::MissingOption("secrets-dir".to_string()))?;

        let data = match store.get_secret(&options.namespace, name).await? {
            Some(data) => data,
            None => {
                tracing::warn!(
                    "Secret {:?} not found in namespace {:?}",
                    name,
                    options.namespace
                );
                Default::default()
            }
        };
        let credentials = SecretCredentials::from_secret_data(&data);
        return resolve_secret(&credentials, options.https_mirror).map(Some);
    }

    if options.github_app_mode && options.owner().is_none() {
        tracing::info!(
            "Nothing to do in GitHub App mode without the github-app-owner option"
        );
        return Ok(None);
    }

    let mut auth_config = sources.auth_config;
    if let (Some(config), Some(kind)) = (auth_config.as_mut(), options.git_kind.as_deref()) {
        if !kind.is_empty() {
            config.retain_kind(kind);
        }
    }

    resolve_auth_config(
        auth_config.as_ref(),
        options.owner(),
        sources.current_identity,
        options.https_mirror,
    )
    .map(Some)
}

/// Run the step: resolve the credentials and write the credentials file.
///
/// Nothing is written when resolution fails.
pub async fn run_step(options: &StepOptions, sources: CredentialSources<'_>) -> Result<StepOutcome> {
    let path = match options.output_file.clone() {
        Some(path) => path,
        None => default_output_path_from_env()
            .ok_or_else(|| CoreError::MissingOption("output".to_string()))?,
    };

    match generate(options, sources).await? {
        Some(lines) => {
            write_credentials_file(&path, &lines)?;
            Ok(StepOutcome::Written {
                path,
                lines: lines.len(),
            })
        }
        None => Ok(StepOutcome::Skipped),
    }
}
