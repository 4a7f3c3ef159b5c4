//! Command implementations

use anyhow::{Context, Result};
use clap::Args;
use gitcreds_config::GlobalConfig;
use gitcreds_core::{
    generate, load_auth_config, run_step, ConfiguredCurrentUser, CredentialSources, HttpsMirror,
    ManifestSecretStore, MountedSecretStore, SecretStore, StepOptions, StepOutcome,
};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub struct CredentialsArgs {
    /// The output file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// The owner (organisation or user name) if using GitHub App based tokens
    #[arg(short = 'g', long)]
    pub github_app_owner: Option<String>,

    /// The secret name to read the credentials from
    #[arg(short = 's', long)]
    pub credentials_secret: Option<String>,

    /// The git kind, e.g. github, gitlab, bitbucketserver
    #[arg(long)]
    pub git_kind: Option<String>,

    /// Path to the git auth config (gitAuth.yaml)
    #[arg(long)]
    pub auth_config: Option<PathBuf>,

    /// Directory holding the secrets
    #[arg(long)]
    pub secrets_dir: Option<PathBuf>,

    /// How secrets are laid out in the secrets directory
    #[arg(long, value_parser = ["mount", "manifest"], default_value = "mount")]
    pub secret_format: String,

    /// Namespace of the credentials secret
    #[arg(long)]
    pub namespace: Option<String>,

    /// Tokens are scoped per GitHub App owner
    #[arg(long)]
    pub github_app_mode: bool,

    /// Only write the https line for http URLs
    #[arg(long)]
    pub no_duplicate_https: bool,

    /// Print the credentials instead of writing the file
    #[arg(long)]
    pub stdout: bool,
}

impl CredentialsArgs {
    /// Merge flags over the global config defaults
    fn step_options(&self, config: &GlobalConfig, secret_override: Option<String>) -> StepOptions {
        let defaults = &config.defaults;
        let https_mirror = if self.no_duplicate_https || !defaults.duplicate_https {
            HttpsMirror::HttpOnly
        } else {
            HttpsMirror::Always
        };

        StepOptions {
            output_file: self
                .output
                .clone()
                .or_else(|| defaults.output_file.as_ref().map(PathBuf::from)),
            github_app_owner: self.github_app_owner.clone(),
            git_kind: self.git_kind.clone().or_else(|| defaults.git_kind.clone()),
            credentials_secret: secret_override.or_else(|| self.credentials_secret.clone()),
            namespace: self
                .namespace
                .clone()
                .unwrap_or_else(|| defaults.namespace.clone()),
            github_app_mode: self.github_app_mode || defaults.github_app_mode,
            https_mirror,
        }
    }

    fn secret_store(&self, config: &GlobalConfig) -> Option<Box<dyn SecretStore>> {
        let dir = self
            .secrets_dir
            .clone()
            .or_else(|| config.defaults.secrets_dir.as_ref().map(PathBuf::from))?;
        let store: Box<dyn SecretStore> = match self.secret_format.as_str() {
            "manifest" => Box::new(ManifestSecretStore::new(dir)),
            _ => Box::new(MountedSecretStore::new(dir)),
        };
        Some(store)
    }

    fn auth_config_path(&self, config: &GlobalConfig) -> Option<PathBuf> {
        self.auth_config
            .clone()
            .or_else(|| config.defaults.auth_config.as_ref().map(PathBuf::from))
    }
}

/// Generate the git credentials file
pub async fn credentials(
    args: CredentialsArgs,
    config: &GlobalConfig,
    secret_override: Option<String>,
) -> Result<()> {
    let options = args.step_options(config, secret_override);
    let store = args.secret_store(config);
    let auth_config = load_auth_config(args.auth_config_path(config).as_deref())?;

    let sources = CredentialSources {
        secrets: store.as_deref(),
        auth_config,
        current_identity: &ConfiguredCurrentUser,
    };

    if args.stdout {
        if let Some(lines) = generate(&options, sources).await? {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&lines.to_bytes())?;
            stdout.flush()?;
        }
        return Ok(());
    }

    match run_step(&options, sources)
        .await
        .context("creating git credentials")?
    {
        StepOutcome::Written { path, lines } => {
            tracing::debug!("Wrote {} line(s) to {}", lines, path.display());
        }
        StepOutcome::Skipped => {}
    }
    Ok(())
}

/// Show the global configuration
pub fn config(config: &GlobalConfig, path: &Path) -> Result<()> {
    println!("Config file: {}", path.display());
    if !path.exists() {
        println!("(not found, showing defaults)");
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
