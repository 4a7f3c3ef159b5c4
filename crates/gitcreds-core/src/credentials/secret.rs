//! Secret-backed credentials
//!
//! A credentials secret holds three keys: `user`, `token` and `url`. Secrets
//! are read through [`SecretStore`], with implementations for Kubernetes
//! secret volume mounts and for `Secret` manifests on disk.

use crate::{CoreError, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raw key/value data of a secret
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// The `user`, `token` and `url` keys of a credentials secret
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretCredentials {
    pub user: String,
    pub token: String,
    pub url: String,
}

impl SecretCredentials {
    /// Decode the credential keys. Missing keys decode to an empty string.
    pub fn from_secret_data(data: &SecretData) -> Self {
        let field = |key: &str| {
            data.get(key)
                .map(|v| String::from_utf8_lossy(v).into_owned())
                .unwrap_or_default()
        };
        Self {
            user: field("user"),
            token: field("token"),
            url: field("url"),
        }
    }
}

/// Source of secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret. `Ok(None)` if it does not exist.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>>;
}

/// Validate a secret name before it is used as a path component.
///
/// Kubernetes names are lowercase alphanumerics, `-` and `.`.
fn is_valid_secret_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
}

fn check_secret_name(name: &str) -> Result<()> {
    if is_valid_secret_name(name) {
        Ok(())
    } else {
        Err(CoreError::Secret(format!("invalid secret name {:?}", name)))
    }
}

/// Secrets mounted as volumes: `<root>/<name>/<key>` holds each value.
///
/// Mounts are already namespace-scoped, so the namespace is ignored.
#[derive(Debug, Clone)]
pub struct MountedSecretStore {
    root: PathBuf,
}

impl MountedSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SecretStore for MountedSecretStore {
    async fn get_secret(&self, _namespace: &str, name: &str) -> Result<Option<SecretData>> {
        check_secret_name(name)?;
        let dir = self.root.join(name);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = SecretData::new();
        while let Some(entry) = entries.next_entry().await? {
            let key = entry.file_name().to_string_lossy().into_owned();
            // Kubernetes keeps its atomic-update bookkeeping in dot entries
            if key.starts_with('.') {
                continue;
            }
            // Follows the symlinks the kubelet creates for each key
            let metadata = tokio::fs::metadata(entry.path()).await?;
            if !metadata.is_file() {
                continue;
            }
            let value = tokio::fs::read(entry.path()).await?;
            data.insert(key, value);
        }

        tracing::debug!("Read {} key(s) from mounted secret {:?}", data.len(), dir);
        Ok(Some(data))
    }
}

/// `Secret` manifest as written by `kubectl get secret -o yaml`
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SecretManifest {
    kind: Option<String>,
    metadata: SecretMetadata,
    /// Base64-encoded values
    data: BTreeMap<String, String>,
    /// Plain values, taking precedence over `data`
    string_data: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SecretMetadata {
    name: Option<String>,
    namespace: Option<String>,
}

/// Secrets stored as manifests: `<root>/<name>.yaml`, `.yml` or `.json`
#[derive(Debug, Clone)]
pub struct ManifestSecretStore {
    root: PathBuf,
}

impl ManifestSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn find_manifest(&self, name: &str) -> Option<PathBuf> {
        ["yaml", "yml", "json"]
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", name, ext)))
            .find(|p| p.is_file())
    }
}

#[async_trait]
impl SecretStore for ManifestSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>> {
        check_secret_name(name)?;
        let path = match self.find_manifest(name) {
            Some(path) => path,
            None => return Ok(None),
        };

        let content = tokio::fs::read_to_string(&path).await?;
        let manifest = parse_manifest(&path, &content)?;

        if let Some(ref kind) = manifest.kind {
            if kind != "Secret" {
                return Err(CoreError::Secret(format!(
                    "{} is a {} manifest, not a Secret",
                    path.display(),
                    kind
                )));
            }
        }
        if let Some(ref ns) = manifest.metadata.namespace {
            if !namespace.is_empty() && ns != namespace {
                tracing::debug!(
                    "Secret manifest {:?} is in namespace {:?}, not {:?}",
                    path,
                    ns,
                    namespace
                );
                return Ok(None);
            }
        }
        if let Some(ref manifest_name) = manifest.metadata.name {
            if manifest_name != name {
                tracing::warn!(
                    "Secret manifest {:?} names secret {:?}, expected {:?}",
                    path,
                    manifest_name,
                    name
                );
            }
        }

        decode_manifest(manifest).map(Some)
    }
}

fn parse_manifest(path: &Path, content: &str) -> Result<SecretManifest> {
    let is_json = path.extension().map(|e| e == "json").unwrap_or(false);
    if is_json {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(serde_yaml::from_str(content)?)
    }
}

fn decode_manifest(manifest: SecretManifest) -> Result<SecretData> {
    let mut data = SecretData::new();
    for (key, encoded) in manifest.data {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let value = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| CoreError::Secret(format!("key {:?} is not valid base64: {}", key, e)))?;
        data.insert(key, value);
    }
    for (key, value) in manifest.string_data {
        data.insert(key, value.into_bytes());
    }
    Ok(data)
}
