//! Test support utilities for gitcreds-core
//!
//! Provides an in-memory [`SecretStore`] so the credentials step can be
//! tested without a cluster or mounted secrets.

use crate::{Result, SecretData, SecretStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory secret store that records every lookup
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<(String, String), SecretData>,
    /// `(namespace, name)` of every `get_secret` call, in order
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret with raw data
    pub fn with_secret(mut self, namespace: &str, name: &str, data: SecretData) -> Self {
        self.secrets
            .insert((namespace.to_string(), name.to_string()), data);
        self
    }

    /// Add a credentials secret holding `user`, `token` and `url`
    pub fn with_credentials(
        self,
        namespace: &str,
        name: &str,
        user: &str,
        token: &str,
        url: &str,
    ) -> Self {
        let data = [("user", user), ("token", token), ("url", url)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        self.with_secret(namespace, name, data)
    }

    /// Lookups made so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>> {
        self.calls
            .lock()
            .unwrap()
            .push((namespace.to_string(), name.to_string()));
        Ok(self
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}
