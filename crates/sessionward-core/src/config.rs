//! Application configuration management.
//!
//! This module handles loading and saving the configuration: storage
//! namespace and backend, renewal margin, default token lifetime, and where
//! credentials get verified (the mock directory or an HTTPS API).
//!
//! Configuration is stored at `~/.config/sessionward/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_LIFETIME_MINUTES;
use crate::scheduler::DEFAULT_REFRESH_MARGIN_MINUTES;
use crate::store::{
    FileBackend, KeyringBackend, MemoryBackend, SessionStore, StorageBackend, DEFAULT_NAMESPACE,
};
use crate::verifier::{CredentialVerifier, HttpVerifier, MockVerifier};

/// Application name used for config/data directory paths
const APP_NAME: &str = "sessionward";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Where the session is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub namespace: String,
    pub storage: StorageKind,
    pub refresh_margin_minutes: i64,
    pub default_lifetime_minutes: i64,
    /// When set, credentials are verified against this API instead of the
    /// built-in demo accounts
    pub api_base_url: Option<String>,
    pub login_latency_ms: u64,
    pub refresh_latency_ms: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            storage: StorageKind::default(),
            refresh_margin_minutes: DEFAULT_REFRESH_MARGIN_MINUTES,
            default_lifetime_minutes: DEFAULT_LIFETIME_MINUTES,
            api_base_url: None,
            login_latency_ms: 800,
            refresh_latency_ms: 500,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Backend selected by `storage`
    pub fn storage_backend(&self) -> Result<Arc<dyn StorageBackend>> {
        let backend: Arc<dyn StorageBackend> = match self.storage {
            StorageKind::File => Arc::new(FileBackend::new(self.data_dir()?)),
            StorageKind::Keyring => Arc::new(KeyringBackend::new(APP_NAME)),
            StorageKind::Memory => Arc::new(MemoryBackend::new()),
        };
        Ok(backend)
    }

    pub fn session_store(&self) -> Result<SessionStore> {
        Ok(SessionStore::new(self.storage_backend()?, &self.namespace))
    }

    /// HTTPS verifier when an API is configured, the demo directory otherwise
    pub fn verifier(&self) -> Result<Arc<dyn CredentialVerifier>> {
        let verifier: Arc<dyn CredentialVerifier> = match self.api_base_url {
            Some(ref base_url) => Arc::new(
                HttpVerifier::new(base_url.clone()).context("Failed to build HTTP client")?,
            ),
            None => Arc::new(MockVerifier::new().with_latency(
                Duration::from_millis(self.login_latency_ms),
                Duration::from_millis(self.refresh_latency_ms),
            )),
        };
        Ok(verifier)
    }
}
