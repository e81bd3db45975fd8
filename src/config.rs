use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::Path,
};

use crate::error::CatalogError;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "LIBCAT_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// How the SPARQL console encodes its request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SparqlEncoding {
    /// `{"endpoint": ..., "query": ...}`
    #[default]
    Json,
    /// Form fields `dataSource` and `query`.
    Form,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparqlConfig {
    pub default_endpoint: Option<String>,
    pub encoding: SparqlEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin. Empty means same-origin relative requests (browser build).
    pub base_url: String,
    pub timeout_secs: u64,
    pub sparql: SparqlConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            sparql: SparqlConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for pages served by the backend itself.
    pub fn same_origin() -> Self {
        ClientConfig {
            base_url: String::new(),
            ..Default::default()
        }
    }

    /// Reads a TOML config file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read client config from: {:?}", path);
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(ClientConfig::default());
        }
        let content = read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        tracing::debug!("Attempting to write client config to: {:?}", path.as_ref());
        let toml_string = toml::to_string(self)?;
        write(path, toml_string)?;
        Ok(())
    }

    /// Applies `LIBCAT_BASE_URL` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                self.base_url = base_url.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if !self.base_url.is_empty() {
            url::Url::parse(&self.base_url)?;
        }
        if self.timeout_secs == 0 {
            return Err(CatalogError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
