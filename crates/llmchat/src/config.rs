use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::Provider;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    /// Load config from a YAML file. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    300
}

// ============================================================================
// ProvidersConfig
// ============================================================================

/// Per-provider endpoint overrides. Credentials never live here.
#[derive(Debug, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: EndpointConfig,
    #[serde(default)]
    pub openrouter: EndpointConfig,
    #[serde(default)]
    pub groq: EndpointConfig,
}

impl ProvidersConfig {
    pub fn endpoint(&self, provider: Provider) -> &EndpointConfig {
        match provider {
            Provider::Gemini => &self.gemini,
            Provider::OpenRouter => &self.openrouter,
            Provider::Groq => &self.groq,
        }
    }

    /// Configured base URL, or the provider's public API.
    pub fn base_url(&self, provider: Provider) -> String {
        self.endpoint(provider)
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string())
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
