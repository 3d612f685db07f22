//! Provider registry and the single entry point for sending prompts.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use super::error::LLMError;
use super::gemini::GeminiProvider;
use super::openai::OpenAICompatibleProvider;
use super::provider::{LLMProvider, Provider};
use super::types::ChatRequest;
use crate::config::ProvidersConfig;

/// Registry of LLM providers, keyed by provider type.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every supported provider, honoring base URL overrides.
    ///
    /// All providers share one HTTP client.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let client = Client::new();
        let mut registry = Self::new();

        for provider in Provider::ALL {
            let base_url = config.base_url(provider);
            let implementation: Arc<dyn LLMProvider> = match provider {
                Provider::Gemini => Arc::new(GeminiProvider::new(client.clone(), base_url.clone())),
                Provider::OpenRouter | Provider::Groq => Arc::new(OpenAICompatibleProvider::new(
                    client.clone(),
                    base_url.clone(),
                )),
            };
            registry.register(provider, implementation);
            info!(provider = %provider, base_url = %base_url, "Registered provider");
        }

        registry
    }

    /// Register a provider implementation, replacing any previous one.
    pub fn register(&mut self, provider: Provider, implementation: Arc<dyn LLMProvider>) {
        self.providers.insert(provider, implementation);
    }

    /// Get a provider by type.
    pub fn get(&self, provider: Provider) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(&provider).cloned()
    }

    /// Send one prompt to `provider` and return the reply text.
    ///
    /// The model string is forwarded as-is. An empty key is rejected before
    /// any network I/O.
    pub async fn send(
        &self,
        provider: Provider,
        model: &str,
        api_key: &SecretString,
        prompt: &str,
    ) -> Result<String, LLMError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(LLMError::MissingApiKey(provider));
        }

        let Some(implementation) = self.get(provider) else {
            return Err(LLMError::NotConfigured(provider));
        };

        let request = ChatRequest {
            model,
            api_key,
            prompt,
        };

        debug!(
            provider = %provider,
            model,
            prompt_len = prompt.len(),
            "Sending chat request"
        );

        match implementation.chat(&request).await {
            Ok(reply) => {
                debug!(provider = %provider, model, reply_len = reply.len(), "Received reply");
                Ok(reply)
            }
            Err(e) => {
                warn!(provider = %provider, model, kind = e.kind(), error = %e, "Chat request failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.providers.keys().map(|p| p.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}
