//! LLM provider trait and the closed set of supported providers.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::LLMError;
use super::types::ChatRequest;

/// Trait for LLM providers with different API formats.
///
/// Implementations only describe the wire format; [`LLMProvider::chat`]
/// handles sending, status checking and parsing the same way for all of them.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Build the outbound HTTP request (URL, auth, JSON body).
    fn build_request(&self, request: &ChatRequest<'_>) -> RequestBuilder;

    /// Extract the reply text from a successful response body.
    fn parse_response(&self, body: &str) -> Result<String, LLMError>;

    /// Make a chat completion request and return the reply text unmodified.
    async fn chat(&self, request: &ChatRequest<'_>) -> Result<String, LLMError> {
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(strip_url)?;

        let status = response.status();
        let body = response.text().await.map_err(strip_url)?;

        if status != StatusCode::OK {
            return Err(LLMError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        self.parse_response(&body)
    }
}

/// Transport errors carry the request URL, which may hold the API key.
fn strip_url(err: reqwest::Error) -> LLMError {
    LLMError::Request(err.without_url())
}

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[serde(alias = "google")]
    Gemini,
    OpenRouter,
    Groq,
}

const GEMINI_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro"];

const OPENROUTER_MODELS: &[&str] = &[
    "mistralai/mistral-7b-instruct:free",
    "meta-llama/llama-3-8b-instruct:free",
    "google/gemma-7b-it:free",
    "google/gemini-2.0-flash-exp:free",
    "google/gemma-3-27b-it:free",
    "google/gemma-3-4b-it:free",
    "mistralai/devstral-small:free",
];

const GROQ_MODELS: &[&str] = &["llama3-8b-8192", "llama3-70b-8192"];

impl Provider {
    /// All providers, in selector order.
    pub const ALL: [Provider; 3] = [Provider::Gemini, Provider::OpenRouter, Provider::Groq];

    /// Identifier used in config files, URLs and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
            Provider::Groq => "groq",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Provider::Gemini => "Google Gemini",
            Provider::OpenRouter => "OpenRouter",
            Provider::Groq => "Groq",
        }
    }

    /// Models offered in the selector. Not used for validation.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => GEMINI_MODELS,
            Provider::OpenRouter => OPENROUTER_MODELS,
            Provider::Groq => GROQ_MODELS,
        }
    }

    pub fn default_model(self) -> &'static str {
        self.models()[0]
    }

    /// API base URL; the provider appends its own path.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Where users obtain an API key.
    pub fn key_url(self) -> &'static str {
        match self {
            Provider::Gemini => "https://makersuite.google.com/app/apikey",
            Provider::OpenRouter => "https://openrouter.ai/keys",
            Provider::Groq => "https://console.groq.com/keys",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown provider '{0}' (expected gemini, openrouter or groq)")]
pub struct ParseProviderError(String);

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "gemini" | "google" | "google gemini" => Ok(Provider::Gemini),
            "openrouter" => Ok(Provider::OpenRouter),
            "groq" => Ok(Provider::Groq),
            _ => Err(ParseProviderError(s.to_string())),
        }
    }
}
