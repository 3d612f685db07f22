//! OpenAI-compatible LLM provider.
//!
//! Serves both OpenRouter and Groq; they differ only in base URL.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::error::LLMError;
use super::provider::LLMProvider;
use super::types::{ChatRequest, Role};

/// OpenAI-compatible provider with bearer-token auth.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
}

impl OpenAICompatibleProvider {
    #[must_use]
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    fn build_request(&self, request: &ChatRequest<'_>) -> RequestBuilder {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        self.client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(request.api_key.expose_secret())
            .json(&to_request(request))
    }

    fn parse_response(&self, body: &str) -> Result<String, LLMError> {
        let response: Response = serde_json::from_str(body)?;
        from_response(response)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn to_request<'a>(request: &ChatRequest<'a>) -> Request<'a> {
    Request {
        model: request.model,
        messages: vec![RequestMessage {
            role: Role::User,
            content: request.prompt,
        }],
    }
}

fn from_response(response: Response) -> Result<String, LLMError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LLMError::InvalidResponse("missing choices[0].message.content".to_string()))
}
