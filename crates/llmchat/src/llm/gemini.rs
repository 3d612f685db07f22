//! Google Gemini provider (`generateContent` API).

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::error::LLMError;
use super::provider::LLMProvider;
use super::types::ChatRequest;

/// Gemini provider. The API key travels as the `key` query parameter.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    #[must_use]
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn build_request(&self, request: &ChatRequest<'_>) -> RequestBuilder {
        self.client
            .post(self.endpoint(request.model))
            .header(CONTENT_TYPE, "application/json")
            .query(&[("key", request.api_key.expose_secret())])
            .json(&to_request(request.prompt))
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
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

fn to_request(prompt: &str) -> Request<'_> {
    Request {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
    }
}

fn from_response(response: Response) -> Result<String, LLMError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            LLMError::InvalidResponse("missing candidates[0].content.parts[0].text".to_string())
        })
}
