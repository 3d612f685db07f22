//! LLM error types.

use std::error::Error as StdError;

use thiserror::Error;

use super::provider::Provider;

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No credential was supplied, so no request was made.
    #[error("no api key provided for {}", .0.label())]
    MissingApiKey(Provider),

    /// The registry has no implementation for the provider.
    #[error("provider '{0}' is not configured")]
    NotConfigured(Provider),

    /// HTTP request failed (DNS, connect, timeout, body read)
    #[error("http request failed: {}", error_chain(.0))]
    Request(#[from] reqwest::Error),

    /// API returned a non-200 response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 200 response whose body does not have the expected shape
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        LLMError::InvalidResponse(err.to_string())
    }
}

impl LLMError {
    /// Short machine-readable category, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            LLMError::MissingApiKey(_) => "missing_api_key",
            LLMError::NotConfigured(_) => "not_configured",
            LLMError::Request(_) => "request",
            LLMError::Api { .. } => "api",
            LLMError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Text shown in place of the assistant reply when a call fails.
    ///
    /// Provider errors keep the status code and raw body verbatim.
    pub fn reply_text(&self) -> String {
        match self {
            LLMError::Api { status, message } => format!("Error {status}: {message}"),
            other => format!("⚠️ Exception: {other}"),
        }
    }
}

/// Render an error and its sources as `outer: inner: root`.
///
/// reqwest's own `Display` omits the underlying cause.
fn error_chain(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
