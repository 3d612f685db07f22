//! LLM provider client for chat completions.

mod error;
mod gemini;
mod openai;
mod provider;
mod registry;
mod types;

pub use error::LLMError;
pub use gemini::GeminiProvider;
pub use openai::OpenAICompatibleProvider;
pub use provider::{LLMProvider, ParseProviderError, Provider};
pub use registry::ProviderRegistry;
pub use types::{ChatRequest, Message, Role};
