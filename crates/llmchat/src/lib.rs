//! llmchat - relay chat prompts to Gemini, OpenRouter and Groq.

pub mod config;
pub mod handlers;
pub mod llm;
pub mod repl;
pub mod response;
pub mod server;
pub mod session;
