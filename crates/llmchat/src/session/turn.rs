//! Handling of one submitted prompt: record it, call the provider, record the
//! reply.

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use super::store::Session;
use crate::llm::{LLMError, Message, Provider, ProviderRegistry};

/// Provider and model picked by the user for a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSelection {
    pub provider: Provider,
    pub model: String,
}

impl ChatSelection {
    /// Select `provider` with its default model.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
        }
    }

    pub fn with_model(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl Default for ChatSelection {
    fn default() -> Self {
        Self::new(Provider::default())
    }
}

/// What happened to a submitted prompt.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The provider answered; the reply was appended.
    Replied(Message),
    /// The call failed; a placeholder describing the error was appended.
    Failed { message: Message, error: LLMError },
    /// No credential: the provider was not called and nothing but the prompt
    /// was recorded.
    MissingCredential { provider: Provider },
}

impl TurnOutcome {
    /// The assistant message appended for this turn, if any.
    pub fn assistant_message(&self) -> Option<&Message> {
        match self {
            TurnOutcome::Replied(message) | TurnOutcome::Failed { message, .. } => Some(message),
            TurnOutcome::MissingCredential { .. } => None,
        }
    }
}

/// True when no usable credential was supplied.
pub fn is_missing(api_key: Option<&SecretString>) -> bool {
    api_key.is_none_or(|key| key.expose_secret().trim().is_empty())
}

impl Session {
    /// Record `prompt`, ask the selected provider, and record its reply.
    ///
    /// Provider failures never escape: they become an assistant message
    /// carrying the error text.
    pub async fn submit(
        &mut self,
        registry: &ProviderRegistry,
        selection: &ChatSelection,
        api_key: Option<&SecretString>,
        prompt: &str,
    ) -> TurnOutcome {
        self.append(Message::user(prompt));

        let api_key = match api_key {
            Some(key) if !is_missing(Some(key)) => key,
            _ => {
                warn!(
                    session_id = %self.id,
                    provider = %selection.provider,
                    "Prompt submitted without an API key"
                );
                return TurnOutcome::MissingCredential {
                    provider: selection.provider,
                };
            }
        };

        match registry
            .send(selection.provider, &selection.model, api_key, prompt)
            .await
        {
            Ok(reply) => {
                let message = Message::assistant(reply);
                self.append(message.clone());
                TurnOutcome::Replied(message)
            }
            Err(error) => {
                let message = Message::assistant(error.reply_text());
                self.append(message.clone());
                TurnOutcome::Failed { message, error }
            }
        }
    }
}
