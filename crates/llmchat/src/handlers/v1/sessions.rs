//! Session management HTTP handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::error;
use ulid::Ulid;

use crate::llm::{Message, Provider, Role};
use crate::response;
use crate::server::AppState;
use crate::session::{ChatSelection, TurnOutcome};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct CreateSessionResponse {
    session_id: String,
    created_at: String,
}

#[derive(Serialize)]
pub struct GetSessionResponse {
    session_id: String,
    created_at: String,
    updated_at: String,
    message_count: usize,
}

#[derive(Serialize)]
pub struct ListMessagesResponse {
    session_id: String,
    messages: Vec<Message>,
}

/// Body of a prompt submission. Provider, model and key are per request.
#[derive(Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    provider: Option<Provider>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    content: String,
}

#[derive(Serialize)]
pub struct SendMessageResponse {
    message_id: String,
    role: Role,
    content: String,
    /// Error category when `content` is an error placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sessions
pub async fn create_session(State(state): State<AppState>) -> Response {
    let handle = state.sessions.create();
    let session = handle.lock().await;

    let response = CreateSessionResponse {
        session_id: session.id.clone(),
        created_at: session.created_at.to_rfc3339(),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// GET /api/v1/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(handle) = state.sessions.get(&session_id) else {
        return response::not_found("Session not found").into_response();
    };
    let session = handle.lock().await;

    let response = GetSessionResponse {
        session_id: session.id.clone(),
        created_at: session.created_at.to_rfc3339(),
        updated_at: session.updated_at.to_rfc3339(),
        message_count: session.transcript().len(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// DELETE /api/v1/sessions/{session_id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    if !state.sessions.remove(&session_id) {
        return response::not_found("Session not found").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// GET /api/v1/sessions/{session_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(handle) = state.sessions.get(&session_id) else {
        return response::not_found("Session not found").into_response();
    };
    let session = handle.lock().await;

    let response = ListMessagesResponse {
        session_id: session.id.clone(),
        messages: session.transcript().all().to_vec(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// DELETE /api/v1/sessions/{session_id}/messages
pub async fn clear_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(handle) = state.sessions.get(&session_id) else {
        return response::not_found("Session not found").into_response();
    };
    handle.lock().await.clear();
    StatusCode::NO_CONTENT.into_response()
}

/// POST /api/v1/sessions/{session_id}/messages
///
/// Records the prompt, calls the provider and records the reply. Provider
/// failures still answer 200 with the error text as the assistant message.
/// A missing API key answers 400 after recording the prompt only.
///
/// The turn runs on its own task, so a dropped request never leaves a prompt
/// without its reply.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    if req.content.trim().is_empty() {
        return response::bad_request("invalid_request", "Message content must not be empty")
            .into_response();
    }

    let Some(handle) = state.sessions.get(&session_id) else {
        return response::not_found("Session not found").into_response();
    };

    let provider = req.provider.unwrap_or_default();
    let selection = match req.model {
        Some(model) if !model.trim().is_empty() => ChatSelection::with_model(provider, model),
        _ => ChatSelection::new(provider),
    };
    let api_key = req.api_key.map(SecretString::from);
    let providers = state.providers.clone();
    let content = req.content;

    let turn = tokio::spawn(async move {
        // Held across the provider call so prompts in one session stay ordered.
        let mut session = handle.lock_owned().await;
        session
            .submit(&providers, &selection, api_key.as_ref(), &content)
            .await
    });

    let outcome = match turn.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Prompt task failed");
            return response::internal_error("Failed to process message").into_response();
        }
    };

    match outcome {
        TurnOutcome::Replied(message) => reply(message, None),
        TurnOutcome::Failed { message, error } => reply(message, Some(error.kind())),
        TurnOutcome::MissingCredential { provider } => response::bad_request(
            "missing_api_key",
            format!(
                "Please enter your {} API key ({}).",
                provider.label(),
                provider.key_url()
            ),
        )
        .into_response(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn reply(message: Message, error: Option<&'static str>) -> Response {
    let response = SendMessageResponse {
        message_id: format!("msg_{}", Ulid::new()),
        role: message.role,
        content: message.content,
        error,
    };
    (StatusCode::OK, Json(response)).into_response()
}
