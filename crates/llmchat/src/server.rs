use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::llm::ProviderRegistry;
use crate::session::SessionStore;

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub providers: ProviderRegistry,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self {
            providers,
            sessions: SessionStore::new(),
        }
    }
}

/// Build the router.
///
/// `request_timeout_secs` bounds every route except prompt submission, which
/// runs until the provider answers or the transport gives up.
pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(request_timeout_secs),
    );

    let api_v1 = Router::new()
        .route("/providers", get(handlers::v1::list_providers))
        .route("/sessions", post(handlers::v1::create_session))
        .route(
            "/sessions/{session_id}",
            get(handlers::v1::get_session).delete(handlers::v1::delete_session),
        )
        .route(
            "/sessions/{session_id}/messages",
            get(handlers::v1::list_messages).delete(handlers::v1::clear_messages),
        )
        .layer(timeout.clone())
        .route(
            "/sessions/{session_id}/messages",
            post(handlers::v1::send_message),
        )
        .with_state(state);

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .layer(timeout)
        .nest("/api/v1", api_v1)
}
