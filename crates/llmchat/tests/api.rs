//! HTTP API driven through the router without a listening socket.

use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use llmchat::config::{EndpointConfig, ProvidersConfig};
use llmchat::llm::ProviderRegistry;
use llmchat::server::{AppState, build_app};

fn app_with(providers: ProvidersConfig) -> Router {
    build_app(AppState::new(ProviderRegistry::from_config(&providers)), 30)
}

fn mock_providers(server: &MockServer) -> ProvidersConfig {
    ProvidersConfig {
        gemini: EndpointConfig {
            base_url: Some(format!("{}/v1beta", server.uri())),
        },
        openrouter: EndpointConfig {
            base_url: Some(format!("{}/api/v1", server.uri())),
        },
        groq: EndpointConfig {
            base_url: Some(format!("{}/openai/v1", server.uri())),
        },
    }
}

fn app() -> Router {
    app_with(ProvidersConfig::default())
}

fn mocked_app(server: &MockServer) -> Router {
    app_with(mock_providers(server))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

async fn messages(app: &Router, id: &str) -> Vec<Value> {
    let (status, body) = call(app, Method::GET, &format!("/api/v1/sessions/{id}/messages"), None).await;
    assert_eq!(status, StatusCode::OK);
    body["messages"].as_array().unwrap().clone()
}

#[tokio::test]
async fn health_and_version() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/livez", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));

    let (status, _) = call(&app, Method::GET, "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "llmchat");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn providers_lists_catalog() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/providers", None).await;
    assert_eq!(status, StatusCode::OK);

    let providers = body["providers"].as_array().unwrap();
    let ids: Vec<&str> = providers.iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["gemini", "openrouter", "groq"]);

    assert_eq!(providers[0]["label"], "Google Gemini");
    assert_eq!(providers[0]["default_model"], "gemini-1.5-flash");
    assert_eq!(providers[1]["models"].as_array().unwrap().len(), 7);
    assert_eq!(providers[2]["default_model"], "llama3-8b-8192");
}

#[tokio::test]
async fn session_lifecycle() {
    let app = app();
    let id = create_session(&app).await;
    assert!(id.starts_with("session_"));

    let (status, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], id.as_str());
    assert_eq!(body["message_count"], 0);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = app();
    let uri = "/api/v1/sessions/session_missing/messages";

    let (status, _) = call(&app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::DELETE, uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        uri,
        Some(json!({"api_key": "k", "content": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn send_message_records_prompt_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_json(json!({
            "model": "mistralai/mistral-7b-instruct:free",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Hi there!"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = mocked_app(&server);
    let id = create_session(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{id}/messages"),
        Some(json!({"provider": "openrouter", "api_key": "sk-test", "content": "Hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["content"], "Hi there!");
    assert!(body["message_id"].as_str().unwrap().starts_with("msg_"));
    assert!(body.get("error").is_none());

    assert_eq!(
        messages(&app, &id).await,
        vec![
            json!({"role": "user", "content": "Hello"}),
            json!({"role": "assistant", "content": "Hi there!"}),
        ]
    );
}

#[tokio::test]
async fn provider_failure_becomes_assistant_placeholder() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid key"}"#))
        .mount(&server)
        .await;

    let app = mocked_app(&server);
    let id = create_session(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{id}/messages"),
        Some(json!({"provider": "groq", "api_key": "bad", "content": "hi"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "api");
    assert_eq!(body["content"], r#"Error 401: {"error":"invalid key"}"#);
    assert_eq!(messages(&app, &id).await.len(), 2);
}

#[tokio::test]
async fn missing_key_records_prompt_only() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = mocked_app(&server);
    let id = create_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}/messages");

    let (status, body) = call(&app, Method::POST, &uri, Some(json!({"content": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "missing_api_key");

    let (status, _) = call(
        &app,
        Method::POST,
        &uri,
        Some(json!({"provider": "gemini", "api_key": "  ", "content": "again"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(
        messages(&app, &id).await,
        vec![
            json!({"role": "user", "content": "hi"}),
            json!({"role": "user", "content": "again"}),
        ]
    );
}

#[tokio::test]
async fn empty_content_is_rejected() {
    let app = app();
    let id = create_session(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{id}/messages"),
        Some(json!({"api_key": "k", "content": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");
    assert!(messages(&app, &id).await.is_empty());
}

#[tokio::test]
async fn clear_empties_transcript() {
    let app = app();
    let id = create_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}/messages");

    call(&app, Method::POST, &uri, Some(json!({"content": "one"}))).await;
    assert_eq!(messages(&app, &id).await.len(), 1);

    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(messages(&app, &id).await.is_empty());

    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "4"}]}}]
        })))
        .mount(&server)
        .await;

    let app = mocked_app(&server);
    let first = create_session(&app).await;
    let second = create_session(&app).await;

    let send = |id: String, content: &'static str| {
        let app = app.clone();
        async move {
            call(
                &app,
                Method::POST,
                &format!("/api/v1/sessions/{id}/messages"),
                Some(json!({"api_key": "key123", "content": content})),
            )
            .await
        }
    };
    let (a, b) = tokio::join!(send(first.clone(), "2+2?"), send(second.clone(), "1+3?"));
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);

    let first_messages = messages(&app, &first).await;
    let second_messages = messages(&app, &second).await;
    assert_eq!(first_messages[0]["content"], "2+2?");
    assert_eq!(second_messages[0]["content"], "1+3?");
    assert_eq!(first_messages.len(), 2);
    assert_eq!(second_messages.len(), 2);
}

#[tokio::test]
async fn slow_provider_outlives_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": "late reply"}}]}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = ProviderRegistry::from_config(&mock_providers(&server));
    let app = build_app(AppState::new(registry), 1);
    let id = create_session(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{id}/messages"),
        Some(json!({"provider": "groq", "api_key": "k", "content": "slow?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "late reply");
    assert_eq!(
        messages(&app, &id).await,
        vec![
            json!({"role": "user", "content": "slow?"}),
            json!({"role": "assistant", "content": "late reply"}),
        ]
    );
}

#[tokio::test]
async fn prompts_in_one_session_run_in_order() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(500);
    for (prompt, answer) in [("first", "one"), ("second", "two")] {
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(body_json(json!({
                "model": "mistralai/mistral-7b-instruct:free",
                "messages": [{"role": "user", "content": prompt}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": answer}}]}))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let app = mocked_app(&server);
    let id = create_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}/messages");
    let body = |content: &str| {
        Some(json!({"provider": "openrouter", "api_key": "sk", "content": content}))
    };

    let started = Instant::now();
    let (a, b) = tokio::join!(call(&app, Method::POST, &uri, body("first")), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        call(&app, Method::POST, &uri, body("second")).await
    });

    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    // The second call waited for the first reply before reaching the provider.
    assert!(started.elapsed() >= delay * 2, "{:?}", started.elapsed());
    assert_eq!(
        messages(&app, &id).await,
        vec![
            json!({"role": "user", "content": "first"}),
            json!({"role": "assistant", "content": "one"}),
            json!({"role": "user", "content": "second"}),
            json!({"role": "assistant", "content": "two"}),
        ]
    );
}

#[tokio::test]
async fn unregistered_provider_is_recorded_like_other_failures() {
    let app = build_app(AppState::new(ProviderRegistry::new()), 30);
    let id = create_session(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{id}/messages"),
        Some(json!({"provider": "groq", "api_key": "k", "content": "hi"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "not_configured");

    let transcript = messages(&app, &id).await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1]["content"], body["content"]);
    assert!(
        transcript[1]["content"]
            .as_str()
            .unwrap()
            .contains("not configured")
    );
}
