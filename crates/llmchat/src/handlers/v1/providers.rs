//! Provider catalog for building provider and model selectors.

use axum::Json;
use serde::Serialize;

use crate::llm::Provider;

#[derive(Serialize)]
pub struct ProviderInfo {
    id: Provider,
    label: &'static str,
    default_model: &'static str,
    models: &'static [&'static str],
    key_url: &'static str,
}

#[derive(Serialize)]
pub struct ListProvidersResponse {
    providers: Vec<ProviderInfo>,
}

/// GET /api/v1/providers
pub async fn list_providers() -> Json<ListProvidersResponse> {
    let providers = Provider::ALL
        .into_iter()
        .map(|provider| ProviderInfo {
            id: provider,
            label: provider.label(),
            default_model: provider.default_model(),
            models: provider.models(),
            key_url: provider.key_url(),
        })
        .collect();

    Json(ListProvidersResponse { providers })
}
