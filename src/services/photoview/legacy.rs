//! Adapter for callers still using the old blueprint-style client contract
//! (`get_data`/`set_title`).

use std::sync::Arc;

use serde_json::{Value, json};

use super::client::PhotoviewClient;

/// Legacy facade over a shared [PhotoviewClient].
#[derive(Debug, Clone)]
pub struct LegacyApiClient {
    client: Arc<PhotoviewClient>,
}

impl LegacyApiClient {
    pub fn new(client: Arc<PhotoviewClient>) -> Self {
        Self { client }
    }

    /// Reports whether the server accepts the configured credentials.
    pub async fn get_data(&self) -> bool {
        self.client.validate_connection().await
    }

    /// Photoview has no title to set; always acknowledges.
    pub async fn set_title(&self, _value: &str) -> Value {
        json!({ "status": "ok" })
    }
}
