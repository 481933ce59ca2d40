//! Health check endpoints

use std::collections::HashMap;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::app::AppState;
use crate::services::manager::{HealthStatus, ServiceHealth};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub entries: Vec<String>,
    pub services: HashMap<String, ServiceHealth>,
}

/// Health check - always returns OK if the server is running
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check - at least one Photoview entry is set up and no service
/// reports itself unhealthy. An entry that has not logged in yet is fine.
async fn readyz(State(state): State<AppState>) -> Json<ReadyResponse> {
    let services = state.services.health_all().await;
    let entries = state.entries.ids();
    let ready = !entries.is_empty()
        && services
            .values()
            .all(|h| h.status != HealthStatus::Unhealthy);

    Json(ReadyResponse {
        ready,
        entries,
        services,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::services::ServicesManager;
    use crate::services::photoview::{PhotoviewCredentials, PhotoviewEntryConfig};

    async fn get_json(app: Router, uri: &str) -> Value {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn app(services: Arc<ServicesManager>) -> Router {
        let state = AppState {
            entries: services.entries(),
            services,
        };
        router().with_state(state)
    }

    #[tokio::test]
    async fn test_healthz() {
        let body = get_json(app(Arc::new(ServicesManager::new())), "/healthz").await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readyz_requires_an_entry() {
        let body = get_json(app(Arc::new(ServicesManager::new())), "/readyz").await;
        assert_eq!(body["ready"], false);

        let services = ServicesManager::builder(reqwest::Client::new())
            .add_service(PhotoviewEntryConfig {
                entry_id: "home".to_string(),
                credentials: PhotoviewCredentials::new("http://photos.local", "u", "p"),
            })
            .start()
            .await
            .unwrap();
        let body = get_json(app(services), "/readyz").await;
        assert_eq!(body["ready"], true);
        assert_eq!(body["entries"][0], "home");
        assert_eq!(body["services"]["photoview:home"]["status"], "degraded");
    }
}
