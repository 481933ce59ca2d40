//! Application state and HTTP router construction.
//!
//! Used by [HttpServerService](crate::services::http_server::HttpServerService)
//! to build the Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::services::{IntegrationEntries, ServicesManager};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Photoview clients, one per configured entry.
    pub entries: Arc<IntegrationEntries>,
    pub services: Arc<ServicesManager>,
}

/// Build the API router (/api/*) by merging all route builders registered
/// with [ServicesManagerBuilder::add_api_routes](crate::services::manager::ServicesManagerBuilder::add_api_routes).
pub fn api_router(state: AppState) -> Router<AppState> {
    state.services.build_api_router(state.clone())
}

/// Build the full Axum router: /api, health checks, and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    let api = api_router(state.clone());
    Router::new()
        .nest("/api", api)
        .merge(api::health::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_registered_routes_are_mounted() {
        let services = ServicesManager::builder(reqwest::Client::new())
            .add_api_routes("photoview", |_| api::photoview_router())
            .build()
            .await
            .unwrap();
        let app = build_app(AppState {
            entries: services.entries(),
            services,
        });

        let response = app
            .clone()
            .oneshot(Request::get("/api/photoview/photo/x.jpg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
