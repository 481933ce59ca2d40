//! Photo proxy endpoint
//!
//! `GET /api/photoview/photo/{*path}` fetches `<base_url>/api/photo/<path>`
//! from Photoview with the session cookie and streams the image back. The
//! route carries no auth of its own; the Photoview token is the credential.
//!
//! Requests are served by the first configured entry. With several Photoview
//! servers configured, images of the others are not reachable through this
//! route.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, error, warn};

use crate::app::AppState;
use crate::services::entries::IntegrationEntries;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";
const CACHE_CONTROL: &str = "public, max-age=3600";

async fn proxy_photo(State(state): State<AppState>, Path(photo_path): Path<String>) -> Response {
    forward_photo(&state.entries, &photo_path).await
}

async fn missing_photo_path() -> Response {
    (StatusCode::BAD_REQUEST, "Missing photo path").into_response()
}

/// Fetch one photo through the first configured client. Never fails: every
/// error is mapped to a status code.
pub async fn forward_photo(entries: &IntegrationEntries, photo_path: &str) -> Response {
    if photo_path.is_empty() {
        return missing_photo_path().await;
    }

    let Some(client) = entries.first() else {
        error!("No Photoview API client available");
        return (StatusCode::SERVICE_UNAVAILABLE, "Photoview not configured").into_response();
    };

    let upstream = match client.fetch_photo(photo_path).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, photo_path = %photo_path, "Error proxying photo request");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let status = upstream.status();
    if status != StatusCode::OK {
        warn!(status = %status, photo_path = %photo_path, "Failed to fetch photo from Photoview");
        return (status, "Failed to fetch photo").into_response();
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    debug!(photo_path = %photo_path, content_type = %content_type, "Streaming photo");

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photoview/photo", get(missing_photo_path))
        .route("/photoview/photo/", get(missing_photo_path))
        .route("/photoview/photo/{*photo_path}", get(proxy_photo))
}
