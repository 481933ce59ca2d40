//! Media-source endpoints
//!
//! JSON surface of the Photoview media source:
//!
//! - `GET /api/photoview/browse` - root node
//! - `GET /api/photoview/browse/{*identifier}` - any other node
//! - `GET /api/photoview/resolve/{*identifier}` - playable URL for a media id

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::warn;

use crate::app::AppState;
use crate::media::{MediaSource, MediaSourceError, PhotoviewMediaSource};
use crate::services::photoview::PhotoviewError;

fn media_source(state: &AppState) -> Result<PhotoviewMediaSource, Response> {
    state
        .entries
        .first()
        .map(PhotoviewMediaSource::new)
        .ok_or_else(|| {
            warn!("Media source requested but no Photoview entry is configured");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "No Photoview integration configured" })),
            )
                .into_response()
        })
}

fn error_response(err: MediaSourceError) -> Response {
    let status = match &err {
        MediaSourceError::Unresolvable(_) => StatusCode::NOT_FOUND,
        MediaSourceError::Client(PhotoviewError::NotFound(_)) => StatusCode::NOT_FOUND,
        MediaSourceError::Client(_) => StatusCode::BAD_GATEWAY,
    };
    if let MediaSourceError::Client(e) = &err
        && e.is_auth()
    {
        warn!(error = %e, "Photoview rejected the configured credentials");
    }
    warn!(status = %status, error = %err, "Media source request failed");
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn browse(state: &AppState, identifier: Option<&str>) -> Response {
    let source = match media_source(state) {
        Ok(source) => source,
        Err(response) => return response,
    };
    match source.browse_media(identifier).await {
        Ok(node) => Json(node).into_response(),
        Err(e) => error_response(e),
    }
}

async fn browse_root(State(state): State<AppState>) -> Response {
    browse(&state, None).await
}

async fn browse_identifier(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Response {
    browse(&state, Some(&identifier)).await
}

async fn resolve(State(state): State<AppState>, Path(identifier): Path<String>) -> Response {
    let source = match media_source(&state) {
        Ok(source) => source,
        Err(response) => return response,
    };
    match source.resolve_media(&identifier).await {
        Ok(play) => Json(play).into_response(),
        Err(e) => error_response(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photoview/browse", get(browse_root))
        .route("/photoview/browse/", get(browse_root))
        .route("/photoview/browse/{*identifier}", get(browse_identifier))
        .route("/photoview/resolve/{*identifier}", get(resolve))
}
