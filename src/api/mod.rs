//! API route definitions
//!
//! Everything lives under `/api/photoview`: the photo proxy and the
//! media-source browse/resolve endpoints. Health checks sit at the root.

pub mod health;
pub mod media;
pub mod photo_proxy;

use axum::Router;

use crate::app::AppState;

/// Routes merged under `/api`.
pub fn photoview_router() -> Router<AppState> {
    Router::new()
        .merge(photo_proxy::router())
        .merge(media::router())
}
