//! Media-source contract consumed by the home-automation host.
//!
//! A media source turns opaque identifiers into a tree of browsable nodes and
//! resolves leaf identifiers into something a player can fetch.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::services::photoview::PhotoviewError;

/// Kind of node shown in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Directory,
    Image,
}

/// One node of the browse tree, with its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseMediaSource {
    pub domain: String,
    pub identifier: String,
    pub media_class: MediaClass,
    pub media_content_type: String,
    pub title: String,
    pub can_play: bool,
    pub can_expand: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub children: Vec<BrowseMediaSource>,
}

impl BrowseMediaSource {
    /// Expandable, non-playable folder.
    pub fn directory(
        domain: impl Into<String>,
        identifier: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            identifier: identifier.into(),
            media_class: MediaClass::Directory,
            media_content_type: String::new(),
            title: title.into(),
            can_play: false,
            can_expand: true,
            thumbnail: None,
            children: Vec::new(),
        }
    }

    /// Playable leaf with the given content type.
    pub fn image(
        domain: impl Into<String>,
        identifier: impl Into<String>,
        title: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            identifier: identifier.into(),
            media_class: MediaClass::Image,
            media_content_type: content_type.into(),
            title: title.into(),
            can_play: true,
            can_expand: false,
            thumbnail: None,
            children: Vec::new(),
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn with_children(mut self, children: Vec<BrowseMediaSource>) -> Self {
        self.children = children;
        self
    }
}

/// A resolved, fetchable media URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayMedia {
    pub url: String,
    pub mime_type: String,
}

#[derive(Error, Debug)]
pub enum MediaSourceError {
    /// The identifier does not name anything this source can browse or play.
    #[error("unresolvable: {0}")]
    Unresolvable(String),

    #[error(transparent)]
    Client(#[from] PhotoviewError),
}

#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Domain stamped on every node (e.g. "photoview").
    fn domain(&self) -> &str;

    /// Display name of the source.
    fn name(&self) -> &str;

    /// Browse the node named by `identifier`; `None` or `""` is the root.
    async fn browse_media(
        &self,
        identifier: Option<&str>,
    ) -> Result<BrowseMediaSource, MediaSourceError>;

    /// Resolve a playable leaf to a URL and MIME type.
    async fn resolve_media(&self, identifier: &str) -> Result<PlayMedia, MediaSourceError>;
}
