//! Photoview media source: maps the flat identifier namespace onto the album
//! graph of a Photoview server.
//!
//! | identifier      | node                                          |
//! |-----------------|-----------------------------------------------|
//! | `""` / none     | root with the fixed folders                    |
//! | `albums`        | root albums                                    |
//! | `album:<id>`    | child albums, then photos of album `<id>`      |
//! | `people`        | placeholder                                    |
//! | `starred`       | placeholder                                    |
//! | anything else   | a media id (resolve only)                      |

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::source::{BrowseMediaSource, MediaSource, MediaSourceError, PlayMedia};
use crate::services::photoview::{Album, Media, PhotoviewClient};

pub const DOMAIN: &str = "photoview";
pub const NAME: &str = "Photoview";

const ALBUM_PREFIX: &str = "album:";
const IMAGE_MIME: &str = "image/jpeg";

/// Fixed folders under the root, in display order: (identifier, title).
const ROOT_FOLDERS: [(&str, &str); 3] = [
    ("albums", "Albums"),
    ("people", "People"),
    ("starred", "Starred"),
];

/// Media source backed by one Photoview client.
pub struct PhotoviewMediaSource {
    client: Arc<PhotoviewClient>,
}

impl PhotoviewMediaSource {
    pub fn new(client: Arc<PhotoviewClient>) -> Self {
        Self { client }
    }

    fn browse_root(&self) -> BrowseMediaSource {
        debug!("Browsing root level");
        let children = ROOT_FOLDERS
            .iter()
            .map(|(id, title)| BrowseMediaSource::directory(DOMAIN, *id, *title))
            .collect();
        BrowseMediaSource::directory(DOMAIN, "", NAME).with_children(children)
    }

    async fn browse_albums_root(&self) -> Result<BrowseMediaSource, MediaSourceError> {
        debug!("Browsing root albums");
        let albums = self.client.albums(true).await?;
        let children = albums.iter().map(|a| self.album_node(a)).collect();
        Ok(BrowseMediaSource::directory(DOMAIN, "albums", "Albums").with_children(children))
    }

    async fn browse_album(&self, album_id: &str) -> Result<BrowseMediaSource, MediaSourceError> {
        debug!(album_id = %album_id, "Browsing album");

        let details = self.client.album_details(album_id).await?;
        let child_albums = self.client.album_children(album_id).await?;
        let photos = self.client.photos(Some(album_id)).await?;

        let children = child_albums
            .iter()
            .map(|a| self.album_node(a))
            .chain(photos.iter().map(|p| self.photo_node(p)))
            .collect();

        let title = details
            .title
            .unwrap_or_else(|| format!("Album {album_id}"));
        Ok(
            BrowseMediaSource::directory(DOMAIN, format!("{ALBUM_PREFIX}{album_id}"), title)
                .with_children(children),
        )
    }

    fn browse_not_implemented(&self, folder_name: &str) -> BrowseMediaSource {
        debug!(folder = %folder_name, "Browsing not implemented folder");
        let mut node = BrowseMediaSource::directory(
            DOMAIN,
            folder_name.to_lowercase(),
            format!("{folder_name} (Not Implemented)"),
        );
        node.can_expand = false;
        node
    }

    fn album_node(&self, album: &Album) -> BrowseMediaSource {
        let thumbnail = album
            .thumbnail_url()
            .map(|url| self.client.get_authenticated_url(url));
        let title = album
            .title
            .clone()
            .unwrap_or_else(|| format!("Album {}", album.id));
        BrowseMediaSource::directory(DOMAIN, format!("{ALBUM_PREFIX}{}", album.id), title)
            .with_thumbnail(thumbnail)
    }

    fn photo_node(&self, photo: &Media) -> BrowseMediaSource {
        let thumbnail = photo
            .thumbnail_url()
            .map(|url| self.client.get_authenticated_url(url));
        let title = photo
            .title
            .clone()
            .unwrap_or_else(|| format!("Photo {}", photo.id));
        BrowseMediaSource::image(DOMAIN, photo.id.clone(), title, IMAGE_MIME)
            .with_thumbnail(thumbnail)
    }
}

#[async_trait]
impl MediaSource for PhotoviewMediaSource {
    fn domain(&self) -> &str {
        DOMAIN
    }

    fn name(&self) -> &str {
        NAME
    }

    async fn browse_media(
        &self,
        identifier: Option<&str>,
    ) -> Result<BrowseMediaSource, MediaSourceError> {
        let identifier = identifier.unwrap_or_default();
        debug!(identifier = %identifier, "Browsing media");

        match identifier {
            "" => Ok(self.browse_root()),
            "albums" => self.browse_albums_root().await,
            "people" => Ok(self.browse_not_implemented("People")),
            "starred" => Ok(self.browse_not_implemented("Starred")),
            other => match other.strip_prefix(ALBUM_PREFIX) {
                Some(album_id) => self.browse_album(album_id).await,
                None => {
                    warn!(identifier = %other, "Unknown identifier");
                    Err(MediaSourceError::Unresolvable(format!(
                        "Unknown identifier: {other}"
                    )))
                }
            },
        }
    }

    async fn resolve_media(&self, identifier: &str) -> Result<PlayMedia, MediaSourceError> {
        debug!(media_id = %identifier, "Resolving media item");

        let media_url = self.client.media_url(identifier).await?;
        let url = self.client.get_authenticated_url(&media_url);

        debug!(media_id = %identifier, url = %url, "Resolved media to proxied URL");
        Ok(PlayMedia {
            url,
            mime_type: IMAGE_MIME.to_string(),
        })
    }
}
