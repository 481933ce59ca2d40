//! Response types for the Photoview GraphQL API.
//!
//! Every collection defaults to empty and every optional field to `None`, so a
//! sparse response never fails to decode.

use serde::{Deserialize, Deserializer, Serialize};

/// GraphQL `ID` values arrive as strings, but some servers send integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

/// Result of the `authorizeUser` mutation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeUser {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// A `{ url }` object, used for thumbnails and high resolution images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUrl {
    #[serde(default)]
    pub url: Option<String>,
}

impl MediaUrl {
    /// The URL when present and non-empty.
    pub fn non_empty(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Album cover. The root and children queries return the nested
/// `thumbnail { thumbnail { url } }` shape; older servers return a flat
/// `thumbnail { url }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumThumbnail {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<MediaUrl>,
    #[serde(default)]
    pub url: Option<String>,
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_id")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

impl AlbumThumbnail {
    /// First non-empty URL, nested shape first.
    pub fn relative_url(&self) -> Option<&str> {
        self.thumbnail
            .as_ref()
            .and_then(MediaUrl::non_empty)
            .or_else(|| self.url.as_deref().filter(|u| !u.is_empty()))
    }
}

/// One level of an album's ancestry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumPathEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<AlbumThumbnail>,
    #[serde(default)]
    pub path: Vec<AlbumPathEntry>,
    #[serde(default)]
    pub sub_albums: Vec<Album>,
    #[serde(default)]
    pub media: Vec<Media>,
}

impl Album {
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().and_then(AlbumThumbnail::relative_url)
    }
}

/// A photo or video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<MediaUrl>,
    #[serde(default)]
    pub high_res: Option<MediaUrl>,
}

impl Media {
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().and_then(MediaUrl::non_empty)
    }

    pub fn high_res_url(&self) -> Option<&str> {
        self.high_res.as_ref().and_then(MediaUrl::non_empty)
    }
}
