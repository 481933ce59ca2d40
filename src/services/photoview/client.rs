//! Photoview API client
//!
//! Talks to the Photoview GraphQL endpoint at `<base_url>/api/graphql` and
//! holds the session token returned by `authorizeUser`. The token is sent as
//! the `auth-token` cookie on every request, including image fetches.
//!
//! There is no retry and no expiry tracking: a missing token triggers one
//! lazy login, an expired one surfaces as [PhotoviewError::Authentication].

use std::fmt;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use url::Url;

use super::error::{PhotoviewError, Result};
use super::queries;
use super::types::{Album, AlbumPathEntry, AuthorizeUser, Media};

/// Local route that serves proxied Photoview images.
pub const PROXY_PHOTO_ROUTE: &str = "/api/photoview/photo";

const GRAPHQL_PATH: &str = "/api/graphql";
const PHOTO_PATH: &str = "/api/photo/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Session token issued by `authorizeUser`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn cookie(&self) -> String {
        format!("auth-token={}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(<{} bytes>)", self.0.len())
    }
}

/// Connection settings for one configured Photoview server.
#[derive(Clone)]
pub struct PhotoviewCredentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl PhotoviewCredentials {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for PhotoviewCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoviewCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"...")
            .finish()
    }
}

/// Photoview API client
pub struct PhotoviewClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
    token: RwLock<Option<AuthToken>>,
}

impl fmt::Debug for PhotoviewClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoviewClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &*self.token.read())
            .finish()
    }
}

impl PhotoviewClient {
    /// Create a client sharing the given HTTP connection pool.
    pub fn new(http: Client, credentials: PhotoviewCredentials) -> Self {
        Self {
            http,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            username: credentials.username,
            password: credentials.password,
            timeout: REQUEST_TIMEOUT,
            token: RwLock::new(None),
        }
    }

    /// Override the per-request timeout of GraphQL calls (10 seconds by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.token.read().clone()
    }

    fn auth_cookie(&self) -> Option<String> {
        self.token.read().as_ref().map(AuthToken::cookie)
    }

    /// Log in with the configured credentials and store the session token.
    ///
    /// Every failure, including transport errors, is reported as
    /// [PhotoviewError::Authentication].
    pub async fn authenticate(&self) -> Result<()> {
        debug!(base_url = %self.base_url, username = %self.username, "Authenticating with Photoview");

        let variables = json!({
            "username": self.username,
            "password": self.password,
        });

        let body = self
            .request(queries::AUTHORIZE_USER, Some(variables))
            .await
            .map_err(|e| match e {
                PhotoviewError::Authentication(_) => e,
                other => PhotoviewError::Authentication(format!(
                    "authentication request failed: {other}"
                )),
            })?;

        let auth: AuthorizeUser = extract(&body, &["data", "authorizeUser"]).map_err(|_| {
            PhotoviewError::Authentication("malformed authorizeUser response".to_string())
        })?;

        if !auth.success {
            error!(username = %self.username, status = ?auth.status, "Photoview authentication failed");
            return Err(PhotoviewError::Authentication(match auth.status {
                Some(status) => format!("Authentication failed: {status}"),
                None => "Authentication failed".to_string(),
            }));
        }

        let token = auth
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                PhotoviewError::Authentication("authorizeUser returned no token".to_string())
            })?;

        debug!(token_len = token.len(), "Photoview authentication successful");
        *self.token.write() = Some(AuthToken::new(token));
        Ok(())
    }

    /// Authenticate unless a token is already held.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        if !self.has_token() {
            debug!("No auth token available, authenticating first");
            self.authenticate().await?;
        }
        Ok(())
    }

    /// Check that the configured credentials are accepted by the server.
    pub async fn validate_connection(&self) -> bool {
        debug!(base_url = %self.base_url, "Validating connection to Photoview");
        match self.authenticate().await {
            Ok(()) => {
                info!(base_url = %self.base_url, "Photoview connection validated");
                true
            }
            Err(e) => {
                error!(base_url = %self.base_url, error = %e, "Photoview connection validation failed");
                false
            }
        }
    }

    /// POST a GraphQL document and return the decoded response body.
    pub async fn request(&self, query: &str, variables: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, GRAPHQL_PATH);

        let mut payload = json!({ "query": query });
        if let Some(variables) = variables.filter(has_variables) {
            payload["variables"] = variables;
        }

        let mut builder = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload);
        match self.auth_cookie() {
            Some(cookie) => builder = builder.header(COOKIE, cookie),
            None => debug!("No auth token available for request"),
        }

        let response = builder.send().await.map_err(|e| {
            error!(url = %url, error = %e, "GraphQL request failed");
            PhotoviewError::from(e)
        })?;

        let status = response.status();
        debug!(status = %status, "Received GraphQL response");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!(status = %status, "Photoview rejected credentials");
            return Err(PhotoviewError::Authentication(format!(
                "Invalid credentials (HTTP {})",
                status.as_u16()
            )));
        }

        if !status.is_success() {
            return Err(PhotoviewError::Communication(format!(
                "Photoview GraphQL request failed with status: {status}"
            )));
        }

        let body: Value = response.json().await.map_err(PhotoviewError::from)?;

        match body.get("errors") {
            None => Ok(body),
            Some(Value::Array(errors)) => Err(graphql_error(errors)),
            Some(other) => Err(PhotoviewError::Client(format!(
                "unexpected errors field in GraphQL response: {other}"
            ))),
        }
    }

    /// Albums owned by the user. `only_root` restricts to top-level albums,
    /// ordered by title and including their cover thumbnail.
    pub async fn albums(&self, only_root: bool) -> Result<Vec<Album>> {
        debug!(only_root, "Fetching albums from Photoview");
        self.ensure_authenticated().await?;

        let query = if only_root {
            queries::ROOT_ALBUMS
        } else {
            queries::ALL_ALBUMS
        };
        let body = self.request(query, None).await?;
        let albums: Vec<Album> = extract(&body, &["data", "myAlbums"])?;

        debug!(count = albums.len(), "Retrieved albums from Photoview");
        Ok(albums)
    }

    /// Ancestors of an album, root first.
    pub async fn album_path(&self, album_id: &str) -> Result<Vec<AlbumPathEntry>> {
        debug!(album_id = %album_id, "Fetching album path");
        self.ensure_authenticated().await?;

        let body = self
            .request(queries::ALBUM_PATH, Some(json!({ "id": album_id })))
            .await?;
        let path: Vec<AlbumPathEntry> = extract(&body, &["data", "album", "path"])?;

        debug!(album_id = %album_id, levels = path.len(), "Retrieved album path");
        Ok(path)
    }

    pub async fn album_children(&self, album_id: &str) -> Result<Vec<Album>> {
        debug!(album_id = %album_id, "Fetching child albums");
        self.ensure_authenticated().await?;

        let body = self
            .request(queries::ALBUM_CHILDREN, Some(json!({ "id": album_id })))
            .await?;
        let children: Vec<Album> = extract(&body, &["data", "album", "subAlbums"])?;

        debug!(album_id = %album_id, count = children.len(), "Retrieved child albums");
        Ok(children)
    }

    /// Id and title of an album. An unknown album yields an empty [Album].
    pub async fn album_details(&self, album_id: &str) -> Result<Album> {
        debug!(album_id = %album_id, "Fetching album details");
        self.ensure_authenticated().await?;

        let body = self
            .request(queries::ALBUM_DETAILS, Some(json!({ "id": album_id })))
            .await?;
        let album: Album = extract(&body, &["data", "album"])?;

        debug!(album_id = %album_id, title = ?album.title, "Retrieved album details");
        Ok(album)
    }

    /// Server-relative URL of the full resolution image for a media item.
    pub async fn media_url(&self, media_id: &str) -> Result<String> {
        debug!(media_id = %media_id, "Getting media URL");
        self.ensure_authenticated().await?;

        let body = self
            .request(queries::MEDIA_URL, Some(json!({ "id": media_id })))
            .await?;
        let media: Option<Media> = extract(&body, &["data", "media"])?;

        match media.as_ref().and_then(Media::high_res_url) {
            Some(url) => {
                debug!(media_id = %media_id, url = %url, "Retrieved media URL");
                Ok(url.to_string())
            }
            None => {
                error!(media_id = %media_id, "No high-res URL found for media");
                Err(PhotoviewError::NotFound(format!(
                    "No URL found for media {media_id}"
                )))
            }
        }
    }

    /// Media in an album, or all of the user's media when `album_id` is `None`.
    pub async fn photos(&self, album_id: Option<&str>) -> Result<Vec<Media>> {
        self.ensure_authenticated().await?;

        let photos: Vec<Media> = match album_id {
            Some(album_id) => {
                debug!(album_id = %album_id, "Fetching photos for album");
                let body = self
                    .request(queries::ALBUM_PHOTOS, Some(json!({ "albumId": album_id })))
                    .await?;
                extract(&body, &["data", "album", "media"])?
            }
            None => {
                debug!("Fetching all photos from Photoview");
                let body = self.request(queries::ALL_PHOTOS, None).await?;
                extract(&body, &["data", "myMedia"])?
            }
        };

        debug!(count = photos.len(), "Retrieved photos from Photoview");
        Ok(photos)
    }

    /// Absolute URL of an image on the Photoview server.
    ///
    /// `photo_path` is taken as decoded text: every `/`-separated segment is
    /// percent-encoded again, so `#` or `?` in a file name stay in the path.
    pub fn photo_url(&self, photo_path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            PhotoviewError::Client(format!("invalid Photoview base URL {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                PhotoviewError::Client(format!("Photoview base URL {} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(PHOTO_PATH.split('/').filter(|s| !s.is_empty()))
            .extend(photo_path.split('/'));
        Ok(url)
    }

    /// GET an image from the Photoview server with the session cookie.
    ///
    /// Returns the upstream response whatever its status; only transport and
    /// login failures are errors.
    pub async fn fetch_photo(&self, photo_path: &str) -> Result<reqwest::Response> {
        self.ensure_authenticated().await?;

        let url = self.photo_url(photo_path)?;
        debug!(url = %url, "Proxying photo request");

        let mut builder = self.http.get(url.clone());
        match self.auth_cookie() {
            Some(cookie) => builder = builder.header(COOKIE, cookie),
            None => warn!("No auth token available for photo request"),
        }

        let response = builder.send().await?;
        debug!(status = %response.status(), url = %url, "Photoview photo response");
        Ok(response)
    }

    /// Rewrite a Photoview image URL to the local proxy route.
    pub fn get_authenticated_url(&self, relative_url: &str) -> String {
        proxied_photo_url(relative_url)
    }
}

/// Map a Photoview image URL onto [PROXY_PHOTO_ROUTE].
///
/// Absolute URLs are returned unchanged and an empty input yields an empty
/// string. One leading `/api/photo/` or `api/photo/` is stripped.
pub fn proxied_photo_url(relative_url: &str) -> String {
    if relative_url.is_empty() {
        return String::new();
    }
    if relative_url.starts_with("http") {
        return relative_url.to_string();
    }

    let photo_path = relative_url
        .strip_prefix(PHOTO_PATH)
        .or_else(|| relative_url.strip_prefix(&PHOTO_PATH[1..]))
        .unwrap_or(relative_url);

    format!("{PROXY_PHOTO_ROUTE}/{photo_path}")
}

/// Turn a GraphQL `errors` array into an error. Any message mentioning
/// "unauthorized" makes it an authentication failure.
fn graphql_error(errors: &[Value]) -> PhotoviewError {
    let messages: Vec<&str> = errors
        .iter()
        .map(|e| {
            e.get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
        })
        .collect();
    error!(errors = ?messages, "GraphQL errors in response");

    if messages
        .iter()
        .any(|m| m.to_lowercase().contains("unauthorized"))
    {
        return PhotoviewError::Authentication(format!(
            "Authentication error: {}",
            messages.join(", ")
        ));
    }
    if messages.is_empty() {
        return PhotoviewError::Protocol("Unknown error".to_string());
    }
    PhotoviewError::Protocol(messages.join(", "))
}

fn has_variables(variables: &Value) -> bool {
    match variables {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Walk `path` into a response body and decode what is found there. A missing
/// or null field decodes to `T::default()`.
fn extract<T>(body: &Value, path: &[&str]) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let mut node = body;
    for key in path {
        match node.get(key) {
            Some(value) if !value.is_null() => node = value,
            _ => return Ok(T::default()),
        }
    }
    serde_json::from_value(node.clone()).map_err(|e| {
        PhotoviewError::Client(format!("unexpected shape for {}: {e}", path.join(".")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::photoview::testing::{StubServer, serve};
    use assert_matches::assert_matches;
    use axum::Router;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use pretty_assertions::assert_eq;

    fn client_for(base_url: &str) -> PhotoviewClient {
        PhotoviewClient::new(
            Client::new(),
            PhotoviewCredentials::new(base_url, "alice", "secret"),
        )
    }

    #[test]
    fn test_proxied_photo_url() {
        assert_eq!(
            proxied_photo_url("/api/photo/x.jpg"),
            "/api/photoview/photo/x.jpg"
        );
        assert_eq!(
            proxied_photo_url("api/photo/thumb/a b.jpg"),
            "/api/photoview/photo/thumb/a b.jpg"
        );
        assert_eq!(
            proxied_photo_url("https://cdn.example.com/api/photo/x.jpg"),
            "https://cdn.example.com/api/photo/x.jpg"
        );
        assert_eq!(proxied_photo_url(""), "");
        assert_eq!(proxied_photo_url("other.jpg"), "/api/photoview/photo/other.jpg");
    }

    #[test]
    fn test_proxied_photo_url_strips_prefix_once() {
        assert_eq!(
            proxied_photo_url("/api/photo/api/photo/x.jpg"),
            "/api/photoview/photo/api/photo/x.jpg"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client_for("http://photos.local:8000/");
        assert_eq!(client.base_url(), "http://photos.local:8000");
        assert_eq!(
            client.photo_url("abc.jpg").unwrap().as_str(),
            "http://photos.local:8000/api/photo/abc.jpg"
        );
    }

    #[test]
    fn test_photo_url_encodes_each_segment() {
        let client = client_for("http://photos.local:8000");
        assert_eq!(
            client.photo_url("thumb/holiday#beach?.jpg").unwrap().as_str(),
            "http://photos.local:8000/api/photo/thumb/holiday%23beach%3F.jpg"
        );
        assert_eq!(
            client.photo_url("a b.jpg").unwrap().as_str(),
            "http://photos.local:8000/api/photo/a%20b.jpg"
        );

        let nested = client_for("https://home.lan/photoview/");
        assert_eq!(
            nested.photo_url("x.jpg").unwrap().as_str(),
            "https://home.lan/photoview/api/photo/x.jpg"
        );
    }

    #[test]
    fn test_photo_url_rejects_unusable_base() {
        let client = client_for("not a url");
        assert_matches!(client.photo_url("x.jpg"), Err(PhotoviewError::Client(_)));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let creds = PhotoviewCredentials::new("http://p", "alice", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
        let token = AuthToken::new("abcdef");
        assert_eq!(format!("{token:?}"), "AuthToken(<6 bytes>)");
    }

    #[test]
    fn test_has_variables() {
        assert!(!has_variables(&Value::Null));
        assert!(!has_variables(&json!({})));
        assert!(has_variables(&json!({ "id": "1" })));
    }

    #[tokio::test]
    async fn test_authenticate_stores_token() {
        let stub = StubServer::start(vec![]).await;
        let client = client_for(&stub.base_url);

        client.authenticate().await.unwrap();
        assert_eq!(client.token(), Some(AuthToken::new("T")));

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body["variables"]["username"], "alice");
        assert_eq!(calls[0].body["variables"]["password"], "secret");
        assert_eq!(calls[0].cookie, None);
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let stub = StubServer::with_auth_response(
            json!({ "data": { "authorizeUser": { "success": false, "status": "invalid", "token": null } } }),
            vec![],
        )
        .await;
        let client = client_for(&stub.base_url);

        assert_matches!(
            client.authenticate().await,
            Err(PhotoviewError::Authentication(msg)) if msg.contains("invalid")
        );
        assert!(!client.has_token());
    }

    #[tokio::test]
    async fn test_authenticate_malformed_response() {
        let stub = StubServer::with_auth_response(json!({ "data": { "authorizeUser": "nope" } }), vec![]).await;
        let client = client_for(&stub.base_url);
        assert_matches!(client.authenticate().await, Err(PhotoviewError::Authentication(_)));

        let stub = StubServer::with_auth_response(json!({ "data": null }), vec![]).await;
        let client = client_for(&stub.base_url);
        assert_matches!(client.authenticate().await, Err(PhotoviewError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_authenticate_transport_failure_is_auth_error() {
        // Nothing listens on the discard port.
        let client = client_for("http://127.0.0.1:9");
        assert_matches!(client.authenticate().await, Err(PhotoviewError::Authentication(_)));
    }

    async fn status_stub(status: AxumStatus, body: Value) -> String {
        let router = Router::new().route(
            "/api/graphql",
            post(move || {
                let body = body.clone();
                async move { (status, axum::Json(body)) }
            }),
        );
        serve(router).await
    }

    #[tokio::test]
    async fn test_request_http_401_is_auth_error() {
        let base = status_stub(AxumStatus::UNAUTHORIZED, json!({ "data": { "ok": true } })).await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { ok }", None).await,
            Err(PhotoviewError::Authentication(_))
        );
    }

    #[tokio::test]
    async fn test_request_http_403_is_auth_error() {
        let base = status_stub(AxumStatus::FORBIDDEN, json!({})).await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { ok }", None).await,
            Err(PhotoviewError::Authentication(_))
        );
    }

    #[tokio::test]
    async fn test_request_http_500_is_communication_error() {
        let base = status_stub(AxumStatus::INTERNAL_SERVER_ERROR, json!({})).await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { ok }", None).await,
            Err(PhotoviewError::Communication(_))
        );
    }

    #[tokio::test]
    async fn test_request_graphql_unauthorized_error() {
        let base = status_stub(
            AxumStatus::OK,
            json!({ "errors": [{ "message": "Unauthorized access" }] }),
        )
        .await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { ok }", None).await,
            Err(PhotoviewError::Authentication(msg)) if msg.contains("Unauthorized access")
        );
    }

    #[tokio::test]
    async fn test_request_graphql_protocol_error() {
        let base = status_stub(
            AxumStatus::OK,
            json!({ "errors": [{ "message": "Field X not found" }, { "path": ["a"] }] }),
        )
        .await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { ok }", None).await,
            Err(PhotoviewError::Protocol(msg)) if msg == "Field X not found, Unknown error"
        );
    }

    #[tokio::test]
    async fn test_request_empty_errors_array_is_protocol_error() {
        let base = status_stub(AxumStatus::OK, json!({ "data": { "x": 1 }, "errors": [] })).await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { x }", None).await,
            Err(PhotoviewError::Protocol(msg)) if msg == "Unknown error"
        );
    }

    #[tokio::test]
    async fn test_request_non_array_errors_is_client_error() {
        let base = status_stub(AxumStatus::OK, json!({ "data": { "x": 1 }, "errors": null })).await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { x }", None).await,
            Err(PhotoviewError::Client(_))
        );

        let base = status_stub(AxumStatus::OK, json!({ "errors": "boom" })).await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { x }", None).await,
            Err(PhotoviewError::Client(_))
        );
    }

    #[tokio::test]
    async fn test_request_timeout_is_communication_error() {
        let router = Router::new().route(
            "/api/graphql",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                axum::Json(json!({ "data": {} }))
            }),
        );
        let base = serve(router).await;
        let client = client_for(&base).with_timeout(Duration::from_millis(100));
        assert_matches!(
            client.request("query { x }", None).await,
            Err(PhotoviewError::Communication(_))
        );
    }

    #[tokio::test]
    async fn test_request_undecodable_body_is_client_error() {
        let router = Router::new().route("/api/graphql", post(|| async { "not json" }));
        let base = serve(router).await;
        let client = client_for(&base);
        assert_matches!(
            client.request("query { ok }", None).await,
            Err(PhotoviewError::Client(_))
        );
    }

    #[tokio::test]
    async fn test_request_connection_refused_is_communication_error() {
        let client = client_for("http://127.0.0.1:9");
        assert_matches!(
            client.request("query { ok }", None).await,
            Err(PhotoviewError::Communication(_))
        );
    }

    #[tokio::test]
    async fn test_request_omits_empty_variables() {
        let stub = StubServer::start(vec![]).await;
        let client = client_for(&stub.base_url);
        client.request("query { a }", Some(json!({}))).await.unwrap();
        client.request("query { b }", None).await.unwrap();

        for call in stub.calls() {
            assert!(call.body.get("variables").is_none());
        }
    }

    #[tokio::test]
    async fn test_accessor_authenticates_lazily_once() {
        let stub = StubServer::start(vec![(
            "getMyRootAlbums",
            json!({ "data": { "myAlbums": [
                { "id": "1", "title": "A", "thumbnail": { "id": "7", "thumbnail": { "url": "/api/photo/a.jpg" } } },
                { "id": "2", "title": "B", "thumbnail": null }
            ] } }),
        )])
        .await;
        let client = client_for(&stub.base_url);

        let albums = client.albums(true).await.unwrap();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].thumbnail_url(), Some("/api/photo/a.jpg"));
        client.albums(true).await.unwrap();

        let calls = stub.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].query().contains("authorizeUser"));
        assert_eq!(calls[1].cookie.as_deref(), Some("auth-token=T"));
        assert_eq!(calls[2].cookie.as_deref(), Some("auth-token=T"));
    }

    #[tokio::test]
    async fn test_accessors_default_to_empty() {
        let stub = StubServer::start(vec![
            ("GetAlbums", json!({ "data": { "myAlbums": null } })),
            ("albumPathQuery", json!({ "data": { "album": null } })),
            ("getAlbumChildren", json!({ "data": {} })),
            ("getAlbumDetails", json!({ "data": { "album": null } })),
            ("GetAlbumPhotos", json!({ "data": { "album": { "media": [] } } })),
            ("GetAllPhotos", json!({})),
        ])
        .await;
        let client = client_for(&stub.base_url);

        assert!(client.albums(false).await.unwrap().is_empty());
        assert!(client.album_path("1").await.unwrap().is_empty());
        assert!(client.album_children("1").await.unwrap().is_empty());
        assert_eq!(client.album_details("1").await.unwrap(), Album::default());
        assert!(client.photos(Some("1")).await.unwrap().is_empty());
        assert!(client.photos(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_album_path_and_photos() {
        let stub = StubServer::start(vec![
            (
                "albumPathQuery",
                json!({ "data": { "album": { "id": "3", "path": [
                    { "id": "1", "title": "Root" },
                    { "id": "2", "title": "Middle" }
                ] } } }),
            ),
            (
                "GetAlbumPhotos",
                json!({ "data": { "album": { "media": [
                    { "id": "10", "title": "x.jpg", "type": "photo", "thumbnail": { "url": "/api/photo/t.jpg" } }
                ] } } }),
            ),
        ])
        .await;
        let client = client_for(&stub.base_url);

        let path = client.album_path("3").await.unwrap();
        assert_eq!(
            path.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "2"]
        );

        let photos = client.photos(Some("3")).await.unwrap();
        assert_eq!(photos[0].thumbnail_url(), Some("/api/photo/t.jpg"));

        let photo_call = stub.calls().into_iter().last().unwrap();
        assert_eq!(photo_call.body["variables"]["albumId"], "3");
    }

    #[tokio::test]
    async fn test_media_url() {
        let stub = StubServer::start(vec![(
            "getMediaUrl",
            json!({ "data": { "media": { "id": "5", "highRes": { "url": "/api/photo/x.jpg" } } } }),
        )])
        .await;
        let client = client_for(&stub.base_url);
        assert_eq!(client.media_url("5").await.unwrap(), "/api/photo/x.jpg");
    }

    #[tokio::test]
    async fn test_media_url_missing_high_res() {
        let stub = StubServer::start(vec![(
            "getMediaUrl",
            json!({ "data": { "media": { "id": "5" } } }),
        )])
        .await;
        let client = client_for(&stub.base_url);
        assert_matches!(client.media_url("5").await, Err(PhotoviewError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_validate_connection() {
        let stub = StubServer::start(vec![]).await;
        assert!(client_for(&stub.base_url).validate_connection().await);
        assert!(!client_for("http://127.0.0.1:9").validate_connection().await);
    }

    #[tokio::test]
    async fn test_expired_token_is_not_retried() {
        let stub = StubServer::start(vec![(
            "getAlbumDetails",
            json!({ "errors": [{ "message": "unauthorized" }] }),
        )])
        .await;
        let client = client_for(&stub.base_url);

        assert_matches!(
            client.album_details("1").await,
            Err(PhotoviewError::Authentication(_))
        );
        // One login plus the failing query, nothing more.
        assert_eq!(stub.calls().len(), 2);
        assert!(client.has_token());
    }
}
