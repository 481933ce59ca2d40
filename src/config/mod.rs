//! Application configuration management

use std::env;
use std::fmt;
use std::net::IpAddr;

use anyhow::{Context, Result, bail};
use url::Url;

use crate::services::photoview::{PhotoviewCredentials, PhotoviewEntryConfig};

const DEFAULT_ENTRY_ID: &str = "default";

/// Application configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// Photoview server base URL, e.g. `http://photoview.lan:8000`
    pub photoview_url: String,

    pub photoview_username: String,

    pub photoview_password: String,

    /// Identifier of the configured Photoview entry
    pub entry_id: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{key} is required"))
        };

        let photoview_url = required("PHOTOVIEW_URL")?;
        validate_base_url(&photoview_url)?;

        Ok(Self {
            host: lookup("HOST")
                .unwrap_or_else(|| "0.0.0.0".to_string())
                .parse()
                .context("Invalid HOST")?,

            port: lookup("PORT")
                .unwrap_or_else(|| "8123".to_string())
                .parse()
                .context("Invalid PORT")?,

            photoview_url,
            photoview_username: required("PHOTOVIEW_USERNAME")?,
            photoview_password: required("PHOTOVIEW_PASSWORD")?,

            entry_id: lookup("PHOTOVIEW_ENTRY_ID")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_ENTRY_ID.to_string()),
        })
    }

    /// The Photoview entry described by this configuration.
    pub fn photoview_entry(&self) -> PhotoviewEntryConfig {
        PhotoviewEntryConfig {
            entry_id: self.entry_id.clone(),
            credentials: PhotoviewCredentials::new(
                &self.photoview_url,
                &self.photoview_username,
                &self.photoview_password,
            ),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("photoview_url", &self.photoview_url)
            .field("photoview_username", &self.photoview_username)
            .field("photoview_password", &"...")
            .field("entry_id", &self.entry_id)
            .finish()
    }
}

fn validate_base_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("Invalid PHOTOVIEW_URL: {raw}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("PHOTOVIEW_URL must use http or https, got {other}"),
    }
}
