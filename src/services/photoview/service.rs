//! Lifecycle of one configured Photoview entry.
//!
//! Starting the service sets the entry up (builds its client and stores it in
//! [IntegrationEntries]); stopping unloads it; restarting reloads it with a
//! fresh client and therefore a fresh login.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::client::{PhotoviewClient, PhotoviewCredentials};
use crate::services::entries::IntegrationEntries;
use crate::services::manager::{Service, ServiceHealth};

/// Prefix of every entry service name.
pub const SERVICE_PREFIX: &str = "photoview:";

/// Settings for one Photoview entry.
#[derive(Debug, Clone)]
pub struct PhotoviewEntryConfig {
    pub entry_id: String,
    pub credentials: PhotoviewCredentials,
}

impl PhotoviewEntryConfig {
    /// Service name used by the manager for this entry.
    pub fn service_name(&self) -> String {
        format!("{SERVICE_PREFIX}{}", self.entry_id)
    }
}

pub struct PhotoviewEntryService {
    name: String,
    config: PhotoviewEntryConfig,
    http: reqwest::Client,
    entries: Arc<IntegrationEntries>,
}

impl PhotoviewEntryService {
    pub fn new(
        config: PhotoviewEntryConfig,
        http: reqwest::Client,
        entries: Arc<IntegrationEntries>,
    ) -> Self {
        Self {
            name: config.service_name(),
            config,
            http,
            entries,
        }
    }

    /// Client of this entry while it is set up.
    pub fn client(&self) -> Option<Arc<PhotoviewClient>> {
        self.entries.get(&self.config.entry_id)
    }
}

#[async_trait]
impl Service for PhotoviewEntryService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<()> {
        let client = PhotoviewClient::new(self.http.clone(), self.config.credentials.clone());
        self.entries
            .insert(self.config.entry_id.clone(), Arc::new(client));
        info!(
            service = %self.name,
            entry_id = %self.config.entry_id,
            base_url = %self.config.credentials.base_url,
            "Photoview entry set up"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if self.entries.remove(&self.config.entry_id).is_some() {
            info!(service = %self.name, entry_id = %self.config.entry_id, "Photoview entry unloaded");
        }
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        info!(service = %self.name, entry_id = %self.config.entry_id, "Reloading Photoview entry");
        self.stop().await?;
        self.start().await
    }

    async fn health(&self) -> Result<ServiceHealth> {
        Ok(match self.client() {
            None => ServiceHealth::unhealthy("entry not set up"),
            Some(client) if client.has_token() => ServiceHealth::healthy(),
            Some(_) => ServiceHealth::degraded("not yet authenticated"),
        })
    }
}
