//! Per-entry Photoview clients.
//!
//! One [PhotoviewClient] per configured Photoview server, keyed by entry id
//! and kept in setup order. Handlers receive this registry through
//! [AppState](crate::app::AppState) rather than looking it up globally.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::services::photoview::PhotoviewClient;

#[derive(Debug, Default)]
pub struct IntegrationEntries {
    entries: RwLock<Vec<(String, Arc<PhotoviewClient>)>>,
}

impl IntegrationEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the client for an entry, replacing any previous one in place.
    pub fn insert(&self, entry_id: impl Into<String>, client: Arc<PhotoviewClient>) {
        let entry_id = entry_id.into();
        let mut guard = self.entries.write();
        if let Some(slot) = guard.iter_mut().find(|(id, _)| *id == entry_id) {
            warn!(entry_id = %entry_id, "Photoview entry already set up, replacing client");
            slot.1 = client;
        } else {
            debug!(entry_id = %entry_id, "Photoview entry added");
            guard.push((entry_id, client));
        }
    }

    pub fn remove(&self, entry_id: &str) -> Option<Arc<PhotoviewClient>> {
        let mut guard = self.entries.write();
        let pos = guard.iter().position(|(id, _)| id == entry_id)?;
        debug!(entry_id = %entry_id, "Photoview entry removed");
        Some(guard.remove(pos).1)
    }

    pub fn get(&self, entry_id: &str) -> Option<Arc<PhotoviewClient>> {
        self.entries
            .read()
            .iter()
            .find(|(id, _)| id == entry_id)
            .map(|(_, client)| client.clone())
    }

    /// The earliest entry still set up. The photo proxy and the media source
    /// serve a single Photoview server; with several entries this one wins.
    pub fn first(&self) -> Option<Arc<PhotoviewClient>> {
        self.entries.read().first().map(|(_, client)| client.clone())
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.read().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
