//! Photoview integration: GraphQL client, response types, and the per-entry
//! lifecycle service.

pub mod client;
pub mod error;
pub mod legacy;
pub mod queries;
pub mod service;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::{PhotoviewClient, PhotoviewCredentials};
pub use error::PhotoviewError;
pub use legacy::LegacyApiClient;
pub use service::{PhotoviewEntryConfig, PhotoviewEntryService};
pub use types::{Album, Media};
