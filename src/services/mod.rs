//! Services: the Photoview integration, per-entry client registry, and the
//! lifecycle manager that runs them together with the HTTP server.

pub mod entries;
pub mod http_server;
pub mod manager;
pub mod photoview;

pub use entries::IntegrationEntries;
pub use http_server::HttpServerConfig;
pub use manager::ServicesManager;
