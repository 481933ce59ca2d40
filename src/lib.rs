//! Photoview bridge
//!
//! Serves a Photoview library to a home-automation host: media-source
//! browse/resolve endpoints under `/api/photoview` and an authenticated photo
//! proxy at `/api/photoview/photo/{*path}`.
//!
//! [services::photoview] holds the GraphQL client and its legacy adapter,
//! [media] the browse tree built on top of it.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod media;
pub mod services;
