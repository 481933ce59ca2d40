//! Media-source browsing over Photoview albums.

pub mod browser;
pub mod source;

pub use browser::PhotoviewMediaSource;
pub use source::{MediaSource, MediaSourceError};
