//! Catalog construction and lookup errors.

use std::path::PathBuf;

/// The catalog data is inconsistent or unreadable.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate track id: {0}")]
    DuplicateTrack(String),

    #[error("duplicate map id: {0}")]
    DuplicateMap(String),

    #[error("duplicate hotspot id {hotspot} in map {map}")]
    DuplicateHotspot { map: String, hotspot: String },

    #[error("hotspot {hotspot} in map {map} references unknown track {track}")]
    UnknownTrack {
        map: String,
        hotspot: String,
        track: String,
    },

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A lookup by id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("map not found: {0}")]
    Map(String),

    #[error("hotspot {hotspot} not found on map {map}")]
    Hotspot { map: String, hotspot: String },

    #[error("track not found: {0}")]
    Track(String),
}
