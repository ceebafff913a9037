//! Read-only catalogs of tracks and maps.
//!
//! Built once from a list of tracks and maps, validated, and never mutated
//! afterwards.

mod maps;
mod page;
mod tracks;
mod types;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::CatalogError;

pub use maps::builtin_maps;
pub use page::{MapPage, load_map_page};
pub use tracks::builtin_tracks;
pub use types::{GameMap, Hotspot, Track};

/// On-disk catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub maps: Vec<GameMap>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    maps: Vec<GameMap>,
    tracks_by_id: HashMap<String, Track>,
    map_index: HashMap<String, usize>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_data(CatalogData {
        tracks: builtin_tracks(),
        maps: builtin_maps(),
    })
    .unwrap_or_else(|e| panic!("built-in catalog is inconsistent: {e}"))
});

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn from_data(data: CatalogData) -> Result<Self, CatalogError> {
        let mut tracks_by_id = HashMap::with_capacity(data.tracks.len());
        for track in data.tracks {
            if tracks_by_id.contains_key(&track.id) {
                return Err(CatalogError::DuplicateTrack(track.id));
            }
            tracks_by_id.insert(track.id.clone(), track);
        }

        let mut map_index = HashMap::with_capacity(data.maps.len());
        for (i, map) in data.maps.iter().enumerate() {
            if map_index.insert(map.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateMap(map.id.clone()));
            }
            let mut seen = HashSet::new();
            for h in &map.hotspots {
                if !seen.insert(h.id.as_str()) {
                    return Err(CatalogError::DuplicateHotspot {
                        map: map.id.clone(),
                        hotspot: h.id.clone(),
                    });
                }
                if !tracks_by_id.contains_key(&h.track_id) {
                    return Err(CatalogError::UnknownTrack {
                        map: map.id.clone(),
                        hotspot: h.id.clone(),
                        track: h.track_id.clone(),
                    });
                }
            }
        }

        Ok(Self {
            maps: data.maps,
            tracks_by_id,
            map_index,
        })
    }

    /// Parses a JSON catalog document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_slice(bytes)?;
        Self::from_data(data)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let bytes = fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&bytes)?;
        tracing::info!(
            path = %path.display(),
            maps = catalog.maps.len(),
            tracks = catalog.tracks_by_id.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn maps(&self) -> &[GameMap] {
        &self.maps
    }

    pub fn map(&self, id: &str) -> Option<&GameMap> {
        self.map_index.get(id).map(|&i| &self.maps[i])
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks_by_id.get(id)
    }

    pub fn tracks_by_id(&self) -> &HashMap<String, Track> {
        &self.tracks_by_id
    }
}
