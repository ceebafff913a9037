//! Map page resolution: what the front end needs to show one map.

use std::collections::HashMap;

use super::Catalog;
use super::types::{GameMap, Hotspot, Track};
use crate::error::NotFoundError;

/// A resolved map plus the full track table.
#[derive(Debug, Clone, Copy)]
pub struct MapPage<'a> {
    pub map: &'a GameMap,
    pub tracks_by_id: &'a HashMap<String, Track>,
}

impl<'a> MapPage<'a> {
    pub fn hotspot(&self, hotspot_id: &str) -> Result<&'a Hotspot, NotFoundError> {
        self.map
            .hotspot(hotspot_id)
            .ok_or_else(|| NotFoundError::Hotspot {
                map: self.map.id.clone(),
                hotspot: hotspot_id.to_owned(),
            })
    }

    pub fn track_for(&self, hotspot: &Hotspot) -> Result<&'a Track, NotFoundError> {
        self.tracks_by_id
            .get(&hotspot.track_id)
            .ok_or_else(|| NotFoundError::Track(hotspot.track_id.clone()))
    }

    /// Hotspot id → the track it plays.
    pub fn resolve_hotspot(
        &self,
        hotspot_id: &str,
    ) -> Result<(&'a Hotspot, &'a Track), NotFoundError> {
        let hotspot = self.hotspot(hotspot_id)?;
        Ok((hotspot, self.track_for(hotspot)?))
    }

    /// Click position → the hotspot under it and its track, if any.
    pub fn resolve_click(&self, x: f64, y: f64) -> Option<(&'a Hotspot, &'a Track)> {
        let hotspot = self.map.hotspot_at(x, y)?;
        let track = self.track_for(hotspot).ok()?;
        Some((hotspot, track))
    }

    /// Distinct tracks referenced by this map, in hotspot order.
    pub fn tracks(&self) -> Vec<&'a Track> {
        let mut out: Vec<&Track> = Vec::new();
        for h in &self.map.hotspots {
            if let Some(t) = self.tracks_by_id.get(&h.track_id)
                && !out.iter().any(|seen| seen.id == t.id)
            {
                out.push(t);
            }
        }
        out
    }
}

pub fn load_map_page<'a>(catalog: &'a Catalog, map_id: &str) -> Result<MapPage<'a>, NotFoundError> {
    let map = catalog.map(map_id).ok_or_else(|| {
        tracing::warn!(map_id, "map not found");
        NotFoundError::Map(map_id.to_owned())
    })?;
    Ok(MapPage {
        map,
        tracks_by_id: catalog.tracks_by_id(),
    })
}
