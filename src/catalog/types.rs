use serde::{Deserialize, Serialize};

/// A background track that a hotspot can switch to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    /// Source locator: an `http(s)://` URL, a `file://` URL or a path under
    /// the asset root.
    pub src: String,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Loop window start in seconds. Only honoured when `looping` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_start: Option<f64>,
    /// Loop window end in seconds. Only honoured when `looping` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_end: Option<f64>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            src: src.into(),
            looping: false,
            loop_start: None,
            loop_end: None,
        }
    }

    pub fn looped(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn with_loop_window(mut self, start: f64, end: f64) -> Self {
        self.looping = true;
        self.loop_start = Some(start);
        self.loop_end = Some(end);
        self
    }
}

/// A clickable circle on a map, bound to a track by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub track_id: String,
}

impl Hotspot {
    /// Squared distance from the hotspot centre, if `(x, y)` lies inside it.
    pub fn hit_distance_sq(&self, x: f64, y: f64) -> Option<f64> {
        let dx = x - self.x;
        let dy = y - self.y;
        let d2 = dx * dx + dy * dy;
        (d2 <= self.r * self.r).then_some(d2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMap {
    pub id: String,
    pub name: String,
    pub image: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl GameMap {
    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    /// The hotspot under a click. Overlapping hotspots resolve to the one
    /// whose centre is nearest; ties go to the earlier hotspot.
    pub fn hotspot_at(&self, x: f64, y: f64) -> Option<&Hotspot> {
        let mut best: Option<(&Hotspot, f64)> = None;
        for h in &self.hotspots {
            let Some(d2) = h.hit_distance_sq(x, y) else {
                continue;
            };
            if best.is_none_or(|(_, bd)| d2 < bd) {
                best = Some((h, d2));
            }
        }
        best.map(|(h, _)| h)
    }
}
