use super::types::{GameMap, Hotspot};

fn hotspot(id: &str, label: &str, x: f64, y: f64, r: f64, track_id: &str) -> Hotspot {
    Hotspot {
        id: id.to_owned(),
        label: label.to_owned(),
        x,
        y,
        r,
        track_id: track_id.to_owned(),
    }
}

/// Maps compiled into the binary.
pub fn builtin_maps() -> Vec<GameMap> {
    vec![
        GameMap {
            id: "henesys".to_owned(),
            name: "Henesys".to_owned(),
            image: "/maps/henesys.svg".to_owned(),
            width: 512,
            height: 384,
            hotspots: vec![
                hotspot("henesys-market", "Market", 210.0, 160.0, 14.0, "bgm_henesys"),
                hotspot("henesys-park", "Park", 90.0, 240.0, 12.0, "bgm_ellinia"),
                hotspot("henesys-stable", "Pet Stable", 360.0, 210.0, 10.0, "bgm_kerning"),
            ],
        },
        GameMap {
            id: "kerning".to_owned(),
            name: "Kerning City".to_owned(),
            image: "/maps/kerning.svg".to_owned(),
            width: 480,
            height: 320,
            hotspots: vec![
                hotspot("kerning-taxi", "Taxi", 120.0, 230.0, 12.0, "bgm_kerning"),
                hotspot("kerning-sewers", "Sewers", 280.0, 260.0, 14.0, "bgm_ellinia"),
                hotspot("kerning-hideout", "Thieves' Hideout", 380.0, 120.0, 11.0, "bgm_henesys"),
            ],
        },
    ]
}
