use super::types::Track;

/// Tracks compiled into the binary.
pub fn builtin_tracks() -> Vec<Track> {
    vec![
        Track::new("bgm_henesys", "Henesys", "/audio/henesys.wav").looped(),
        Track::new("bgm_ellinia", "Ellinia", "/audio/ellinia.wav").looped(),
        Track::new("bgm_kerning", "Kerning City", "/audio/kerning.wav").looped(),
    ]
}
