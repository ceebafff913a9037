use std::collections::HashMap;
use std::sync::Arc;

use super::decode::{DecodedAudio, decode_in_background};
use super::download::AssetFetcher;
use crate::catalog::Track;
use crate::error::AudioError;

/// Decoded tracks keyed by track id.
///
/// Entries are created on the first successful decode and kept for the
/// lifetime of the cache. A failed fetch or decode leaves no entry behind.
pub struct TrackCache {
    fetcher: Arc<dyn AssetFetcher>,
    entries: HashMap<String, Arc<DecodedAudio>>,
}

impl TrackCache {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            entries: HashMap::new(),
        }
    }

    pub async fn get(&mut self, track: &Track) -> Result<Arc<DecodedAudio>, AudioError> {
        if let Some(hit) = self.entries.get(&track.id) {
            tracing::trace!(track_id = %track.id, "decoded audio cache hit");
            return Ok(Arc::clone(hit));
        }

        tracing::debug!(track_id = %track.id, src = %track.src, "decoded audio cache miss");
        let bytes = self
            .fetcher
            .fetch(&track.src)
            .await
            .map_err(|source| AudioError::Load {
                track_id: track.id.clone(),
                source,
            })?;
        let audio = decode_in_background(bytes)
            .await
            .map_err(|source| AudioError::Decode {
                track_id: track.id.clone(),
                source,
            })?;

        tracing::info!(
            track_id = %track.id,
            channels = audio.channels(),
            sample_rate = audio.sample_rate(),
            duration_ms = audio.duration().as_millis() as u64,
            "track decoded"
        );
        let audio = Arc::new(audio);
        self.entries.insert(track.id.clone(), Arc::clone(&audio));
        Ok(audio)
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.entries.contains_key(track_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeFetcher, wav_bytes};
    use crate::error::{DecodeError, LoadError};

    #[tokio::test]
    async fn second_get_is_served_from_cache() {
        let fetcher = Arc::new(FakeFetcher::default().with("/a.wav", wav_bytes(1, 8_000, 80)));
        let mut cache = TrackCache::new(fetcher.clone());
        let track = Track::new("a", "A", "/a.wav");

        let first = cache.get(&track).await.expect("first load");
        let second = cache.get(&track).await.expect("second load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls("/a.wav"), 1);
        assert!(cache.contains("a"));
    }

    #[tokio::test]
    async fn fetch_failure_caches_nothing() {
        let fetcher = Arc::new(FakeFetcher::default());
        let mut cache = TrackCache::new(fetcher.clone());
        let track = Track::new("missing", "Missing", "/missing.wav");

        let err = cache.get(&track).await.expect_err("not served");
        assert!(matches!(
            err,
            AudioError::Load { source: LoadError::Status { .. }, .. }
        ));
        assert!(cache.is_empty());

        let _ = cache.get(&track).await;
        assert_eq!(fetcher.calls("/missing.wav"), 2, "failures are not cached");
    }

    #[tokio::test]
    async fn undecodable_payload_caches_nothing() {
        let fetcher = Arc::new(FakeFetcher::default().with("/junk.wav", b"junk".to_vec()));
        let mut cache = TrackCache::new(fetcher);
        let track = Track::new("junk", "Junk", "/junk.wav");

        let err = cache.get(&track).await.expect_err("junk");
        assert!(matches!(
            err,
            AudioError::Decode { source: DecodeError::Unsupported(_), .. }
        ));
        assert!(!cache.contains("junk"));
    }
}
