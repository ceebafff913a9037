use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::LoaderConfig;
use crate::error::LoadError;

/// Source of raw asset bytes.
pub trait AssetFetcher: Send + Sync {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LoadError>>;
}

/// Fetches `http(s)://` assets over the network and everything else from
/// the asset root on disk.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    http: Client,
    asset_root: PathBuf,
    retries: u32,
    backoff_ms: u64,
    backoff_max_ms: u64,
}

impl AssetLoader {
    pub fn new(config: &LoaderConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(Duration::from_secs(config.http_connect_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(err = %e, "failed to build HTTP client, using defaults");
                Client::new()
            });
        Self {
            http,
            asset_root: config.asset_root.clone(),
            retries: config.retries,
            backoff_ms: config.retry_backoff_ms,
            backoff_max_ms: config.retry_backoff_max_ms,
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Maps a non-HTTP locator onto the filesystem.
    pub fn local_path(&self, uri: &str) -> Result<PathBuf, LoadError> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if uri.contains("://") {
            return Err(LoadError::InvalidUri(uri.to_owned()));
        }
        let rel = uri.trim_start_matches('/');
        if rel.is_empty() || Path::new(rel).components().any(|c| c.as_os_str() == "..") {
            return Err(LoadError::InvalidUri(uri.to_owned()));
        }
        Ok(self.asset_root.join(rel))
    }

    async fn fetch_http(&self, uri: &str) -> Result<Vec<u8>, LoadError> {
        let mut attempt = 0;
        loop {
            match self.fetch_http_once(uri).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.retries && e.is_retryable() => {
                    tracing::debug!(uri, attempt, err = %e, "asset fetch failed, retrying");
                    sleep_backoff(attempt, self.backoff_ms, self.backoff_max_ms).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_http_once(&self, uri: &str) -> Result<Vec<u8>, LoadError> {
        let http_err = |source| LoadError::Http {
            uri: uri.to_owned(),
            source,
        };
        let resp = self.http.get(uri).send().await.map_err(http_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status,
                uri: uri.to_owned(),
            });
        }

        let mut out = Vec::with_capacity(resp.content_length().unwrap_or(0) as usize);
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.map_err(http_err)?);
        }
        Ok(out)
    }

    async fn fetch_file(&self, uri: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.local_path(uri)?;
        tokio::fs::read(&path)
            .await
            .map_err(|source| LoadError::Io { path, source })
    }
}

impl AssetFetcher for AssetLoader {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LoadError>> {
        Box::pin(async move {
            let bytes = if uri.starts_with("http://") || uri.starts_with("https://") {
                self.fetch_http(uri).await?
            } else {
                self.fetch_file(uri).await?
            };
            tracing::debug!(uri, bytes = bytes.len(), "asset fetched");
            Ok(bytes)
        })
    }
}

/// Exponential backoff capped at `max_ms`, plus up to 250ms of clock-derived
/// jitter (still capped).
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64, jitter_seed: u64) -> Duration {
    let doubled = base_ms.saturating_mul(1u64 << attempt.min(6));
    let jitter = jitter_seed % 251;
    Duration::from_millis(doubled.saturating_add(jitter).min(max_ms))
}

async fn sleep_backoff(attempt: u32, base_ms: u64, max_ms: u64) {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_millis() as u64)
        .unwrap_or(0);
    tokio::time::sleep(backoff_delay(attempt, base_ms, max_ms, seed)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(root: &Path) -> AssetLoader {
        AssetLoader::new(&LoaderConfig {
            asset_root: root.to_path_buf(),
            retries: 0,
            ..LoaderConfig::default()
        })
    }

    #[test]
    fn local_paths_resolve_under_asset_root() {
        let l = loader(Path::new("/srv/assets"));
        assert_eq!(
            l.local_path("/audio/henesys.wav").expect("path"),
            PathBuf::from("/srv/assets/audio/henesys.wav")
        );
        assert_eq!(
            l.local_path("file:///tmp/x.wav").expect("path"),
            PathBuf::from("/tmp/x.wav")
        );
        assert!(matches!(
            l.local_path("ftp://host/x.wav"),
            Err(LoadError::InvalidUri(_))
        ));
        assert!(matches!(
            l.local_path("/../etc/passwd"),
            Err(LoadError::InvalidUri(_))
        ));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(0, 250, 2_000, 0), Duration::from_millis(250));
        assert_eq!(backoff_delay(2, 250, 2_000, 0), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(2, 250, 2_000, 100), Duration::from_millis(1_100));
        assert_eq!(backoff_delay(9, 250, 2_000, 250), Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn reads_local_asset() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("audio")).expect("mkdir");
        std::fs::write(dir.path().join("audio/a.wav"), b"RIFF").expect("write");

        let l = loader(dir.path());
        assert_eq!(l.fetch("/audio/a.wav").await.expect("fetch"), b"RIFF".to_vec());

        let err = l.fetch("/audio/missing.wav").await.expect_err("missing");
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn http_404_is_a_load_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/audio/missing.wav")
            .with_status(404)
            .create_async()
            .await;

        let l = loader(Path::new("."));
        let url = format!("{}/audio/missing.wav", server.url());
        let err = l.fetch(&url).await.expect_err("404");
        assert!(matches!(err, LoadError::Status { status, .. } if status.as_u16() == 404));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_body_is_returned() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/audio/ok.wav")
            .with_status(200)
            .with_body(b"payload".as_slice())
            .create_async()
            .await;

        let l = loader(Path::new("."));
        let url = format!("{}/audio/ok.wav", server.url());
        assert_eq!(l.fetch(&url).await.expect("fetch"), b"payload".to_vec());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/audio/flaky.wav")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let l = AssetLoader::new(&LoaderConfig {
            retries: 2,
            retry_backoff_ms: 1,
            retry_backoff_max_ms: 1,
            ..LoaderConfig::default()
        });
        let url = format!("{}/audio/flaky.wav", server.url());
        let err = l.fetch(&url).await.expect_err("503");
        assert!(matches!(err, LoadError::Status { status, .. } if status.as_u16() == 503));
        mock.assert_async().await;
    }
}
