use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON catalog replacing the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Crossfade length used by `play`
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,
    /// Fade length used by `stop`
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,
    /// Extra wait after a fade-out before the source is stopped
    #[serde(default = "default_teardown_margin_ms")]
    pub teardown_margin_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            fade_in_ms: default_fade_in_ms(),
            fade_out_ms: default_fade_out_ms(),
            teardown_margin_ms: default_teardown_margin_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Root for asset paths that are not HTTP URLs
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_http_connect_timeout_secs")]
    pub http_connect_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_retry_backoff_max_ms")]
    pub retry_backoff_max_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            http_timeout_secs: default_http_timeout_secs(),
            http_connect_timeout_secs: default_http_connect_timeout_secs(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_max_ms: default_retry_backoff_max_ms(),
        }
    }
}

fn default_volume() -> f32 { 0.8 }
fn default_fade_in_ms() -> u64 { 600 }
fn default_fade_out_ms() -> u64 { 400 }
fn default_teardown_margin_ms() -> u64 { 50 }
fn default_asset_root() -> PathBuf { PathBuf::from("assets") }
fn default_http_timeout_secs() -> u64 { 30 }
fn default_http_connect_timeout_secs() -> u64 { 10 }
fn default_retries() -> u32 { 2 }
fn default_retry_backoff_ms() -> u64 { 250 }
fn default_retry_backoff_max_ms() -> u64 { 2000 }

/// Platform data directory, or a temp-dir fallback when none is known.
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("dev", "maptune", "maptune")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| env::temp_dir().join("maptune"))
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("maptune.toml")
}

/// Reads `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl AppConfig {
    /// Applies `MAPTUNE_*` environment overrides. Unparseable values are
    /// ignored.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("MAPTUNE_ASSET_ROOT").filter(|s| !s.trim().is_empty()) {
            self.loader.asset_root = PathBuf::from(v);
        }
        if let Some(v) = var("MAPTUNE_VOLUME").and_then(|s| s.parse().ok()) {
            self.player.volume = v;
        }
        if let Some(v) = var("MAPTUNE_HTTP_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.loader.http_timeout_secs = v;
        }
        if let Some(v) = var("MAPTUNE_DOWNLOAD_RETRIES").and_then(|s| s.parse().ok()) {
            self.loader.retries = v;
        }
    }
}
