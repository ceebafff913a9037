use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "maptune",
    version,
    about = "Map-based background music player: click a hotspot, hear its theme"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Data directory (defaults to the platform data dir)
    #[arg(long, env = "MAPTUNE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log directory (defaults to `{data_dir}/logs`)
    #[arg(long, env = "MAPTUNE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log filter, same syntax as RUST_LOG
    #[arg(long, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    /// Config file (defaults to `{data_dir}/maptune.toml`)
    #[arg(long, env = "MAPTUNE_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON catalog replacing the built-in maps and tracks
    #[arg(long, env = "MAPTUNE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Root directory for asset paths
    #[arg(long)]
    pub asset_root: Option<PathBuf>,

    /// Run without an audio device
    #[arg(long)]
    pub no_audio: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive console (default)
    Run {
        /// Map to open on start
        #[arg(long)]
        map: Option<String>,
    },

    /// List maps, hotspots and tracks
    Maps,
}
