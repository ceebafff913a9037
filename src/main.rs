use clap::Parser;
use std::env;
use std::sync::Arc;

use maptune::audio::{AssetLoader, AudioBackend, spawn_player};
use maptune::catalog::Catalog;
use maptune::cli::{Cli, Command};
use maptune::config::{config_path, default_data_dir, load_config};
use maptune::error::AppError;
use maptune::logging;
use maptune::ui::{run_console, write_catalog};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    let no_audio_env = env::var("MAPTUNE_NO_AUDIO")
        .ok()
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);
    let audio_backend = if cli.no_audio || no_audio_env {
        AudioBackend::Null
    } else {
        AudioBackend::Real
    };

    let log_guard = logging::init(
        &data_dir,
        logging::LogConfig {
            dir: cli.log_dir.clone(),
            filter: cli.log_filter.clone(),
        },
    );
    tracing::info!(
        data_dir = %data_dir.display(),
        log_dir = %log_guard.dir().display(),
        backend = ?audio_backend,
        "maptune starting"
    );

    let config_file = cli.config.clone().unwrap_or_else(|| config_path(&data_dir));
    let mut config = load_config(&config_file)?;
    config.apply_env();
    if let Some(root) = cli.asset_root.clone() {
        config.loader.asset_root = root;
    }
    if let Some(path) = cli.catalog.clone() {
        config.catalog = Some(path);
    }

    let loaded;
    let catalog: &Catalog = match &config.catalog {
        Some(path) => {
            loaded = Catalog::load(path)?;
            &loaded
        }
        None => Catalog::builtin(),
    };

    match cli.command.unwrap_or(Command::Run { map: None }) {
        Command::Maps => {
            write_catalog(catalog, &mut std::io::stdout())?;
            Ok(())
        }
        Command::Run { map } => {
            let loader = Arc::new(AssetLoader::new(&config.loader));
            tracing::info!(asset_root = %loader.asset_root().display(), "asset loader ready");
            let volume = config.player.volume.clamp(0.0, 1.0);
            let (tx, rx) = spawn_player(audio_backend.into_backend(), loader, config.player);
            run_console(catalog, tx, rx, map, volume).await
        }
    }
}
