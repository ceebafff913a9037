use std::sync::Arc;
use tokio::sync::mpsc;

use super::download::AssetFetcher;
use super::engine::AudioPlayer;
use super::messages::{PlayerCommand, PlayerEvent};
use super::output::OutputBackend;
use crate::config::PlayerConfig;

struct PlayerWorker {
    player: AudioPlayer,
    rx_cmd: mpsc::Receiver<PlayerCommand>,
    tx_evt: mpsc::Sender<PlayerEvent>,
}

impl PlayerWorker {
    async fn run(mut self) {
        while let Some(cmd) = self.rx_cmd.recv().await {
            self.handle_command(cmd).await;
        }
        tracing::info!("player worker exiting");
    }

    async fn handle_command(&mut self, cmd: PlayerCommand) {
        match cmd {
            PlayerCommand::Play { track, fade } => {
                tracing::info!(track_id = %track.id, "play requested");
                let res = match fade {
                    Some(fade) => self.player.play_with_fade(&track, fade).await,
                    None => self.player.play(&track).await,
                };
                let evt = match res {
                    Ok(()) => PlayerEvent::NowPlaying {
                        track_id: track.id,
                        title: track.title,
                    },
                    Err(e) => PlayerEvent::from(&e),
                };
                let _ = self.tx_evt.send(evt).await;
            }
            PlayerCommand::Stop { fade } => {
                match fade {
                    Some(fade) => self.player.stop_with_fade(fade),
                    None => self.player.stop(),
                }
                let _ = self.tx_evt.send(PlayerEvent::Stopped).await;
            }
            PlayerCommand::SetVolume(v) => {
                self.player.set_volume(v);
                let _ = self
                    .tx_evt
                    .send(PlayerEvent::VolumeChanged(self.player.volume()))
                    .await;
            }
            PlayerCommand::Prefetch(track) => {
                let evt = match self.player.prefetch(&track).await {
                    Ok(()) => PlayerEvent::Prefetched { track_id: track.id },
                    Err(e) => {
                        tracing::warn!(track_id = %track.id, err = %e, "prefetch failed");
                        PlayerEvent::from(&e)
                    }
                };
                let _ = self.tx_evt.send(evt).await;
            }
        }
    }
}

/// Runs an [`AudioPlayer`] on its own thread.
///
/// The device is opened lazily on that thread; dropping the command sender
/// shuts the worker down.
pub fn spawn_player(
    backend: Box<dyn OutputBackend>,
    fetcher: Arc<dyn AssetFetcher>,
    config: PlayerConfig,
) -> (mpsc::Sender<PlayerCommand>, mpsc::Receiver<PlayerEvent>) {
    let (tx_cmd, rx_cmd) = mpsc::channel::<PlayerCommand>(64);
    let (tx_evt, rx_evt) = mpsc::channel::<PlayerEvent>(64);

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(err = %e, "failed to start player runtime");
                let _ = tx_evt.blocking_send(PlayerEvent::Error {
                    track_id: None,
                    message: format!("failed to start player runtime: {e}"),
                });
                return;
            }
        };
        let local = tokio::task::LocalSet::new();
        local.block_on(&rt, async move {
            tracing::info!(volume = config.volume, "player worker started");
            let worker = PlayerWorker {
                player: AudioPlayer::new(backend, fetcher, &config),
                rx_cmd,
                tx_evt,
            };
            worker.run().await;
        });
    });

    (tx_cmd, rx_evt)
}
