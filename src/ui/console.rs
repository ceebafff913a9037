//! Line-oriented front end: pick a map, click hotspots, hear the music.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::audio::{PlayerCommand, PlayerEvent};
use crate::catalog::{Catalog, MapPage, Track, load_map_page};
use crate::error::{AppError, CommandError};

const HELP: &str = "\
commands:
  maps               list maps
  open <map>         open a map and preload its music
  hotspots           list hotspots on the open map
  click <x> <y>      click a map position
  hotspot <id>       select a hotspot by id
  stop               fade the music out
  volume [0..1]      show or set the master volume
  help               this text
  quit               exit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Maps,
    Open(String),
    Hotspots,
    Click { x: f64, y: f64 },
    Hotspot(String),
    Stop,
    Volume(Option<f32>),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let head = head.to_ascii_lowercase();

    let cmd = match (head.as_str(), args.as_slice()) {
        ("maps", []) => ConsoleCommand::Maps,
        ("open", [id]) => ConsoleCommand::Open((*id).to_owned()),
        ("hotspots", []) => ConsoleCommand::Hotspots,
        ("click", [x, y]) => match (parse_finite(x), parse_finite(y)) {
            (Some(x), Some(y)) => ConsoleCommand::Click { x, y },
            _ => return Err(CommandError::Usage("click <x> <y>")),
        },
        ("hotspot", [id]) => ConsoleCommand::Hotspot((*id).to_owned()),
        ("stop", []) => ConsoleCommand::Stop,
        ("volume", []) => ConsoleCommand::Volume(None),
        ("volume", [v]) => match parse_finite(v) {
            Some(v) => ConsoleCommand::Volume(Some(v as f32)),
            None => return Err(CommandError::Usage("volume [0..1]")),
        },
        ("help" | "?", []) => ConsoleCommand::Help,
        ("quit" | "exit" | "q", []) => ConsoleCommand::Quit,
        (other, _) => {
            return Err(match usage(other) {
                Some(u) => CommandError::Usage(u),
                None => CommandError::Unknown(other.to_owned()),
            });
        }
    };
    Ok(Some(cmd))
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn usage(head: &str) -> Option<&'static str> {
    Some(match head {
        "maps" => "maps",
        "open" => "open <map>",
        "hotspots" => "hotspots",
        "click" => "click <x> <y>",
        "hotspot" => "hotspot <id>",
        "stop" => "stop",
        "volume" => "volume [0..1]",
        "help" | "?" => "help",
        "quit" | "exit" | "q" => "quit",
        _ => return None,
    })
}

/// Prints every map with its hotspots and the track each one plays.
pub fn write_catalog(catalog: &Catalog, out: &mut impl Write) -> std::io::Result<()> {
    for map in catalog.maps() {
        writeln!(out, "{}  {} ({}x{})", map.id, map.name, map.width, map.height)?;
        for h in &map.hotspots {
            let title = catalog
                .track(&h.track_id)
                .map(|t| t.title.as_str())
                .unwrap_or("?");
            writeln!(
                out,
                "  {:<18} {:<18} ({:>5.1}, {:>5.1}) r={:<4} -> {}",
                h.id, h.label, h.x, h.y, h.r, title
            )?;
        }
    }
    Ok(())
}

/// Console state: the open map and the last volume the player reported.
pub struct Console<'a> {
    catalog: &'a Catalog,
    page: Option<MapPage<'a>>,
    tx: mpsc::Sender<PlayerCommand>,
    volume: f32,
}

impl<'a> Console<'a> {
    pub fn new(catalog: &'a Catalog, tx: mpsc::Sender<PlayerCommand>, volume: f32) -> Self {
        Self {
            catalog,
            page: None,
            tx,
            volume,
        }
    }

    pub fn page(&self) -> Option<&MapPage<'a>> {
        self.page.as_ref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub async fn execute(
        &mut self,
        cmd: ConsoleCommand,
        out: &mut impl Write,
    ) -> Result<Flow, AppError> {
        tracing::debug!(?cmd, "console command");
        match cmd {
            ConsoleCommand::Maps => {
                for map in self.catalog.maps() {
                    writeln!(out, "{:<12} {} ({} hotspots)", map.id, map.name, map.hotspots.len())?;
                }
            }
            ConsoleCommand::Open(map_id) => match load_map_page(self.catalog, &map_id) {
                Ok(page) => {
                    writeln!(out, "{}", page.map.name)?;
                    write_hotspots(&page, out)?;
                    for track in page.tracks() {
                        self.send(PlayerCommand::Prefetch(track.clone())).await?;
                    }
                    self.page = Some(page);
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            ConsoleCommand::Hotspots => match &self.page {
                Some(page) => write_hotspots(page, out)?,
                None => writeln!(out, "no map open, try `open <map>`")?,
            },
            ConsoleCommand::Click { x, y } => {
                let Some(page) = self.page else {
                    writeln!(out, "no map open, try `open <map>`")?;
                    return Ok(Flow::Continue);
                };
                match page.resolve_click(x, y) {
                    Some((hotspot, track)) => {
                        writeln!(out, "{} -> {}", hotspot.label, track.title)?;
                        self.play(track).await?;
                    }
                    None => writeln!(out, "nothing at ({x}, {y})")?,
                }
            }
            ConsoleCommand::Hotspot(id) => {
                let Some(page) = self.page else {
                    writeln!(out, "no map open, try `open <map>`")?;
                    return Ok(Flow::Continue);
                };
                match page.resolve_hotspot(&id) {
                    Ok((hotspot, track)) => {
                        writeln!(out, "{} -> {}", hotspot.label, track.title)?;
                        self.play(track).await?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            ConsoleCommand::Stop => self.send(PlayerCommand::Stop { fade: None }).await?,
            ConsoleCommand::Volume(None) => writeln!(out, "volume {:.2}", self.volume)?,
            ConsoleCommand::Volume(Some(v)) => self.send(PlayerCommand::SetVolume(v)).await?,
            ConsoleCommand::Help => writeln!(out, "{HELP}")?,
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    pub fn handle_event(&mut self, evt: PlayerEvent, out: &mut impl Write) -> std::io::Result<()> {
        match evt {
            PlayerEvent::NowPlaying { title, .. } => writeln!(out, "now playing: {title}"),
            PlayerEvent::Stopped => writeln!(out, "stopped"),
            PlayerEvent::VolumeChanged(v) => {
                self.volume = v;
                writeln!(out, "volume {v:.2}")
            }
            PlayerEvent::Prefetched { track_id } => {
                tracing::debug!(track_id = %track_id, "track preloaded");
                Ok(())
            }
            PlayerEvent::Error { track_id, message } => {
                let title = track_id
                    .as_deref()
                    .and_then(|id| self.catalog.track(id))
                    .map(|t| t.title.as_str());
                match title {
                    Some(title) => writeln!(out, "error: {title} unavailable ({message})"),
                    None => writeln!(out, "error: {message}"),
                }
            }
        }
    }

    async fn play(&self, track: &Track) -> Result<(), AppError> {
        self.send(PlayerCommand::Play {
            track: track.clone(),
            fade: None,
        })
        .await
    }

    async fn send(&self, cmd: PlayerCommand) -> Result<(), AppError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| AppError::Other("player worker stopped".to_owned()))
    }
}

fn write_hotspots(page: &MapPage<'_>, out: &mut impl Write) -> std::io::Result<()> {
    for h in &page.map.hotspots {
        let title = page
            .track_for(h)
            .map(|t| t.title.as_str())
            .unwrap_or("?");
        writeln!(
            out,
            "  {:<18} {:<18} ({:>5.1}, {:>5.1}) -> {}",
            h.id, h.label, h.x, h.y, title
        )?;
    }
    Ok(())
}

/// Reads commands from stdin until `quit`, EOF or Ctrl-C, printing player
/// events as they arrive.
pub async fn run_console(
    catalog: &Catalog,
    tx: mpsc::Sender<PlayerCommand>,
    mut rx: mpsc::Receiver<PlayerEvent>,
    start_map: Option<String>,
    volume: f32,
) -> Result<(), AppError> {
    let mut console = Console::new(catalog, tx, volume);
    let mut out = std::io::stdout();

    if let Some(map_id) = start_map {
        console.execute(ConsoleCommand::Open(map_id), &mut out).await?;
    }
    writeln!(out, "type `help` for commands")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("stdin closed");
                    break;
                };
                match parse_line(&line) {
                    Ok(Some(cmd)) => {
                        if console.execute(cmd, &mut out).await? == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            Some(evt) = rx.recv() => console.handle_event(evt, &mut out)?,
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
        }
        out.flush()?;
    }

    tracing::info!("console exiting");
    Ok(())
}
