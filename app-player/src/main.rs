use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::time::Duration;

use log::{debug, info};

use failure::{Error, Fail};

use xmidi_core::xmidi::{EventListRef, XMidiFile};

mod config;
use crate::config::Config;

mod handler;

mod worker;
use crate::worker::PlayerWorker;

const XMIDI_PLAYER_CONFIG: &'static str = "XMIDI_PLAYER_CONFIG";
const DEFAULT_XMIDI_PLAYER_CONFIG: &'static str = "player.toml";

const XMIDI_PLAYER_LOG_CONFIG: &'static str = "XMIDI_PLAYER_LOG_CONFIG";
const DEFAULT_XMIDI_PLAYER_LOG_CONFIG: &'static str = "log4rs.yaml";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },

  #[fail(display = "Track {} not found, {} tracks available", track, tracks)]
  TrackNotFound { track: usize, tracks: usize },
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let config = init_config()?;

  let file = load_file(&config)?;

  let list = select_track(&file, config.player.track)?;

  if let Some(path) = config.player.export.as_ref() {
    export_track(&list, path)?;
  }

  let worker = init_worker(list, &config)?;

  let summary = worker.wait(config.player.duration.map(Duration::from_secs));
  info!("Played {:#?}", summary);

  Ok(())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path = std::env::var(XMIDI_PLAYER_LOG_CONFIG)
    .unwrap_or_else(|_| DEFAULT_XMIDI_PLAYER_LOG_CONFIG.to_string());

  log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
    MainError::LoggingInit {
      cause: err.to_string(),
    }
  })?;

  Ok(())
}

fn init_config() -> Result<Config, Error> {
  let config_path =
    std::env::var(XMIDI_PLAYER_CONFIG).unwrap_or_else(|_| DEFAULT_XMIDI_PLAYER_CONFIG.to_string());

  info!("Loading player configuration from {} ...", config_path);
  let config = Config::from_file(config_path.as_str())?;
  debug!("{:#?}", config);

  Ok(config)
}

fn load_file(config: &Config) -> Result<XMidiFile, Error> {
  info!("Loading {} ...", config.player.file);

  let data = std::fs::read(config.player.file.as_str())?;
  let file = XMidiFile::load(Cursor::new(data), &config.xmidi)?;

  for track in 0..file.number_of_tracks() {
    if let Some(list) = file.event_list(track) {
      info!(
        "Track {}: {} events, channels {:016b}",
        track,
        list.len(),
        list.chan_mask()
      );
      for (channel, patch) in list.initial_patches().iter().enumerate() {
        if let Some(patch) = patch {
          debug!("   Channel {:2} starts with patch {}", channel, patch);
        }
      }
    }
  }

  Ok(file)
}

fn select_track(file: &XMidiFile, track: usize) -> Result<EventListRef, Error> {
  let list = file.event_list(track).ok_or_else(|| MainError::TrackNotFound {
    track,
    tracks: file.number_of_tracks(),
  })?;
  Ok(list)
}

fn export_track(list: &EventListRef, path: &str) -> Result<(), Error> {
  let mut writer = BufWriter::new(File::create(path)?);
  let size = list.write(&mut writer)?;
  info!("Exported {} bytes to {}", size, path);
  Ok(())
}

fn init_worker(list: EventListRef, config: &Config) -> Result<PlayerWorker, Error> {
  PlayerWorker::start(list, &config.player)
}
