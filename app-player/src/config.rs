use failure::Error;

use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

use xmidi_core::config::XMidiConfig;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
  pub player: Player,
  pub xmidi: XMidiConfig,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      player: Player::default(),
      xmidi: XMidiConfig::default(),
    }
  }
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
  }

  #[allow(dead_code)]
  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Player {
  pub file: String,
  pub track: usize,
  pub repeat: bool,
  pub volume: u8,
  /// Playback speed in percent
  pub speed: i32,
  /// Branch point to start playing from
  pub branch: Option<i32>,
  /// Path where the selected track is written as a standard MIDI file
  pub export: Option<String>,
  /// Stop after this many seconds, useful with `repeat`
  pub duration: Option<u64>,
}

impl Default for Player {
  fn default() -> Player {
    Player {
      file: "song.xmi".to_string(),
      track: 0,
      repeat: false,
      volume: 255,
      speed: 100,
      branch: None,
      export: None,
      duration: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use xmidi_core::xmidi::ConversionMode;

  #[test]
  fn defaults() {
    let config = Config::from_str("").unwrap();
    assert_eq!(config.player.volume, 255);
    assert_eq!(config.player.speed, 100);
    assert_eq!(config.xmidi, XMidiConfig::default());
  }

  #[test]
  fn sections() {
    let config = Config::from_str(
      r#"
      [player]
      file = "intro.xmi"
      track = 2
      repeat = true
      branch = 126

      [xmidi]
      conversion = "mt32_to_gs"
      gamma = 1.5
      "#,
    )
    .unwrap();
    assert_eq!(config.player.file, "intro.xmi");
    assert_eq!(config.player.track, 2);
    assert!(config.player.repeat);
    assert_eq!(config.player.branch, Some(126));
    assert_eq!(config.xmidi.conversion, ConversionMode::Mt32ToGs);
    assert_eq!(config.xmidi.gamma, 1.5);
  }
}
