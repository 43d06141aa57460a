use failure::Error;

use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

use crate::xmidi::ConversionMode;

/// Parameters used when loading XMIDI and MIDI content.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct XMidiConfig {
  pub conversion: ConversionMode,
  /// Gamma applied to volumes and velocities when converting
  pub gamma: f64,
  /// Reverb level added to every channel's initial state
  pub reverb: Option<u8>,
  /// Chorus level added to every channel's initial state
  pub chorus: Option<u8>,
}

impl Default for XMidiConfig {
  fn default() -> XMidiConfig {
    XMidiConfig {
      conversion: ConversionMode::None,
      gamma: 1.0,
      reverb: None,
      chorus: None,
    }
  }
}

impl XMidiConfig {
  pub fn from_file<'a, T>(path: T) -> Result<XMidiConfig, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: XMidiConfig = toml::from_str(&content)?;
    Ok(config)
  }

  pub fn from_str<'a, T>(content: T) -> Result<XMidiConfig, Error>
  where
    T: Into<&'a str>,
  {
    let config: XMidiConfig = toml::from_str(content.into())?;
    Ok(config)
  }

  pub fn with_conversion(self, conversion: ConversionMode) -> XMidiConfig {
    XMidiConfig { conversion, ..self }
  }
}
