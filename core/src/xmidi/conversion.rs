use serde_derive::Deserialize;

/// Instrument mapping applied while loading.
#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConversionMode {
  #[serde(rename = "none")]
  None,
  #[serde(rename = "mt32_to_gm")]
  Mt32ToGm,
  #[serde(rename = "mt32_to_gs")]
  Mt32ToGs,
  #[serde(rename = "mt32_to_gs127")]
  Mt32ToGs127,
  #[serde(rename = "gm_to_mt32")]
  GmToMt32,
  #[serde(rename = "gs127_to_gs")]
  Gs127ToGs,
  /// Ignore the source and build an MT-32 initialisation track
  #[serde(rename = "xmidi_mt_hint")]
  XMidiMtHint,
}

impl ConversionMode {
  /// Whether events get remapped, which also enables the volume curve.
  pub fn is_converting(self) -> bool {
    match self {
      ConversionMode::None | ConversionMode::XMidiMtHint => false,
      _ => true,
    }
  }

  /// Whether the source is MT-32 content going to a GM/GS device. Bank selects
  /// in such sources are dropped as the conversion provides its own.
  pub fn from_mt32(self) -> bool {
    match self {
      ConversionMode::Mt32ToGm | ConversionMode::Mt32ToGs | ConversionMode::Mt32ToGs127 => true,
      _ => false,
    }
  }
}

impl Default for ConversionMode {
  fn default() -> ConversionMode {
    ConversionMode::None
  }
}

#[cfg(test)]
mod tests {
  use super::ConversionMode;

  #[test]
  fn is_converting() {
    assert!(!ConversionMode::None.is_converting());
    assert!(!ConversionMode::XMidiMtHint.is_converting());
    assert!(ConversionMode::Mt32ToGm.is_converting());
    assert!(ConversionMode::Gs127ToGs.is_converting());
    assert!(ConversionMode::GmToMt32.is_converting());
  }

  #[test]
  fn from_mt32() {
    assert!(ConversionMode::Mt32ToGs127.from_mt32());
    assert!(!ConversionMode::Gs127ToGs.from_mt32());
    assert!(!ConversionMode::GmToMt32.from_mt32());
  }
}
