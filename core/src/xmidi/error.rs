use std::io;

use failure::Fail;

#[derive(Debug, Fail)]
pub enum XMidiError {
  #[fail(display = "Not a recognised XMIDI, MIDI or RIFF MIDI container: {:?}", signature)]
  UnknownFormat { signature: String },

  #[fail(display = "Not a valid XMIDI: {}", cause)]
  InvalidXMidi { cause: String },

  #[fail(display = "Not a valid MIDI: {}", cause)]
  InvalidMidi { cause: String },

  #[fail(display = "Not a valid RIFF MIDI: {}", cause)]
  InvalidRiff { cause: String },

  #[fail(
    display = "Unable to extract all ({}) tracks specified, only ({})",
    expected, extracted
  )]
  TrackCountMismatch { expected: usize, extracted: usize },

  #[fail(display = "Failed to read the source: {}", cause)]
  Io { cause: String },
}

impl From<io::Error> for XMidiError {
  fn from(err: io::Error) -> XMidiError {
    XMidiError::Io {
      cause: err.to_string(),
    }
  }
}

#[derive(Debug, Fail, PartialEq, Eq, Clone)]
pub enum SequenceFault {
  #[fail(display = "XMIDI: exceeding maximum for loop count ({})", max)]
  ForLoopOverflow { max: usize },
}
