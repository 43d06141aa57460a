//! Reading of XMIDI, standard MIDI and RIFF MIDI containers.

mod source;
mod track;

use std::io::{Read, Seek};

use log::{debug, error, info, warn};

use crate::config::XMidiConfig;
use crate::xmidi::conversion::ConversionMode;
use crate::xmidi::error::XMidiError;
use crate::xmidi::event_list::{EventList, EventListRef};
use crate::xmidi::gamma::GammaTable;

use self::source::{padded, tag_name, Source, Tag};
use self::track::TrackConverter;

pub use self::track::PATCH_VOL_PAN_BIAS;

const VOLUME_CURVE_SIZE: usize = 128;

/// Tracks loaded from a container, ready to be shared with sequences.
pub struct XMidiFile {
  conversion: ConversionMode,
  tracks: Vec<EventListRef>,
}

impl XMidiFile {
  pub fn load<R: Read + Seek>(source: R, config: &XMidiConfig) -> Result<XMidiFile, XMidiError> {
    let volume_curve = GammaTable::new(VOLUME_CURVE_SIZE, config.gamma);
    let mut converter = TrackConverter::new(config, &volume_curve);

    let tracks = if config.conversion == ConversionMode::XMidiMtHint {
      info!("Building an MT-32 initialisation track");
      vec![converter.mt32_init_track()]
    } else {
      let mut source = Source::new(source)?;
      extract_tracks(&mut source, &mut converter, true).map_err(|err| {
        error!("Failed to load: {}", err);
        err
      })?
    };

    for (index, track) in tracks.iter().enumerate() {
      debug!(
        "Track {}: {} events, channels {:016b}",
        index,
        track.len(),
        track.chan_mask()
      );
    }
    info!(
      "Loaded {} tracks with conversion {:?}",
      tracks.len(),
      config.conversion
    );

    Ok(XMidiFile {
      conversion: config.conversion,
      tracks: tracks.into_iter().map(EventList::into_ref).collect(),
    })
  }

  pub fn number_of_tracks(&self) -> usize {
    self.tracks.len()
  }

  pub fn conversion(&self) -> ConversionMode {
    self.conversion
  }

  /// Shared handle on a track's events.
  pub fn event_list(&self, track: usize) -> Option<EventListRef> {
    let list = self.tracks.get(track).cloned();
    if list.is_none() {
      error!(
        "Can't retrieve track {} as only {} tracks were loaded",
        track,
        self.tracks.len()
      );
    }
    list
  }
}

fn extract_tracks<R: Read + Seek>(
  source: &mut Source<R>,
  converter: &mut TrackConverter,
  allow_riff: bool,
) -> Result<Vec<EventList>, XMidiError> {
  let tag = source.read_tag()?;
  match &tag {
    b"FORM" => read_xmidi(source, converter),
    b"MThd" => read_midi(source, converter),
    b"RIFF" if allow_riff => read_riff(source, converter),
    b"RIFF" => Err(XMidiError::InvalidRiff {
      cause: "nested RIFF container".to_string(),
    }),
    _ => Err(XMidiError::UnknownFormat {
      signature: tag_name(&tag),
    }),
  }
}

fn read_xmidi<R: Read + Seek>(
  source: &mut Source<R>,
  converter: &mut TrackConverter,
) -> Result<Vec<EventList>, XMidiError> {
  let len = source.read_u32_be()?;
  let start = source.position()?;
  let form_end = start + padded(len);
  let form_type = source.read_tag()?;

  match &form_type {
    b"XMID" => {
      warn!("XMIDI doesn't have XDIR, assuming a single track");
      let tracks = extract_xmidi_tracks(source, converter, form_end, 1)?;
      check_track_count(1, tracks)
    }
    b"XDIR" => {
      let expected = read_track_count(source, form_end)?;
      debug!("XMIDI directory declares {} tracks", expected);

      source.seek(form_end)?;
      let cat = source.read_tag()?;
      if &cat != b"CAT " {
        return Err(XMidiError::InvalidXMidi {
          cause: format!("expected a CAT chunk, found {:?}", tag_name(&cat)),
        });
      }
      let cat_len = source.read_u32_be()?;
      let cat_end = source.position()? + padded(cat_len);
      let cat_type = source.read_tag()?;
      if &cat_type != b"XMID" {
        return Err(XMidiError::InvalidXMidi {
          cause: format!("unexpected CAT type {:?}", tag_name(&cat_type)),
        });
      }

      let tracks = extract_xmidi_tracks(source, converter, cat_end, expected)?;
      check_track_count(expected, tracks)
    }
    _ => Err(XMidiError::InvalidXMidi {
      cause: format!("unexpected FORM type {:?}", tag_name(&form_type)),
    }),
  }
}

/// Finds the `INFO` chunk in the directory.
fn read_track_count<R: Read + Seek>(
  source: &mut Source<R>,
  end: u64,
) -> Result<usize, XMidiError> {
  while source.position()? + 8 <= end {
    let tag = source.read_tag()?;
    let len = source.read_u32_be()?;
    let start = source.position()?;
    if &tag == b"INFO" {
      if len < 2 {
        break;
      }
      let count = source.read_u16_le()? as usize;
      if count == 0 {
        return Err(XMidiError::InvalidXMidi {
          cause: "no tracks declared".to_string(),
        });
      }
      return Ok(count);
    }
    source.seek(start + padded(len))?;
  }

  Err(XMidiError::InvalidXMidi {
    cause: "missing INFO chunk".to_string(),
  })
}

fn extract_xmidi_tracks<R: Read + Seek>(
  source: &mut Source<R>,
  converter: &mut TrackConverter,
  end: u64,
  expected: usize,
) -> Result<Vec<EventList>, XMidiError> {
  let end = end.min(source.size());
  let mut tracks = Vec::with_capacity(expected);

  while tracks.len() < expected && source.position()? + 8 <= end {
    let tag: Tag = source.read_tag()?;
    let len = source.read_u32_be()?;
    let start = source.position()?;

    match &tag {
      b"FORM" => {
        // step into XMID forms, their chunks follow
        let form_type = source.read_tag()?;
        if &form_type != b"XMID" {
          source.seek(start + padded(len))?;
        }
        continue;
      }
      b"EVNT" => {
        let chan_mask = converter.convert(source, start + u64::from(len), true)?;
        converter.apply_first_state(chan_mask);
        tracks.push(converter.finish(chan_mask));
      }
      _ => {}
    }

    source.seek(start + padded(len))?;
  }

  Ok(tracks)
}

fn read_midi<R: Read + Seek>(
  source: &mut Source<R>,
  converter: &mut TrackConverter,
) -> Result<Vec<EventList>, XMidiError> {
  let len = source.read_u32_be()?;
  if len < 6 {
    return Err(XMidiError::InvalidMidi {
      cause: format!("header is too short ({} bytes)", len),
    });
  }
  let start = source.position()?;
  let format = source.read_u16_be()?;
  if format > 1 {
    return Err(XMidiError::InvalidMidi {
      cause: format!("unsupported MIDI type {}", format),
    });
  }
  let expected = source.read_u16_be()? as usize;
  let ppqn = u32::from(source.read_u16_be()?);
  source.seek(start + u64::from(len))?;

  debug!(
    "MIDI type {} with {} tracks at {} ppqn",
    format, expected, ppqn
  );

  let merge = format == 1;
  let mut tracks = Vec::new();
  let mut extracted = 0;
  let mut merged_mask = 0u16;

  while extracted < expected && source.position()? + 8 <= source.size() {
    let tag = source.read_tag()?;
    let len = source.read_u32_be()?;
    let start = source.position()?;

    if &tag == b"MTrk" {
      let chan_mask = converter.convert(source, start + u64::from(len), false)?;
      extracted += 1;
      if merge {
        merged_mask |= chan_mask;
      } else {
        tracks.push(finish_midi_track(converter, chan_mask, ppqn));
      }
    }

    source.seek(start + u64::from(len))?;
  }

  if extracted != expected {
    error!("Unable to extract all ({}) tracks specified", expected);
    return Err(XMidiError::TrackCountMismatch {
      expected,
      extracted,
    });
  }

  if merge {
    tracks.push(finish_midi_track(converter, merged_mask, ppqn));
  }

  Ok(tracks)
}

fn finish_midi_track(converter: &mut TrackConverter, chan_mask: u16, ppqn: u32) -> EventList {
  converter.apply_first_state(chan_mask);
  converter.adjust_timings(ppqn);
  converter.finish(chan_mask)
}

fn read_riff<R: Read + Seek>(
  source: &mut Source<R>,
  converter: &mut TrackConverter,
) -> Result<Vec<EventList>, XMidiError> {
  let len = source.read_u32_le()?;
  let end = (source.position()? + padded(len)).min(source.size());
  let form_type = source.read_tag()?;
  if &form_type != b"RMID" {
    return Err(XMidiError::InvalidRiff {
      cause: format!("unexpected RIFF type {:?}", tag_name(&form_type)),
    });
  }

  while source.position()? + 8 <= end {
    let tag = source.read_tag()?;
    let len = source.read_u32_le()?;
    if &tag == b"data" {
      return extract_tracks(source, converter, false);
    }
    source.skip(padded(len) as i64)?;
  }

  Err(XMidiError::InvalidRiff {
    cause: "missing data chunk".to_string(),
  })
}

fn check_track_count(
  expected: usize,
  tracks: Vec<EventList>,
) -> Result<Vec<EventList>, XMidiError> {
  if tracks.len() != expected {
    error!("Unable to extract all ({}) tracks specified", expected);
    return Err(XMidiError::TrackCountMismatch {
      expected,
      extracted: tracks.len(),
    });
  }
  Ok(tracks)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{midi_file, riff_file, xmidi_file, xmidi_file_with_count, xmidi_form};
  use crate::xmidi::event::{Event, EventKind};
  use crate::xmidi::{MIDI_CONTROLLER_BANK_SELECT, MIDI_CONTROLLER_PAN, MIDI_CONTROLLER_VOLUME};
  use std::io::Cursor;

  const SINGLE_NOTE: [u8; 12] = [
    0xc0, 0x05, 0x90, 0x3c, 0x64, 0x81, 0x70, 0x7f, 0x71, 0xff, 0x2f, 0x00,
  ];

  fn load(data: Vec<u8>) -> Result<XMidiFile, XMidiError> {
    XMidiFile::load(Cursor::new(data), &XMidiConfig::default())
  }

  #[test]
  fn single_note_xmidi() {
    let file = load(xmidi_file(&[SINGLE_NOTE.to_vec()])).unwrap();
    assert_eq!(file.number_of_tracks(), 1);
    assert_eq!(file.conversion(), ConversionMode::None);

    let list = file.event_list(0).unwrap();
    assert_eq!(list.chan_mask(), 1);
    assert_eq!(
      list.events()[..8].to_vec(),
      vec![
        Event::controller(0, 0, MIDI_CONTROLLER_BANK_SELECT, 0),
        Event::controller(0, 0, MIDI_CONTROLLER_VOLUME, 90),
        Event::controller(0, 0, MIDI_CONTROLLER_PAN, 64),
        Event::program_change(0, 0, 5),
        Event::program_change(0, 0, 5),
        Event::note_on(0, 0x90, 0x3c, 0x64, 240),
        Event::new(240, 0x90, 0x3c, 0),
        Event::sysex(240, 0xff, 0x2f, Vec::new()),
      ]
    );
    assert_eq!(list.len(), 8);
  }

  #[test]
  fn multiple_tracks() {
    let second = vec![0xc1, 0x07, 0x91, 0x40, 0x50, 0x10, 0xff, 0x2f, 0x00];
    let file = load(xmidi_file(&[SINGLE_NOTE.to_vec(), second])).unwrap();
    assert_eq!(file.number_of_tracks(), 2);
    assert_eq!(file.event_list(1).unwrap().chan_mask(), 1 << 1);
    assert!(file.event_list(2).is_none());
  }

  #[test]
  fn event_lists_are_shared() {
    let file = load(xmidi_file(&[SINGLE_NOTE.to_vec()])).unwrap();
    let first = file.event_list(0).unwrap();
    let second = file.event_list(0).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(EventList::references(&first), 3);
  }

  #[test]
  fn xmidi_without_directory() {
    let file = load(xmidi_form(&SINGLE_NOTE)).unwrap();
    assert_eq!(file.number_of_tracks(), 1);
    assert_eq!(file.event_list(0).unwrap().chan_mask(), 1);
  }

  #[test]
  fn unknown_signature() {
    match load(b"ABCD\0\0\0\0".to_vec()) {
      Err(XMidiError::UnknownFormat { signature }) => assert_eq!(signature, "ABCD"),
      other => panic!("unexpected result: {:?}", other.map(|f| f.number_of_tracks())),
    }
  }

  #[test]
  fn missing_tracks() {
    let data = xmidi_file_with_count(3, &[SINGLE_NOTE.to_vec(), SINGLE_NOTE.to_vec()]);
    match load(data) {
      Err(XMidiError::TrackCountMismatch {
        expected,
        extracted,
      }) => {
        assert_eq!(expected, 3);
        assert_eq!(extracted, 2);
      }
      other => panic!("unexpected result: {:?}", other.map(|f| f.number_of_tracks())),
    }
  }

  #[test]
  fn truncated_track() {
    let mut data = xmidi_file(&[SINGLE_NOTE.to_vec()]);
    data.truncate(data.len() - 6);
    assert!(load(data).is_err());
  }

  fn midi_track() -> Vec<u8> {
    // program change, a quarter note at 96 ppqn, end of track
    vec![
      0x00, 0xc0, 0x05, 0x00, 0x90, 0x3c, 0x64, 0x60, 0x80, 0x3c, 0x00, 0x00, 0xff, 0x2f, 0x00,
    ]
  }

  #[test]
  fn midi_type0() {
    let file = load(midi_file(0, 96, &[midi_track()])).unwrap();
    let list = file.event_list(0).unwrap();
    let note = list
      .events()
      .iter()
      .find(|event| event.kind() == EventKind::NoteOn)
      .unwrap();
    assert_eq!(note.duration(), 60);
    let off = list
      .events()
      .iter()
      .find(|event| event.kind() == EventKind::NoteOff)
      .unwrap();
    assert_eq!(off.time, 60);
  }

  #[test]
  fn midi_type1_merges_tracks() {
    let tempo_track = vec![0x00, 0xff, 0x51, 0x03, 0x03, 0xd0, 0x90, 0x00, 0xff, 0x2f, 0x00];
    let file = load(midi_file(1, 96, &[tempo_track, midi_track()])).unwrap();
    assert_eq!(file.number_of_tracks(), 1);

    let list = file.event_list(0).unwrap();
    assert_eq!(list.chan_mask(), 1);
    let tempo = list
      .events()
      .iter()
      .find(|event| event.is_meta(0x51))
      .unwrap();
    assert_eq!(tempo.sysex_data(), &[0x07, 0xa1, 0x20]);
    let note = list
      .events()
      .iter()
      .find(|event| event.kind() == EventKind::NoteOn)
      .unwrap();
    // twice the speed of the default tempo
    assert_eq!(note.duration(), 30);
  }

  #[test]
  fn midi_missing_track() {
    let mut data = midi_file(0, 96, &[midi_track(), midi_track()]);
    let truncated = data.len() - (8 + midi_track().len());
    data.truncate(truncated);
    match load(data) {
      Err(XMidiError::TrackCountMismatch {
        expected,
        extracted,
      }) => {
        assert_eq!(expected, 2);
        assert_eq!(extracted, 1);
      }
      other => panic!("unexpected result: {:?}", other.map(|f| f.number_of_tracks())),
    }
  }

  #[test]
  fn midi_bad_header() {
    let mut data = midi_file(2, 96, &[midi_track()]);
    assert!(match load(data.clone()) {
      Err(XMidiError::InvalidMidi { .. }) => true,
      _ => false,
    });

    data[7] = 4;
    assert!(load(data).is_err());
  }

  #[test]
  fn riff_midi() {
    let file = load(riff_file(&midi_file(0, 96, &[midi_track()]))).unwrap();
    assert_eq!(file.number_of_tracks(), 1);
    assert_eq!(file.event_list(0).unwrap().chan_mask(), 1);
  }

  #[test]
  fn nested_riff() {
    let data = riff_file(&riff_file(&midi_file(0, 96, &[midi_track()])));
    assert!(match load(data) {
      Err(XMidiError::InvalidRiff { .. }) => true,
      _ => false,
    });
  }

  #[test]
  fn mt_hint_builds_init_track() {
    let config = XMidiConfig::default().with_conversion(ConversionMode::XMidiMtHint);
    let file = XMidiFile::load(Cursor::new(Vec::new()), &config).unwrap();
    assert_eq!(file.number_of_tracks(), 1);
    let list = file.event_list(0).unwrap();
    assert_eq!(list.chan_mask(), 0);
    assert_eq!(list.len(), 5);
    assert!(list
      .events()
      .iter()
      .take(4)
      .all(|event| event.kind() == EventKind::SysEx));
  }

  #[test]
  fn conversion_applies_to_every_track() {
    let config = XMidiConfig::default().with_conversion(ConversionMode::Mt32ToGm);
    let data = xmidi_file(&[SINGLE_NOTE.to_vec(), SINGLE_NOTE.to_vec()]);
    let file = XMidiFile::load(Cursor::new(data), &config).unwrap();
    for track in 0..2 {
      let list = file.event_list(track).unwrap();
      assert_eq!(list.events()[3].data[0], crate::xmidi::tables::MT32_AS_GM[5]);
    }
  }
}
