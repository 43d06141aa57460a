use std::io::{Read, Seek};

use crate::config::XMidiConfig;
use crate::xmidi::conversion::ConversionMode;
use crate::xmidi::error::XMidiError;
use crate::xmidi::event::{Event, EventKind};
use crate::xmidi::event_list::EventList;
use crate::xmidi::gamma::GammaTable;
use crate::xmidi::note_stack::{ActiveNote, NoteStack};
use crate::xmidi::tables::{GM_AS_MT32, MT32_AS_GM, MT32_AS_GS};
use crate::xmidi::{
  META_END_OF_TRACK, META_TEMPO, MIDI_CONTROLLER_BANK_SELECT, MIDI_CONTROLLER_CHORUS,
  MIDI_CONTROLLER_EFFECTS, MIDI_CONTROLLER_PAN, MIDI_CONTROLLER_VOLUME, MIDI_STATUS_AFTERTOUCH,
  MIDI_STATUS_CONTROLLER, MIDI_STATUS_NOTE_OFF, MIDI_STATUS_NOTE_ON, MIDI_STATUS_PITCH_WHEEL,
  MIDI_STATUS_PRESSURE, MIDI_STATUS_PROG_CHANGE, MIDI_STATUS_SYSEX, NUM_CHANNELS,
  PERCUSSION_CHANNEL,
};

use super::source::Source;

/// Maximum distance in ticks between a patch change and the volume, pan and
/// bank events that are taken as belonging to it.
pub const PATCH_VOL_PAN_BIAS: i32 = 5;

const DEFAULT_VOLUME: u8 = 90;
const DEFAULT_PAN: u8 = 64;
const DEFAULT_BANK: u8 = 0;

/// Tempo meta events are rewritten to 500000 us per quarter note
const FIXED_TEMPO: [u8; 3] = [0x07, 0xa1, 0x20];
const DEFAULT_TEMPO: u64 = 500_000;

const MT32_INIT_SPACING: i32 = 5;
const MT32_DEFAULT_REVERB_LEVEL: u8 = 3;

type Slot = Option<(i32, u8)>;

/// Earliest patch, bank, volume and pan seen on every channel, as (time, value).
#[derive(Debug, Default, Clone)]
struct FirstState {
  patch: [Slot; NUM_CHANNELS],
  bank: [Slot; NUM_CHANNELS],
  vol: [Slot; NUM_CHANNELS],
  pan: [Slot; NUM_CHANNELS],
}

impl FirstState {
  fn record(slot: &mut Slot, time: i32, value: u8) {
    if slot.map_or(true, |(first, _)| first > time) {
      *slot = Some((time, value));
    }
  }
}

/// Converts track data into events, one track (or one merged group of MIDI
/// tracks) at a time.
pub struct TrackConverter<'a> {
  conversion: ConversionMode,
  volume_curve: &'a GammaTable,
  reverb: Option<u8>,
  chorus: Option<u8>,
  bank127: [bool; NUM_CHANNELS],
  events: Vec<Event>,
  first_state: FirstState,
}

impl<'a> TrackConverter<'a> {
  pub fn new(config: &XMidiConfig, volume_curve: &'a GammaTable) -> TrackConverter<'a> {
    TrackConverter {
      conversion: config.conversion,
      volume_curve,
      reverb: config.reverb,
      chorus: config.chorus,
      bank127: [false; NUM_CHANNELS],
      events: Vec::new(),
      first_state: FirstState::default(),
    }
  }

  /// Converts events until the end of track marker or `end`, returning the
  /// mask of channels playing notes.
  pub fn convert<R: Read + Seek>(
    &mut self,
    source: &mut Source<R>,
    end: u64,
    is_xmi: bool,
  ) -> Result<u16, XMidiError> {
    let mut time: i32 = 0;
    let mut status: u8 = 0;
    let mut chan_mask = 0u16;
    let play_size = if is_xmi { 3 } else { 2 };

    while source.position()? < end {
      if is_xmi {
        time = time.saturating_add(source.read_vlq2()? as i32);
        status = source.read_u8()?;
      } else {
        time = time.saturating_add(source.read_vlq()? as i32);
        let data = source.read_u8()?;
        if data >= 0x80 {
          status = data;
        } else if status == 0 {
          return Err(XMidiError::InvalidMidi {
            cause: "data byte without a running status".to_string(),
          });
        } else {
          source.skip(-1)?;
        }
      }

      match status >> 4 {
        MIDI_STATUS_NOTE_ON => {
          chan_mask |= 1 << (status & 0x0f);
          self.convert_note(time, status, source, play_size)?;
        }
        MIDI_STATUS_NOTE_OFF => self.convert_note(time, status, source, 2)?,
        MIDI_STATUS_AFTERTOUCH | MIDI_STATUS_CONTROLLER | MIDI_STATUS_PITCH_WHEEL => {
          self.convert_event(time, status, source, 2)?
        }
        MIDI_STATUS_PROG_CHANGE | MIDI_STATUS_PRESSURE => {
          self.convert_event(time, status, source, 1)?
        }
        MIDI_STATUS_SYSEX => {
          let mut end_of_track = false;
          if status == 0xff {
            let position = source.position()?;
            let meta_type = source.read_u8()?;
            if meta_type == META_END_OF_TRACK {
              end_of_track = true;
            } else if meta_type == META_TEMPO && is_xmi {
              // XMIDI always plays at 120 Hz
              let len = source.read_vlq()?;
              source.skip(i64::from(len))?;
              continue;
            }
            source.seek(position)?;
          }
          self.convert_system_message(time, status, source)?;
          if end_of_track {
            break;
          }
        }
        _ => {}
      }
    }

    Ok(chan_mask)
  }

  fn convert_note<R: Read + Seek>(
    &mut self,
    time: i32,
    status: u8,
    source: &mut Source<R>,
    size: usize,
  ) -> Result<(), XMidiError> {
    let key = source.read_u8()?;
    let mut velocity = source.read_u8()?;
    let is_note_on = status >> 4 == MIDI_STATUS_NOTE_ON && velocity != 0;

    if is_note_on && self.conversion.is_converting() {
      velocity = self.volume_curve[velocity].max(1);
    }

    if size == 2 {
      if is_note_on {
        // the duration is resolved once the note off is found
        self
          .events
          .push(Event::note_on(time, status, key, velocity, 0));
      } else {
        self.events.push(Event::new(time, status, key, velocity));
      }
      return Ok(());
    }

    let duration = source.read_vlq()? as i32;
    self
      .events
      .push(Event::note_on(time, status, key, velocity, duration));
    if is_note_on {
      self
        .events
        .push(Event::new(time.saturating_add(duration), status, key, 0));
    }
    Ok(())
  }

  fn convert_event<R: Read + Seek>(
    &mut self,
    time: i32,
    status: u8,
    source: &mut Source<R>,
    size: usize,
  ) -> Result<(), XMidiError> {
    let channel = status & 0x0f;
    let kind = status >> 4;
    let mut data = source.read_u8()?;

    if kind == MIDI_STATUS_CONTROLLER && data == MIDI_CONTROLLER_BANK_SELECT {
      let value = source.read_u8()?;
      if self.conversion.from_mt32() {
        return Ok(());
      }
      if self.conversion == ConversionMode::Gs127ToGs {
        let is_bank127 = value == 127;
        self.bank127[channel as usize] = is_bank127;
        if is_bank127 {
          return Ok(());
        }
      }
      self.push_bank(time, channel, value);
      return Ok(());
    }

    if kind == MIDI_STATUS_PROG_CHANGE
      && channel != PERCUSSION_CHANNEL
      && self.conversion.is_converting()
    {
      let patch = (data & 0x7f) as usize;
      match self.conversion {
        ConversionMode::Mt32ToGm => data = MT32_AS_GM[patch],
        ConversionMode::Mt32ToGs => {
          self.push_bank(time, channel, MT32_AS_GS[patch * 2 + 1]);
          data = MT32_AS_GS[patch * 2];
        }
        ConversionMode::Gs127ToGs if self.bank127[channel as usize] => {
          self.push_bank(time, channel, MT32_AS_GS[patch * 2 + 1]);
          data = MT32_AS_GS[patch * 2];
        }
        ConversionMode::Mt32ToGs127 => self.push_bank(time, channel, 127),
        ConversionMode::GmToMt32 => data = GM_AS_MT32[patch],
        _ => {}
      }
    }

    let mut event = Event::new(time, status, data, 0);
    if size == 2 {
      event.data[1] = source.read_u8()?;
      if self.conversion.is_converting()
        && kind == MIDI_STATUS_CONTROLLER
        && data == MIDI_CONTROLLER_VOLUME
      {
        event.data[1] = self.volume_curve[event.data[1]];
      }
    }

    let ch = channel as usize;
    match kind {
      MIDI_STATUS_PROG_CHANGE => FirstState::record(&mut self.first_state.patch[ch], time, data),
      MIDI_STATUS_CONTROLLER if data == MIDI_CONTROLLER_VOLUME => {
        FirstState::record(&mut self.first_state.vol[ch], time, event.data[1])
      }
      MIDI_STATUS_CONTROLLER if data == MIDI_CONTROLLER_PAN => {
        FirstState::record(&mut self.first_state.pan[ch], time, event.data[1])
      }
      _ => {}
    }

    self.events.push(event);
    Ok(())
  }

  fn push_bank(&mut self, time: i32, channel: u8, value: u8) {
    FirstState::record(&mut self.first_state.bank[channel as usize], time, value);
    self.events.push(Event::controller(
      time,
      channel,
      MIDI_CONTROLLER_BANK_SELECT,
      value,
    ));
  }

  fn convert_system_message<R: Read + Seek>(
    &mut self,
    time: i32,
    status: u8,
    source: &mut Source<R>,
  ) -> Result<(), XMidiError> {
    let meta_type = if status == 0xff { source.read_u8()? } else { 0 };
    let len = u64::from(source.read_vlq()?);
    let remaining = source.size().saturating_sub(source.position()?);
    if len > remaining {
      return Err(XMidiError::Io {
        cause: format!("sysex of {} bytes with only {} left", len, remaining),
      });
    }
    let buffer = source.read_bytes(len as usize)?;
    self
      .events
      .push(Event::sysex(time, status, meta_type, buffer));
    Ok(())
  }

  fn sort_events(&mut self) {
    self.events.sort_by_key(|event| event.time);
  }

  /// Puts every used channel into a known state at time zero, from the first
  /// patch change and the volume, pan and bank found next to it.
  pub fn apply_first_state(&mut self, chan_mask: u16) {
    self.sort_events();

    let default_volume = if self.conversion.is_converting() {
      self.volume_curve[DEFAULT_VOLUME]
    } else {
      DEFAULT_VOLUME
    };

    let state = &self.first_state;
    let mut prologue = Vec::new();

    for channel in (0..NUM_CHANNELS).rev() {
      let (patch_time, patch) = match state.patch[channel] {
        Some(patch) if chan_mask & (1 << channel) != 0 => patch,
        _ => continue,
      };

      let near_patch = |slot: Slot| {
        slot
          .filter(|&(time, _)| (time - patch_time).abs() <= PATCH_VOL_PAN_BIAS)
          .map(|(_, value)| value)
      };

      let ch = channel as u8;
      if let Some(reverb) = self.reverb {
        prologue.push(Event::controller(0, ch, MIDI_CONTROLLER_EFFECTS, reverb));
      }
      if let Some(chorus) = self.chorus {
        prologue.push(Event::controller(0, ch, MIDI_CONTROLLER_CHORUS, chorus));
      }
      prologue.push(Event::controller(
        0,
        ch,
        MIDI_CONTROLLER_BANK_SELECT,
        near_patch(state.bank[channel]).unwrap_or(DEFAULT_BANK),
      ));
      prologue.push(Event::controller(
        0,
        ch,
        MIDI_CONTROLLER_VOLUME,
        near_patch(state.vol[channel]).unwrap_or(default_volume),
      ));
      prologue.push(Event::controller(
        0,
        ch,
        MIDI_CONTROLLER_PAN,
        near_patch(state.pan[channel]).unwrap_or(DEFAULT_PAN),
      ));
      prologue.push(Event::program_change(0, ch, patch));
    }

    prologue.extend(self.events.drain(..));
    self.events = prologue;
  }

  /// Converts MIDI ticks into 120 Hz ticks following the tempo changes, and
  /// resolves the duration of every note.
  pub fn adjust_timings(&mut self, ppqn: u32) {
    let ppqn = u64::from(ppqn.max(1)) * 10_000;
    let mut tempo = DEFAULT_TEMPO;
    let mut time_prev: i64 = 0;
    let mut last_time: i32 = 0;
    let mut hs: u64 = 0;
    let mut hs_rem: u64 = 0;
    let mut notes = NoteStack::new();

    for index in 0..self.events.len() {
      let event_time = i64::from(self.events[index].time);
      let aim = (event_time - time_prev).max(0) as u64 * tempo;

      hs_rem += aim % ppqn;
      hs += aim / ppqn;
      hs += hs_rem / ppqn;
      hs_rem %= ppqn;

      time_prev = event_time;
      let time = (hs * 6) / 5 + (6 * hs_rem) / (5 * ppqn);
      let time = (time.min(i32::max_value() as u64) as i32).max(last_time);
      last_time = time;

      let event = &mut self.events[index];
      event.time = time;

      match event.kind() {
        EventKind::NoteOn => notes.push(ActiveNote::new(
          index,
          event.status,
          event.data[0],
          event.data[1],
        )),
        EventKind::NoteOff => {
          let (status, key) = (event.status, event.data[0]);
          if let Some(note) = notes.find_and_pop(status, key) {
            let started = &mut self.events[note.event];
            let duration = time - started.time;
            started.set_duration(duration);
          }
        }
        EventKind::Meta if event.data[0] == META_TEMPO => {
          if let Some(buffer) = event.sysex_data_mut() {
            if buffer.len() >= 3 {
              tempo = (u64::from(buffer[0]) << 16) | (u64::from(buffer[1]) << 8) | u64::from(buffer[2]);
              buffer[..3].copy_from_slice(&FIXED_TEMPO);
            }
          }
        }
        _ => {}
      }
    }
  }

  /// Takes the converted events as a list, leaving the converter ready for the
  /// next track.
  pub fn finish(&mut self, chan_mask: u16) -> EventList {
    self.sort_events();
    let events = std::mem::replace(&mut self.events, Vec::new());
    self.first_state = FirstState::default();
    EventList::new(events, chan_mask)
  }

  /// Builds the track setting up an MT-32 for XMIDI playback.
  pub fn mt32_init_track(&mut self) -> EventList {
    let reverb_level = self
      .reverb
      .map(|level| ((u32::from(level.min(127)) * 7) / 127) as u8)
      .unwrap_or(MT32_DEFAULT_REVERB_LEVEL);

    let messages: [([u8; 3], Vec<u8>); 4] = [
      // all parameters reset
      ([0x7f, 0x00, 0x00], vec![0x01]),
      // parts 1-8 on channels 2-9, rhythm on channel 10
      ([0x10, 0x00, 0x0d], vec![1, 2, 3, 4, 5, 6, 7, 8, 9]),
      // partial reserve
      ([0x10, 0x00, 0x04], vec![3, 10, 6, 4, 3, 0, 0, 0, 6]),
      // reverb mode, time and level
      ([0x10, 0x00, 0x01], vec![0, 5, reverb_level]),
    ];

    let mut time = 0;
    for (address, data) in messages.iter() {
      self
        .events
        .push(Event::sysex(time, 0xf0, 0, roland_sysex(address, data)));
      time += MT32_INIT_SPACING;
    }
    self
      .events
      .push(Event::sysex(time, 0xff, META_END_OF_TRACK, Vec::new()));

    self.finish(0)
  }
}

/// Roland DT1 message body, everything after the `0xF0` status.
fn roland_sysex(address: &[u8; 3], data: &[u8]) -> Vec<u8> {
  let mut body = vec![0x41, 0x10, 0x16, 0x12];
  body.extend_from_slice(address);
  body.extend_from_slice(data);
  let sum: u32 = address
    .iter()
    .chain(data.iter())
    .map(|&b| u32::from(b))
    .sum();
  body.push(((128 - sum % 128) & 0x7f) as u8);
  body.push(0xf7);
  body
}
