use super::types::{U4, U7};
use super::{
  MIDI_STATUS_AFTERTOUCH, MIDI_STATUS_CONTROLLER, MIDI_STATUS_NOTE_OFF, MIDI_STATUS_NOTE_ON,
  MIDI_STATUS_PITCH_WHEEL, MIDI_STATUS_PRESSURE, MIDI_STATUS_PROG_CHANGE,
};

/// Event specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
  Empty,

  /// Body of a sysex or meta event
  SysEx(Vec<u8>),

  /// Note on, duration in 1/120 s ticks
  Note { duration: i32 },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventKind {
  NoteOff,
  NoteOn,
  Aftertouch,
  Controller,
  ProgramChange,
  ChannelPressure,
  PitchWheel,
  SysEx,
  Meta,
}

/// A timestamped MIDI event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
  pub time: i32,
  pub status: u8,
  pub data: [u8; 2],
  pub payload: Payload,
}

impl Event {
  pub fn new(time: i32, status: u8, data0: u8, data1: u8) -> Event {
    Event {
      time,
      status,
      data: [data0, data1],
      payload: Payload::Empty,
    }
  }

  pub fn note_on(time: i32, status: u8, key: U7, velocity: U7, duration: i32) -> Event {
    Event {
      time,
      status,
      data: [key, velocity],
      payload: Payload::Note { duration },
    }
  }

  pub fn controller(time: i32, channel: U4, controller: U7, value: U7) -> Event {
    Event::new(
      time,
      (MIDI_STATUS_CONTROLLER << 4) | (channel & 0x0f),
      controller,
      value,
    )
  }

  pub fn program_change(time: i32, channel: U4, program: U7) -> Event {
    Event::new(
      time,
      (MIDI_STATUS_PROG_CHANGE << 4) | (channel & 0x0f),
      program,
      0,
    )
  }

  /// Sysex (`0xF0`, `0xF7`) or meta (`0xFF`) event. For meta events `meta_type`
  /// lands in `data[0]`.
  pub fn sysex(time: i32, status: u8, meta_type: u8, buffer: Vec<u8>) -> Event {
    Event {
      time,
      status,
      data: [meta_type, 0],
      payload: Payload::SysEx(buffer),
    }
  }

  pub fn kind(&self) -> EventKind {
    match self.status >> 4 {
      MIDI_STATUS_NOTE_OFF => EventKind::NoteOff,
      MIDI_STATUS_NOTE_ON if self.data[1] == 0 => EventKind::NoteOff,
      MIDI_STATUS_NOTE_ON => EventKind::NoteOn,
      MIDI_STATUS_AFTERTOUCH => EventKind::Aftertouch,
      MIDI_STATUS_CONTROLLER => EventKind::Controller,
      MIDI_STATUS_PROG_CHANGE => EventKind::ProgramChange,
      MIDI_STATUS_PRESSURE => EventKind::ChannelPressure,
      MIDI_STATUS_PITCH_WHEEL => EventKind::PitchWheel,
      _ if self.status == 0xff => EventKind::Meta,
      _ => EventKind::SysEx,
    }
  }

  pub fn is_channel_event(&self) -> bool {
    self.status < 0xf0
  }

  pub fn channel(&self) -> U4 {
    self.status & 0x0f
  }

  pub fn is_controller(&self, controller: U7) -> bool {
    self.kind() == EventKind::Controller && self.data[0] == controller
  }

  pub fn is_meta(&self, meta_type: u8) -> bool {
    self.status == 0xff && self.data[0] == meta_type
  }

  pub fn duration(&self) -> i32 {
    match self.payload {
      Payload::Note { duration } => duration,
      _ => 0,
    }
  }

  pub fn set_duration(&mut self, duration: i32) {
    self.payload = Payload::Note { duration };
  }

  pub fn sysex_data(&self) -> &[u8] {
    match &self.payload {
      Payload::SysEx(buffer) => buffer.as_slice(),
      _ => &[],
    }
  }

  pub fn sysex_data_mut(&mut self) -> Option<&mut Vec<u8>> {
    match &mut self.payload {
      Payload::SysEx(buffer) => Some(buffer),
      _ => None,
    }
  }

  /// Channel event packed as `status | data0 << 8 | data1 << 16`.
  pub fn packed(&self) -> u32 {
    u32::from(self.status) | (u32::from(self.data[0]) << 8) | (u32::from(self.data[1]) << 16)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_of_channel_events() {
    assert_eq!(Event::new(0, 0x83, 60, 0).kind(), EventKind::NoteOff);
    assert_eq!(Event::new(0, 0x93, 60, 0).kind(), EventKind::NoteOff);
    assert_eq!(Event::note_on(0, 0x93, 60, 1, 10).kind(), EventKind::NoteOn);
    assert_eq!(Event::new(0, 0xa0, 60, 1).kind(), EventKind::Aftertouch);
    assert_eq!(Event::controller(0, 2, 7, 1).kind(), EventKind::Controller);
    assert_eq!(Event::program_change(0, 2, 7).kind(), EventKind::ProgramChange);
    assert_eq!(Event::new(0, 0xd1, 3, 0).kind(), EventKind::ChannelPressure);
    assert_eq!(Event::new(0, 0xe1, 0, 0x40).kind(), EventKind::PitchWheel);
  }

  #[test]
  fn kind_of_system_events() {
    assert_eq!(Event::sysex(0, 0xf0, 0, vec![1, 0xf7]).kind(), EventKind::SysEx);
    assert_eq!(Event::sysex(0, 0xf7, 0, vec![1]).kind(), EventKind::SysEx);
    assert_eq!(Event::sysex(0, 0xff, 0x2f, vec![]).kind(), EventKind::Meta);
  }

  #[test]
  fn is_controller() {
    let event = Event::controller(0, 1, 0x74, 3);
    assert!(event.is_controller(0x74));
    assert!(!event.is_controller(0x75));
    assert!(!Event::program_change(0, 1, 0x74).is_controller(0x74));
  }

  #[test]
  fn duration() {
    let mut event = Event::note_on(0, 0x90, 60, 100, 240);
    assert_eq!(event.duration(), 240);
    event.set_duration(12);
    assert_eq!(event.duration(), 12);
    assert_eq!(Event::controller(0, 0, 7, 1).duration(), 0);
  }

  #[test]
  fn packed() {
    assert_eq!(Event::note_on(0, 0x93, 60, 100, 0).packed(), 0x64_3c_93);
    assert_eq!(Event::program_change(0, 0, 5).packed(), 0x00_05_c0);
  }
}
