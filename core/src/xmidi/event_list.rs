use std::io::{self, Write};
use std::sync::Arc;

use log::error;

use super::event::{Event, EventKind};
use super::vlq::write_vlq;
use super::{
  MIDI_CONTROLLER_BANK_SELECT, META_END_OF_TRACK, NUM_CHANNELS, XMIDI_CONTROLLER_BANK_CHANGE,
  XMIDI_CONTROLLER_SEQ_BRANCH_INDEX,
};

/// Division written into exported files, 60 ppqn at 120 bpm gives 120 ticks/s
const EXPORT_PPQN: u16 = 60;

pub type EventListRef = Arc<EventList>;

/// The events of one track, ordered by time.
///
/// Lists are immutable once built and shared between every sequence playing
/// them through an [`EventListRef`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventList {
  events: Vec<Event>,
  branches: Vec<usize>,
  patch_bank: Vec<usize>,
  chan_mask: u16,
}

impl EventList {
  pub fn new(events: Vec<Event>, chan_mask: u16) -> EventList {
    debug_assert!(events.windows(2).all(|pair| pair[0].time <= pair[1].time));

    let branches = events
      .iter()
      .enumerate()
      .filter(|(_, event)| event.is_controller(XMIDI_CONTROLLER_SEQ_BRANCH_INDEX))
      .map(|(index, _)| index)
      .collect();

    let patch_bank = events
      .iter()
      .enumerate()
      .filter(|(_, event)| {
        event.kind() == EventKind::ProgramChange
          || event.is_controller(MIDI_CONTROLLER_BANK_SELECT)
          || event.is_controller(XMIDI_CONTROLLER_BANK_CHANGE)
      })
      .map(|(index, _)| index)
      .collect();

    EventList {
      events,
      branches,
      patch_bank,
      chan_mask,
    }
  }

  pub fn into_ref(self) -> EventListRef {
    Arc::new(self)
  }

  /// Number of live handles to a shared list.
  pub fn references(list: &EventListRef) -> usize {
    Arc::strong_count(list)
  }

  pub fn events(&self) -> &[Event] {
    &self.events
  }

  pub fn get(&self, index: usize) -> Option<&Event> {
    self.events.get(index)
  }

  pub fn len(&self) -> usize {
    self.events.len()
  }

  pub fn is_empty(&self) -> bool {
    self.events.is_empty()
  }

  /// Bit `n` is set when channel `n` plays at least one note.
  pub fn chan_mask(&self) -> u16 {
    self.chan_mask
  }

  pub fn uses_channel(&self, channel: usize) -> bool {
    channel < NUM_CHANNELS && self.chan_mask & (1 << channel) != 0
  }

  pub fn branches(&self) -> impl Iterator<Item = &Event> {
    self.branches.iter().map(move |&index| &self.events[index])
  }

  /// Finds the branch point for `index`, only its low byte being significant.
  pub fn find_branch_event(&self, index: i32) -> Option<usize> {
    let index = (index & 0xff) as u8;
    self
      .branches
      .iter()
      .cloned()
      .find(|&branch| self.events[branch].data[1] == index)
  }

  pub fn patch_bank_events(&self) -> impl Iterator<Item = &Event> {
    self.patch_bank.iter().map(move |&index| &self.events[index])
  }

  /// First program selected on every channel.
  pub fn initial_patches(&self) -> [Option<u8>; NUM_CHANNELS] {
    let mut patches = [None; NUM_CHANNELS];
    for event in self.patch_bank_events() {
      if event.kind() == EventKind::ProgramChange {
        let patch = &mut patches[event.channel() as usize];
        if patch.is_none() {
          *patch = Some(event.data[0]);
        }
      }
    }
    patches
  }

  /// Writes the list as a format 0 standard MIDI file.
  pub fn write<W: Write>(&self, dest: &mut W) -> io::Result<usize> {
    if self.events.is_empty() {
      error!("No events to write");
      return Ok(0);
    }

    dest.write_all(b"MThd")?;
    dest.write_all(&6u32.to_be_bytes())?;
    dest.write_all(&0u16.to_be_bytes())?;
    dest.write_all(&1u16.to_be_bytes())?;
    dest.write_all(&EXPORT_PPQN.to_be_bytes())?;

    Ok(14 + self.convert_to_mtrk(dest)?)
  }

  /// Writes the `MTrk` chunk for this list.
  pub fn convert_to_mtrk<W: Write>(&self, dest: &mut W) -> io::Result<usize> {
    let mut track = Vec::new();
    let mut time = 0;
    let mut last_time = 0;
    let mut last_status = 0u8;

    for event in self.events.iter() {
      // the end of track marker is written once, after everything else
      if event.is_meta(META_END_OF_TRACK) {
        last_time = event.time;
        continue;
      }

      write_vlq(&mut track, (event.time - time).max(0) as u32)?;
      time = event.time;

      if event.status != last_status || event.status >= 0xf0 {
        track.push(event.status);
      }
      last_status = event.status;

      match event.kind() {
        EventKind::ProgramChange | EventKind::ChannelPressure => track.push(event.data[0]),
        EventKind::SysEx | EventKind::Meta => {
          if event.status == 0xff {
            track.push(event.data[0]);
          }
          let data = event.sysex_data();
          write_vlq(&mut track, data.len() as u32)?;
          track.extend_from_slice(data);
        }
        _ => track.extend_from_slice(&event.data),
      }
    }

    write_vlq(&mut track, (last_time - time).max(0) as u32)?;
    track.extend_from_slice(&[0xff, META_END_OF_TRACK, 0x00]);

    dest.write_all(b"MTrk")?;
    dest.write_all(&(track.len() as u32).to_be_bytes())?;
    dest.write_all(&track)?;
    Ok(8 + track.len())
  }
}
