//! Realtime playback of an [`EventList`](super::EventList).
//!
//! A [`Sequence`] is polled by its host: every call to
//! [`Sequence::play_event`] plays at most one due event and tells how long to
//! wait, in 1/6000 s handler ticks, before calling again.

pub mod handler;
mod shadow;

use std::sync::Arc;

use log::{debug, trace};

use self::handler::SequenceHandler;
use self::shadow::scale_volume;
use super::error::SequenceFault;
use super::event::{Event, EventKind};
use super::event_list::EventListRef;
use super::message::Message;
use super::note_stack::{ActiveNote, NoteStack};
use super::types::U4;
use super::{
  MIDI_CONTROLLER_VOLUME, NUM_CHANNELS, XMIDI_CONTROLLER_BANK_CHANGE,
  XMIDI_CONTROLLER_CALLBACK_TRIG, XMIDI_CONTROLLER_FOR_LOOP, XMIDI_CONTROLLER_NEXT_BREAK,
  XMIDI_LOOP_START_BRANCH, XMIDI_MAX_FOR_LOOP_COUNT,
};

pub use self::shadow::ChannelShadow;

/// Handler ticks per event tick are `SPEED_SCALE / speed`, 50 at normal speed.
const SPEED_SCALE: i64 = 5000;
const DEFAULT_SPEED: i32 = 100;

/// Beyond this many handler ticks late the sequence stops catching up.
const MAX_LATENESS: i64 = 1200;

const HANDLER_TICKS_PER_MS: i64 = 6;

const DEFAULT_CHANNEL_VOLUME: u8 = 100;
const NEXT_BREAK_THRESHOLD: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ForLoop {
  /// Index of the FOR event
  start: usize,
  /// Remaining iterations, 0 loops forever
  count: u8,
}

pub struct Sequence {
  id: u16,
  list: EventListRef,
  cursor: Option<usize>,
  start: Option<u64>,
  last_tick: i32,
  loops: Vec<ForLoop>,
  shadows: [ChannelShadow; NUM_CHANNELS],
  notes: NoteStack,
  repeat: bool,
  volume: u8,
  speed: i32,
  paused: bool,
}

impl Sequence {
  /// Creates a sequence ready to play `list`, optionally from the branch
  /// point `branch`.
  pub fn new(
    handler: &mut dyn SequenceHandler,
    id: u16,
    list: EventListRef,
    repeat: bool,
    volume: u8,
    branch: Option<i32>,
  ) -> Sequence {
    let cursor = if list.is_empty() { None } else { Some(0) };
    let mut sequence = Sequence {
      id,
      list,
      cursor,
      start: None,
      last_tick: 0,
      loops: Vec::with_capacity(XMIDI_MAX_FOR_LOOP_COUNT),
      shadows: [ChannelShadow::default(); NUM_CHANNELS],
      notes: NoteStack::new(),
      repeat,
      volume,
      speed: DEFAULT_SPEED,
      paused: false,
    };

    for channel in 0..NUM_CHANNELS {
      let reset = Message::ControlChange {
        channel: channel as U4,
        controller: XMIDI_CONTROLLER_BANK_CHANGE,
        value: 0,
      };
      handler.send_event(id, reset.packed());
    }

    if let Some(branch) = branch {
      match sequence.list.find_branch_event(branch) {
        Some(index) => sequence.start_at_branch(handler, index),
        None => debug!("Sequence {}: branch {} not found", id, branch),
      }
    }

    sequence
  }

  fn start_at_branch(&mut self, handler: &mut dyn SequenceHandler, index: usize) {
    let list = Arc::clone(&self.list);
    for event in list.events()[..index].iter() {
      if event.is_channel_event() {
        self.shadows[event.channel() as usize].update(event);
      }
    }
    self.cursor = Some(index);
    self.last_tick = list.events()[index].time;
    debug!("Sequence {}: starting at event {}", self.id, index);

    for channel in 0..NUM_CHANNELS {
      self.gain_channel(handler, channel as U4);
    }
  }

  pub fn id(&self) -> u16 {
    self.id
  }

  pub fn volume(&self) -> u8 {
    self.volume
  }

  pub fn speed(&self) -> i32 {
    self.speed
  }

  pub fn is_paused(&self) -> bool {
    self.paused
  }

  pub fn is_finished(&self) -> bool {
    self.cursor.is_none() && self.notes.is_empty()
  }

  pub fn event_list(&self) -> &EventListRef {
    &self.list
  }

  /// Handler ticks until the event at `time` is due, measured from the last
  /// played event.
  fn aim(&self, time: i32) -> i64 {
    i64::from(time - self.last_tick) * SPEED_SCALE / i64::from(self.speed)
  }

  fn elapsed(&self, now: u64) -> i64 {
    now.saturating_sub(self.start.unwrap_or(now)) as i64
  }

  fn release_notes(&mut self, handler: &mut dyn SequenceHandler, now: u64) {
    while let Some(note) = self.notes.pop_time(now) {
      handler.send_event(self.id, note.off_message().packed());
    }
  }

  /// Handler ticks until either the next event, `event_wait` away, or the
  /// earliest note off is due. Negative when neither is left.
  fn wait(&self, now: u64, event_wait: Option<i64>) -> i32 {
    let note_wait = self
      .notes
      .first()
      .map(|note| note.note_time as i64 - now as i64);
    let wait = match (event_wait, note_wait) {
      (Some(event), Some(note)) => event.min(note),
      (Some(wait), None) | (None, Some(wait)) => wait,
      (None, None) => return -1,
    };
    clamp(wait.max(0))
  }

  /// Plays the next event if it is due, releasing the notes that expired
  /// before and after it.
  ///
  /// Returns the handler ticks to wait before calling again, counting both the
  /// next event and the next note off. `0` means that something is already
  /// due and a negative value that the sequence has nothing left to play.
  pub fn play_event(&mut self, handler: &mut dyn SequenceHandler) -> Result<i32, SequenceFault> {
    let now = handler.tick_count(self.id);
    if self.start.is_none() {
      self.start = Some(now);
    }
    self.release_notes(handler, now);

    let index = match self.cursor {
      Some(index) => index,
      None => return Ok(self.wait(now, None)),
    };

    if self.paused || self.speed <= 0 {
      return Ok(1);
    }

    let list = Arc::clone(&self.list);
    let event = &list.events()[index];

    let aim = self.aim(event.time);
    let diff = aim - self.elapsed(now);
    if diff > 0 {
      return Ok(self.wait(now, Some(diff)));
    }

    let mut start = self.start.unwrap_or(now) + aim.max(0) as u64;
    if diff < -MAX_LATENESS {
      start += (-diff) as u64;
    }
    self.start = Some(start);
    self.last_tick = event.time;

    trace!(
      "Sequence {}: event {} at {} {:02x} {:02x} {:02x}",
      self.id,
      index,
      event.time,
      event.status,
      event.data[0],
      event.data[1]
    );

    let mut next = index + 1;

    match event.kind() {
      EventKind::Controller if event.data[0] == XMIDI_CONTROLLER_FOR_LOOP => {
        if self.loops.len() >= XMIDI_MAX_FOR_LOOP_COUNT {
          return Err(SequenceFault::ForLoopOverflow {
            max: XMIDI_MAX_FOR_LOOP_COUNT,
          });
        }
        self.loops.push(ForLoop {
          start: index,
          count: event.data[1],
        });
      }
      EventKind::Controller if event.data[0] == XMIDI_CONTROLLER_NEXT_BREAK => {
        if event.data[1] < NEXT_BREAK_THRESHOLD {
          self.loops.pop();
        } else if let Some(resume) = self.next_iteration() {
          next = resume;
        }
      }
      EventKind::Controller if event.data[0] == XMIDI_CONTROLLER_CALLBACK_TRIG => {
        handler.handle_callback_trigger(self.id, event.data[1]);
      }
      EventKind::SysEx => handler.send_sysex(self.id, event.status, event.sysex_data()),
      EventKind::Meta => {}
      _ => self.send_event(handler, index, event),
    }

    self.release_notes(handler, now);

    if next >= list.len() {
      match self.resume_loop() {
        Some(resume) => next = resume,
        None if self.repeat => {
          self.cursor = Some(0);
          if self.last_tick == 0 {
            return Ok(1);
          }
          self.last_tick = 0;
          next = 0;
        }
        None => {
          self.cursor = None;
          return Ok(self.wait(now, None));
        }
      }
    }

    self.cursor = Some(next);
    let diff = self.aim(list.events()[next].time) - self.elapsed(now);
    Ok(self.wait(now, Some(diff)))
  }

  /// Ends the current iteration of the innermost loop, returning where to
  /// resume when it has to go on.
  fn next_iteration(&mut self) -> Option<usize> {
    if self.loops.is_empty() {
      let branch = self.list.find_branch_event(XMIDI_LOOP_START_BRANCH)?;
      self.loops.push(ForLoop {
        start: branch,
        count: 0,
      });
    }

    let level = self.loops.last_mut()?;
    if level.count != 0 {
      level.count -= 1;
      if level.count == 0 {
        self.loops.pop();
        return None;
      }
    }
    let start = level.start;
    Some(self.jump(start))
  }

  fn jump(&mut self, start: usize) -> usize {
    self.last_tick = self.list.events()[start].time;
    start + 1
  }

  /// Continues the active loops once the last event was played.
  fn resume_loop(&mut self) -> Option<usize> {
    while !self.loops.is_empty() {
      match self.next_iteration() {
        Some(resume) if resume < self.list.len() => return Some(resume),
        Some(_) => {
          self.loops.pop();
        }
        None => {}
      }
    }
    None
  }

  fn send_event(&mut self, handler: &mut dyn SequenceHandler, index: usize, event: &Event) {
    let channel = event.channel() as usize;

    match event.kind() {
      // durations drive the note offs
      EventKind::NoteOff => return,
      EventKind::NoteOn => {
        if let Some(previous) = self.notes.find_and_pop(event.status, event.data[0]) {
          handler.send_event(self.id, previous.off_message().packed());
        }
        let duration = i64::from(event.duration()) * SPEED_SCALE / i64::from(self.speed);
        let note_time = self.start.unwrap_or(0) + duration.max(0) as u64;
        let note = ActiveNote::new(index, event.status, event.data[0], event.data[1]);
        self.notes.push_timed(note, note_time);
        handler.send_event(self.id, event.packed());
        return;
      }
      _ => self.shadows[channel].update(event),
    }

    if event.is_controller(MIDI_CONTROLLER_VOLUME) {
      let scaled = Message::ControlChange {
        channel: event.channel(),
        controller: MIDI_CONTROLLER_VOLUME,
        value: scale_volume(event.data[1], self.volume),
      };
      handler.send_event(self.id, scaled.packed());
    } else {
      handler.send_event(self.id, event.packed());
    }
  }

  /// Milliseconds until something has to be played, never negative.
  pub fn time_till_next(&self, handler: &dyn SequenceHandler) -> i32 {
    let now = handler.tick_count(self.id);
    let mut till = i64::from(i32::max_value());

    if let Some(note) = self.notes.first() {
      till = till.min(note.note_time as i64 - now as i64);
    }

    if let Some(index) = self.cursor {
      if !self.paused && self.speed > 0 {
        let event = &self.list.events()[index];
        till = till.min(self.aim(event.time) - self.elapsed(now));
      }
    }

    (till.max(0) / HANDLER_TICKS_PER_MS) as i32
  }

  pub fn set_volume(&mut self, handler: &mut dyn SequenceHandler, volume: u8) {
    self.volume = volume;
    for channel in 0..NUM_CHANNELS {
      if self.list.uses_channel(channel) {
        let value = self.shadows[channel]
          .volume()
          .unwrap_or(DEFAULT_CHANNEL_VOLUME);
        let message = Message::ControlChange {
          channel: channel as U4,
          controller: MIDI_CONTROLLER_VOLUME,
          value: scale_volume(value, volume),
        };
        handler.send_event(self.id, message.packed());
      }
    }
  }

  /// Playback speed in percent, values up to 0 pause the sequence.
  pub fn set_speed(&mut self, speed: i32) {
    self.speed = speed;
  }

  /// Silences the notes of `channel`, keeping them to be resumed by
  /// [`Sequence::gain_channel`].
  pub fn lose_channel(&mut self, handler: &mut dyn SequenceHandler, channel: U4) {
    for note in self.notes.iter().filter(|note| note.channel() == channel) {
      handler.send_event(self.id, note.off_message().packed());
    }
  }

  /// Restores the state of `channel` and replays its sounding notes.
  pub fn gain_channel(&mut self, handler: &mut dyn SequenceHandler, channel: U4) {
    self.apply_shadow(handler, channel);
    for note in self.notes.iter().filter(|note| note.channel() == channel) {
      handler.send_event(self.id, note.on_message().packed());
    }
  }

  pub fn apply_shadow(&mut self, handler: &mut dyn SequenceHandler, channel: U4) {
    let messages = self.shadows[channel as usize].messages(channel, self.volume);
    for message in messages {
      handler.send_event(self.id, message.packed());
    }
  }

  pub fn pause(&mut self, handler: &mut dyn SequenceHandler) {
    self.paused = true;
    for channel in 0..NUM_CHANNELS {
      if self.list.uses_channel(channel) {
        self.lose_channel(handler, channel as U4);
      }
    }
  }

  pub fn unpause(&mut self, handler: &mut dyn SequenceHandler) {
    self.paused = false;
    for channel in 0..NUM_CHANNELS {
      if self.list.uses_channel(channel) {
        self.apply_shadow(handler, channel as U4);
      }
    }
  }

  pub fn count_notes_on(&self, channel: U4) -> usize {
    if self.paused {
      0
    } else {
      self
        .notes
        .iter()
        .filter(|note| note.channel() == channel)
        .count()
    }
  }

  /// Releases every note and puts all the channels back in their default
  /// state before letting go of the event list.
  pub fn stop(mut self, handler: &mut dyn SequenceHandler) {
    while let Some(note) = self.notes.pop() {
      handler.send_event(self.id, note.off_message().packed());
    }
    for channel in 0..NUM_CHANNELS {
      self.shadows[channel].reset();
      self.apply_shadow(handler, channel as U4);
    }
    debug!("Sequence {} stopped", self.id);
  }
}

fn clamp(ticks: i64) -> i32 {
  ticks.min(i64::from(i32::max_value())) as i32
}
