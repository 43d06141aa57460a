use super::message::Message;
use super::types::{U4, U7};

/// A note that is currently sounding, or waiting for its note off while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveNote {
  /// Index of the note on in its event list
  pub event: usize,
  pub status: u8,
  pub key: U7,
  pub velocity: U7,
  /// When the note has to be released, in handler ticks
  pub note_time: u64,
}

impl ActiveNote {
  pub fn new(event: usize, status: u8, key: U7, velocity: U7) -> ActiveNote {
    ActiveNote {
      event,
      status,
      key,
      velocity,
      note_time: 0,
    }
  }

  pub fn channel(&self) -> U4 {
    self.status & 0x0f
  }

  pub fn on_message(&self) -> Message {
    Message::NoteOn {
      channel: self.channel(),
      key: self.key,
      velocity: self.velocity,
    }
  }

  /// Released as a note on with zero velocity.
  pub fn off_message(&self) -> Message {
    Message::NoteOn {
      channel: self.channel(),
      key: self.key,
      velocity: 0,
    }
  }
}

/// Stack of active notes.
///
/// Notes pushed with [`NoteStack::push_timed`] are kept in ascending release
/// time so that expired notes can be popped from the top.
#[derive(Debug, Default)]
pub struct NoteStack {
  notes: Vec<ActiveNote>,
  max_polyphony: usize,
}

impl NoteStack {
  pub fn new() -> NoteStack {
    NoteStack::default()
  }

  pub fn clear(&mut self) {
    self.notes.clear();
    self.max_polyphony = 0;
  }

  /// Pushes on top, ignoring release times.
  pub fn push(&mut self, note: ActiveNote) {
    self.notes.insert(0, note);
    self.update_polyphony();
  }

  /// Pushes keeping the stack ordered by `note_time`.
  pub fn push_timed(&mut self, mut note: ActiveNote, time: u64) {
    note.note_time = time;
    let position = self
      .notes
      .iter()
      .position(|other| other.note_time > time)
      .unwrap_or_else(|| self.notes.len());
    self.notes.insert(position, note);
    self.update_polyphony();
  }

  pub fn pop(&mut self) -> Option<ActiveNote> {
    if self.notes.is_empty() {
      None
    } else {
      Some(self.notes.remove(0))
    }
  }

  /// Pops the top note if it has to be released at or before `time`.
  pub fn pop_time(&mut self, time: u64) -> Option<ActiveNote> {
    match self.notes.first() {
      Some(note) if note.note_time <= time => self.pop(),
      _ => None,
    }
  }

  /// Removes the note playing the same key on the same channel.
  pub fn find_and_pop(&mut self, status: u8, key: U7) -> Option<ActiveNote> {
    let channel = status & 0x0f;
    self
      .notes
      .iter()
      .position(|note| note.channel() == channel && note.key == key)
      .map(|position| self.notes.remove(position))
  }

  /// Removes the note started by the event at `event`.
  pub fn remove(&mut self, event: usize) -> Option<ActiveNote> {
    self
      .notes
      .iter()
      .position(|note| note.event == event)
      .map(|position| self.notes.remove(position))
  }

  pub fn first(&self) -> Option<&ActiveNote> {
    self.notes.first()
  }

  pub fn iter(&self) -> impl Iterator<Item = &ActiveNote> {
    self.notes.iter()
  }

  pub fn len(&self) -> usize {
    self.notes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.notes.is_empty()
  }

  pub fn polyphony(&self) -> usize {
    self.notes.len()
  }

  pub fn max_polyphony(&self) -> usize {
    self.max_polyphony
  }

  fn update_polyphony(&mut self) {
    self.max_polyphony = self.max_polyphony.max(self.notes.len());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn note(event: usize, key: U7) -> ActiveNote {
    ActiveNote::new(event, 0x90, key, 100)
  }

  #[test]
  fn pop_time_in_release_order() {
    let mut stack = NoteStack::new();
    let times = [500u64, 100, 900, 300, 700];
    for (i, &time) in times.iter().enumerate() {
      stack.push_timed(note(i, 60 + i as u8), time);
    }

    let mut popped = Vec::new();
    for t in (0..=1000).step_by(50) {
      while let Some(note) = stack.pop_time(t) {
        assert!(note.note_time <= t);
        popped.push(note.note_time);
      }
    }

    assert_eq!(popped, vec![100, 300, 500, 700, 900]);
    assert!(stack.is_empty());
  }

  #[test]
  fn pop_time_keeps_future_notes() {
    let mut stack = NoteStack::new();
    stack.push_timed(note(0, 60), 200);
    assert_eq!(stack.pop_time(199), None);
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.pop_time(200).map(|n| n.event), Some(0));
  }

  #[test]
  fn equal_times_are_fifo() {
    let mut stack = NoteStack::new();
    stack.push_timed(note(0, 60), 100);
    stack.push_timed(note(1, 61), 100);
    assert_eq!(stack.pop_time(100).map(|n| n.event), Some(0));
    assert_eq!(stack.pop_time(100).map(|n| n.event), Some(1));
  }

  #[test]
  fn find_and_pop_matches_channel_and_key() {
    let mut stack = NoteStack::new();
    stack.push(ActiveNote::new(0, 0x90, 60, 100));
    stack.push(ActiveNote::new(1, 0x91, 60, 100));
    stack.push(ActiveNote::new(2, 0x90, 62, 100));

    assert_eq!(stack.find_and_pop(0x81, 60).map(|n| n.event), Some(1));
    assert_eq!(stack.find_and_pop(0x91, 60), None);
    assert_eq!(stack.find_and_pop(0x90, 60).map(|n| n.event), Some(0));
    assert_eq!(stack.len(), 1);
  }

  #[test]
  fn push_is_lifo() {
    let mut stack = NoteStack::new();
    stack.push(note(0, 60));
    stack.push(note(1, 61));
    assert_eq!(stack.pop().map(|n| n.event), Some(1));
    assert_eq!(stack.pop().map(|n| n.event), Some(0));
    assert_eq!(stack.pop(), None);
  }

  #[test]
  fn remove_and_polyphony() {
    let mut stack = NoteStack::new();
    stack.push_timed(note(0, 60), 10);
    stack.push_timed(note(1, 61), 20);
    stack.push_timed(note(2, 62), 30);
    assert_eq!(stack.polyphony(), 3);

    assert_eq!(stack.remove(1).map(|n| n.key), Some(61));
    assert_eq!(stack.remove(1), None);
    assert_eq!(stack.polyphony(), 2);
    assert_eq!(stack.max_polyphony(), 3);

    stack.clear();
    assert_eq!(stack.max_polyphony(), 0);
  }

  #[test]
  fn messages() {
    let note = ActiveNote::new(0, 0x93, 60, 99);
    assert_eq!(note.on_message().packed(), 0x63_3c_93);
    assert_eq!(note.off_message().packed(), 0x00_3c_93);
  }
}
