use std::time::Instant;

use log::{debug, trace};

use xmidi_core::xmidi::{Message, SequenceHandler};

const TICKS_PER_SECOND: u64 = 6000;

/// Counts of what a [`LogHandler`] was sent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
  pub notes: usize,
  pub controllers: usize,
  pub programs: usize,
  pub other: usize,
  pub sysex: usize,
  pub callbacks: usize,
}

/// Handler logging every message it receives, against the wall clock.
pub struct LogHandler {
  origin: Instant,
  summary: Summary,
}

impl LogHandler {
  pub fn new() -> LogHandler {
    LogHandler {
      origin: Instant::now(),
      summary: Summary::default(),
    }
  }

  pub fn summary(&self) -> &Summary {
    &self.summary
  }
}

impl SequenceHandler for LogHandler {
  fn send_event(&mut self, seq_id: u16, message: u32) {
    let message = Message::from_packed(message);
    trace!("[{}] {:?}", seq_id, message);

    match message {
      Message::NoteOn { .. } | Message::NoteOff { .. } => self.summary.notes += 1,
      Message::ControlChange { .. } => self.summary.controllers += 1,
      Message::ProgramChange { .. } => self.summary.programs += 1,
      _ => self.summary.other += 1,
    }
  }

  fn send_sysex(&mut self, seq_id: u16, status: u8, data: &[u8]) {
    debug!("[{}] SysEx {:02x} {:02x?}", seq_id, status, data);
    self.summary.sysex += 1;
  }

  fn tick_count(&self, _seq_id: u16) -> u64 {
    let elapsed = self.origin.elapsed();
    elapsed.as_secs() * TICKS_PER_SECOND
      + u64::from(elapsed.subsec_micros()) * TICKS_PER_SECOND / 1_000_000
  }

  fn handle_callback_trigger(&mut self, seq_id: u16, data: u8) {
    debug!("[{}] Callback {}", seq_id, data);
    self.summary.callbacks += 1;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summary() {
    let mut handler = LogHandler::new();
    handler.send_event(0, 0x00_64_3c_90);
    handler.send_event(0, 0x00_00_3c_90);
    handler.send_event(0, 0x00_5a_07_b0);
    handler.send_event(0, 0x00_00_05_c0);
    handler.send_event(0, 0x00_40_00_e0);
    handler.send_sysex(0, 0xf0, &[0x41, 0xf7]);
    handler.handle_callback_trigger(0, 3);

    assert_eq!(
      handler.summary(),
      &Summary {
        notes: 2,
        controllers: 1,
        programs: 1,
        other: 1,
        sysex: 1,
        callbacks: 1,
      }
    );
  }

  #[test]
  fn clock_is_monotonic() {
    let handler = LogHandler::new();
    let first = handler.tick_count(0);
    let second = handler.tick_count(0);
    assert!(second >= first);
  }
}
