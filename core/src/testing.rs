use crate::xmidi::{Message, SequenceHandler};

/// Handler with a manually advanced clock that records everything it is sent.
#[derive(Debug, Default)]
pub struct RecordingHandler {
  pub clock: u64,
  pub events: Vec<(u64, u32)>,
  pub sysex: Vec<(u8, Vec<u8>)>,
  pub callbacks: Vec<u8>,
}

impl RecordingHandler {
  pub fn new() -> RecordingHandler {
    RecordingHandler::default()
  }

  pub fn advance(&mut self, ticks: u64) {
    self.clock += ticks;
  }

  pub fn messages(&self) -> Vec<Message> {
    self
      .events
      .iter()
      .map(|&(_, packed)| Message::from_packed(packed))
      .collect()
  }

  pub fn clear(&mut self) {
    self.events.clear();
    self.sysex.clear();
    self.callbacks.clear();
  }
}

impl SequenceHandler for RecordingHandler {
  fn send_event(&mut self, _seq_id: u16, message: u32) {
    self.events.push((self.clock, message));
  }

  fn send_sysex(&mut self, _seq_id: u16, status: u8, data: &[u8]) {
    self.sysex.push((status, data.to_vec()));
  }

  fn tick_count(&self, _seq_id: u16) -> u64 {
    self.clock
  }

  fn handle_callback_trigger(&mut self, _seq_id: u16, data: u8) {
    self.callbacks.push(data);
  }
}

/// IFF chunk with a big endian length, padded to an even size.
pub fn chunk(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
  let mut data = tag.to_vec();
  data.extend_from_slice(&(body.len() as u32).to_be_bytes());
  data.extend_from_slice(body);
  if body.len() % 2 != 0 {
    data.push(0);
  }
  data
}

fn form(form_type: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut body = form_type.to_vec();
  for c in chunks {
    body.extend_from_slice(c);
  }
  chunk(b"FORM", &body)
}

/// `FORM XDIR` + `CAT XMID` container declaring `count` tracks.
pub fn xmidi_file_with_count(count: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
  let mut data = form(b"XDIR", &[chunk(b"INFO", &count.to_le_bytes())]);
  let mut cat = b"XMID".to_vec();
  for track in tracks {
    cat.extend(form(b"XMID", &[chunk(b"EVNT", track)]));
  }
  data.extend(chunk(b"CAT ", &cat));
  data
}

pub fn xmidi_file(tracks: &[Vec<u8>]) -> Vec<u8> {
  xmidi_file_with_count(tracks.len() as u16, tracks)
}

/// Single track XMIDI with no `XDIR` directory.
pub fn xmidi_form(track: &[u8]) -> Vec<u8> {
  form(b"XMID", &[chunk(b"EVNT", track)])
}

pub fn midi_file(format: u16, ppqn: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
  let mut header = Vec::new();
  header.extend_from_slice(&format.to_be_bytes());
  header.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
  header.extend_from_slice(&ppqn.to_be_bytes());
  let mut data = chunk(b"MThd", &header);
  for track in tracks {
    data.extend(b"MTrk");
    data.extend_from_slice(&(track.len() as u32).to_be_bytes());
    data.extend_from_slice(track);
  }
  data
}

/// `RIFF RMID` wrapper with a single `data` chunk.
pub fn riff_file(midi: &[u8]) -> Vec<u8> {
  let mut body = b"RMID".to_vec();
  body.extend(b"data");
  body.extend_from_slice(&(midi.len() as u32).to_le_bytes());
  body.extend_from_slice(midi);
  if midi.len() % 2 != 0 {
    body.push(0);
  }
  let mut data = b"RIFF".to_vec();
  data.extend_from_slice(&(body.len() as u32).to_le_bytes());
  data.extend(body);
  data
}
