/// Receiver of everything a [`Sequence`](super::Sequence) plays.
///
/// Times are counted in ticks of 1/6000 s. Every call carries the id the
/// sequence was created with, so one handler can serve several sequences.
pub trait SequenceHandler {
  /// Channel message packed as `status | data0 << 8 | data1 << 16`.
  fn send_event(&mut self, seq_id: u16, message: u32);

  /// System exclusive message, `data` being everything after the status byte.
  fn send_sysex(&mut self, seq_id: u16, status: u8, data: &[u8]);

  fn tick_count(&self, seq_id: u16) -> u64;

  fn handle_callback_trigger(&mut self, seq_id: u16, data: u8);
}
