use super::types::{U14, U4, U7};

#[inline]
fn u4(d: U4) -> u32 {
  u32::from(d & 0x0f)
}

#[inline]
fn u7(d: U7) -> u32 {
  u32::from(d & 0x7f)
}

#[inline]
fn status_and_channel(status: u8, channel: U4) -> u32 {
  (u32::from(status) << 4) | u4(channel)
}

#[inline]
fn pack(status: u32, d1: u32, d2: u32) -> u32 {
  status | (d1 << 8) | (d2 << 16)
}

/// Channel message exchanged with a sequence handler.
///
/// Handlers receive messages packed into a `u32` with the status byte in the
/// low byte followed by the two data bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
  NoteOff {
    channel: U4,
    key: U7,
    velocity: U7,
  },
  NoteOn {
    channel: U4,
    key: U7,
    velocity: U7,
  },
  PolyphonicKeyPressure {
    channel: U4,
    key: U7,
    value: U7,
  },
  ControlChange {
    channel: U4,
    controller: U7,
    value: U7,
  },
  ProgramChange {
    channel: U4,
    value: U7,
  },
  ChannelPressure {
    channel: U4,
    value: U7,
  },
  PitchBend {
    channel: U4,
    value: U14,
  },
  Unknown(u32),
}

impl Message {
  pub fn from_packed(packed: u32) -> Message {
    let status = (packed & 0xff) as u8;
    let d1 = ((packed >> 8) & 0xff) as u8;
    let d2 = ((packed >> 16) & 0xff) as u8;
    let channel = status & 0x0f;

    if d1 & 0x80 != 0 || d2 & 0x80 != 0 {
      return Message::Unknown(packed);
    }

    match (status >> 4) & 0x0f {
      0b1000 => Message::NoteOff {
        channel,
        key: d1,
        velocity: d2,
      },
      0b1001 => Message::NoteOn {
        channel,
        key: d1,
        velocity: d2,
      },
      0b1010 => Message::PolyphonicKeyPressure {
        channel,
        key: d1,
        value: d2,
      },
      0b1011 => Message::ControlChange {
        channel,
        controller: d1,
        value: d2,
      },
      0b1100 => Message::ProgramChange { channel, value: d1 },
      0b1101 => Message::ChannelPressure { channel, value: d1 },
      0b1110 => Message::PitchBend {
        channel,
        value: ((d2 as U14) << 7) | (d1 as U14),
      },
      _ => Message::Unknown(packed),
    }
  }

  pub fn packed(&self) -> u32 {
    match *self {
      Message::NoteOff {
        channel,
        key,
        velocity,
      } => pack(status_and_channel(0b1000, channel), u7(key), u7(velocity)),
      Message::NoteOn {
        channel,
        key,
        velocity,
      } => pack(status_and_channel(0b1001, channel), u7(key), u7(velocity)),
      Message::PolyphonicKeyPressure {
        channel,
        key,
        value,
      } => pack(status_and_channel(0b1010, channel), u7(key), u7(value)),
      Message::ControlChange {
        channel,
        controller,
        value,
      } => pack(
        status_and_channel(0b1011, channel),
        u7(controller),
        u7(value),
      ),
      Message::ProgramChange { channel, value } => {
        pack(status_and_channel(0b1100, channel), u7(value), 0)
      }
      Message::ChannelPressure { channel, value } => {
        pack(status_and_channel(0b1101, channel), u7(value), 0)
      }
      Message::PitchBend { channel, value } => pack(
        status_and_channel(0b1110, channel),
        u32::from(value & 0x7f),
        u32::from((value >> 7) & 0x7f),
      ),
      Message::Unknown(packed) => packed,
    }
  }

  pub fn channel(&self) -> Option<U4> {
    match *self {
      Message::NoteOff { channel, .. }
      | Message::NoteOn { channel, .. }
      | Message::PolyphonicKeyPressure { channel, .. }
      | Message::ControlChange { channel, .. }
      | Message::ProgramChange { channel, .. }
      | Message::ChannelPressure { channel, .. }
      | Message::PitchBend { channel, .. } => Some(channel),
      Message::Unknown(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unpack_notes() {
    assert_eq!(
      Message::from_packed(0x7f_40_85),
      Message::NoteOff {
        channel: 0b0101,
        key: 64,
        velocity: 127
      }
    );
    assert_eq!(
      Message::from_packed(0x7f_00_9a),
      Message::NoteOn {
        channel: 0b1010,
        key: 0,
        velocity: 127
      }
    );
  }

  #[test]
  fn unpack_control_change() {
    assert_eq!(
      Message::from_packed(0x5a_07_b3),
      Message::ControlChange {
        channel: 3,
        controller: 7,
        value: 90
      }
    );
  }

  #[test]
  fn unpack_program_change_ignores_second_byte() {
    assert_eq!(
      Message::from_packed(0x00_05_c0),
      Message::ProgramChange {
        channel: 0,
        value: 5
      }
    );
  }

  #[test]
  fn unpack_pitch_bend() {
    let msg = Message::from_packed(0x2a_55_e5);
    assert_eq!(
      msg,
      Message::PitchBend {
        channel: 0b0101,
        value: 0b0_01010101010101
      }
    );
  }

  #[test]
  fn unpack_unknown() {
    assert_eq!(Message::from_packed(0xf0), Message::Unknown(0xf0));
    assert_eq!(Message::from_packed(0x00_80_90), Message::Unknown(0x00_80_90));
  }

  #[test]
  fn pack_messages() {
    let msg = Message::ControlChange {
      channel: 9,
      controller: 0x72,
      value: 0,
    };
    assert_eq!(msg.packed(), 0x00_72_b9);

    let msg = Message::PitchBend {
      channel: 0,
      value: 0x2000,
    };
    assert_eq!(msg.packed(), 0x40_00_e0);
    assert_eq!(Message::from_packed(msg.packed()), msg);
  }

  #[test]
  fn channel() {
    let msg = Message::ProgramChange {
      channel: 12,
      value: 1,
    };
    assert_eq!(msg.channel(), Some(12));
    assert_eq!(Message::Unknown(0xff).channel(), None);
  }
}
