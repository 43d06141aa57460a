use crate::xmidi::event::{Event, EventKind};
use crate::xmidi::message::Message;
use crate::xmidi::types::{U14, U4, U7};
use crate::xmidi::{
  MIDI_CONTROLLER_BANK_SELECT, MIDI_CONTROLLER_CHORUS, MIDI_CONTROLLER_EFFECTS,
  MIDI_CONTROLLER_SUSTAIN, MIDI_CONTROLLER_VOLUME, XMIDI_CONTROLLER_BANK_CHANGE,
};

const PITCH_WHEEL_CENTER: U14 = 0x2000;
const FINE_OFFSET: usize = 32;

/// Last known state of a channel, used to restore it after it was lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelShadow {
  pitch_wheel: U14,
  program: Option<U7>,
  coarse: [Option<U7>; 32],
  fine: [Option<U7>; 32],
  sustain: Option<U7>,
  effects: Option<U7>,
  chorus: Option<U7>,
  xbank: U7,
}

impl Default for ChannelShadow {
  fn default() -> ChannelShadow {
    ChannelShadow {
      pitch_wheel: PITCH_WHEEL_CENTER,
      program: None,
      coarse: [None; 32],
      fine: [None; 32],
      sustain: None,
      effects: None,
      chorus: None,
      xbank: 0,
    }
  }
}

impl ChannelShadow {
  pub fn reset(&mut self) {
    *self = ChannelShadow::default();
  }

  pub fn update(&mut self, event: &Event) {
    match event.kind() {
      EventKind::Controller => {
        let (controller, value) = (event.data[0], event.data[1]);
        match controller {
          0..=31 => self.coarse[controller as usize] = Some(value),
          32..=63 => self.fine[controller as usize - FINE_OFFSET] = Some(value),
          MIDI_CONTROLLER_SUSTAIN => self.sustain = Some(value),
          MIDI_CONTROLLER_EFFECTS => self.effects = Some(value),
          MIDI_CONTROLLER_CHORUS => self.chorus = Some(value),
          XMIDI_CONTROLLER_BANK_CHANGE => self.xbank = value,
          _ => {}
        }
      }
      EventKind::ProgramChange => self.program = Some(event.data[0]),
      EventKind::PitchWheel => {
        self.pitch_wheel = U14::from(event.data[0] & 0x7f) | (U14::from(event.data[1] & 0x7f) << 7)
      }
      _ => {}
    }
  }

  pub fn volume(&self) -> Option<U7> {
    self.coarse[MIDI_CONTROLLER_VOLUME as usize]
  }

  pub fn program(&self) -> Option<U7> {
    self.program
  }

  /// Messages restoring this state, with the channel volume scaled by
  /// `volume / 255`.
  pub fn messages(&self, channel: U4, volume: u8) -> Vec<Message> {
    let cc = |controller: U7, value: U7| Message::ControlChange {
      channel,
      controller,
      value,
    };

    let mut messages = vec![Message::PitchBend {
      channel,
      value: self.pitch_wheel,
    }];

    for controller in 1..32 {
      if let Some(value) = self.coarse[controller] {
        let value = if controller == MIDI_CONTROLLER_VOLUME as usize {
          scale_volume(value, volume)
        } else {
          value
        };
        messages.push(cc(controller as U7, value));
      }
    }

    for controller in 1..32 {
      if let Some(value) = self.fine[controller] {
        messages.push(cc((controller + FINE_OFFSET) as U7, value));
      }
    }

    let extras = [
      (MIDI_CONTROLLER_SUSTAIN, self.sustain),
      (MIDI_CONTROLLER_EFFECTS, self.effects),
      (MIDI_CONTROLLER_CHORUS, self.chorus),
    ];
    for &(controller, value) in extras.iter() {
      if let Some(value) = value {
        messages.push(cc(controller, value));
      }
    }

    messages.push(cc(XMIDI_CONTROLLER_BANK_CHANGE, self.xbank));

    if let Some(program) = self.program {
      if let Some(bank) = self.coarse[0] {
        messages.push(cc(MIDI_CONTROLLER_BANK_SELECT, bank));
      }
      if let Some(bank) = self.fine[0] {
        messages.push(cc(MIDI_CONTROLLER_BANK_SELECT + FINE_OFFSET as U7, bank));
      }
      messages.push(Message::ProgramChange {
        channel,
        value: program,
      });
    }

    messages
  }
}

pub fn scale_volume(value: U7, volume: u8) -> U7 {
  ((u32::from(value) * u32::from(volume)) / 255) as U7
}
