//! XMIDI loading and playback.
//!
//! [`XMidiFile`] turns an XMIDI, MIDI or RIFF MIDI container into one shared
//! [`EventList`] per track, and a [`Sequence`] plays one of those lists
//! against a [`SequenceHandler`].

pub mod conversion;
pub mod error;
pub mod event;
pub mod event_list;
pub mod file;
pub mod gamma;
pub mod message;
pub mod note_stack;
pub mod sequence;
pub mod tables;
pub mod types;
pub mod vlq;

pub use self::conversion::ConversionMode;
pub use self::error::{SequenceFault, XMidiError};
pub use self::event::{Event, EventKind, Payload};
pub use self::event_list::{EventList, EventListRef};
pub use self::file::XMidiFile;
pub use self::message::Message;
pub use self::note_stack::{ActiveNote, NoteStack};
pub use self::sequence::{handler::SequenceHandler, Sequence};

pub const MIDI_STATUS_NOTE_OFF: u8 = 0x8;
pub const MIDI_STATUS_NOTE_ON: u8 = 0x9;
pub const MIDI_STATUS_AFTERTOUCH: u8 = 0xA;
pub const MIDI_STATUS_CONTROLLER: u8 = 0xB;
pub const MIDI_STATUS_PROG_CHANGE: u8 = 0xC;
pub const MIDI_STATUS_PRESSURE: u8 = 0xD;
pub const MIDI_STATUS_PITCH_WHEEL: u8 = 0xE;
pub const MIDI_STATUS_SYSEX: u8 = 0xF;

pub const MIDI_CONTROLLER_BANK_SELECT: u8 = 0;
pub const MIDI_CONTROLLER_VOLUME: u8 = 7;
pub const MIDI_CONTROLLER_PAN: u8 = 10;
pub const MIDI_CONTROLLER_SUSTAIN: u8 = 64;
pub const MIDI_CONTROLLER_EFFECTS: u8 = 91;
pub const MIDI_CONTROLLER_CHORUS: u8 = 93;

pub const XMIDI_CONTROLLER_CHAN_LOCK: u8 = 0x6e;
pub const XMIDI_CONTROLLER_CHAN_LOCK_PROT: u8 = 0x6f;
pub const XMIDI_CONTROLLER_VOICE_PROT: u8 = 0x70;
pub const XMIDI_CONTROLLER_TIMBRE_PROT: u8 = 0x71;
pub const XMIDI_CONTROLLER_BANK_CHANGE: u8 = 0x72;
pub const XMIDI_CONTROLLER_IND_CTRL_PREFIX: u8 = 0x73;
pub const XMIDI_CONTROLLER_FOR_LOOP: u8 = 0x74;
pub const XMIDI_CONTROLLER_NEXT_BREAK: u8 = 0x75;
pub const XMIDI_CONTROLLER_CLEAR_BB_COUNT: u8 = 0x76;
pub const XMIDI_CONTROLLER_CALLBACK_TRIG: u8 = 0x77;
pub const XMIDI_CONTROLLER_SEQ_BRANCH_INDEX: u8 = 0x78;

pub const XMIDI_MAX_FOR_LOOP_COUNT: usize = 4;

/// Branch index used by convention as the song's loop start.
pub const XMIDI_LOOP_START_BRANCH: i32 = 126;

pub const META_END_OF_TRACK: u8 = 0x2f;
pub const META_TEMPO: u8 = 0x51;

pub const NUM_CHANNELS: usize = 16;
pub const PERCUSSION_CHANNEL: u8 = 9;
