//! Serde support for [`MidiEvent`].
//!
//! Used to store captured buffers (test fixtures, recorded input) next to
//! instance presets. Plain 7-bit control changes are encoded as
//! (control, value); other control change forms are rejected.

use midi_msg::{Channel, ChannelVoiceMsg, ControlChange};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::event::MidiEvent;

#[derive(Serialize, Deserialize)]
struct EventRepr {
    frame_offset: usize,
    /// 0-based.
    channel: u8,
    message: MessageRepr,
}

#[derive(Serialize, Deserialize)]
enum MessageRepr {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    HighResNoteOn { note: u8, velocity: u16 },
    HighResNoteOff { note: u8, velocity: u16 },
    PolyPressure { note: u8, pressure: u8 },
    ControlChange { control: u8, value: u8 },
    ProgramChange { program: u8 },
    ChannelPressure { pressure: u8 },
    PitchBend { bend: u16 },
}

impl Serialize for MidiEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let message = match self.msg {
            ChannelVoiceMsg::NoteOn { note, velocity } => MessageRepr::NoteOn { note, velocity },
            ChannelVoiceMsg::NoteOff { note, velocity } => MessageRepr::NoteOff { note, velocity },
            ChannelVoiceMsg::HighResNoteOn { note, velocity } => {
                MessageRepr::HighResNoteOn { note, velocity }
            }
            ChannelVoiceMsg::HighResNoteOff { note, velocity } => {
                MessageRepr::HighResNoteOff { note, velocity }
            }
            ChannelVoiceMsg::PolyPressure { note, pressure } => {
                MessageRepr::PolyPressure { note, pressure }
            }
            ChannelVoiceMsg::ControlChange {
                control: ControlChange::CC { control, value },
            } => MessageRepr::ControlChange { control, value },
            ChannelVoiceMsg::ControlChange { control } => {
                return Err(serde::ser::Error::custom(format!(
                    "unsupported control change: {:?}",
                    control
                )))
            }
            ChannelVoiceMsg::ProgramChange { program } => MessageRepr::ProgramChange { program },
            ChannelVoiceMsg::ChannelPressure { pressure } => {
                MessageRepr::ChannelPressure { pressure }
            }
            ChannelVoiceMsg::PitchBend { bend } => MessageRepr::PitchBend { bend },
        };

        EventRepr {
            frame_offset: self.frame_offset,
            channel: self.channel_num(),
            message,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MidiEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = EventRepr::deserialize(deserializer)?;
        if repr.channel > 15 {
            return Err(serde::de::Error::custom(format!(
                "channel {} out of range (0-15)",
                repr.channel
            )));
        }

        let msg = match repr.message {
            MessageRepr::NoteOn { note, velocity } => ChannelVoiceMsg::NoteOn { note, velocity },
            MessageRepr::NoteOff { note, velocity } => ChannelVoiceMsg::NoteOff { note, velocity },
            MessageRepr::HighResNoteOn { note, velocity } => {
                ChannelVoiceMsg::HighResNoteOn { note, velocity }
            }
            MessageRepr::HighResNoteOff { note, velocity } => {
                ChannelVoiceMsg::HighResNoteOff { note, velocity }
            }
            MessageRepr::PolyPressure { note, pressure } => {
                ChannelVoiceMsg::PolyPressure { note, pressure }
            }
            MessageRepr::ControlChange { control, value } => ChannelVoiceMsg::ControlChange {
                control: ControlChange::CC { control, value },
            },
            MessageRepr::ProgramChange { program } => ChannelVoiceMsg::ProgramChange { program },
            MessageRepr::ChannelPressure { pressure } => {
                ChannelVoiceMsg::ChannelPressure { pressure }
            }
            MessageRepr::PitchBend { bend } => ChannelVoiceMsg::PitchBend { bend },
        };

        Ok(MidiEvent::new(
            repr.frame_offset,
            Channel::from_u8(repr.channel),
            msg,
        ))
    }
}
