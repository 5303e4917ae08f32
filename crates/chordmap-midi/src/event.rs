//! RT-safe MIDI event type with sample-accurate timing.

use midi_msg::{Channel, ChannelVoiceMsg};

use crate::note::NoteKey;

/// MIDI event positioned inside a processing buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    /// Offset within the current buffer (0 = first sample).
    pub frame_offset: usize,
    pub channel: Channel,
    pub msg: ChannelVoiceMsg,
}

impl MidiEvent {
    #[inline]
    pub fn new(frame_offset: usize, channel: Channel, msg: ChannelVoiceMsg) -> Self {
        Self {
            frame_offset,
            channel,
            msg,
        }
    }

    /// `channel` is 0-based (0 = MIDI channel 1).
    #[inline]
    pub fn note_on(frame_offset: usize, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(
            frame_offset,
            Channel::from_u8(channel),
            ChannelVoiceMsg::NoteOn { note, velocity },
        )
    }

    #[inline]
    pub fn note_off(frame_offset: usize, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(
            frame_offset,
            Channel::from_u8(channel),
            ChannelVoiceMsg::NoteOff { note, velocity },
        )
    }

    #[inline]
    pub fn control_change(frame_offset: usize, channel: u8, cc: u8, value: u8) -> Self {
        Self::new(
            frame_offset,
            Channel::from_u8(channel),
            ChannelVoiceMsg::ControlChange {
                control: midi_msg::ControlChange::CC { control: cc, value },
            },
        )
    }

    #[inline]
    pub fn pitch_bend(frame_offset: usize, channel: u8, bend: u16) -> Self {
        Self::new(
            frame_offset,
            Channel::from_u8(channel),
            ChannelVoiceMsg::PitchBend { bend },
        )
    }

    #[inline]
    pub fn poly_aftertouch(frame_offset: usize, channel: u8, note: u8, pressure: u8) -> Self {
        Self::new(
            frame_offset,
            Channel::from_u8(channel),
            ChannelVoiceMsg::PolyPressure { note, pressure },
        )
    }

    /// 0-based channel number.
    #[inline]
    pub fn channel_num(&self) -> u8 {
        self.channel as u8
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        matches!(self.msg, ChannelVoiceMsg::NoteOn { velocity, .. } if velocity > 0)
    }

    /// NOTE ON with velocity 0 counts as NOTE OFF.
    #[inline]
    pub fn is_note_off(&self) -> bool {
        matches!(
            self.msg,
            ChannelVoiceMsg::NoteOff { .. } | ChannelVoiceMsg::NoteOn { velocity: 0, .. }
        )
    }

    /// True for MIDI 1.0 NOTE ON / NOTE OFF.
    #[inline]
    pub fn is_note(&self) -> bool {
        matches!(
            self.msg,
            ChannelVoiceMsg::NoteOn { .. } | ChannelVoiceMsg::NoteOff { .. }
        )
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        match self.msg {
            ChannelVoiceMsg::NoteOn { note, .. }
            | ChannelVoiceMsg::NoteOff { note, .. }
            | ChannelVoiceMsg::HighResNoteOn { note, .. }
            | ChannelVoiceMsg::HighResNoteOff { note, .. }
            | ChannelVoiceMsg::PolyPressure { note, .. } => Some(note),
            _ => None,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Option<u8> {
        match self.msg {
            ChannelVoiceMsg::NoteOn { velocity, .. }
            | ChannelVoiceMsg::NoteOff { velocity, .. } => Some(velocity),
            _ => None,
        }
    }

    /// The (note, channel) key of a note-tied event.
    #[inline]
    pub fn key(&self) -> Option<NoteKey> {
        self.note().map(|note| NoteKey::new(note, self.channel_num()))
    }

    /// Same timing and channel, different message.
    #[inline]
    pub fn with(self, msg: ChannelVoiceMsg) -> Self {
        Self { msg, ..self }
    }

    /// Same event retargeted to another pitch. Events without a note are
    /// returned unchanged.
    #[inline]
    pub fn with_note(self, new_note: u8) -> Self {
        let msg = match self.msg {
            ChannelVoiceMsg::NoteOn { velocity, .. } => ChannelVoiceMsg::NoteOn {
                note: new_note,
                velocity,
            },
            ChannelVoiceMsg::NoteOff { velocity, .. } => ChannelVoiceMsg::NoteOff {
                note: new_note,
                velocity,
            },
            ChannelVoiceMsg::HighResNoteOn { velocity, .. } => ChannelVoiceMsg::HighResNoteOn {
                note: new_note,
                velocity,
            },
            ChannelVoiceMsg::HighResNoteOff { velocity, .. } => ChannelVoiceMsg::HighResNoteOff {
                note: new_note,
                velocity,
            },
            ChannelVoiceMsg::PolyPressure { pressure, .. } => ChannelVoiceMsg::PolyPressure {
                note: new_note,
                pressure,
            },
            other => other,
        };
        self.with(msg)
    }
}
