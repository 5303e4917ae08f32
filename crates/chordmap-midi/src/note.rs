//! Pitch helpers and the (note, channel) key used to track sounding notes.

/// Number of MIDI pitches (0-127).
pub const NOTE_COUNT: usize = 128;

/// Number of MIDI channels.
pub const CHANNEL_COUNT: usize = 16;

/// Pitch classes of the black keys (C# D# F# G# A#).
const BLACK_PITCH_CLASSES: [bool; 12] = [
    false, true, false, true, false, false, true, false, true, false, true, false,
];

/// 0-11, where 0 = C. Works for pitches outside 0-127 too.
#[inline]
pub fn pitch_class(pitch: i32) -> u8 {
    pitch.rem_euclid(12) as u8
}

/// True for the five black keys of every octave.
#[inline]
pub fn is_black_key(pitch: i32) -> bool {
    BLACK_PITCH_CLASSES[pitch_class(pitch) as usize]
}

/// Returns the pitch as a MIDI note number, or `None` outside 0-127.
#[inline]
pub fn to_midi_note(pitch: i32) -> Option<u8> {
    if (0..NOTE_COUNT as i32).contains(&pitch) {
        Some(pitch as u8)
    } else {
        None
    }
}

/// Identifies one sounding note: pitch plus 0-based channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteKey {
    pub note: u8,
    /// 0-based (0 = MIDI channel 1).
    pub channel: u8,
}

impl NoteKey {
    #[inline]
    pub const fn new(note: u8, channel: u8) -> Self {
        Self { note, channel }
    }

    /// Dense index in `0..CHANNEL_COUNT * NOTE_COUNT`, or `None` for
    /// out-of-range keys.
    #[inline]
    pub fn index(self) -> Option<usize> {
        if (self.note as usize) < NOTE_COUNT && (self.channel as usize) < CHANNEL_COUNT {
            Some(self.channel as usize * NOTE_COUNT + self.note as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self {
            note: (index % NOTE_COUNT) as u8,
            channel: (index / NOTE_COUNT) as u8,
        }
    }
}
