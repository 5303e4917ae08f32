//! MIDI types for the chordmap engine.
//!
//! - **Events**: [`MidiEvent`], a channel-voice message with a sample-accurate
//!   frame offset inside the current buffer
//! - **Keys**: [`NoteKey`], the (note, channel) pair identifying a sounding note
//! - **Pitch helpers**: black-key detection and pitch classes
//! - **Serde**: `MidiEvent` implements `Serialize`/`Deserialize` for captured buffers
//!
//! # Example
//! ```ignore
//! use chordmap_midi::MidiEvent;
//!
//! let on = MidiEvent::note_on(0, 0, 60, 100);
//! assert!(on.is_note_on());
//! let moved = on.with_note(64); // keeps frame_offset, channel, velocity
//! ```

pub(crate) mod event;
pub mod note;
mod serde_support;

pub use event::MidiEvent;
pub use note::{is_black_key, pitch_class, to_midi_note, NoteKey, CHANNEL_COUNT, NOTE_COUNT};

// Re-export essential upstream types (users shouldn't need to import midi-msg directly)
pub use midi_msg::{Channel, ChannelVoiceMsg, ControlChange};
