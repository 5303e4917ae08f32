//! # Chordmap - chord-following MIDI arpeggiator engine
//!
//! Pattern notes (an arpeggio, a bass line, a drum-pad riff) are re-mapped in
//! real time onto the degrees of the chord currently held, so one pattern
//! follows any progression.
//!
//! ## Architecture
//!
//! Chordmap is an umbrella crate that coordinates:
//! - **chordmap-midi** - MIDI event type with sample-accurate frame offsets
//! - **chordmap-core** - Chord store, degree mapping, scale building and the
//!   per-instance processor ([`Arp`])
//!
//! ## Quick Start
//!
//! ```ignore
//! use chordmap::prelude::*;
//!
//! // One rig per group of cooperating plugin instances
//! let rig = Chordmap::builder().build()?;
//!
//! let mut chords = rig.chord_source();
//! let mut pattern = rig.pattern_source();
//!
//! let mut out = Vec::new();
//! chords.process_block(&[MidiEvent::note_on(0, 0, 60, 90)], &mut out);
//! pattern.process_block(&[MidiEvent::note_on(0, 0, 60, 100)], &mut out);
//! ```
//!
//! A single instance can also do both jobs: with the default behaviour,
//! notes on MIDI channel 16 form the chord and every other channel carries
//! pattern notes.

/// Re-export of chordmap-core for direct access
pub use chordmap_core as core;
/// Re-export of chordmap-midi for direct access
pub use chordmap_midi as midi;

pub use chordmap_core::{
    Arp, ArpParams, Chord, ChordSnapshot, ChordStore, InstanceBehaviour, ParamsHandle,
    PatternNotesMapping, PatternNotesWraparound, PreMappingChordProcessing, SharedChordStore,
    UnmappedNotesBehaviour, WhenNoChordNote, WhenSingleChordNote,
};
pub use chordmap_midi::{MidiEvent, NoteKey};

mod error;
pub use error::{Error, Result};

mod builder;
pub use builder::ChordmapBuilder;

mod engine;
pub use engine::Chordmap;

pub mod prelude {
    pub use crate::{
        Arp, ArpParams, Chordmap, ChordmapBuilder, InstanceBehaviour, MidiEvent, ParamsHandle,
        PatternNotesMapping, PatternNotesWraparound, PreMappingChordProcessing,
        UnmappedNotesBehaviour, WhenNoChordNote, WhenSingleChordNote,
    };
}
