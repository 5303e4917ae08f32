//! Chord tracking and pattern-note mapping engine.
//!
//! # Primary API
//!
//! - [`Arp`]: per-instance processor, one call per buffer
//! - [`ChordStore`] / [`SharedChordStore`]: held chord notes and the resolved chord
//! - [`ArpParams`] / [`ParamsHandle`]: instance options, published lock-free
//! - [`map_pattern_note`], [`build_scale`]: the pure mapping functions
//!
//! # Example
//!
//! ```ignore
//! use chordmap_core::prelude::*;
//!
//! // One chord instance, one pattern instance, one shared store
//! let store = SharedChordStore::new();
//! let chords = ParamsHandle::new(ArpParams {
//!     behaviour: InstanceBehaviour::ChordSource,
//!     ..Default::default()
//! });
//! let patterns = ParamsHandle::new(ArpParams {
//!     behaviour: InstanceBehaviour::PatternSource,
//!     ..Default::default()
//! });
//! let mut chord_arp = Arp::new(chords, store.clone());
//! let mut pattern_arp = Arp::new(patterns, store);
//!
//! let mut out = Vec::new();
//! chord_arp.process_block(&chord_events, &mut out);
//! out.clear();
//! pattern_arp.process_block(&pattern_events, &mut out);
//! ```

#[macro_use]
mod macros;

pub mod error;
pub use error::{Error, Result};

pub mod chord;
pub use chord::{Chord, Pitch};

pub mod params;
pub use params::{
    ArpParams, InstanceBehaviour, ParamsHandle, PatternNotesMapping, PatternNotesWraparound,
    PreMappingChordProcessing, UnmappedNotesBehaviour, WhenNoChordNote, WhenSingleChordNote,
};

pub mod state;
pub use state::STATE_LEN;

pub mod chord_store;
pub use chord_store::{ChordSnapshot, ChordStore, SharedChordStore};

pub mod mapping;
pub use mapping::{degree_offset, is_mappable, map_pattern_note, map_to_scale_degree, MappedNotes};

pub mod scale;
pub use scale::{build_scale, scale_root};

pub mod live_table;
pub use live_table::{LiveMappingTable, OutputNotes};

pub mod delay;
pub use delay::DelayLine;

mod arp;
pub use arp::Arp;

pub mod prelude {
    pub use crate::{
        Arp, ArpParams, Chord, ChordSnapshot, InstanceBehaviour, ParamsHandle,
        PatternNotesMapping, PatternNotesWraparound, PreMappingChordProcessing,
        SharedChordStore, UnmappedNotesBehaviour, WhenNoChordNote, WhenSingleChordNote,
    };
    pub use chordmap_midi::MidiEvent;
}
