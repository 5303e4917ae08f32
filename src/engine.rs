//! Chordmap rig: one shared chord store and the instances wired to it.

use chordmap_core::{Arp, ArpParams, ChordSnapshot, InstanceBehaviour, ParamsHandle, SharedChordStore};

use crate::{ChordmapBuilder, Result};

/// Owns the chord store shared by a group of instances.
///
/// In a plugin host every plugin instance gets its own [`Arp`]; the rig is
/// the object the plugin shell keeps alive for as long as any of them
/// exists. Instances created from different rigs never see each other's
/// chords.
///
/// # Example
///
/// ```ignore
/// use chordmap::prelude::*;
///
/// let rig = Chordmap::builder().build()?;
/// let mut chords = rig.chord_source();
/// let mut pattern = rig.pattern_source();
///
/// let mut out = Vec::new();
/// chords.process_block(&chord_input, &mut out);
/// out.clear();
/// pattern.process_block(&pattern_input, &mut out);
/// ```
#[derive(Debug, Clone)]
pub struct Chordmap {
    defaults: ArpParams,
    store: SharedChordStore,
}

impl Chordmap {
    pub fn builder() -> ChordmapBuilder {
        ChordmapBuilder::default()
    }

    pub(crate) fn from_parts(defaults: ArpParams, store: SharedChordStore) -> Self {
        Self { defaults, store }
    }

    /// Instance with the rig defaults.
    pub fn create_instance(&self) -> Arp {
        self.instance(self.defaults.clone())
    }

    /// Instance with explicit parameters.
    pub fn create_instance_with(&self, params: ArpParams) -> Result<Arp> {
        params.validate()?;
        Ok(self.instance(params))
    }

    /// Instance that feeds this rig's chord store.
    pub fn chord_source(&self) -> Arp {
        self.with_behaviour(InstanceBehaviour::ChordSource)
    }

    /// Instance that maps its input against this rig's chord store.
    pub fn pattern_source(&self) -> Arp {
        self.with_behaviour(InstanceBehaviour::PatternSource)
    }

    /// Like [`pattern_source`](Self::pattern_source), one buffer late.
    pub fn pattern_source_delayed(&self) -> Arp {
        self.with_behaviour(InstanceBehaviour::PatternSourceDelayed)
    }

    /// Chord last published by the chord source.
    pub fn current_chord(&self) -> ChordSnapshot {
        self.store.snapshot()
    }

    #[inline]
    pub fn store(&self) -> &SharedChordStore {
        &self.store
    }

    #[inline]
    pub fn defaults(&self) -> &ArpParams {
        &self.defaults
    }

    fn with_behaviour(&self, behaviour: InstanceBehaviour) -> Arp {
        self.instance(ArpParams {
            behaviour,
            ..self.defaults.clone()
        })
    }

    fn instance(&self, params: ArpParams) -> Arp {
        Arp::new(ParamsHandle::new(params), self.store.clone())
    }
}
