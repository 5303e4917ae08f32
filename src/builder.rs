//! Builder for configuring and constructing a [`Chordmap`] rig.

use chordmap_core::{ArpParams, SharedChordStore};

use crate::{Chordmap, Result};

/// Parameters given here become the defaults of every instance the rig
/// creates. They are validated once in [`build`](Self::build).
///
/// # Example
///
/// ```ignore
/// use chordmap::prelude::*;
///
/// let rig = Chordmap::builder()
///     .reference_note(48)
///     .look_ahead_ms(20)
///     .build()?;
///
/// let chords = rig.chord_source();
/// let pattern = rig.pattern_source();
/// ```
#[derive(Debug, Default)]
pub struct ChordmapBuilder {
    defaults: ArpParams,
    store: Option<SharedChordStore>,
}

impl ChordmapBuilder {
    /// Replaces all instance defaults at once.
    pub fn defaults(mut self, params: ArpParams) -> Self {
        self.defaults = params;
        self
    }

    /// Default: 60
    pub fn reference_note(mut self, note: u8) -> Self {
        self.defaults.reference_note = note;
        self
    }

    /// Default: 0
    pub fn look_ahead_ms(mut self, ms: u32) -> Self {
        self.defaults.look_ahead_ms = ms;
        self
    }

    /// Attaches an existing store instead of creating a new one, so two rigs
    /// can feed the same pattern instances.
    pub fn store(mut self, store: SharedChordStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Chordmap> {
        self.defaults.validate()?;
        let store = self.store.unwrap_or_default();
        tracing::info!(
            "Chordmap rig ready (reference note {}, look-ahead {} ms)",
            self.defaults.reference_note,
            self.defaults.look_ahead_ms
        );
        Ok(Chordmap::from_parts(self.defaults, store))
    }
}
