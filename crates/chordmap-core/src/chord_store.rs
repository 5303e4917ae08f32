//! Chord tracking: reference-counted chord notes resolved into a snapshot.
//!
//! A [`ChordStore`] is owned by one instance (single-instance mode). A
//! [`SharedChordStore`] wraps one store behind a reader/writer lock so a
//! chord source instance can publish to any number of pattern instances.
//!
//! # Lock scope
//!
//! The writer holds the exclusive lock for a whole buffer: every chord note
//! of the buffer is applied, then the snapshot is resolved, then the lock is
//! released. Readers take the shared lock only to copy the snapshot. A reader
//! therefore sees either the previous buffer's chord or the new one, never a
//! half-updated chord.

use std::sync::Arc;

use chordmap_midi::{MidiEvent, NOTE_COUNT};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::chord::Chord;
use crate::params::{WhenNoChordNote, WhenSingleChordNote};

/// Interval added on top of a single note by [`WhenSingleChordNote::Powerchord`].
const POWERCHORD_FIFTH: i32 = 7;

/// Resolved chord plus the per-buffer processing flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSnapshot {
    pub chord: Chord,
    /// `false` = pattern notes play unmapped.
    pub should_process: bool,
    /// `true` = no new pattern NOTE ONs. Sounding notes still get their OFFs.
    pub should_silence: bool,
}

impl Default for ChordSnapshot {
    fn default() -> Self {
        Self {
            chord: Chord::new(),
            should_process: true,
            should_silence: false,
        }
    }
}

/// Reference-counted chord notes and the last resolved snapshot.
#[derive(Debug, Clone)]
pub struct ChordStore {
    /// NOTE ON count per pitch; 0 = not held.
    counters: [u16; NOTE_COUNT],
    snapshot: ChordSnapshot,
    needs_update: bool,
    last_policies: Option<(WhenNoChordNote, WhenSingleChordNote)>,
}

impl Default for ChordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChordStore {
    pub fn new() -> Self {
        Self {
            counters: [0; NOTE_COUNT],
            snapshot: ChordSnapshot::default(),
            needs_update: true,
            last_policies: None,
        }
    }

    /// One more NOTE ON for `note`. Out-of-range notes are ignored.
    pub fn add_chord_note(&mut self, note: u8) {
        if let Some(count) = self.counters.get_mut(note as usize) {
            *count = count.saturating_add(1);
            self.needs_update = true;
        }
    }

    /// One NOTE OFF for `note`. No-op if the note is not held.
    pub fn remove_chord_note(&mut self, note: u8) {
        if let Some(count) = self.counters.get_mut(note as usize) {
            if *count > 0 {
                *count -= 1;
                self.needs_update = true;
            }
        }
    }

    /// Feeds a NOTE ON/OFF into the counters. Returns `false` for events
    /// that are not notes.
    pub fn apply_event(&mut self, event: &MidiEvent) -> bool {
        match event.note() {
            Some(note) if event.is_note_on() => {
                self.add_chord_note(note);
                true
            }
            Some(note) if event.is_note_off() => {
                self.remove_chord_note(note);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn note_count(&self, note: u8) -> u16 {
        self.counters.get(note as usize).copied().unwrap_or(0)
    }

    #[inline]
    pub fn is_held(&self, note: u8) -> bool {
        self.note_count(note) > 0
    }

    /// Held pitches, ascending.
    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.counters
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(note, _)| note as u8)
    }

    /// Last resolved snapshot.
    #[inline]
    pub fn snapshot(&self) -> &ChordSnapshot {
        &self.snapshot
    }

    /// Recomputes the snapshot from the counters.
    ///
    /// Cheap to call every buffer: nothing is recomputed unless a note or a
    /// policy changed since the last call.
    pub fn resolve(
        &mut self,
        when_no_chord_note: WhenNoChordNote,
        when_single_chord_note: WhenSingleChordNote,
    ) -> &ChordSnapshot {
        let policies = (when_no_chord_note, when_single_chord_note);
        if !self.needs_update && self.last_policies == Some(policies) {
            return &self.snapshot;
        }

        let previous = self.snapshot.chord.clone();
        let snap = &mut self.snapshot;
        snap.should_silence = false;
        snap.should_process = true;

        let held: Chord = self
            .counters
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(note, _)| note as i32)
            .collect();

        match held.len() {
            0 => match when_no_chord_note {
                // Nothing to latch yet
                WhenNoChordNote::LatchLastChord => snap.should_silence = snap.chord.is_empty(),
                WhenNoChordNote::UsePatternAsNotes => snap.should_process = false,
                WhenNoChordNote::Silence => snap.should_silence = true,
            },
            1 => {
                let single = held.as_slice()[0];
                match when_single_chord_note {
                    WhenSingleChordNote::TransposeLastChord => match snap.chord.lowest() {
                        Some(root) => snap.chord = snap.chord.transposed(single - root),
                        None => snap.should_silence = true,
                    },
                    WhenSingleChordNote::Powerchord => {
                        let mut chord = held;
                        chord.insert(single + POWERCHORD_FIFTH);
                        snap.chord = chord;
                    }
                    WhenSingleChordNote::UseAsIs => snap.chord = held,
                    WhenSingleChordNote::UsePatternAsNotes => snap.should_process = false,
                    WhenSingleChordNote::Silence => snap.should_silence = true,
                }
            }
            _ => snap.chord = held,
        }

        if snap.chord != previous {
            tracing::trace!("Chord changed: {:?} -> {:?}", previous.as_slice(), snap.chord.as_slice());
        }

        self.needs_update = false;
        self.last_policies = Some(policies);
        &self.snapshot
    }

    /// Drops every held note and the resolved chord.
    pub fn clear(&mut self) {
        self.counters = [0; NOTE_COUNT];
        self.snapshot = ChordSnapshot::default();
        self.needs_update = true;
        self.last_policies = None;
    }
}

/// Chord store shared between instances.
///
/// Construct one per group of cooperating instances and hand a clone to each
/// of them; clones share the same store.
#[derive(Clone, Default)]
pub struct SharedChordStore {
    inner: Arc<RwLock<ChordStore>>,
}

impl SharedChordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access. Hold the guard for the whole buffer: apply every
    /// chord note, resolve, then drop it.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, ChordStore> {
        self.inner.write()
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, ChordStore> {
        self.inner.read()
    }

    /// Copy of the last published snapshot.
    pub fn snapshot(&self) -> ChordSnapshot {
        self.inner.read().snapshot().clone()
    }

    /// Copies the last published snapshot into `dest`, reusing its storage.
    pub fn snapshot_into(&self, dest: &mut ChordSnapshot) {
        dest.clone_from(self.inner.read().snapshot());
    }

    /// True if both handles point at the same store.
    pub fn ptr_eq(&self, other: &SharedChordStore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for SharedChordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedChordStore")
            .field("snapshot", self.inner.read().snapshot())
            .finish()
    }
}
