//! Output notes currently sounding for each input pattern note.

use chordmap_midi::{NoteKey, CHANNEL_COUNT, NOTE_COUNT};
use smallvec::SmallVec;

/// Output notes of one input key.
pub type OutputNotes = SmallVec<[u8; 8]>;

const SLOT_COUNT: usize = CHANNEL_COUNT * NOTE_COUNT;

/// Fixed table indexed by `channel * 128 + note`.
///
/// All slots are allocated up front; slots are reused, so the audio thread
/// never allocates as long as a mapping fits inline.
#[derive(Debug, Clone)]
pub struct LiveMappingTable {
    slots: Box<[OutputNotes]>,
    live: usize,
}

impl Default for LiveMappingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveMappingTable {
    pub fn new() -> Self {
        Self {
            slots: vec![OutputNotes::new(); SLOT_COUNT].into_boxed_slice(),
            live: 0,
        }
    }

    /// Records `notes` for `key`, replacing any previous entry.
    /// Empty output leaves the key absent.
    pub fn insert(&mut self, key: NoteKey, notes: &[u8]) {
        let Some(index) = key.index() else {
            return;
        };
        let slot = &mut self.slots[index];
        match (slot.is_empty(), notes.is_empty()) {
            (true, false) => self.live += 1,
            (false, true) => self.live -= 1,
            _ => {}
        }
        slot.clear();
        slot.extend_from_slice(notes);
    }

    /// Removes and returns the entry for `key`.
    pub fn take(&mut self, key: NoteKey) -> Option<OutputNotes> {
        let index = key.index()?;
        let slot = &mut self.slots[index];
        if slot.is_empty() {
            return None;
        }
        self.live -= 1;
        Some(std::mem::take(slot))
    }

    /// Output notes for `key`; empty if absent.
    #[inline]
    pub fn get(&self, key: NoteKey) -> &[u8] {
        match key.index() {
            Some(index) => &self.slots[index],
            None => &[],
        }
    }

    /// Number of keys with live output.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Empties the table, calling `f` for every live entry (keys ascending
    /// by channel, then note).
    pub fn drain(&mut self, mut f: impl FnMut(NoteKey, &[u8])) {
        if self.live == 0 {
            return;
        }
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.is_empty() {
                f(NoteKey::from_index(index), slot);
                slot.clear();
            }
        }
        self.live = 0;
    }
}
