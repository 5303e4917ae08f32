//! Ordered pitch set used for resolved chords and derived scales.

use smallvec::SmallVec;

/// Signed pitch. Chords may be transposed past the MIDI range; output notes
/// are range-checked when emitted.
pub type Pitch = i32;

/// Chords up to this size live inline (no allocation on the audio thread).
const INLINE_NOTES: usize = 16;

/// Strictly ascending set of pitches, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chord {
    notes: SmallVec<[Pitch; INLINE_NOTES]>,
}

impl Chord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `pitch`, keeping the set sorted. No-op if already present.
    pub fn insert(&mut self, pitch: Pitch) {
        if let Err(pos) = self.notes.binary_search(&pitch) {
            self.notes.insert(pos, pitch);
        }
    }

    /// Drops the bass note.
    pub fn remove_lowest(&mut self) -> Option<Pitch> {
        if self.notes.is_empty() {
            None
        } else {
            Some(self.notes.remove(0))
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    #[inline]
    pub fn lowest(&self) -> Option<Pitch> {
        self.notes.first().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Pitch] {
        &self.notes
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.notes.iter().copied()
    }

    #[inline]
    pub fn contains(&self, pitch: Pitch) -> bool {
        self.notes.binary_search(&pitch).is_ok()
    }

    /// Every note shifted by `offset` semitones.
    pub fn transposed(&self, offset: Pitch) -> Chord {
        Chord {
            notes: self.notes.iter().map(|&n| n + offset).collect(),
        }
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}

impl FromIterator<Pitch> for Chord {
    fn from_iter<I: IntoIterator<Item = Pitch>>(iter: I) -> Self {
        let mut notes: SmallVec<[Pitch; INLINE_NOTES]> = iter.into_iter().collect();
        notes.sort_unstable();
        notes.dedup();
        Chord { notes }
    }
}

impl<const N: usize> From<[Pitch; N]> for Chord {
    fn from(pitches: [Pitch; N]) -> Self {
        pitches.into_iter().collect()
    }
}
