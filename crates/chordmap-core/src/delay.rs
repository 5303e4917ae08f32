//! One-buffer delay for pattern events.
//!
//! A pattern instance that runs before the chord source in the host's
//! processing order would map against the previous buffer's chord. Holding
//! its pattern events back by one buffer lines them up with the chord they
//! were played against.

use chordmap_midi::MidiEvent;

/// Initial capacity of each side of the line.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Events held back from the previous buffer.
    pending: Vec<MidiEvent>,
    /// Scratch for the current buffer; swapped with `pending`.
    incoming: Vec<MidiEvent>,
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DelayLine {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            incoming: Vec::with_capacity(capacity),
        }
    }

    /// Moves the events of `input` selected by `delayed` into the line and
    /// writes into `out` the previous buffer's delayed events merged with
    /// the rest of `input`, ordered by frame offset.
    ///
    /// On equal offsets the delayed events come first.
    pub fn process(
        &mut self,
        input: &[MidiEvent],
        delayed: impl Fn(&MidiEvent) -> bool,
        out: &mut Vec<MidiEvent>,
    ) {
        self.incoming.clear();
        self.incoming
            .extend(input.iter().filter(|e| delayed(*e)).copied());
        std::mem::swap(&mut self.pending, &mut self.incoming);

        out.clear();
        let mut previous = self.incoming.iter().copied().peekable();
        let mut current = input.iter().filter(|e| !delayed(*e)).copied().peekable();
        loop {
            let take_previous = match (previous.peek(), current.peek()) {
                (Some(p), Some(c)) => p.frame_offset <= c.frame_offset,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_previous {
                previous.next()
            } else {
                current.next()
            };
            out.extend(next);
        }
    }

    /// Number of events waiting for the next buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops the events waiting for the next buffer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
