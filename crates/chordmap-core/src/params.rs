//! Instance parameters and the handle that publishes them to the audio thread.
//!
//! The editor/host side writes through [`ParamsHandle`]; the audio thread
//! loads one snapshot at the top of every buffer so all values stay coherent
//! for the whole buffer.

use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Highest MIDI channel number (channels are 1-based here).
pub const MAX_CHORD_CHANNEL: u8 = 16;

/// Largest degree count accepted by [`PatternNotesWraparound::Fixed`].
pub const MAX_FIXED_WRAPAROUND: u8 = 12;

/// Upper bound for the chord source look-ahead.
pub const MAX_LOOK_AHEAD_MS: u32 = 1000;

/// What an instance does with the MIDI it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceBehaviour {
    /// Everything passes through untouched.
    Bypass,
    /// Single instance: notes on this channel (1-16) form the chord, every
    /// other channel carries pattern notes.
    ChordChannel(u8),
    /// Feeds the shared chord store. Emits no pattern notes.
    ChordSource,
    /// Maps pattern notes against the shared chord store.
    PatternSource,
    /// Like `PatternSource`, with pattern notes delayed by one buffer.
    PatternSourceDelayed,
}

impl Default for InstanceBehaviour {
    fn default() -> Self {
        InstanceBehaviour::ChordChannel(MAX_CHORD_CHANNEL)
    }
}

impl InstanceBehaviour {
    /// 0 = bypass, 1-16 = chord channel, 17-19 = multi-instance roles.
    pub const fn index(self) -> i32 {
        match self {
            InstanceBehaviour::Bypass => 0,
            InstanceBehaviour::ChordChannel(ch) => ch as i32,
            InstanceBehaviour::ChordSource => 17,
            InstanceBehaviour::PatternSource => 18,
            InstanceBehaviour::PatternSourceDelayed => 19,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(InstanceBehaviour::Bypass),
            1..=16 => Some(InstanceBehaviour::ChordChannel(index as u8)),
            17 => Some(InstanceBehaviour::ChordSource),
            18 => Some(InstanceBehaviour::PatternSource),
            19 => Some(InstanceBehaviour::PatternSourceDelayed),
            _ => None,
        }
    }
}

choice_enum! {
    /// Chord resolution when no chord note is held.
    #[derive(Default)]
    pub enum WhenNoChordNote {
        #[default]
        LatchLastChord = 0,
        Silence = 1,
        UsePatternAsNotes = 2,
    }
}

choice_enum! {
    /// Chord resolution when exactly one chord note is held.
    #[derive(Default)]
    pub enum WhenSingleChordNote {
        #[default]
        TransposeLastChord = 0,
        Powerchord = 1,
        UseAsIs = 2,
        Silence = 3,
        UsePatternAsNotes = 4,
    }
}

choice_enum! {
    /// How a pattern note's distance to the reference note becomes a degree.
    #[derive(Default)]
    pub enum PatternNotesMapping {
        AlwaysLeaveUnmapped = 0,
        #[default]
        SemitoneToDegree = 1,
        /// Only white keys count as degrees; black keys stay unmapped.
        WhiteNoteToDegree = 2,
        /// Keep the pattern's semitone intervals, anchored on the first degree.
        TransposeFromFirstDegree = 3,
    }
}

choice_enum! {
    /// What to play for a pattern note that got no degree.
    #[derive(Default)]
    pub enum UnmappedNotesBehaviour {
        #[default]
        Silence = 0,
        UseAsIs = 1,
        TransposeFromFirstDegree = 2,
        /// Every scale note up to the pattern note (fans out into a chord).
        PlayAllDegreesUpToNote = 3,
    }
}

choice_enum! {
    /// Transformation applied to the resolved chord before mapping.
    #[derive(Default)]
    pub enum PreMappingChordProcessing {
        #[default]
        None = 0,
        IgnoreBassNote = 1,
        AddWholeSteps = 2,
        /// Whole steps, with degrees 4, 5 and 7 of a 7-note result forced to
        /// P4, P5 and maj7 unless the chord itself has them.
        AddWholeStepsDefP4P5Maj7 = 3,
    }
}

/// How degrees past the end of the chord/scale fold back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternNotesWraparound {
    /// Degrees outside the scale are unmapped.
    NoWraparound,
    /// Wrap (with octave shift) after the scale's last degree.
    AfterAllDegrees,
    /// Wrap every `n` degrees, ignoring scale notes past `n`.
    Fixed(u8),
}

impl Default for PatternNotesWraparound {
    fn default() -> Self {
        PatternNotesWraparound::AfterAllDegrees
    }
}

impl PatternNotesWraparound {
    /// 0 = none, 1 = after all degrees, n + 1 = fixed(n).
    pub const fn index(self) -> i32 {
        match self {
            PatternNotesWraparound::NoWraparound => 0,
            PatternNotesWraparound::AfterAllDegrees => 1,
            PatternNotesWraparound::Fixed(n) => n as i32 + 1,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(PatternNotesWraparound::NoWraparound),
            1 => Some(PatternNotesWraparound::AfterAllDegrees),
            i if i >= 2 && i <= MAX_FIXED_WRAPAROUND as i32 + 1 => {
                Some(PatternNotesWraparound::Fixed((i - 1) as u8))
            }
            _ => None,
        }
    }
}

/// All options of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpParams {
    pub behaviour: InstanceBehaviour,
    /// Pattern note that maps to the first degree (0-127).
    pub reference_note: u8,
    pub chord_notes_passthrough: bool,
    pub when_no_chord_note: WhenNoChordNote,
    pub when_single_chord_note: WhenSingleChordNote,
    pub mapping: PatternNotesMapping,
    pub wraparound: PatternNotesWraparound,
    pub unmapped: UnmappedNotesBehaviour,
    pub pre_mapping: PreMappingChordProcessing,
    /// Forward pattern notes the mapping mode can never map, bypassing the engine.
    pub pattern_notes_passthrough: bool,
    /// Freeze the resolved chord/scale while chord counters keep updating.
    pub hold_current_state: bool,
    /// Latency reported by a chord source instance.
    pub look_ahead_ms: u32,
}

impl Default for ArpParams {
    fn default() -> Self {
        Self {
            behaviour: InstanceBehaviour::default(),
            reference_note: 60,
            chord_notes_passthrough: false,
            when_no_chord_note: WhenNoChordNote::default(),
            when_single_chord_note: WhenSingleChordNote::default(),
            mapping: PatternNotesMapping::default(),
            wraparound: PatternNotesWraparound::default(),
            unmapped: UnmappedNotesBehaviour::default(),
            pre_mapping: PreMappingChordProcessing::default(),
            pattern_notes_passthrough: false,
            hold_current_state: false,
            look_ahead_ms: 0,
        }
    }
}

impl ArpParams {
    pub fn validate(&self) -> Result<()> {
        if self.reference_note > 127 {
            return Err(Error::InvalidConfig(format!(
                "reference_note {} out of range (0-127)",
                self.reference_note
            )));
        }
        if let InstanceBehaviour::ChordChannel(ch) = self.behaviour {
            if !(1..=MAX_CHORD_CHANNEL).contains(&ch) {
                return Err(Error::InvalidConfig(format!(
                    "chord channel {} out of range (1-16)",
                    ch
                )));
            }
        }
        if let PatternNotesWraparound::Fixed(n) = self.wraparound {
            if !(1..=MAX_FIXED_WRAPAROUND).contains(&n) {
                return Err(Error::InvalidConfig(format!(
                    "fixed wraparound {} out of range (1-{})",
                    n, MAX_FIXED_WRAPAROUND
                )));
            }
        }
        if self.look_ahead_ms > MAX_LOOK_AHEAD_MS {
            return Err(Error::InvalidConfig(format!(
                "look_ahead_ms {} out of range (0-{})",
                self.look_ahead_ms, MAX_LOOK_AHEAD_MS
            )));
        }
        Ok(())
    }

    /// Look-ahead expressed in samples.
    pub fn look_ahead_samples(&self, sample_rate: f64) -> u32 {
        (self.look_ahead_ms as f64 * sample_rate / 1000.0).round() as u32
    }
}

/// Shared, lock-free view of an instance's parameters.
///
/// Cloning the handle shares the same parameters.
#[derive(Clone)]
pub struct ParamsHandle {
    inner: Arc<ArcSwap<ArpParams>>,
}

impl ParamsHandle {
    pub fn new(params: ArpParams) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(params)),
        }
    }

    /// Snapshot for the audio thread. **Lock-free**, no allocation.
    #[inline]
    pub fn load(&self) -> Guard<Arc<ArpParams>> {
        self.inner.load()
    }

    pub fn get(&self) -> ArpParams {
        ArpParams::clone(&self.inner.load())
    }

    /// Publishes new parameters after validating them.
    pub fn set(&self, params: ArpParams) -> Result<()> {
        params.validate()?;
        self.inner.store(Arc::new(params));
        Ok(())
    }

    /// Edits a copy of the current parameters and publishes it.
    pub fn update(&self, f: impl FnOnce(&mut ArpParams)) -> Result<()> {
        let mut params = self.get();
        f(&mut params);
        self.set(params)
    }

    /// Flat host state (see [`ArpParams::to_state_bytes`]).
    pub fn save_state(&self) -> Vec<u8> {
        self.inner.load().to_state_bytes()
    }

    /// Restores host state. On failure the current parameters are kept.
    pub fn load_state(&self, data: &[u8]) -> Result<()> {
        match ArpParams::from_state_bytes(data) {
            Ok(params) => {
                self.inner.store(Arc::new(params));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load instance state: {}", e);
                Err(e)
            }
        }
    }
}

impl Default for ParamsHandle {
    fn default() -> Self {
        Self::new(ArpParams::default())
    }
}

impl std::fmt::Debug for ParamsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ParamsHandle")
            .field(&**self.inner.load())
            .finish()
    }
}
