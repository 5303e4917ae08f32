//! Flat host state: parameters as little-endian fixed-width values.
//!
//! Layout, in order: behaviour (i32), reference note (i32), chord notes
//! passthrough (u8), when-no-chord-note (i32), when-single-chord-note (i32),
//! mapping (i32), wraparound (i32), unmapped behaviour (i32), pre-mapping
//! (i32), pattern notes passthrough (u8), hold current state (u8),
//! look-ahead ms (i32). No version header; trailing bytes are ignored.

use crate::params::{
    ArpParams, InstanceBehaviour, PatternNotesMapping, PatternNotesWraparound,
    PreMappingChordProcessing, UnmappedNotesBehaviour, WhenNoChordNote, WhenSingleChordNote,
};
use crate::{Error, Result};

/// Encoded size of [`ArpParams`].
pub const STATE_LEN: usize = 9 * 4 + 3;

struct StateWriter {
    data: Vec<u8>,
}

impl StateWriter {
    fn write_int(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    fn write_bool(&mut self, value: bool) {
        self.data.push(value as u8);
    }
}

struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl StateReader<'_> {
    fn read_int(&mut self) -> i32 {
        let bytes = [
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ];
        self.pos += 4;
        i32::from_le_bytes(bytes)
    }

    fn read_bool(&mut self) -> bool {
        let value = self.data[self.pos];
        self.pos += 1;
        value != 0
    }

    fn read_choice<T>(
        &mut self,
        field: &'static str,
        from_index: impl FnOnce(i32) -> Option<T>,
    ) -> Result<T> {
        let value = self.read_int();
        from_index(value).ok_or(Error::InvalidStateValue { field, value })
    }
}

impl ArpParams {
    /// Serializes for the host's state chunk.
    pub fn to_state_bytes(&self) -> Vec<u8> {
        let mut w = StateWriter {
            data: Vec::with_capacity(STATE_LEN),
        };
        w.write_int(self.behaviour.index());
        w.write_int(self.reference_note as i32);
        w.write_bool(self.chord_notes_passthrough);
        w.write_int(self.when_no_chord_note.index());
        w.write_int(self.when_single_chord_note.index());
        w.write_int(self.mapping.index());
        w.write_int(self.wraparound.index());
        w.write_int(self.unmapped.index());
        w.write_int(self.pre_mapping.index());
        w.write_bool(self.pattern_notes_passthrough);
        w.write_bool(self.hold_current_state);
        w.write_int(self.look_ahead_ms as i32);
        w.data
    }

    /// Decodes a state chunk written by [`ArpParams::to_state_bytes`].
    pub fn from_state_bytes(data: &[u8]) -> Result<ArpParams> {
        if data.len() < STATE_LEN {
            return Err(Error::StateTooShort {
                expected: STATE_LEN,
                actual: data.len(),
            });
        }

        let mut r = StateReader { data, pos: 0 };
        let behaviour = r.read_choice("behaviour", InstanceBehaviour::from_index)?;
        let reference_note = r.read_choice("reference_note", |v| u8::try_from(v).ok())?;
        let chord_notes_passthrough = r.read_bool();
        let when_no_chord_note = r.read_choice("when_no_chord_note", WhenNoChordNote::from_index)?;
        let when_single_chord_note =
            r.read_choice("when_single_chord_note", WhenSingleChordNote::from_index)?;
        let mapping = r.read_choice("mapping", PatternNotesMapping::from_index)?;
        let wraparound = r.read_choice("wraparound", PatternNotesWraparound::from_index)?;
        let unmapped = r.read_choice("unmapped", UnmappedNotesBehaviour::from_index)?;
        let pre_mapping = r.read_choice("pre_mapping", PreMappingChordProcessing::from_index)?;
        let pattern_notes_passthrough = r.read_bool();
        let hold_current_state = r.read_bool();
        let look_ahead_ms = r.read_choice("look_ahead_ms", |v| u32::try_from(v).ok())?;

        let params = ArpParams {
            behaviour,
            reference_note,
            chord_notes_passthrough,
            when_no_chord_note,
            when_single_chord_note,
            mapping,
            wraparound,
            unmapped,
            pre_mapping,
            pattern_notes_passthrough,
            hold_current_state,
            look_ahead_ms,
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_params() -> ArpParams {
        ArpParams {
            behaviour: InstanceBehaviour::PatternSource,
            reference_note: 48,
            chord_notes_passthrough: true,
            when_no_chord_note: WhenNoChordNote::UsePatternAsNotes,
            when_single_chord_note: WhenSingleChordNote::Powerchord,
            mapping: PatternNotesMapping::WhiteNoteToDegree,
            wraparound: PatternNotesWraparound::Fixed(7),
            unmapped: UnmappedNotesBehaviour::PlayAllDegreesUpToNote,
            pre_mapping: PreMappingChordProcessing::AddWholeSteps,
            pattern_notes_passthrough: true,
            hold_current_state: false,
            look_ahead_ms: 25,
        }
    }

    #[test]
    fn test_state_layout() {
        let bytes = custom_params().to_state_bytes();
        assert_eq!(bytes.len(), STATE_LEN);
        // behaviour first, as i32 LE
        assert_eq!(&bytes[0..4], &18i32.to_le_bytes());
        // reference note
        assert_eq!(&bytes[4..8], &48i32.to_le_bytes());
        // chord passthrough is a single byte
        assert_eq!(bytes[8], 1);
        // look-ahead last
        assert_eq!(&bytes[STATE_LEN - 4..], &25i32.to_le_bytes());
    }

    #[test]
    fn test_state_restores_params() {
        let params = custom_params();
        let restored = ArpParams::from_state_bytes(&params.to_state_bytes()).unwrap();
        assert_eq!(restored, params);
    }

    #[test]
    fn test_state_too_short() {
        let bytes = ArpParams::default().to_state_bytes();
        let err = ArpParams::from_state_bytes(&bytes[..10]).unwrap_err();
        assert_eq!(
            err,
            Error::StateTooShort {
                expected: STATE_LEN,
                actual: 10
            }
        );
    }

    #[test]
    fn test_state_invalid_choice() {
        let mut bytes = ArpParams::default().to_state_bytes();
        // when_no_chord_note starts after behaviour, note and one bool
        bytes[9..13].copy_from_slice(&7i32.to_le_bytes());
        let err = ArpParams::from_state_bytes(&bytes).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidStateValue {
                field: "when_no_chord_note",
                value: 7
            }
        );
    }

    #[test]
    fn test_state_out_of_range_note_fails_validation() {
        let mut bytes = ArpParams::default().to_state_bytes();
        bytes[4..8].copy_from_slice(&200i32.to_le_bytes());
        assert!(matches!(
            ArpParams::from_state_bytes(&bytes),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = custom_params().to_state_bytes();
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(ArpParams::from_state_bytes(&bytes).unwrap(), custom_params());
    }
}
