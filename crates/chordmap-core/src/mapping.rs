//! Pattern note to chord/scale degree mapping.
//!
//! Pure functions: the caller passes the scale snapshot and the policy
//! values, nothing here touches shared state.

use chordmap_midi::is_black_key;
use smallvec::SmallVec;

use crate::chord::Pitch;
use crate::params::{PatternNotesMapping, PatternNotesWraparound, UnmappedNotesBehaviour};

/// Output pitches of one pattern note. Only
/// [`UnmappedNotesBehaviour::PlayAllDegreesUpToNote`] yields more than one.
pub type MappedNotes = SmallVec<[Pitch; 8]>;

/// Degree number of `note` relative to `reference`, or `None` if the mode
/// leaves this note unmapped.
///
/// `TransposeFromFirstDegree` has no degree; [`map_pattern_note`] handles it
/// before calling this.
pub fn degree_offset(reference: Pitch, mode: PatternNotesMapping, note: Pitch) -> Option<i32> {
    match mode {
        PatternNotesMapping::SemitoneToDegree => Some(note - reference),
        PatternNotesMapping::WhiteNoteToDegree => white_note_offset(reference, note),
        PatternNotesMapping::AlwaysLeaveUnmapped | PatternNotesMapping::TransposeFromFirstDegree => {
            None
        }
    }
}

/// Semitone offset minus the black keys strictly between both notes.
fn white_note_offset(reference: Pitch, note: Pitch) -> Option<i32> {
    if is_black_key(note) {
        return None;
    }
    let raw = note - reference;
    let (low, high) = if raw < 0 { (note, reference) } else { (reference, note) };
    let black = ((low + 1)..high).filter(|&p| is_black_key(p)).count() as i32;
    Some(raw - raw.signum() * black)
}

/// True if `mode` can ever give `note` a degree.
pub fn is_mappable(mode: PatternNotesMapping, note: Pitch) -> bool {
    match mode {
        PatternNotesMapping::AlwaysLeaveUnmapped => false,
        PatternNotesMapping::WhiteNoteToDegree => !is_black_key(note),
        PatternNotesMapping::SemitoneToDegree | PatternNotesMapping::TransposeFromFirstDegree => true,
    }
}

/// Resolves a signed degree against an ascending `scale`.
///
/// Negative degrees fold with floor division, so degree `-1` is the last
/// degree one octave down.
pub fn map_to_scale_degree(
    wrap: PatternNotesWraparound,
    scale: &[Pitch],
    degree: i32,
) -> Option<Pitch> {
    if scale.is_empty() {
        return None;
    }
    let count = match wrap {
        PatternNotesWraparound::NoWraparound | PatternNotesWraparound::AfterAllDegrees => {
            scale.len() as i32
        }
        PatternNotesWraparound::Fixed(n) => n as i32,
    };
    if count <= 0 {
        return None;
    }
    if wrap == PatternNotesWraparound::NoWraparound && !(0..count).contains(&degree) {
        return None;
    }

    let wanted = degree.rem_euclid(count) as usize;
    let octave = degree.div_euclid(count);
    scale.get(wanted).map(|&pitch| pitch + 12 * octave)
}

/// Maps one pattern note to zero or more output pitches.
///
/// Pitches are not range-checked; the caller drops anything outside the
/// MIDI range.
pub fn map_pattern_note(
    reference: Pitch,
    mode: PatternNotesMapping,
    wrap: PatternNotesWraparound,
    unmapped: UnmappedNotesBehaviour,
    scale: &[Pitch],
    note: Pitch,
) -> MappedNotes {
    let mut out = MappedNotes::new();
    let Some(&first) = scale.first() else {
        if unmapped == UnmappedNotesBehaviour::UseAsIs {
            out.push(note);
        }
        return out;
    };

    if mode == PatternNotesMapping::TransposeFromFirstDegree {
        out.push(first + (note - reference));
        return out;
    }

    let degree = degree_offset(reference, mode, note);
    if let Some(pitch) = degree.and_then(|d| map_to_scale_degree(wrap, scale, d)) {
        out.push(pitch);
        return out;
    }

    match unmapped {
        UnmappedNotesBehaviour::Silence => {}
        UnmappedNotesBehaviour::UseAsIs => out.push(note),
        // Notes without a degree fall back to the semitone distance
        UnmappedNotesBehaviour::TransposeFromFirstDegree => {
            out.push(first + degree.unwrap_or(note - reference))
        }
        UnmappedNotesBehaviour::PlayAllDegreesUpToNote => {
            out.extend(scale.iter().copied().take_while(|&p| p <= note));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const C_MAJOR_TRIAD: [Pitch; 3] = [60, 64, 67];
    const AFTER_ALL: PatternNotesWraparound = PatternNotesWraparound::AfterAllDegrees;

    fn map_semitone(scale: &[Pitch], note: Pitch) -> MappedNotes {
        map_pattern_note(
            60,
            PatternNotesMapping::SemitoneToDegree,
            AFTER_ALL,
            UnmappedNotesBehaviour::Silence,
            scale,
            note,
        )
    }

    #[test]
    fn test_triad_degrees() {
        assert_eq!(map_semitone(&C_MAJOR_TRIAD, 60).as_slice(), &[60]);
        assert_eq!(map_semitone(&C_MAJOR_TRIAD, 61).as_slice(), &[64]);
        assert_eq!(map_semitone(&C_MAJOR_TRIAD, 62).as_slice(), &[67]);
        // degree 3 wraps to degree 0 one octave up
        assert_eq!(map_semitone(&C_MAJOR_TRIAD, 63).as_slice(), &[72]);
        assert_eq!(map_semitone(&C_MAJOR_TRIAD, 65).as_slice(), &[79]);
    }

    #[test]
    fn test_negative_degrees_use_floor_division() {
        assert_eq!(map_to_scale_degree(AFTER_ALL, &C_MAJOR_TRIAD, -1), Some(55));
        assert_eq!(map_to_scale_degree(AFTER_ALL, &C_MAJOR_TRIAD, -3), Some(48));
        assert_eq!(map_to_scale_degree(AFTER_ALL, &C_MAJOR_TRIAD, -4), Some(43));
    }

    #[test]
    fn test_no_wraparound() {
        let wrap = PatternNotesWraparound::NoWraparound;
        assert_eq!(map_to_scale_degree(wrap, &C_MAJOR_TRIAD, 2), Some(67));
        assert_eq!(map_to_scale_degree(wrap, &C_MAJOR_TRIAD, 3), None);
        assert_eq!(map_to_scale_degree(wrap, &C_MAJOR_TRIAD, -1), None);
    }

    #[test]
    fn test_fixed_wraparound() {
        let scale = [60, 62, 64, 65, 67, 69, 71];
        let wrap = PatternNotesWraparound::Fixed(5);
        // degree 5 folds back before reaching 69
        assert_eq!(map_to_scale_degree(wrap, &scale, 5), Some(72));
        assert_eq!(map_to_scale_degree(wrap, &scale, 4), Some(67));

        // larger than the scale: missing degrees are unmapped
        let wrap = PatternNotesWraparound::Fixed(4);
        assert_eq!(map_to_scale_degree(wrap, &C_MAJOR_TRIAD, 3), None);
        assert_eq!(map_to_scale_degree(wrap, &C_MAJOR_TRIAD, 4), Some(72));
    }

    #[test]
    fn test_empty_scale_is_unmapped() {
        assert_eq!(map_to_scale_degree(AFTER_ALL, &[], 0), None);
        assert!(map_semitone(&[], 60).is_empty());
        let out = map_pattern_note(
            60,
            PatternNotesMapping::SemitoneToDegree,
            AFTER_ALL,
            UnmappedNotesBehaviour::UseAsIs,
            &[],
            63,
        );
        assert_eq!(out.as_slice(), &[63]);
    }

    #[test]
    fn test_white_note_offset() {
        let mode = PatternNotesMapping::WhiteNoteToDegree;
        assert_eq!(degree_offset(60, mode, 60), Some(0));
        assert_eq!(degree_offset(60, mode, 62), Some(1));
        assert_eq!(degree_offset(60, mode, 64), Some(2));
        assert_eq!(degree_offset(60, mode, 65), Some(3));
        assert_eq!(degree_offset(60, mode, 72), Some(7));
        assert_eq!(degree_offset(60, mode, 59), Some(-1));
        assert_eq!(degree_offset(60, mode, 57), Some(-2));
        assert_eq!(degree_offset(60, mode, 48), Some(-7));
        // black keys have no degree
        assert_eq!(degree_offset(60, mode, 61), None);
        assert!(!is_mappable(mode, 66));
        assert!(is_mappable(mode, 67));
    }

    #[test]
    fn test_always_leave_unmapped() {
        let mode = PatternNotesMapping::AlwaysLeaveUnmapped;
        assert_eq!(degree_offset(60, mode, 62), None);
        let out = map_pattern_note(
            60,
            mode,
            AFTER_ALL,
            UnmappedNotesBehaviour::UseAsIs,
            &C_MAJOR_TRIAD,
            62,
        );
        assert_eq!(out.as_slice(), &[62]);
    }

    #[test]
    fn test_transpose_from_first_degree_mode() {
        let out = map_pattern_note(
            60,
            PatternNotesMapping::TransposeFromFirstDegree,
            AFTER_ALL,
            UnmappedNotesBehaviour::Silence,
            &[62, 65, 69],
            64,
        );
        assert_eq!(out.as_slice(), &[66]);
    }

    #[test]
    fn test_unmapped_behaviours() {
        let wrap = PatternNotesWraparound::NoWraparound;
        let map = |unmapped| {
            map_pattern_note(
                60,
                PatternNotesMapping::SemitoneToDegree,
                wrap,
                unmapped,
                &C_MAJOR_TRIAD,
                65,
            )
        };
        assert!(map(UnmappedNotesBehaviour::Silence).is_empty());
        assert_eq!(map(UnmappedNotesBehaviour::UseAsIs).as_slice(), &[65]);
        assert_eq!(
            map(UnmappedNotesBehaviour::TransposeFromFirstDegree).as_slice(),
            &[65]
        );
        assert_eq!(
            map(UnmappedNotesBehaviour::PlayAllDegreesUpToNote).as_slice(),
            &[60, 64]
        );
    }

    #[test]
    fn test_transpose_fallback_uses_white_note_offset() {
        let map = |note| {
            map_pattern_note(
                60,
                PatternNotesMapping::WhiteNoteToDegree,
                PatternNotesWraparound::NoWraparound,
                UnmappedNotesBehaviour::TransposeFromFirstDegree,
                &C_MAJOR_TRIAD,
                note,
            )
        };
        // C5 is white degree 7, past the triad
        assert_eq!(map(72).as_slice(), &[67]);
        // A black key has no degree: semitone distance
        assert_eq!(map(61).as_slice(), &[61]);
        // B3 is white degree -1
        assert_eq!(map(59).as_slice(), &[59]);
    }

    #[test]
    fn test_play_all_degrees_below_scale_is_empty() {
        let out = map_pattern_note(
            60,
            PatternNotesMapping::AlwaysLeaveUnmapped,
            AFTER_ALL,
            UnmappedNotesBehaviour::PlayAllDegreesUpToNote,
            &C_MAJOR_TRIAD,
            59,
        );
        assert!(out.is_empty());
    }

    fn scale_strategy() -> impl Strategy<Value = Vec<Pitch>> {
        prop::collection::btree_set(0i32..12, 1..8)
            .prop_map(|set| set.into_iter().map(|pc| 48 + pc).collect())
    }

    proptest! {
        #[test]
        fn prop_degree_zero_is_first_note(scale in scale_strategy()) {
            prop_assert_eq!(map_to_scale_degree(AFTER_ALL, &scale, 0), Some(scale[0]));
        }

        #[test]
        fn prop_no_wraparound_outside_range_is_unmapped(
            scale in scale_strategy(),
            degree in -40i32..40,
        ) {
            let result = map_to_scale_degree(PatternNotesWraparound::NoWraparound, &scale, degree);
            if degree < 0 || degree >= scale.len() as i32 {
                prop_assert_eq!(result, None);
            } else {
                prop_assert_eq!(result, Some(scale[degree as usize]));
            }
        }

        #[test]
        fn prop_octave_consistency(
            scale in scale_strategy(),
            degree in -40i32..40,
            k in -4i32..4,
            fixed in prop::option::of(1u8..=12),
        ) {
            let wrap = fixed.map_or(AFTER_ALL, PatternNotesWraparound::Fixed);
            let count = fixed.map_or(scale.len() as i32, |n| n as i32);
            let base = map_to_scale_degree(wrap, &scale, degree);
            let shifted = map_to_scale_degree(wrap, &scale, degree + k * count);
            prop_assert_eq!(base, shifted.map(|p| p - 12 * k));
        }
    }
}
