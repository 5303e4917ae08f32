//! Derives the mapping scale from the resolved chord.

use crate::chord::{Chord, Pitch};
use crate::params::PreMappingChordProcessing;

const WHOLE_STEP: Pitch = 2;
/// Whole-step filling stops once the scale spans at least a minor seventh.
const MIN_SPAN: Pitch = 10;

const PERFECT_FOURTH: Pitch = 5;
const PERFECT_FIFTH: Pitch = 7;
const MAJOR_SEVENTH: Pitch = 11;

/// Builds the scale pattern notes are mapped against.
pub fn build_scale(chord: &Chord, processing: PreMappingChordProcessing) -> Chord {
    match processing {
        PreMappingChordProcessing::None => chord.clone(),
        PreMappingChordProcessing::IgnoreBassNote => {
            let mut scale = chord.clone();
            if scale.len() >= 3 {
                scale.remove_lowest();
            }
            scale
        }
        PreMappingChordProcessing::AddWholeSteps => add_whole_steps(chord, false),
        PreMappingChordProcessing::AddWholeStepsDefP4P5Maj7 => add_whole_steps(chord, true),
    }
}

/// Lowest chord note moved by whole octaves toward the mean of the others.
pub fn scale_root(chord: &Chord) -> Option<Pitch> {
    let root = chord.lowest()?;
    let others = chord.len() as Pitch - 1;
    if others == 0 {
        return Some(root);
    }
    let sum: Pitch = chord.iter().skip(1).map(|n| n - root).sum();
    // round(sum / others / 12), half away from zero for the non-negative sum
    let octaves = (2 * sum + 12 * others).div_euclid(24 * others);
    Some(root + 12 * octaves)
}

fn add_whole_steps(chord: &Chord, fix_degrees: bool) -> Chord {
    let (Some(chord_root), Some(root)) = (chord.lowest(), scale_root(chord)) else {
        return Chord::new();
    };

    let compact: Chord = chord
        .iter()
        .map(|n| root + (n - chord_root).rem_euclid(12))
        .collect();

    let mut scale = Chord::new();
    let mut last = root;
    scale.insert(root);
    for note in compact.iter().skip(1) {
        while note - last > WHOLE_STEP {
            last += WHOLE_STEP;
            scale.insert(last);
        }
        scale.insert(note);
        last = note;
    }
    while last - root < MIN_SPAN {
        last += WHOLE_STEP;
        scale.insert(last);
    }

    if fix_degrees && scale.len() == 7 {
        let mut degrees: [Pitch; 7] = [0; 7];
        degrees.copy_from_slice(scale.as_slice());
        for (index, interval) in [(3, PERFECT_FOURTH), (4, PERFECT_FIFTH), (6, MAJOR_SEVENTH)] {
            if !compact.contains(degrees[index]) {
                degrees[index] = root + interval;
            }
        }
        scale = degrees.into();
    }

    scale
}
