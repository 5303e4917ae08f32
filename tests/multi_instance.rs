//! Multi-instance tests: one chord source and several pattern instances
//! sharing a rig's chord store, as when a host runs them on separate tracks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chordmap::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn chord_buffer(release: &[u8], press: &[u8]) -> Vec<MidiEvent> {
    release
        .iter()
        .map(|&n| MidiEvent::note_off(0, 0, n, 0))
        .chain(press.iter().map(|&n| MidiEvent::note_on(0, 0, n, 90)))
        .collect()
}

fn notes_on(events: &[MidiEvent]) -> Vec<u8> {
    events
        .iter()
        .filter(|e| e.is_note_on())
        .filter_map(|e| e.note())
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Host-ordered processing on one thread
// ---------------------------------------------------------------------------

/// Chord track processed first, then two pattern tracks, for a short
/// progression.
#[test]
fn test_progression_across_tracks() {
    init_tracing();
    let rig = Chordmap::builder().build().unwrap();
    let mut chords = rig.chord_source();
    let mut arp = rig.pattern_source();
    let mut bass = rig
        .create_instance_with(ArpParams {
            behaviour: InstanceBehaviour::PatternSource,
            reference_note: 36,
            ..Default::default()
        })
        .unwrap();

    let progression: [&[u8]; 3] = [&[60, 64, 67], &[57, 60, 64], &[65, 69, 72]];
    let mut held: &[u8] = &[];
    let mut out = Vec::new();
    for chord in progression {
        chords.process_block(&chord_buffer(held, chord), &mut out);
        assert!(out.is_empty());
        held = chord;
        assert_eq!(rig.current_chord().chord.len(), 3);

        let pattern = [
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_on(10, 0, 61, 100),
            MidiEvent::note_on(20, 0, 62, 100),
            MidiEvent::note_off(30, 0, 60, 0),
            MidiEvent::note_off(30, 0, 61, 0),
            MidiEvent::note_off(30, 0, 62, 0),
        ];
        arp.process_block(&pattern, &mut out);
        assert_eq!(notes_on(&out), chord.to_vec());
        out.clear();

        bass.process_block(
            &[
                MidiEvent::note_on(0, 1, 36, 100),
                MidiEvent::note_off(40, 1, 36, 0),
            ],
            &mut out,
        );
        assert_eq!(notes_on(&out), vec![chord[0]]);
        out.clear();
    }
    assert_eq!(arp.live_notes(), 0);
    assert_eq!(bass.live_notes(), 0);
}

/// A pattern track processed before the chord track still lines up when
/// it runs one buffer late.
#[test]
fn test_delayed_track_processed_before_chords() {
    let rig = Chordmap::builder().build().unwrap();
    let mut chords = rig.chord_source();
    let mut early = rig.pattern_source_delayed();

    let mut out = Vec::new();
    let changes: [(&[u8], &[u8]); 2] = [(&[], &[60, 64, 67]), (&[60, 64, 67], &[62, 65, 69])];
    let mut mapped = Vec::new();
    for (release, press) in changes {
        // Host order: pattern track first
        early.process_block(&[MidiEvent::note_on(0, 0, 61, 100)], &mut out);
        mapped.extend(notes_on(&out));
        out.clear();
        chords.process_block(&chord_buffer(release, press), &mut out);
        out.clear();
    }
    early.process_block(&[], &mut out);
    mapped.extend(notes_on(&out));

    // Each note is mapped against the chord of the buffer it was played in
    assert_eq!(mapped, vec![64, 65]);
}

// ---------------------------------------------------------------------------
// 2. Concurrent instances
// ---------------------------------------------------------------------------

/// One writer thread flips between two chords every buffer while reader
/// threads map a full triad per buffer. Every buffer must map against one
/// whole chord, never a mix.
#[test]
fn test_concurrent_pattern_sources_see_whole_chords() {
    init_tracing();
    const C_MAJOR: [u8; 3] = [60, 64, 67];
    const F_MAJOR: [u8; 3] = [65, 69, 72];
    const BUFFERS: usize = 500;

    let rig = Chordmap::builder().build().unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let mut chords = rig.chord_source();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut out = Vec::new();
            chords.process_block(&chord_buffer(&[], &C_MAJOR), &mut out);
            for i in 0..BUFFERS {
                let (release, press) = if i % 2 == 0 {
                    (C_MAJOR, F_MAJOR)
                } else {
                    (F_MAJOR, C_MAJOR)
                };
                chords.process_block(&chord_buffer(&release, &press), &mut out);
                thread::yield_now();
            }
            done.store(true, Ordering::Release);
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|track| {
            let mut pattern = rig.pattern_source();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut out = Vec::new();
                let mut ons = 0usize;
                let mut offs = 0usize;
                let channel = track as u8;
                loop {
                    let finished = done.load(Ordering::Acquire);
                    out.clear();
                    pattern.process_block(
                        &[
                            MidiEvent::note_on(0, channel, 60, 100),
                            MidiEvent::note_on(1, channel, 61, 100),
                            MidiEvent::note_on(2, channel, 62, 100),
                        ],
                        &mut out,
                    );
                    let mapped = notes_on(&out);
                    assert!(
                        mapped.is_empty() || mapped == C_MAJOR || mapped == F_MAJOR,
                        "track {} mapped against a torn chord: {:?}",
                        track,
                        mapped
                    );
                    ons += mapped.len();

                    out.clear();
                    pattern.process_block(
                        &[
                            MidiEvent::note_off(0, channel, 60, 0),
                            MidiEvent::note_off(0, channel, 61, 0),
                            MidiEvent::note_off(0, channel, 62, 0),
                        ],
                        &mut out,
                    );
                    offs += out.iter().filter(|e| e.is_note_off()).count();
                    if finished {
                        break;
                    }
                }
                (ons, offs, pattern.live_notes())
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        let (ons, offs, live) = reader.join().unwrap();
        assert_eq!(ons, offs);
        assert_eq!(live, 0);
    }
}
