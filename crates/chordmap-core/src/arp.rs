//! Per-instance MIDI processor.
//!
//! One [`Arp`] runs inside one plugin instance, driven by the host's audio
//! thread once per buffer through [`Arp::process_block`].
//!
//! # Buffer flow
//!
//! ```text
//! params.load()                 one snapshot for the whole buffer
//!     │
//!     ▼
//! pass 1: chord notes ──▶ ChordStore ──▶ resolve() ──▶ build_scale()
//!     │                   (local, or shared under the write lock)
//!     ▼
//! pass 2: events in input order
//!     ├─ chord notes       passthrough if enabled
//!     ├─ pattern notes     OFF: close live entry / ON: close stale, map, open
//!     ├─ poly aftertouch   fanned out over the key's live output notes
//!     └─ everything else   passthrough
//! ```
//!
//! # RT Safety
//!
//! `process_block` takes no lock except the shared chord store's, and only
//! allocates if the caller's output vector has to grow.

use chordmap_midi::{to_midi_note, ChannelVoiceMsg, MidiEvent, NoteKey};

use crate::chord::{Chord, Pitch};
use crate::chord_store::{ChordSnapshot, ChordStore, SharedChordStore};
use crate::delay::DelayLine;
use crate::live_table::{LiveMappingTable, OutputNotes};
use crate::mapping::{is_mappable, map_pattern_note};
use crate::params::{ArpParams, InstanceBehaviour, ParamsHandle};
use crate::scale::build_scale;

/// What the instance does this buffer. Rebuilt whenever the behaviour
/// parameter changes.
#[derive(Debug)]
enum Role {
    Bypass,
    /// Chord notes on `channel` (0-based) feed the local store.
    Combined { channel: u8, store: ChordStore },
    ChordSource(SharedChordStore),
    PatternSource {
        store: SharedChordStore,
        delayed: bool,
    },
}

impl Role {
    fn new(behaviour: InstanceBehaviour, shared: &SharedChordStore) -> Self {
        match behaviour {
            InstanceBehaviour::Bypass => Role::Bypass,
            InstanceBehaviour::ChordChannel(channel) => Role::Combined {
                channel: channel.saturating_sub(1),
                store: ChordStore::new(),
            },
            InstanceBehaviour::ChordSource => Role::ChordSource(shared.clone()),
            InstanceBehaviour::PatternSource => Role::PatternSource {
                store: shared.clone(),
                delayed: false,
            },
            InstanceBehaviour::PatternSourceDelayed => Role::PatternSource {
                store: shared.clone(),
                delayed: true,
            },
        }
    }
}

/// Pattern side of an instance: current chord, derived scale and the notes
/// sounding because of earlier NOTE ONs.
#[derive(Debug, Default)]
struct PatternMapper {
    snapshot: ChordSnapshot,
    scale: Chord,
    live: LiveMappingTable,
}

impl PatternMapper {
    fn update(&mut self, snapshot: &ChordSnapshot, params: &ArpParams) {
        self.snapshot.clone_from(snapshot);
        self.rebuild_scale(params);
    }

    fn rebuild_scale(&mut self, params: &ArpParams) {
        self.scale = build_scale(&self.snapshot.chord, params.pre_mapping);
    }

    fn process(&mut self, event: &MidiEvent, params: &ArpParams, output: &mut Vec<MidiEvent>) {
        match event.msg {
            ChannelVoiceMsg::NoteOn { note, .. } | ChannelVoiceMsg::NoteOff { note, .. } => {
                self.note(event, NoteKey::new(note, event.channel_num()), params, output)
            }
            ChannelVoiceMsg::PolyPressure { note, .. } => {
                let outputs = self.live.get(NoteKey::new(note, event.channel_num()));
                if outputs.is_empty() {
                    output.push(*event);
                } else {
                    output.extend(outputs.iter().map(|&n| event.with_note(n)));
                }
            }
            _ => output.push(*event),
        }
    }

    fn note(
        &mut self,
        event: &MidiEvent,
        key: NoteKey,
        params: &ArpParams,
        output: &mut Vec<MidiEvent>,
    ) {
        if event.is_note_off() {
            // Unmatched OFF: nothing sounding for this key
            if let Some(notes) = self.live.take(key) {
                output.extend(notes.iter().map(|&n| event.with_note(n)));
            }
            return;
        }

        // Double NOTE ON: close the previous mapping first
        self.close(key, event.frame_offset, output);

        let note = key.note;
        if params.pattern_notes_passthrough && !is_mappable(params.mapping, note as Pitch) {
            output.push(*event);
            self.live.insert(key, &[note]);
            return;
        }
        if self.snapshot.should_silence {
            return;
        }

        let mut notes = OutputNotes::new();
        if self.snapshot.should_process {
            let mapped = map_pattern_note(
                params.reference_note as Pitch,
                params.mapping,
                params.wraparound,
                params.unmapped,
                self.scale.as_slice(),
                note as Pitch,
            );
            for pitch in mapped {
                if let Some(n) = to_midi_note(pitch) {
                    if !notes.contains(&n) {
                        notes.push(n);
                    }
                }
            }
        } else {
            notes.push(note);
        }

        output.extend(notes.iter().map(|&n| event.with_note(n)));
        self.live.insert(key, &notes);
    }

    /// Synthetic OFFs for whatever `key` is sounding.
    fn close(&mut self, key: NoteKey, frame_offset: usize, output: &mut Vec<MidiEvent>) {
        if let Some(notes) = self.live.take(key) {
            output.extend(
                notes
                    .iter()
                    .map(|&n| MidiEvent::note_off(frame_offset, key.channel, n, 0)),
            );
        }
    }

    /// Closes every live note at the start of the buffer.
    fn flush(&mut self, output: &mut Vec<MidiEvent>) -> usize {
        let count = self.live.len();
        self.live.drain(|key, notes| {
            output.extend(
                notes
                    .iter()
                    .map(|&n| MidiEvent::note_off(0, key.channel, n, 0)),
            );
        });
        count
    }

    fn reset(&mut self) {
        self.snapshot = ChordSnapshot::default();
        self.scale.clear();
    }
}

/// Chord/pattern MIDI processor for one plugin instance.
///
/// # Example
/// ```ignore
/// let store = SharedChordStore::new();
/// let mut arp = Arp::new(ParamsHandle::default(), store);
///
/// let mut output = Vec::new();
/// arp.process_block(&input, &mut output);
/// ```
#[derive(Debug)]
pub struct Arp {
    params: ParamsHandle,
    shared: SharedChordStore,
    behaviour: InstanceBehaviour,
    role: Role,
    mapper: PatternMapper,
    delay: DelayLine,
    /// Merged events of the delayed mode.
    merged: Vec<MidiEvent>,
}

impl Arp {
    /// Creates an instance. `shared` is only used in the chord source and
    /// pattern source modes.
    pub fn new(params: ParamsHandle, shared: SharedChordStore) -> Self {
        let behaviour = params.load().behaviour;
        tracing::debug!("Created instance ({:?})", behaviour);
        Self {
            role: Role::new(behaviour, &shared),
            params,
            shared,
            behaviour,
            mapper: PatternMapper::default(),
            delay: DelayLine::default(),
            merged: Vec::with_capacity(256),
        }
    }

    #[inline]
    pub fn params(&self) -> &ParamsHandle {
        &self.params
    }

    #[inline]
    pub fn shared_store(&self) -> &SharedChordStore {
        &self.shared
    }

    /// Behaviour the instance ran with during the last buffer.
    #[inline]
    pub fn behaviour(&self) -> InstanceBehaviour {
        self.behaviour
    }

    /// Chord and flags the pattern notes were mapped against.
    #[inline]
    pub fn current_snapshot(&self) -> &ChordSnapshot {
        &self.mapper.snapshot
    }

    /// Scale the pattern notes were mapped against.
    #[inline]
    pub fn current_scale(&self) -> &Chord {
        &self.mapper.scale
    }

    /// Number of input keys with sounding output notes.
    #[inline]
    pub fn live_notes(&self) -> usize {
        self.mapper.live.len()
    }

    /// Latency to report to the host. Only a chord source looks ahead.
    pub fn latency_samples(&self, sample_rate: f64) -> u32 {
        match self.role {
            Role::ChordSource(_) => self.params.load().look_ahead_samples(sample_rate),
            _ => 0,
        }
    }

    /// Processes one buffer. `output` is appended to; `input` is never
    /// modified.
    pub fn process_block(&mut self, input: &[MidiEvent], output: &mut Vec<MidiEvent>) {
        let guard = self.params.load();
        let params: &ArpParams = &guard;

        if params.behaviour != self.behaviour {
            self.reconfigure(params.behaviour, output);
        }
        let hold = params.hold_current_state;

        match &mut self.role {
            Role::Bypass => output.extend_from_slice(input),

            Role::ChordSource(store) => {
                {
                    let mut store = store.write();
                    for event in input {
                        store.apply_event(event);
                    }
                    if !hold {
                        store.resolve(params.when_no_chord_note, params.when_single_chord_note);
                    }
                }
                output.extend(
                    input
                        .iter()
                        .filter(|e| params.chord_notes_passthrough || !e.is_note())
                        .copied(),
                );
            }

            Role::Combined { channel, store } => {
                let channel = *channel;
                for event in input.iter().filter(|e| e.channel_num() == channel) {
                    store.apply_event(event);
                }
                if !hold {
                    let snapshot =
                        store.resolve(params.when_no_chord_note, params.when_single_chord_note);
                    self.mapper.update(snapshot, params);
                }

                for event in input {
                    if event.channel_num() != channel {
                        self.mapper.process(event, params, output);
                    } else if params.chord_notes_passthrough || !event.is_note() {
                        output.push(*event);
                    }
                }
            }

            Role::PatternSource { store, delayed } => {
                if !hold {
                    store.snapshot_into(&mut self.mapper.snapshot);
                    self.mapper.rebuild_scale(params);
                }

                if *delayed {
                    self.delay
                        .process(input, is_pattern_event, &mut self.merged);
                    for event in &self.merged {
                        self.mapper.process(event, params, output);
                    }
                } else {
                    for event in input {
                        self.mapper.process(event, params, output);
                    }
                }
            }
        }
    }

    /// Closes every live note and drops all held state (transport stop,
    /// all-notes-off). The OFFs are appended to `output` at frame 0.
    pub fn reset(&mut self, output: &mut Vec<MidiEvent>) {
        let flushed = self.mapper.flush(output);
        if flushed > 0 {
            tracing::debug!("Reset closed {} live notes", flushed);
        }
        self.clear_state();
    }

    fn reconfigure(&mut self, behaviour: InstanceBehaviour, output: &mut Vec<MidiEvent>) {
        tracing::debug!(
            "Instance behaviour changed: {:?} -> {:?}",
            self.behaviour,
            behaviour
        );
        let flushed = self.mapper.flush(output);
        if flushed > 0 {
            tracing::debug!("Flushed {} live notes", flushed);
        }
        self.clear_state();
        self.role = Role::new(behaviour, &self.shared);
        self.behaviour = behaviour;
    }

    fn clear_state(&mut self) {
        self.delay.clear();
        self.mapper.reset();
        match &mut self.role {
            Role::Combined { store, .. } => store.clear(),
            // Sole writer: its held notes go with it
            Role::ChordSource(store) => store.write().clear(),
            Role::Bypass | Role::PatternSource { .. } => {}
        }
    }
}

/// Events held back by the delayed pattern mode.
fn is_pattern_event(event: &MidiEvent) -> bool {
    event.is_note() || matches!(event.msg, ChannelVoiceMsg::PolyPressure { .. })
}
