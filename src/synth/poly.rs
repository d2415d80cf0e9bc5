use log::info;

use crate::{
    dsp::{amplify::{mix_into, poly_attenuation}, filter::SaturationMode},
    engine::instrument::Instrument,
    io::{converter::midi_to_synth, midi::MidiChannel, MidiMessage},
    params::{load_factory_patch, CcMap, ParamStore, PARAM_COUNT},
    synth::{
        message::SynthMessage,
        voice::{Voice, VoiceState},
    },
    MAX_VOICES,
};

/// Fixed pool of voices behind the allocator.
///
/// Voices are built once in [`Instrument::prepare_for_play`]; nothing on the
/// block path allocates.
pub struct PolySynth {
    voices: Vec<Voice>,
    max_voices: usize,
    channel: MidiChannel,
    patch: usize,
    saturation: SaturationMode,
    cc_map: CcMap,
    params: [f32; PARAM_COUNT],
    block_size: usize,
}

impl PolySynth {
    pub fn new(max_voices: usize) -> Self {
        Self {
            voices: Vec::new(),
            max_voices: max_voices.clamp(1, MAX_VOICES),
            channel: MidiChannel::Omni,
            patch: 0,
            saturation: SaturationMode::Rational,
            cc_map: CcMap::factory(),
            params: [0.0; PARAM_COUNT],
            block_size: 0,
        }
    }

    /// Listen on one MIDI channel instead of all of them.
    pub fn with_channel(mut self, channel: MidiChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Factory patch loaded on prepare.
    pub fn with_patch(mut self, patch: usize) -> Self {
        self.patch = patch;
        self
    }

    pub fn with_saturation(mut self, mode: SaturationMode) -> Self {
        self.saturation = mode;
        self
    }

    /// Apply a decoded event.
    pub fn handle(&mut self, msg: SynthMessage, store: &mut ParamStore) {
        match msg {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note, .. } => self.note_off(note),
            SynthMessage::ControlChange { controller, value } => {
                if let Some(param) = self.cc_map.lookup(controller) {
                    store.set_from_midi(param, value);
                }
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        // 1. Retrigger whatever already owns this note
        if let Some(voice) = self.voices.iter_mut().find(|v| v.owns(note)) {
            voice.note_on(note, velocity);
            return;
        }

        // 2. Idle voice, 3. otherwise the oldest voice not already stealing
        let target = self
            .voices
            .iter()
            .position(Voice::is_idle)
            .or_else(|| self.oldest(|v| !v.is_stealing()));

        let Some(index) = target else {
            return; // every voice is mid-steal
        };

        for (i, voice) in self.voices.iter_mut().enumerate() {
            if i != index && !voice.is_idle() {
                voice.bump_age();
            }
        }
        self.voices[index].note_on(note, velocity);
    }

    pub fn note_off(&mut self, note: u8) {
        if let Some(index) = self.oldest(|v| v.accepts_release(note)) {
            self.voices[index].note_off();
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| !v.is_idle()) {
            voice.note_off();
        }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_idle()).count()
    }

    pub fn voice_states(&self) -> impl Iterator<Item = VoiceState> + '_ {
        self.voices.iter().map(Voice::state)
    }

    pub fn cc_map(&self) -> &CcMap {
        &self.cc_map
    }

    fn oldest(&self, filter: impl Fn(&Voice) -> bool) -> Option<usize> {
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, v)| filter(*v))
            // ties go to the lowest index
            .max_by(|(ia, a), (ib, b)| a.age().cmp(&b.age()).then(ib.cmp(ia)))
            .map(|(i, _)| i)
    }
}

impl Default for PolySynth {
    fn default() -> Self {
        Self::new(MAX_VOICES)
    }
}

impl Instrument for PolySynth {
    fn prepare_for_play(
        &mut self,
        sample_rate: f32,
        block_size: usize,
        store: &mut ParamStore,
    ) -> MidiChannel {
        self.block_size = block_size;
        self.voices = (0..self.max_voices)
            .map(|id| {
                let mut voice = Voice::new(id, sample_rate, block_size);
                voice.set_saturation_mode(self.saturation);
                voice
            })
            .collect();

        self.cc_map = load_factory_patch(store, self.patch);
        self.parameters_changed(store);

        info!(
            "poly synth ready: {} voices, {} Hz, {} frames, channel {:?}",
            self.max_voices, sample_rate, block_size, self.channel
        );
        self.channel
    }

    fn parameters_changed(&mut self, store: &ParamStore) {
        let values = store.values();
        let n = values.len().min(PARAM_COUNT);
        self.params[..n].copy_from_slice(&values[..n]);

        for voice in &mut self.voices {
            voice.update_params(&self.params);
        }
    }

    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let len = left.len().min(right.len()).min(self.block_size);
        let left = &mut left[..len];
        left.fill(0.0);

        let gain = poly_attenuation(self.voices.len());
        for voice in &mut self.voices {
            if voice.render() {
                mix_into(left, &voice.samples()[..len], gain);
            }
        }

        right[..len].copy_from_slice(left);
    }

    fn handle_midi(&mut self, msg: &MidiMessage, store: &mut ParamStore) {
        if let Some(event) = midi_to_synth(msg) {
            self.handle(event, store);
        }
    }
}
