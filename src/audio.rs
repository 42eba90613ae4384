use serde::Serialize;

use crate::timbre::Waveform;

/// Voice ids for the two sustained voices of a harmony round.
pub const BASE_VOICE: &str = "base_note";
pub const TARGET_VOICE: &str = "target_note";

/// One sustained voice of a chord, as handed to the audio layer. The layer
/// picks the closest sample (or falls back to `waveform`) and loops the
/// note; `dynamics` is an optional 10 Hz gain curve for the loop.
#[derive(Serialize, Clone, Debug)]
pub struct ChordNote {
    pub id: String,
    pub instrument: String,
    pub frequency: f64,
    pub waveform: Waveform,
    pub dynamics: Option<Vec<f32>>,
}

/// The audio layer as seen from the core: an opaque callback target. The
/// wasm boundary implements this over JS callbacks; tests use a recorder.
/// Starting a new round always goes through `stop_all` first so stale
/// voices and their loop timers die with the old problem.
pub trait AudioEngine {
    fn play_chord(&mut self, chord: &[ChordNote]);
    fn update_frequency(&mut self, voice: &str, frequency: f64);
    fn stop_all(&mut self);
}

/// No-op engine for contexts with no audio sink wired up.
pub struct NullAudio;

impl AudioEngine for NullAudio {
    fn play_chord(&mut self, _chord: &[ChordNote]) {}
    fn update_frequency(&mut self, _voice: &str, _frequency: f64) {}
    fn stop_all(&mut self) {}
}
