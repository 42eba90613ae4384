use serde::{Deserialize, Serialize};

/// The built-in synthesized timbre; always available even before any sample
/// tables are loaded, and the fallback when a sample set is missing.
pub const SAWTOOTH_WAVE: &str = "Sawtooth Wave";
pub const SINE_WAVE: &str = "Sine Wave";

/// Oscillator waveform, serialized to the Web Audio `OscillatorType` names.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Sawtooth,
    Triangle,
    Square,
}

/// A sound source identity: a synthesized waveform or a sampled instrument
/// addressed by name. Sample storage and decoding live in the audio layer;
/// the core only names the instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Timbre {
    Synth(Waveform),
    Sampled(String),
}

impl Timbre {
    pub fn from_name(name: &str) -> Timbre {
        match name {
            SAWTOOTH_WAVE => Timbre::Synth(Waveform::Sawtooth),
            SINE_WAVE => Timbre::Synth(Waveform::Sine),
            other => Timbre::Sampled(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Timbre::Synth(Waveform::Sine) => SINE_WAVE,
            Timbre::Synth(_) => SAWTOOTH_WAVE,
            Timbre::Sampled(name) => name,
        }
    }

    /// Waveform the audio layer falls back to when no sample is available
    /// for this timbre. Flute gets the softer triangle.
    pub fn fallback_waveform(&self) -> Waveform {
        match self {
            Timbre::Synth(w) => *w,
            Timbre::Sampled(name) if name == "Flute" => Waveform::Triangle,
            Timbre::Sampled(_) => Waveform::Sawtooth,
        }
    }

    /// Resolve how one voice of this timbre should be rendered at a given
    /// frequency.
    pub fn playback(&self, frequency: f64) -> Playback {
        match self {
            Timbre::Synth(waveform) => Playback::Oscillator {
                waveform: *waveform,
                frequency,
            },
            Timbre::Sampled(name) => Playback::Sample {
                instrument: name.clone(),
                frequency,
            },
        }
    }
}

/// Resolved playback parameters for one voice.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Playback {
    Oscillator { waveform: Waveform, frequency: f64 },
    Sample { instrument: String, frequency: f64 },
}
