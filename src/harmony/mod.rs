//! Harmony game: tune a slider until a sustained target voice locks into a
//! just-intonation interval against the base voice.

mod session;
mod types;

pub use session::{HarmonySession, REFERENCE_A};
pub use types::{
    dead_zone, shake_intensity, tolerance_cents, Difficulty, JudgeOutcome, Phase, Problem,
    ProgressionState, BASE_DETUNE_LEVEL, CORRECT_POSITION_RANGE, MIX_FAMILIARITY_THRESHOLD,
    RANDOM_INSTRUMENT_LEVEL, START_LIVES,
};
