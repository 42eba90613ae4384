use wasm_bindgen::prelude::*;

pub mod audio;
pub mod dynamics;
pub mod harmony;
pub mod judge;
pub mod levels;
pub mod timbre;
pub mod tuning;
pub mod updown;

use std::cell::RefCell;
use std::collections::HashMap;

use js_sys::Function;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use audio::{AudioEngine, ChordNote, NullAudio};
use dynamics::Dynamics;
use harmony::{Difficulty, HarmonySession};
use levels::{LevelDesign, LevelSpec, NoteTables};
use updown::UpDownSession;

thread_local! {
    static HARMONY: RefCell<Option<HarmonySession<SmallRng>>> = RefCell::new(None);
    static HARMONY_AUDIO: RefCell<Option<JsAudioEngine>> = RefCell::new(None);
    static UPDOWN: RefCell<Option<UpDownSession<SmallRng>>> = RefCell::new(None);
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Warn);
}

/// Audio layer handle: three JS callbacks registered at session start. The
/// core never reaches past them into the Web Audio graph.
struct JsAudioEngine {
    play_chord: Function,
    update_frequency: Function,
    stop_all: Function,
}

impl AudioEngine for JsAudioEngine {
    fn play_chord(&mut self, chord: &[ChordNote]) {
        if let Ok(value) = serde_wasm_bindgen::to_value(chord) {
            let _ = self.play_chord.call1(&JsValue::NULL, &value);
        }
    }

    fn update_frequency(&mut self, voice: &str, frequency: f64) {
        let _ = self.update_frequency.call2(
            &JsValue::NULL,
            &JsValue::from_str(voice),
            &JsValue::from_f64(frequency),
        );
    }

    fn stop_all(&mut self) {
        let _ = self.stop_all.call0(&JsValue::NULL);
    }
}

fn err_js(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn fresh_rng() -> SmallRng {
    SmallRng::seed_from_u64(js_sys::Date::now() as u64)
}

fn with_harmony<T>(
    f: impl FnOnce(&mut HarmonySession<SmallRng>, &mut dyn AudioEngine) -> T,
) -> Option<T> {
    HARMONY.with(|session| {
        let mut session = session.borrow_mut();
        let session = session.as_mut()?;
        HARMONY_AUDIO.with(|audio| {
            let mut audio = audio.borrow_mut();
            match audio.as_mut() {
                Some(engine) => Some(f(session, engine)),
                None => {
                    let mut null = NullAudio;
                    Some(f(session, &mut null))
                }
            }
        })
    })
}

// --- Harmony game ---

/// Start (or restart) a harmony session. `level_design` is the ordered
/// level table, `instrument_notes` maps instrument names to playable note
/// names; both arrive as parsed JSON. The three callbacks are the audio
/// layer: `playChord(notes)`, `updateFrequency(voiceId, hz)`, `stopAll()`.
#[wasm_bindgen]
pub fn harmony_start(
    level_design: JsValue,
    instrument_notes: JsValue,
    level: u32,
    difficulty: &str,
    play_chord: Function,
    update_frequency: Function,
    stop_all: Function,
) -> Result<(), JsValue> {
    let entries: Vec<LevelSpec> =
        serde_wasm_bindgen::from_value(level_design).map_err(err_js)?;
    let tables: HashMap<String, Vec<String>> =
        serde_wasm_bindgen::from_value(instrument_notes).map_err(err_js)?;

    let design = LevelDesign::new(entries).map_err(err_js)?;
    let notes = NoteTables::new(tables).map_err(err_js)?;

    let session = HarmonySession::new(
        design,
        notes,
        level,
        Difficulty::from_name(difficulty),
        fresh_rng(),
    );
    HARMONY.with(|s| *s.borrow_mut() = Some(session));
    HARMONY_AUDIO.with(|a| {
        *a.borrow_mut() = Some(JsAudioEngine {
            play_chord,
            update_frequency,
            stop_all,
        })
    });
    Ok(())
}

/// Generate the next problem, stopping anything left from the previous
/// round. Returns the problem record, or null once the session has ended.
#[wasm_bindgen]
pub fn harmony_next_problem() -> Result<JsValue, JsValue> {
    let problem = with_harmony(|session, audio| session.next_problem(audio).cloned()).flatten();
    match problem {
        Some(problem) => serde_wasm_bindgen::to_value(&problem).map_err(err_js),
        None => Ok(JsValue::NULL),
    }
}

/// Start the sustained chord (the driver calls this when the intro timer
/// fires).
#[wasm_bindgen]
pub fn harmony_begin_playback(slider_position: i32) {
    with_harmony(|session, audio| session.begin_playback(audio, slider_position));
}

/// Unlock answering for the current round.
#[wasm_bindgen]
pub fn harmony_open_answers() {
    with_harmony(|session, _| session.open_answers());
}

/// Live slider input: retunes the target voice and returns the beat
/// intensity for immediate visual feedback.
#[wasm_bindgen]
pub fn harmony_slider_moved(slider_position: i32) -> f64 {
    with_harmony(|session, audio| session.slider_moved(audio, slider_position)).unwrap_or(0.0)
}

/// Judge the submitted slider position. Safe to call at any time: outside
/// the answer phase this returns a neutral outcome with `judged: false`.
#[wasm_bindgen]
pub fn harmony_submit_answer(slider_position: i32) -> Result<JsValue, JsValue> {
    match with_harmony(|session, audio| session.submit_answer(audio, slider_position)) {
        Some(outcome) => serde_wasm_bindgen::to_value(&outcome).map_err(err_js),
        None => Ok(JsValue::NULL),
    }
}

/// Replay the judged round's chord at the given slider position (review
/// after a miss). Judging stays closed.
#[wasm_bindgen]
pub fn harmony_replay(slider_position: i32) {
    with_harmony(|session, audio| session.replay(audio, slider_position));
}

/// Play the judged round's chord pinned to the correct position.
#[wasm_bindgen]
pub fn harmony_play_correct() {
    with_harmony(|session, audio| session.play_correct(audio));
}

/// Animation-tick intensity: deviation past the familiarity dead zone.
/// Returns 0 whenever no round is active.
#[wasm_bindgen]
pub fn harmony_feedback_intensity(slider_position: i32) -> f64 {
    with_harmony(|session, _| session.feedback_intensity(slider_position)).unwrap_or(0.0)
}

/// Current dead zone width in slider steps (0 when idle).
#[wasm_bindgen]
pub fn harmony_dead_zone() -> f64 {
    with_harmony(|session, _| session.dead_zone()).unwrap_or(0.0)
}

/// Progression snapshot: level, score, lives, difficulty, interval counts.
#[wasm_bindgen]
pub fn harmony_state() -> Result<JsValue, JsValue> {
    match with_harmony(|session, _| session.state().clone()) {
        Some(state) => serde_wasm_bindgen::to_value(&state).map_err(err_js),
        None => Ok(JsValue::NULL),
    }
}

/// Current phase of the round lifecycle, for the driver's timers.
#[wasm_bindgen]
pub fn harmony_phase() -> Result<JsValue, JsValue> {
    match with_harmony(|session, _| session.phase()) {
        Some(phase) => serde_wasm_bindgen::to_value(&phase).map_err(err_js),
        None => Ok(JsValue::NULL),
    }
}

// --- Pitch-direction (up/down) game ---

/// Start a pitch-direction session at the given level (the difficulty
/// picker maps easy/normal/hard to levels 1/15/30).
#[wasm_bindgen]
pub fn updown_start(level: u32) {
    UPDOWN.with(|s| *s.borrow_mut() = Some(UpDownSession::new(level, fresh_rng())));
}

/// Switch level and clear the current run.
#[wasm_bindgen]
pub fn updown_set_level(level: u32) {
    UPDOWN.with(|s| {
        if let Some(session) = s.borrow_mut().as_mut() {
            session.set_level(level);
        }
    });
}

/// Clear score, combo, and the random-walk chain.
#[wasm_bindgen]
pub fn updown_reset() {
    UPDOWN.with(|s| {
        if let Some(session) = s.borrow_mut().as_mut() {
            session.reset();
        }
    });
}

/// Generate the next up/down problem (base and target notes with their
/// frequencies). Null when no session is running.
#[wasm_bindgen]
pub fn updown_next_problem() -> Result<JsValue, JsValue> {
    let problem = UPDOWN.with(|s| {
        s.borrow_mut()
            .as_mut()
            .map(|session| session.next_problem().clone())
    });
    match problem {
        Some(problem) => serde_wasm_bindgen::to_value(&problem).map_err(err_js),
        None => Ok(JsValue::NULL),
    }
}

/// Judge an up/down choice. Neutral (`judged: false`) when no problem is
/// active or the round was already answered.
#[wasm_bindgen]
pub fn updown_answer(is_up: bool) -> Result<JsValue, JsValue> {
    let answer = UPDOWN.with(|s| s.borrow_mut().as_mut().map(|session| session.answer(is_up)));
    match answer {
        Some(answer) => serde_wasm_bindgen::to_value(&answer).map_err(err_js),
        None => Ok(JsValue::NULL),
    }
}

/// Progression snapshot: level, score, combo, last note of the walk.
#[wasm_bindgen]
pub fn updown_state() -> Result<JsValue, JsValue> {
    let state = UPDOWN.with(|s| s.borrow().as_ref().map(|session| session.state().clone()));
    match state {
        Some(state) => serde_wasm_bindgen::to_value(&state).map_err(err_js),
        None => Ok(JsValue::NULL),
    }
}

// --- Pure utilities ---

/// Frequency for a slider position: each step is half the tolerance in
/// cents away from the correct position.
#[wasm_bindgen]
pub fn frequency_for_slider(
    base_frequency: f64,
    tolerance_cents: u32,
    correct_position: i32,
    slider_position: i32,
) -> f64 {
    tuning::frequency_for_slider(
        base_frequency,
        tolerance_cents,
        correct_position,
        slider_position,
    )
}

/// Just-intonation ratio for an interval name; unknown names fall back to
/// 1.0 with a console warning.
#[wasm_bindgen]
pub fn interval_ratio(name: &str) -> f64 {
    tuning::interval_ratio(name)
}

/// Equal-temperament MIDI-to-frequency conversion for a given reference A4.
#[wasm_bindgen]
pub fn midi_to_frequency(midi: f64, reference_a: f64) -> f64 {
    tuning::midi_to_frequency(midi, reference_a)
}

/// Sample a named dynamics shape at 10 Hz over the given duration, for
/// `setValueCurveAtTime`.
#[wasm_bindgen]
pub fn dynamics_curve(shape: &str, duration_secs: f64) -> Result<Vec<f32>, JsValue> {
    let shape: Dynamics = shape.parse().map_err(|e: String| err_js(e))?;
    Ok(shape.curve(duration_secs))
}

/// True when the slider landed inside the fixed ±2-step answer window.
#[wasm_bindgen]
pub fn is_within_tolerance(slider_position: i32, correct_position: i32) -> bool {
    judge::is_within_tolerance(slider_position, correct_position)
}

/// Beat intensity for a slider deviation (0.1 per step, unclamped).
#[wasm_bindgen]
pub fn deviation_intensity(slider_position: i32, correct_position: i32) -> f64 {
    judge::deviation_intensity(slider_position, correct_position)
}
