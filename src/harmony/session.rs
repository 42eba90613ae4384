use log::warn;
use rand::Rng;

use crate::audio::{AudioEngine, ChordNote, BASE_VOICE, TARGET_VOICE};
use crate::judge;
use crate::levels::{LevelDesign, NoteTables};
use crate::timbre::Timbre;
use crate::tuning;

use super::types::{
    dead_zone, shake_intensity, tolerance_cents, Difficulty, JudgeOutcome, Phase, Problem,
    ProgressionState, BASE_DETUNE_LEVEL, CORRECT_POSITION_RANGE, MIX_FAMILIARITY_THRESHOLD,
    RANDOM_INSTRUMENT_LEVEL,
};

/// Harmony sessions tune to orchestral A=442. The pitch-direction game uses
/// A=440; the discrepancy is intentional per-game configuration.
pub const REFERENCE_A: f64 = 442.0;

/// Seconds of one loop of the sustained chord; the dynamics curve is
/// sampled over this span.
const CHORD_LOOP_SECS: f64 = 3.5;

const RANDOM_SENTINEL: &str = "Random";

/// One harmony game session: progression state, the active problem, and the
/// phase machine that serializes input handling. All mutation happens
/// synchronously inside a single caller (the UI event loop); timers live in
/// the driver and fire the phase transitions here.
pub struct HarmonySession<R: Rng> {
    design: LevelDesign,
    notes: NoteTables,
    instruments: Vec<String>,
    reference_a: f64,
    state: ProgressionState,
    phase: Phase,
    problem: Option<Problem>,
    rng: R,
}

impl<R: Rng> HarmonySession<R> {
    pub fn new(
        design: LevelDesign,
        notes: NoteTables,
        level: u32,
        difficulty: Difficulty,
        rng: R,
    ) -> Self {
        Self::with_state(design, notes, ProgressionState::new(level, difficulty), rng)
    }

    /// Resume from an explicit progression state (persisted level, forced
    /// interval exposure, ...). The state is owned by the session from here
    /// on; nothing in it is process-global.
    pub fn with_state(
        design: LevelDesign,
        notes: NoteTables,
        state: ProgressionState,
        rng: R,
    ) -> Self {
        let instruments = notes.available_instruments();
        HarmonySession {
            design,
            notes,
            instruments,
            reference_a: REFERENCE_A,
            state,
            phase: Phase::AwaitingNextProblem,
            problem: None,
            rng,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    /// Generate the next round. Anything still sounding or pending from the
    /// previous round is stopped first. Returns `None` once the session has
    /// reached game over; restarting is a new session.
    pub fn next_problem(&mut self, audio: &mut dyn AudioEngine) -> Option<&Problem> {
        if self.phase == Phase::GameOver {
            return None;
        }
        audio.stop_all();

        let spec = self.design.spec_for(self.state.level).clone();

        let interval = if spec.interval == RANDOM_SENTINEL {
            let idx = self.rng.random_range(0..tuning::RANDOM_INTERVAL_POOL.len());
            tuning::RANDOM_INTERVAL_POOL[idx].to_string()
        } else {
            spec.interval.clone()
        };

        *self.state.interval_counts.entry(interval.clone()).or_insert(0) += 1;

        let occurrence_count = self.state.occurrence_count(&interval);
        let (base_instrument, target_instrument) = choose_instruments(
            &mut self.rng,
            &self.instruments,
            self.state.level,
            occurrence_count,
            &spec.timbre,
        );

        let note_list = self.notes.notes_for(&base_instrument);
        let base_note = note_list[self.rng.random_range(0..note_list.len())].clone();
        let midi = match tuning::note_name_to_midi(&base_note) {
            Some(midi) => midi,
            None => {
                warn!("Unparseable note name '{}'; using A4.", base_note);
                69
            }
        };

        let mut base_frequency = tuning::midi_to_frequency(f64::from(midi), self.reference_a);
        if self.state.level >= BASE_DETUNE_LEVEL {
            // Quarter-tone jitter so the base itself stops being a landmark.
            let cents = self.rng.random_range(-50.0..50.0);
            base_frequency = tuning::detune_cents(base_frequency, cents);
        }

        let target_base_frequency = base_frequency * tuning::interval_ratio(&interval);

        self.problem = Some(Problem {
            interval,
            base_note,
            base_frequency,
            target_base_frequency,
            tolerance_cents: tolerance_cents(self.state.level),
            correct_slider_position: self
                .rng
                .random_range(-CORRECT_POSITION_RANGE..=CORRECT_POSITION_RANGE),
            dynamics: spec.dynamics,
            base_instrument,
            target_instrument,
        });
        self.phase = Phase::ProblemIntroducing;
        self.problem.as_ref()
    }

    /// Start the sustained chord once the intro delay has run out. The
    /// dynamics curve rides the base voice only; the target stays flat so
    /// the beat is audible against it.
    pub fn begin_playback(&mut self, audio: &mut dyn AudioEngine, slider_pos: i32) {
        if self.phase != Phase::ProblemIntroducing {
            return;
        }
        let Some(problem) = &self.problem else { return };
        audio.play_chord(&chord(problem, slider_pos));
        self.phase = Phase::ProblemPlaying;
    }

    /// Enable answering (the driver calls this when input unlocks).
    pub fn open_answers(&mut self) {
        if self.phase == Phase::ProblemPlaying {
            self.phase = Phase::AwaitingAnswer;
        }
    }

    /// Live retune while the slider moves. Returns the beat intensity for
    /// immediate feedback; neutral zero outside an active round.
    pub fn slider_moved(&mut self, audio: &mut dyn AudioEngine, slider_pos: i32) -> f64 {
        if !matches!(self.phase, Phase::ProblemPlaying | Phase::AwaitingAnswer) {
            return 0.0;
        }
        let Some(problem) = &self.problem else {
            return 0.0;
        };
        let frequency = tuning::frequency_for_slider(
            problem.target_base_frequency,
            problem.tolerance_cents,
            problem.correct_slider_position,
            slider_pos,
        );
        audio.update_frequency(TARGET_VOICE, frequency);
        judge::deviation_intensity(slider_pos, problem.correct_slider_position)
    }

    /// Judge the submitted slider position. Submissions outside the answer
    /// phase come back with `judged: false` and change nothing, so rapid
    /// repeated input cannot produce a second outcome for the same problem.
    pub fn submit_answer(&mut self, audio: &mut dyn AudioEngine, slider_pos: i32) -> JudgeOutcome {
        let correct_pos = match (&self.phase, &self.problem) {
            (Phase::AwaitingAnswer, Some(problem)) => problem.correct_slider_position,
            _ => return self.neutral_outcome(),
        };

        audio.stop_all();
        let correct = judge::is_within_tolerance(slider_pos, correct_pos);
        if correct {
            self.state.score += 1;
            self.state.level += 1;
            self.phase = Phase::Judged { correct: true };
        } else {
            self.state.lives = self.state.lives.saturating_sub(1);
            self.phase = if self.state.lives == 0 {
                Phase::GameOver
            } else {
                Phase::Judged { correct: false }
            };
        }

        JudgeOutcome {
            judged: true,
            correct,
            score: self.state.score,
            level: self.state.level,
            lives: self.state.lives,
            game_over: self.phase == Phase::GameOver,
        }
    }

    /// Replay the chord for review after judging. Does not reopen judging.
    pub fn replay(&mut self, audio: &mut dyn AudioEngine, slider_pos: i32) {
        if !matches!(self.phase, Phase::Judged { .. }) {
            return;
        }
        if let Some(problem) = &self.problem {
            audio.play_chord(&chord(problem, slider_pos));
        }
    }

    /// Play the chord pinned to the correct position, for the post-answer
    /// "this is how it should sound" feedback.
    pub fn play_correct(&mut self, audio: &mut dyn AudioEngine) {
        if !matches!(self.phase, Phase::Judged { .. } | Phase::GameOver) {
            return;
        }
        if let Some(problem) = &self.problem {
            audio.play_chord(&chord(problem, problem.correct_slider_position));
        }
    }

    /// Dead zone for the current problem's interval; zero when idle.
    pub fn dead_zone(&self) -> f64 {
        match &self.problem {
            Some(problem) => {
                dead_zone(self.state.occurrence_count(&problem.interval).max(1))
            }
            None => 0.0,
        }
    }

    /// Animation-tick intensity: deviation past the dead zone, 0.1 per
    /// step. Renders neutral whenever there is no active round to react to.
    pub fn feedback_intensity(&self, slider_pos: i32) -> f64 {
        if !matches!(self.phase, Phase::ProblemPlaying | Phase::AwaitingAnswer) {
            return 0.0;
        }
        match &self.problem {
            Some(problem) => {
                shake_intensity(slider_pos, problem.correct_slider_position, self.dead_zone())
            }
            None => 0.0,
        }
    }

    fn neutral_outcome(&self) -> JudgeOutcome {
        JudgeOutcome {
            judged: false,
            correct: false,
            score: self.state.score,
            level: self.state.level,
            lives: self.state.lives,
            game_over: self.phase == Phase::GameOver,
        }
    }
}

/// Instrument roles for one round. Below level 30 the level's configured
/// timbre plays both voices. From level 30 the base is a uniform pick from
/// the pool, and once an interval is familiar (seen more than 10 times) a
/// fair coin decides whether the target gets a deliberately different
/// timbre.
fn choose_instruments<R: Rng>(
    rng: &mut R,
    pool: &[String],
    level: u32,
    occurrence_count: u32,
    configured: &str,
) -> (String, String) {
    let base = if level >= RANDOM_INSTRUMENT_LEVEL {
        pool[rng.random_range(0..pool.len())].clone()
    } else {
        configured.to_string()
    };

    let mut target = base.clone();
    if level >= RANDOM_INSTRUMENT_LEVEL
        && occurrence_count > MIX_FAMILIARITY_THRESHOLD
        && rng.random_bool(0.5)
    {
        let others: Vec<&String> = pool.iter().filter(|name| **name != base).collect();
        if !others.is_empty() {
            target = others[rng.random_range(0..others.len())].clone();
        }
    }
    (base, target)
}

fn chord(problem: &Problem, slider_pos: i32) -> [ChordNote; 2] {
    let target_frequency = tuning::frequency_for_slider(
        problem.target_base_frequency,
        problem.tolerance_cents,
        problem.correct_slider_position,
        slider_pos,
    );
    [
        ChordNote {
            id: BASE_VOICE.to_string(),
            instrument: problem.base_instrument.clone(),
            frequency: problem.base_frequency,
            waveform: Timbre::from_name(&problem.base_instrument).fallback_waveform(),
            dynamics: Some(problem.dynamics.curve(CHORD_LOOP_SECS)),
        },
        ChordNote {
            id: TARGET_VOICE.to_string(),
            instrument: problem.target_instrument.clone(),
            frequency: target_frequency,
            waveform: Timbre::from_name(&problem.target_instrument).fallback_waveform(),
            dynamics: None,
        },
    ]
}
