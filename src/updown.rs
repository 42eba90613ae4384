//! Pitch-direction game: two notes sound in sequence, the player answers
//! "up" or "down". Problems chain into a bounded random walk and shrink
//! with the player's combo; the session itself is time-boxed by an external
//! 60-second timer.

use rand::Rng;
use serde::Serialize;

use crate::judge;
use crate::tuning;

/// Playable MIDI range, C3 to C6. Three octaves wide, so a single bounce
/// off an edge always lands back inside (intervals are at most an octave).
pub const MIN_NOTE: f64 = 48.0;
pub const MAX_NOTE: f64 = 84.0;

/// This game tunes to A=440 (the harmony game uses 442; kept separate by
/// design).
pub const REFERENCE_A: f64 = 440.0;

/// Combo count over which the interval shrinks from the tier start to the
/// tier end.
const COMBO_RAMP: f64 = 30.0;

/// One up/down round. `target_note` seeds the next round's base, so a
/// session walks the range instead of jumping around it.
#[derive(Serialize, Clone, Debug)]
pub struct Problem {
    pub base_note: f64,
    pub target_note: f64,
    pub is_up: bool,
    pub interval_semitones: f64,
    pub base_frequency: f64,
    pub target_frequency: f64,
}

#[derive(Serialize, Clone, Debug)]
pub struct Progression {
    pub level: u32,
    pub score: u32,
    pub combo: u32,
    pub last_note: Option<f64>,
}

/// Result of one direction choice. `judged` is false when there was no
/// active problem or the round was already answered.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Answer {
    pub judged: bool,
    pub correct: bool,
    pub score: u32,
    pub combo: u32,
}

/// Interval tier for a level, (start, end) in semitones. Tiers only change
/// with an explicit level change; within a tier, combo does the shrinking.
fn interval_tier(level: u32) -> (f64, f64) {
    if level >= 30 {
        // Quarter tone down to 3 cents.
        (0.5, 0.03)
    } else if level >= 15 {
        (2.0, 0.5)
    } else {
        (12.0, 2.0)
    }
}

/// Interval size in semitones: shrinks linearly from the tier start to the
/// tier end over the first 30 combo.
pub fn interval_semitones(level: u32, combo: u32) -> f64 {
    let (start, end) = interval_tier(level);
    let progress = (combo as f64 / COMBO_RAMP).min(1.0);
    start - (start - end) * progress
}

pub struct UpDownSession<R: Rng> {
    state: Progression,
    problem: Option<Problem>,
    answered: bool,
    reference_a: f64,
    rng: R,
}

impl<R: Rng> UpDownSession<R> {
    pub fn new(level: u32, rng: R) -> Self {
        UpDownSession {
            state: Progression {
                level: level.max(1),
                score: 0,
                combo: 0,
                last_note: None,
            },
            problem: None,
            answered: false,
            reference_a: REFERENCE_A,
            rng,
        }
    }

    pub fn state(&self) -> &Progression {
        &self.state
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn set_level(&mut self, level: u32) {
        self.state.level = level.max(1);
        self.reset();
    }

    /// Clear score, combo, and the random-walk chain for a fresh timed run.
    pub fn reset(&mut self) {
        self.state.score = 0;
        self.state.combo = 0;
        self.state.last_note = None;
        self.problem = None;
        self.answered = false;
    }

    pub fn next_problem(&mut self) -> &Problem {
        let base = match self.state.last_note {
            Some(note) => note,
            // First problem of the run: uniform start anywhere in range.
            None => f64::from(self.rng.random_range(MIN_NOTE as i32..=MAX_NOTE as i32)),
        };

        let interval = interval_semitones(self.state.level, self.state.combo);
        let mut is_up = self.rng.random_bool(0.5);
        let mut target = if is_up { base + interval } else { base - interval };

        // Bounce off the range edges by flipping direction once; the
        // interval is at most an octave, so the reflected note always fits.
        if target > MAX_NOTE {
            target = base - interval;
            is_up = false;
        } else if target < MIN_NOTE {
            target = base + interval;
            is_up = true;
        }

        self.state.last_note = Some(target);
        self.answered = false;
        let problem = Problem {
            base_note: base,
            target_note: target,
            is_up,
            interval_semitones: interval,
            base_frequency: tuning::midi_to_frequency(base, self.reference_a),
            target_frequency: tuning::midi_to_frequency(target, self.reference_a),
        };
        &*self.problem.insert(problem)
    }

    /// Judge a direction choice. Neutral when no problem is active or this
    /// round was already answered; one problem, one outcome.
    pub fn answer(&mut self, user_says_up: bool) -> Answer {
        let Some(problem) = &self.problem else {
            return self.neutral();
        };
        if self.answered {
            return self.neutral();
        }
        self.answered = true;

        let correct = judge::judge_direction(user_says_up, problem.is_up);
        if correct {
            self.state.combo += 1;
            // Base point plus a bonus step every five combo.
            self.state.score += 1 + (self.state.combo - 1) / 5;
        } else {
            self.state.combo = 0;
        }

        Answer {
            judged: true,
            correct,
            score: self.state.score,
            combo: self.state.combo,
        }
    }

    fn neutral(&self) -> Answer {
        Answer {
            judged: false,
            correct: false,
            score: self.state.score,
            combo: self.state.combo,
        }
    }
}
