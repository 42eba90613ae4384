use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dynamics::Dynamics;

pub const START_LIVES: u32 = 3;
/// Correct positions stay inside [-8, 8] on a [-10, 10] slider, so the
/// ±2-step answer window never clips at the extremes.
pub const CORRECT_POSITION_RANGE: i32 = 8;
/// From this level on, the base instrument is a uniform pick from the pool.
pub const RANDOM_INSTRUMENT_LEVEL: u32 = 30;
/// From this level on, the base pitch gets a ±50-cent quarter-tone jitter.
pub const BASE_DETUNE_LEVEL: u32 = 50;
/// An interval seen more often than this is eligible for a mismatched
/// target timbre.
pub const MIX_FAMILIARITY_THRESHOLD: u32 = 10;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn from_name(name: &str) -> Difficulty {
        match name {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Normal,
        }
    }

    /// Starting level behind the pitch-direction game's difficulty picker.
    pub fn starting_level(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 15,
            Difficulty::Hard => 30,
        }
    }
}

/// One harmony round, immutable once generated and replaced wholesale by
/// the next one.
#[derive(Serialize, Clone, Debug)]
pub struct Problem {
    pub interval: String,
    pub base_note: String,
    pub base_frequency: f64,
    pub target_base_frequency: f64,
    pub tolerance_cents: u32,
    pub correct_slider_position: i32,
    pub dynamics: Dynamics,
    pub base_instrument: String,
    pub target_instrument: String,
}

/// Session progression. `interval_counts` tracks how often each interval
/// has been presented, never how well it was answered; it gates the
/// instrument mix and widens the visual dead zone. It never resets within
/// a session.
#[derive(Serialize, Clone, Debug)]
pub struct ProgressionState {
    pub level: u32,
    pub score: u32,
    pub lives: u32,
    pub difficulty: Difficulty,
    pub interval_counts: HashMap<String, u32>,
}

impl ProgressionState {
    pub fn new(level: u32, difficulty: Difficulty) -> Self {
        ProgressionState {
            level: level.max(1),
            score: 0,
            lives: START_LIVES,
            difficulty,
            interval_counts: HashMap::new(),
        }
    }

    pub fn occurrence_count(&self, interval: &str) -> u32 {
        self.interval_counts.get(interval).copied().unwrap_or(0)
    }
}

/// Round lifecycle. Answer submission is only honored in `AwaitingAnswer`,
/// which is what guarantees at most one judged outcome per problem.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingNextProblem,
    ProblemIntroducing,
    ProblemPlaying,
    AwaitingAnswer,
    Judged { correct: bool },
    GameOver,
}

/// Result of one answer submission, carrying the updated progression values
/// so the UI never reads core internals piecemeal. `judged` is false when
/// the submission was ignored (no active problem, or already answered).
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct JudgeOutcome {
    pub judged: bool,
    pub correct: bool,
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub game_over: bool,
}

/// Cents tolerance for a level: ±20c at level 1, tightening by 1c every
/// five levels, floored at ±3c.
pub fn tolerance_cents(level: u32) -> u32 {
    20u32.saturating_sub((level.max(1) - 1) / 5).max(3)
}

/// Dead zone in slider steps for the shake hint: widens half a step per
/// prior exposure to the interval, capped at 5. Familiarity fades the hint
/// independently of level.
pub fn dead_zone(occurrence_count: u32) -> f64 {
    (occurrence_count.saturating_sub(1) as f64 * 0.5).min(5.0)
}

/// Shake intensity once the dead zone is subtracted from the deviation.
pub fn shake_intensity(slider_pos: i32, correct_pos: i32, dead_zone: f64) -> f64 {
    let diff = (slider_pos - correct_pos).abs() as f64;
    (diff - dead_zone).max(0.0) * 0.1
}
