/// Half-width of the correct answer window, in slider steps. This is fixed:
/// the cents tolerance tightens with level, the slider window never does.
pub const ANSWER_WINDOW_STEPS: i32 = 2;

/// True when the slider landed inside the answer window.
pub fn is_within_tolerance(slider_pos: i32, correct_pos: i32) -> bool {
    (slider_pos - correct_pos).abs() <= ANSWER_WINDOW_STEPS
}

/// Beat intensity for live visual feedback: zero at an exact match and
/// 0.1 per step of deviation, deliberately unclamped.
pub fn deviation_intensity(slider_pos: i32, correct_pos: i32) -> f64 {
    (slider_pos - correct_pos).abs() as f64 * 0.1
}

/// Judge an up/down direction choice.
pub fn judge_direction(user_says_up: bool, actual_is_up: bool) -> bool {
    user_says_up == actual_is_up
}
