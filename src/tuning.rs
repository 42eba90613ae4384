use log::warn;

/// The interval pool the "Random" level sentinel draws from, ordered by the
/// LCM of the just ratio (simplest consonances first).
pub const RANDOM_INTERVAL_POOL: [&str; 13] = [
    "Perfect 1st",
    "Perfect 8th",
    "Perfect 5th",
    "Perfect 4th",
    "Major 6th",
    "Major 3rd",
    "minor 3rd",
    "minor 6th",
    "minor 7th",
    "Major 2nd",
    "Major 7th",
    "minor 2nd",
    "Tritone",
];

/// Just-intonation frequency ratio for a named interval (5-limit).
/// The level tables are data-driven, so an unknown name falls back to unison
/// with a warning instead of failing the round.
pub fn interval_ratio(name: &str) -> f64 {
    match name {
        "Perfect 1st" => 1.0,
        "minor 2nd" => 16.0 / 15.0,
        "Major 2nd" => 9.0 / 8.0,
        "minor 3rd" => 6.0 / 5.0,
        "Major 3rd" => 5.0 / 4.0,
        "Perfect 4th" => 4.0 / 3.0,
        // Diatonic tritone
        "Tritone" => 45.0 / 32.0,
        "Perfect 5th" => 3.0 / 2.0,
        "minor 6th" => 8.0 / 5.0,
        "Major 6th" => 5.0 / 3.0,
        "minor 7th" => 9.0 / 5.0,
        "Major 7th" => 15.0 / 8.0,
        "Perfect 8th" | "Octave" => 2.0,
        other => {
            warn!("Unknown interval: {}. Defaulting to Perfect 1st.", other);
            1.0
        }
    }
}

/// Apply a detune in cents to a frequency.
pub fn detune_cents(freq: f64, cents: f64) -> f64 {
    freq * (cents / 1200.0).exp2()
}

/// Frequency for a slider position. One slider step is half the current
/// tolerance in cents, so the ±2-step answer window spans the full
/// ±tolerance around the correct position.
pub fn frequency_for_slider(
    base_freq: f64,
    tolerance_cents: u32,
    correct_pos: i32,
    slider_pos: i32,
) -> f64 {
    let cents_per_step = tolerance_cents as f64 / 2.0;
    let cents_offset = (slider_pos - correct_pos) as f64 * cents_per_step;
    detune_cents(base_freq, cents_offset)
}

/// Equal-temperament MIDI number to frequency relative to a reference A4.
/// The harmony game tunes to A=442, the pitch-direction game to A=440; the
/// reference is session configuration, not a constant.
pub fn midi_to_frequency(midi: f64, reference_a: f64) -> f64 {
    reference_a * ((midi - 69.0) / 12.0).exp2()
}

/// Parse a note name like "C4", "F#3" or "Bb4" into a MIDI number.
pub fn note_name_to_midi(name: &str) -> Option<i32> {
    let mut chars = name.trim().chars();
    let step = chars.next()?;
    let rest: String = chars.collect();

    let (alter, octave_str) = if let Some(r) = rest.strip_prefix('#') {
        (1, r)
    } else if let Some(r) = rest.strip_prefix('b') {
        (-1, r)
    } else {
        (0, rest.as_str())
    };

    let base = match step.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let octave: i32 = octave_str.parse().ok()?;
    Some((octave + 1) * 12 + base + alter)
}
