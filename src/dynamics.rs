use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Gain curves are sampled at this fixed rate, matching what
/// `setValueCurveAtTime` expects from the audio layer.
pub const CURVE_SAMPLE_RATE: f64 = 10.0;

const MIN_VOL: f32 = 0.05;
const MAX_VOL: f32 = 0.5;

/// Gain-envelope shapes as named in the level-design table.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Dynamics {
    #[default]
    #[serde(rename = "none")]
    None,
    Crescendo,
    Decrescendo,
    Swell,
    #[serde(rename = "Diminuendo-Crescendo")]
    DiminuendoCrescendo,
}

impl FromStr for Dynamics {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Dynamics::None),
            "Crescendo" => Ok(Dynamics::Crescendo),
            "Decrescendo" => Ok(Dynamics::Decrescendo),
            "Swell" => Ok(Dynamics::Swell),
            "Diminuendo-Crescendo" => Ok(Dynamics::DiminuendoCrescendo),
            other => Err(format!("Unknown dynamics shape: {}", other)),
        }
    }
}

impl Dynamics {
    /// Sample the gain envelope over `duration_secs`, values in
    /// [0.05, 0.5] with `none` pinned at 0.5. The audio layer rescales the
    /// curve to the active timbre's gain convention.
    pub fn curve(&self, duration_secs: f64) -> Vec<f32> {
        let len = (duration_secs * CURVE_SAMPLE_RATE).floor().max(0.0) as usize;
        let span = MAX_VOL - MIN_VOL;
        let mut curve = Vec::with_capacity(len);

        for i in 0..len {
            // A one-sample curve would make t 0/0; pin it to the start.
            let t = if len > 1 {
                i as f32 / (len - 1) as f32
            } else {
                0.0
            };
            let v = match self {
                Dynamics::None => 0.5,
                Dynamics::Crescendo => MIN_VOL + span * t,
                Dynamics::Decrescendo => MAX_VOL - span * t,
                Dynamics::Swell => {
                    if t < 0.5 {
                        MIN_VOL + span * (t * 2.0)
                    } else {
                        MAX_VOL - span * ((t - 0.5) * 2.0)
                    }
                }
                Dynamics::DiminuendoCrescendo => {
                    if t < 0.5 {
                        MAX_VOL - span * (t * 2.0)
                    } else {
                        MIN_VOL + span * ((t - 0.5) * 2.0)
                    }
                }
            };
            curve.push(v);
        }
        curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_count() {
        assert_eq!(Dynamics::None.curve(3.5).len(), 35);
        assert_eq!(Dynamics::Crescendo.curve(1.0).len(), 10);
        assert_eq!(Dynamics::Crescendo.curve(0.05).len(), 0);
        assert_eq!(Dynamics::Crescendo.curve(-1.0).len(), 0);
    }

    #[test]
    fn test_none_is_constant() {
        let curve = Dynamics::None.curve(3.5);
        assert!(curve.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_crescendo_rises() {
        let curve = Dynamics::Crescendo.curve(3.5);
        assert!((curve[0] - 0.05).abs() < 1e-6);
        assert!((curve[curve.len() - 1] - 0.5).abs() < 1e-6);
        assert!(curve[0] < curve[curve.len() - 1]);
        assert!(curve.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_decrescendo_falls() {
        let curve = Dynamics::Decrescendo.curve(3.5);
        assert!((curve[0] - 0.5).abs() < 1e-6);
        assert!((curve[curve.len() - 1] - 0.05).abs() < 1e-6);
        assert!(curve.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_swell_peaks_at_midpoint() {
        let curve = Dynamics::Swell.curve(4.0);
        let mid = curve.len() / 2;
        let peak = curve.iter().cloned().fold(f32::MIN, f32::max);
        assert!((curve[mid] - peak).abs() < 0.05);
        assert!(curve[0] < curve[mid]);
        assert!(curve[curve.len() - 1] < curve[mid]);
    }

    #[test]
    fn test_diminuendo_crescendo_troughs_at_midpoint() {
        let curve = Dynamics::DiminuendoCrescendo.curve(4.0);
        let mid = curve.len() / 2;
        assert!(curve[0] > curve[mid]);
        assert!(curve[curve.len() - 1] > curve[mid]);
    }

    #[test]
    fn test_single_sample_curve_is_finite() {
        for shape in [
            Dynamics::None,
            Dynamics::Crescendo,
            Dynamics::Decrescendo,
            Dynamics::Swell,
            Dynamics::DiminuendoCrescendo,
        ] {
            let curve = shape.curve(0.1);
            assert_eq!(curve.len(), 1);
            assert!(curve[0].is_finite());
            assert!((0.05..=0.5).contains(&curve[0]));
        }
    }

    #[test]
    fn test_values_stay_in_volume_range() {
        for shape in [
            Dynamics::Crescendo,
            Dynamics::Decrescendo,
            Dynamics::Swell,
            Dynamics::DiminuendoCrescendo,
        ] {
            for &v in &shape.curve(7.3) {
                assert!((0.05..=0.5).contains(&v));
            }
        }
    }

    #[test]
    fn test_parse_shape_names() {
        assert_eq!("none".parse::<Dynamics>().unwrap(), Dynamics::None);
        assert_eq!("Swell".parse::<Dynamics>().unwrap(), Dynamics::Swell);
        assert_eq!(
            "Diminuendo-Crescendo".parse::<Dynamics>().unwrap(),
            Dynamics::DiminuendoCrescendo
        );
        assert!("fortissimo".parse::<Dynamics>().is_err());
    }
}
