use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dynamics::Dynamics;
use crate::timbre::SAWTOOTH_WAVE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("level design table is empty")]
    EmptyLevelDesign,
    #[error("instrument note tables are missing the 'Sawtooth Wave' entry")]
    MissingSynthNotes,
    #[error("instrument '{0}' has an empty note list")]
    EmptyNoteList(String),
}

/// One row of the level-design table. `interval` may be the literal
/// "Random" sentinel, resolved per problem.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LevelSpec {
    pub level: u32,
    pub interval: String,
    #[serde(default)]
    pub dynamics: Dynamics,
    #[serde(default = "default_timbre")]
    pub timbre: String,
}

fn default_timbre() -> String {
    SAWTOOTH_WAVE.to_string()
}

/// Ordered level-design table, validated non-empty at construction.
#[derive(Clone, Debug)]
pub struct LevelDesign {
    entries: Vec<LevelSpec>,
}

impl LevelDesign {
    pub fn new(entries: Vec<LevelSpec>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyLevelDesign);
        }
        Ok(LevelDesign { entries })
    }

    /// Exact level match, or the last entry once the player runs past the
    /// end of the table.
    pub fn spec_for(&self, level: u32) -> &LevelSpec {
        match self.entries.iter().find(|e| e.level == level) {
            Some(spec) => spec,
            None => &self.entries[self.entries.len() - 1],
        }
    }
}

/// Per-instrument playable note names. The synthesized entry is mandatory:
/// it doubles as the fallback note list for instruments without their own
/// table, so base-pitch selection can never come up empty.
#[derive(Clone, Debug)]
pub struct NoteTables {
    tables: HashMap<String, Vec<String>>,
}

impl NoteTables {
    pub fn new(tables: HashMap<String, Vec<String>>) -> Result<Self, ConfigError> {
        if !tables.contains_key(SAWTOOTH_WAVE) {
            return Err(ConfigError::MissingSynthNotes);
        }
        for (name, notes) in &tables {
            if notes.is_empty() {
                return Err(ConfigError::EmptyNoteList(name.clone()));
            }
        }
        Ok(NoteTables { tables })
    }

    pub fn notes_for(&self, instrument: &str) -> &[String] {
        match self.tables.get(instrument) {
            Some(notes) => notes,
            None => &self.tables[SAWTOOTH_WAVE],
        }
    }

    /// The instrument pool for level-30+ random selection: the synthesized
    /// timbre plus every sampled instrument, in a stable order.
    pub fn available_instruments(&self) -> Vec<String> {
        let mut sampled: Vec<&String> = self
            .tables
            .keys()
            .filter(|k| k.as_str() != SAWTOOTH_WAVE)
            .collect();
        sampled.sort();

        let mut pool = Vec::with_capacity(sampled.len() + 1);
        pool.push(SAWTOOTH_WAVE.to_string());
        pool.extend(sampled.into_iter().cloned());
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design() -> LevelDesign {
        LevelDesign::new(vec![
            LevelSpec {
                level: 1,
                interval: "Perfect 1st".to_string(),
                dynamics: Dynamics::None,
                timbre: SAWTOOTH_WAVE.to_string(),
            },
            LevelSpec {
                level: 2,
                interval: "Perfect 5th".to_string(),
                dynamics: Dynamics::Crescendo,
                timbre: "Flute".to_string(),
            },
            LevelSpec {
                level: 3,
                interval: "Random".to_string(),
                dynamics: Dynamics::Swell,
                timbre: "Violin".to_string(),
            },
        ])
        .unwrap()
    }

    fn tables() -> NoteTables {
        let mut map = HashMap::new();
        map.insert(
            SAWTOOTH_WAVE.to_string(),
            vec!["A3".to_string(), "A4".to_string()],
        );
        map.insert("Violin".to_string(), vec!["G3".to_string(), "D4".to_string()]);
        NoteTables::new(map).unwrap()
    }

    #[test]
    fn test_exact_level_lookup() {
        let d = design();
        assert_eq!(d.spec_for(2).interval, "Perfect 5th");
        assert_eq!(d.spec_for(1).timbre, SAWTOOTH_WAVE);
    }

    #[test]
    fn test_past_end_uses_last_entry() {
        let d = design();
        assert_eq!(d.spec_for(99).interval, "Random");
        assert_eq!(d.spec_for(99).timbre, "Violin");
    }

    #[test]
    fn test_empty_design_rejected() {
        assert_eq!(
            LevelDesign::new(Vec::new()).unwrap_err(),
            ConfigError::EmptyLevelDesign
        );
    }

    #[test]
    fn test_note_table_fallback() {
        let t = tables();
        assert_eq!(t.notes_for("Violin"), ["G3".to_string(), "D4".to_string()]);
        // Unknown instrument falls back to the synth list.
        assert_eq!(t.notes_for("Tuba"), ["A3".to_string(), "A4".to_string()]);
    }

    #[test]
    fn test_note_tables_require_synth_entry() {
        let mut map = HashMap::new();
        map.insert("Violin".to_string(), vec!["G3".to_string()]);
        assert_eq!(
            NoteTables::new(map).unwrap_err(),
            ConfigError::MissingSynthNotes
        );
    }

    #[test]
    fn test_note_tables_reject_empty_list() {
        let mut map = HashMap::new();
        map.insert(SAWTOOTH_WAVE.to_string(), vec!["A4".to_string()]);
        map.insert("Cello".to_string(), Vec::new());
        assert_eq!(
            NoteTables::new(map).unwrap_err(),
            ConfigError::EmptyNoteList("Cello".to_string())
        );
    }

    #[test]
    fn test_available_instruments_pool() {
        let pool = tables().available_instruments();
        assert_eq!(pool[0], SAWTOOTH_WAVE);
        assert!(pool.contains(&"Violin".to_string()));
        assert_eq!(pool.len(), 2);
    }
}
