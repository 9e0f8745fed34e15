//! Typed payload structs for workout drafts and permanent workout records.
//!
//! These are stored in JSONB columns and travel over the sync wire, so they
//! use camelCase field names. Clients sync partially-filled entries while a
//! workout is underway, hence the pervasive `Option`s.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One logged set of a strength exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    #[serde(default)]
    pub completed: bool,
}

/// One exercise within a workout, strength sets and/or cardio fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub name: String,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
    pub duration_secs: Option<i32>,
    pub distance_km: Option<f64>,
    pub notes: Option<String>,
}

/// Record of one exercise swapped for another mid-workout, keyed in the
/// draft by the original exercise name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutedExercise {
    pub name: String,
    pub reason: Option<String>,
}

/// Map of original exercise name -> substitution record.
pub type SubstitutionMap = HashMap<String, SubstitutedExercise>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_exercise_entry_deserializes() {
        // Mid-workout syncs carry half-filled entries; missing sets and
        // cardio fields must not be an error.
        let entry: ExerciseEntry =
            serde_json::from_str(r#"{"name": "Bench Press"}"#).expect("partial entry must parse");
        assert_eq!(entry.name, "Bench Press");
        assert!(entry.sets.is_empty());
        assert!(entry.duration_secs.is_none());
    }

    #[test]
    fn test_set_entry_uses_camel_case() {
        let set = SetEntry {
            reps: Some(8),
            weight: Some(62.5),
            completed: true,
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["reps"], 8);
        assert_eq!(json["completed"], true);
    }

    #[test]
    fn test_substitution_map_round_trips_by_original_name() {
        let mut subs = SubstitutionMap::new();
        subs.insert(
            "Barbell Squat".to_string(),
            SubstitutedExercise {
                name: "Leg Press".to_string(),
                reason: Some("rack occupied".to_string()),
            },
        );
        let json = serde_json::to_string(&subs).unwrap();
        let back: SubstitutionMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back["Barbell Squat"].name, "Leg Press");
    }
}
