use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod builder;
pub mod history;

pub use builder::build_default_exercises;
pub use history::{WorkoutError, WorkoutStore};

/// Persisted mapping from calendar date to that day's workout.
pub type History = BTreeMap<NaiveDate, DailyWorkout>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseType {
    Warmup,
    Swing,
    Tgu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
    pub name: String,
    /// Kilograms unless the settings say otherwise.
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ExerciseLog {
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    pub fn with_load(&self, weight: f64, reps: u32) -> Self {
        Self {
            weight,
            reps,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyWorkout {
    pub date: NaiveDate,
    pub exercises: Vec<ExerciseLog>,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

impl DailyWorkout {
    pub fn new(date: NaiveDate, exercises: Vec<ExerciseLog>) -> Self {
        let mut workout = Self {
            date,
            exercises,
            completed: false,
            duration_minutes: None,
        };
        workout.recompute_completed();
        workout
    }

    /// True iff every exercise is completed. Never set directly.
    pub fn completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn recompute_completed(&mut self) {
        self.completed = self.exercises.iter().all(|exercise| exercise.completed);
    }

    pub fn completed_count(&self) -> usize {
        self.exercises
            .iter()
            .filter(|exercise| exercise.completed)
            .count()
    }

    pub fn progress_percent(&self) -> f32 {
        if self.exercises.is_empty() {
            return 0.0;
        }
        self.completed_count() as f32 / self.exercises.len() as f32 * 100.0
    }

    pub fn exercise(&self, kind: ExerciseType) -> Option<&ExerciseLog> {
        self.exercises.iter().find(|exercise| exercise.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn label(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "defaultSwingWeight")]
    pub default_swing_weight: f64,
    #[serde(rename = "defaultTGUWeight")]
    pub default_tgu_weight: f64,
    #[serde(rename = "weightUnit", default)]
    pub weight_unit: WeightUnit,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_swing_weight: 24.0,
            default_tgu_weight: 16.0,
            weight_unit: WeightUnit::Kg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DailyWorkout, ExerciseType, UserSettings, WeightUnit};
    use crate::workout::build_default_exercises;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    #[test]
    fn settings_deserialize_from_stored_camel_case_shape() {
        let data = r#"{"defaultSwingWeight": 32, "defaultTGUWeight": 24, "weightUnit": "lbs"}"#;
        let settings: UserSettings = serde_json::from_str(data).expect("settings should parse");
        assert_eq!(settings.default_swing_weight, 32.0);
        assert_eq!(settings.default_tgu_weight, 24.0);
        assert_eq!(settings.weight_unit, WeightUnit::Lbs);
    }

    #[test]
    fn workout_serializes_with_original_field_names() {
        let workout = DailyWorkout::new(day(), build_default_exercises(&UserSettings::default()));
        let value = serde_json::to_value(&workout).expect("workout should serialize");

        assert_eq!(value["date"], "2024-01-01");
        assert_eq!(value["completed"], false);
        assert_eq!(value["exercises"][1]["type"], "SWING");
        assert_eq!(value["exercises"][2]["type"], "TGU");
        assert!(value.get("durationMinutes").is_none());
        assert!(value["exercises"][0].get("notes").is_none());
    }

    #[test]
    fn progress_percent_tracks_completed_exercises() {
        let mut workout =
            DailyWorkout::new(day(), build_default_exercises(&UserSettings::default()));
        assert_eq!(workout.progress_percent(), 0.0);

        workout.exercises[0].completed = true;
        workout.recompute_completed();
        assert!((workout.progress_percent() - 100.0 / 3.0).abs() < 1e-4);

        let empty = DailyWorkout::new(day(), Vec::new());
        assert_eq!(empty.progress_percent(), 0.0);
    }

    #[test]
    fn exercise_lookup_by_kind() {
        let workout = DailyWorkout::new(day(), build_default_exercises(&UserSettings::default()));
        let tgu = workout.exercise(ExerciseType::Tgu).expect("tgu present");
        assert_eq!(tgu.id, "tgu-1");
    }
}
