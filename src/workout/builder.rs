use crate::workout::{ExerciseLog, ExerciseType, UserSettings};

pub const WARMUP_ID: &str = "warmup-1";
pub const SWING_ID: &str = "swings-1";
pub const TGU_ID: &str = "tgu-1";

const WARMUP_WEIGHT: f64 = 12.0;

/// The day's protocol: warm-up, 100 swings in 10 sets, 10 get-ups in 10 sets.
pub fn build_default_exercises(settings: &UserSettings) -> Vec<ExerciseLog> {
    vec![
        ExerciseLog {
            id: WARMUP_ID.to_string(),
            kind: ExerciseType::Warmup,
            name: "Warmup (Halo, Goblet Squat, Bridge)".to_string(),
            weight: WARMUP_WEIGHT,
            reps: 3,
            sets: 3,
            completed: false,
            notes: None,
        },
        ExerciseLog {
            id: SWING_ID.to_string(),
            kind: ExerciseType::Swing,
            name: "Kettlebell Swings".to_string(),
            weight: settings.default_swing_weight,
            reps: 100,
            sets: 10,
            completed: false,
            notes: None,
        },
        ExerciseLog {
            id: TGU_ID.to_string(),
            kind: ExerciseType::Tgu,
            name: "Turkish Get-Ups".to_string(),
            weight: settings.default_tgu_weight,
            reps: 10,
            sets: 10,
            completed: false,
            notes: None,
        },
    ]
}
