use crate::workout::{DailyWorkout, ExerciseType, History};
use chrono::NaiveDate;

/// Number of most recent days kept in the chart series.
pub const PROGRESS_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub swing_weight: f64,
    pub swing_reps: u32,
    pub tgu_weight: f64,
    pub tgu_reps: u32,
}

impl ProgressPoint {
    fn from_workout(workout: &DailyWorkout) -> Self {
        let load = |kind: ExerciseType| {
            workout
                .exercise(kind)
                .map(|exercise| (exercise.weight, exercise.reps))
                .unwrap_or((0.0, 0))
        };
        let (swing_weight, swing_reps) = load(ExerciseType::Swing);
        let (tgu_weight, tgu_reps) = load(ExerciseType::Tgu);

        Self {
            date: workout.date,
            swing_weight,
            swing_reps,
            tgu_weight,
            tgu_reps,
        }
    }

    pub fn axis_label(&self) -> String {
        self.date.format("%m/%d").to_string()
    }
}

/// Chronological swing/get-up series over the last [`PROGRESS_WINDOW`] days.
pub fn aggregate(history: &History) -> Vec<ProgressPoint> {
    let mut workouts: Vec<&DailyWorkout> = history.values().collect();
    workouts.sort_by_key(|workout| workout.date);

    let skip = workouts.len().saturating_sub(PROGRESS_WINDOW);
    workouts
        .into_iter()
        .skip(skip)
        .map(ProgressPoint::from_workout)
        .collect()
}
