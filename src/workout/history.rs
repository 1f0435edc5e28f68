use crate::storage::{KvStore, HISTORY_KEY};
use crate::workout::{build_default_exercises, DailyWorkout, ExerciseLog, History, UserSettings};
use chrono::NaiveDate;
use log::{error, info};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WorkoutError {
    #[error("no workout recorded for {0}")]
    DateNotFound(NaiveDate),
    #[error("workout for {date} has no exercise with id {id}")]
    ExerciseNotFound { date: NaiveDate, id: String },
    #[error("weight must be a non-negative number, got {0}")]
    InvalidWeight(f64),
}

/// Owns the workout history and keeps it in sync with durable storage.
///
/// A freshly built day is persisted as soon as it is created so that it
/// reloads identically even if it is never edited.
pub struct WorkoutStore {
    kv: KvStore,
    history: History,
}

impl WorkoutStore {
    pub fn open(kv: KvStore) -> Self {
        let mut history: History = kv.load(HISTORY_KEY, History::new());
        for workout in history.values_mut() {
            workout.recompute_completed();
        }
        info!("loaded {} workout(s) from {}", history.len(), kv.root().display());
        Self { kv, history }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyWorkout> {
        self.history.get(&date)
    }

    pub fn get_or_create(&mut self, date: NaiveDate, settings: &UserSettings) -> DailyWorkout {
        if let Some(existing) = self.history.get(&date) {
            return existing.clone();
        }

        let workout = DailyWorkout::new(date, build_default_exercises(settings));
        self.history.insert(date, workout.clone());
        info!("started workout for {date}");
        self.persist();
        workout
    }

    pub fn apply_exercise_update(
        &mut self,
        date: NaiveDate,
        updated: ExerciseLog,
    ) -> Result<DailyWorkout, WorkoutError> {
        if !updated.weight.is_finite() || updated.weight < 0.0 {
            return Err(WorkoutError::InvalidWeight(updated.weight));
        }

        let workout = self
            .history
            .get_mut(&date)
            .ok_or(WorkoutError::DateNotFound(date))?;
        let slot = workout
            .exercises
            .iter_mut()
            .find(|exercise| exercise.id == updated.id)
            .ok_or_else(|| WorkoutError::ExerciseNotFound {
                date,
                id: updated.id.clone(),
            })?;

        *slot = updated;
        workout.recompute_completed();
        let snapshot = workout.clone();

        self.persist();
        Ok(snapshot)
    }

    fn persist(&self) {
        if let Err(err) = self.kv.save(HISTORY_KEY, &self.history) {
            error!("failed to persist workout history: {err}");
        }
    }
}
