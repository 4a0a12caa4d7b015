use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::api::ExerciseStatus;
use super::ProgressError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Aggregate progress for one user as the backend reports it.
/// Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressSnapshot {
    pub total_points: u32,
    pub exercises_completed: u32,
    pub streak_days: u32,
    pub average_score: f64,
    /// minutes per week
    pub weekly_goal: u32,
    /// keyed by `YYYY-MM-DD`
    pub daily_progress: BTreeMap<String, DailyProgress>,
    pub exercise_history: Vec<HistoryEntry>,
    pub achievements: Vec<String>,
    pub last_exercise_date: Option<String>,
    pub weekly_progress: BTreeMap<String, DailyProgress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyProgress {
    pub minutes: f64,
    pub exercises: u32,
    pub score: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEntry {
    pub exercise_id: Option<u32>,
    pub status: Option<String>,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub score: f64,
    pub duration: f64,
    pub points: u32,
}

/// One day of the rolling seven-day plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDay {
    pub date: NaiveDate,
    pub minutes: f64,
    pub exercises: u32,
    pub target_minutes: u32,
    pub completed: bool,
}

impl PlanDay {
    /// Share of the daily target reached, 0..=100
    pub fn percent(&self) -> u16 {
        if self.target_minutes == 0 {
            return if self.exercises > 0 { 100 } else { 0 };
        }
        ((self.minutes / self.target_minutes as f64) * 100.0).clamp(0.0, 100.0) as u16
    }
}

impl ProgressSnapshot {
    pub fn total_minutes(&self) -> f64 {
        self.daily_progress.values().map(|d| d.minutes).sum()
    }

    pub fn best_score(&self) -> f64 {
        self.exercise_history
            .iter()
            .map(|e| e.score)
            .fold(0.0, f64::max)
    }

    /// Entries without a status predate status tracking and count as completed.
    pub fn status_of(&self, exercise_id: u32) -> ExerciseStatus {
        let completed = ExerciseStatus::Completed.to_string();
        let in_progress = ExerciseStatus::InProgress.to_string();
        let entries = self
            .exercise_history
            .iter()
            .filter(|e| e.exercise_id == Some(exercise_id));

        let mut seen_in_progress = false;
        for entry in entries {
            match entry.status.as_deref() {
                None => return ExerciseStatus::Completed,
                Some(s) if s == completed => return ExerciseStatus::Completed,
                Some(s) if s == in_progress => seen_in_progress = true,
                Some(_) => {}
            }
        }

        if seen_in_progress {
            ExerciseStatus::InProgress
        } else {
            ExerciseStatus::Locked
        }
    }

    pub fn daily_target_minutes(&self) -> u32 {
        self.weekly_goal.div_ceil(7)
    }

    /// The seven days ending with `today`, oldest first
    pub fn weekly_plan(&self, today: NaiveDate) -> Vec<PlanDay> {
        let target_minutes = self.daily_target_minutes();
        (0..7u64)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|date| {
                let key = date.format(DATE_FORMAT).to_string();
                let day = self.daily_progress.get(&key).cloned().unwrap_or_default();
                let completed = if target_minutes == 0 {
                    day.exercises > 0
                } else {
                    day.minutes >= target_minutes as f64
                };
                PlanDay {
                    date,
                    minutes: day.minutes,
                    exercises: day.exercises,
                    target_minutes,
                    completed,
                }
            })
            .collect()
    }

    /// Minutes practiced over the plan window against the weekly goal, 0..=100
    pub fn weekly_percent(&self, today: NaiveDate) -> u16 {
        if self.weekly_goal == 0 {
            return 0;
        }
        let minutes: f64 = self.weekly_plan(today).iter().map(|d| d.minutes).sum();
        ((minutes / self.weekly_goal as f64) * 100.0).clamp(0.0, 100.0) as u16
    }
}

/// `{success, progress, error}` wrapper around the snapshot
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgressEnvelope {
    pub success: Option<bool>,
    pub progress: Option<ProgressSnapshot>,
    pub error: Option<String>,
}

impl ProgressEnvelope {
    pub fn into_snapshot(self) -> Result<ProgressSnapshot, ProgressError> {
        match (self.success, self.progress) {
            (Some(false), _) | (_, None) => Err(ProgressError::Rejected(
                self.error
                    .unwrap_or_else(|| "response carried no progress".to_string()),
            )),
            (_, Some(progress)) => Ok(progress),
        }
    }
}
