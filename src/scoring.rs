use crate::catalog::{Difficulty, Exercise};

/// Points credited for a status update that has not been analyzed yet
pub const BASE_POINTS: u32 = 10;

/// Weight of step completion in the session score
const PROGRESS_WEIGHT: f64 = 0.4;
/// Weight of time practiced (capped at the target) in the session score
const TIME_WEIGHT: f64 = 0.6;

pub fn performance_multiplier(overall_score: f64) -> f64 {
    if overall_score >= 90.0 {
        1.5
    } else if overall_score >= 80.0 {
        1.2
    } else if overall_score >= 70.0 {
        1.0
    } else {
        0.8
    }
}

/// Points awarded for an analyzed exercise
pub fn calculate_exercise_points(baseline: u32, difficulty: Difficulty, overall_score: f64) -> u32 {
    let points =
        f64::from(baseline) * difficulty.multiplier() * performance_multiplier(overall_score);
    points.round() as u32
}

/// Session score in `[0, 100]`: 40% step progress, 60% time practiced up to the target
pub fn session_score(progress_percent: f64, elapsed_secs: u64, target_secs: u64) -> f64 {
    let time_credit = if target_secs == 0 {
        1.0
    } else {
        elapsed_secs.min(target_secs) as f64 / target_secs as f64
    };

    (progress_percent * PROGRESS_WEIGHT + time_credit * 100.0 * TIME_WEIGHT).clamp(0.0, 100.0)
}

pub fn exercise_session_score(exercise: &Exercise, progress_percent: f64, elapsed_secs: u64) -> f64 {
    session_score(progress_percent, elapsed_secs, exercise.target_secs())
}

/// Whole minutes spent, rounded up
pub fn duration_minutes(elapsed_secs: u64) -> u64 {
    elapsed_secs.div_ceil(60)
}

/// Points reported with the runner's own completion update
pub fn completion_points(score: f64) -> u32 {
    (score / 10.0).round() as u32
}
