use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::ProgressSnapshot;
use super::ProgressError;
use crate::catalog::{Difficulty, Exercise, ExerciseType};
use crate::scoring::{calculate_exercise_points, BASE_POINTS};
use crate::util::mean;

const UPDATE_KIND: &str = "exercise";
const ANALYSIS_TYPE: &str = "exercise_completion";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExerciseStatus {
    Locked,
    InProgress,
    Completed,
}

/// Body of `POST /api/progress/update`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub user_id: String,
    pub exercise_data: ExerciseData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseData {
    pub exercise_id: u32,
    pub status: ExerciseStatus,
    pub completed_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<ExerciseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_results: Option<AnalysisScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_metrics: Option<serde_json::Value>,
}

impl ExerciseData {
    /// Plain status transition carrying the base points
    pub fn status_update(exercise_id: u32, status: ExerciseStatus) -> Self {
        Self {
            exercise_id,
            status,
            completed_at: Utc::now(),
            kind: UPDATE_KIND.to_string(),
            points: BASE_POINTS,
            duration: None,
            score: None,
            exercise_type: None,
            difficulty: None,
            time_spent: None,
            progress: None,
            analysis_results: None,
            speech_metrics: None,
        }
    }

    /// Completion written once the analyzer has scored the exercise
    pub fn analyzed(
        exercise: &Exercise,
        scores: AnalysisScores,
        points: u32,
        speech_metrics: Option<serde_json::Value>,
    ) -> Self {
        Self {
            points,
            exercise_type: Some(exercise.exercise_type),
            difficulty: Some(exercise.difficulty),
            analysis_results: Some(scores),
            speech_metrics,
            ..Self::status_update(exercise.id, ExerciseStatus::Completed)
        }
    }
}

/// Body of `POST /api/speech-analysis/exercise`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub user_id: String,
    pub exercise_id: u32,
    pub exercise_type: ExerciseType,
    pub difficulty: Difficulty,
    pub duration: u32,
    pub completed_at: DateTime<Utc>,
    pub analysis_type: String,
}

impl AnalysisRequest {
    pub fn for_exercise(user_id: &str, exercise: &Exercise) -> Self {
        Self {
            user_id: user_id.to_string(),
            exercise_id: exercise.id,
            exercise_type: exercise.exercise_type,
            difficulty: exercise.difficulty,
            duration: exercise.duration,
            completed_at: Utc::now(),
            analysis_type: ANALYSIS_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResponse {
    pub success: Option<bool>,
    pub error: Option<String>,
    pub pronunciation_score: Option<f64>,
    pub fluency_score: Option<f64>,
    pub clarity_score: Option<f64>,
    pub overall_score: Option<f64>,
    /// Raw measurements from the analyzer, forwarded untouched
    pub analysis: Option<serde_json::Value>,
    pub suggested_improvements: Vec<String>,
}

impl AnalysisResponse {
    pub fn scores(&self) -> AnalysisScores {
        let clarity = self.clarity_score.or_else(|| {
            self.analysis
                .as_ref()
                .and_then(|a| a.get("clarity"))
                .and_then(|c| c.as_f64())
        });

        let available: Vec<f64> = [self.pronunciation_score, self.fluency_score, clarity]
            .into_iter()
            .flatten()
            .collect();

        AnalysisScores {
            pronunciation: self.pronunciation_score.unwrap_or_default(),
            fluency: self.fluency_score.unwrap_or_default(),
            clarity: clarity.unwrap_or_default(),
            overall: self
                .overall_score
                .or_else(|| mean(&available))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScores {
    pub pronunciation: f64,
    pub fluency: f64,
    pub clarity: f64,
    pub overall: f64,
}

/// What the dashboard learns from a finished analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub exercise_id: u32,
    pub scores: AnalysisScores,
    pub points: u32,
    pub suggestions: Vec<String>,
    /// whether the follow-up progress update carrying the points was accepted
    pub recorded: bool,
}

/// Transport for the progress backend
pub trait ProgressApi: Send {
    fn post_update(&self, update: &ProgressUpdate) -> Result<(), ProgressError>;
    fn fetch_progress(&self, user_id: &str) -> Result<ProgressSnapshot, ProgressError>;
    fn request_analysis(&self, request: &AnalysisRequest)
        -> Result<AnalysisResponse, ProgressError>;
}

impl<A: ProgressApi + ?Sized> ProgressApi for Box<A> {
    fn post_update(&self, update: &ProgressUpdate) -> Result<(), ProgressError> {
        (**self).post_update(update)
    }

    fn fetch_progress(&self, user_id: &str) -> Result<ProgressSnapshot, ProgressError> {
        (**self).fetch_progress(user_id)
    }

    fn request_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResponse, ProgressError> {
        (**self).request_analysis(request)
    }
}

/// The progress operations for one user, on top of a transport
pub struct ProgressService<A: ProgressApi> {
    api: A,
    user_id: String,
}

impl<A: ProgressApi> ProgressService<A> {
    pub fn new(api: A, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn update_exercise_progress(
        &self,
        exercise_id: u32,
        status: ExerciseStatus,
    ) -> Result<(), ProgressError> {
        self.post(ExerciseData::status_update(exercise_id, status))
    }

    pub fn record_completion(&self, data: ExerciseData) -> Result<(), ProgressError> {
        self.post(data)
    }

    pub fn fetch_progress(&self) -> Result<ProgressSnapshot, ProgressError> {
        self.api.fetch_progress(&self.user_id)
    }

    /// Ask the analyzer to score the exercise, then credit the computed points
    pub fn submit_for_analysis(&self, exercise: &Exercise) -> Result<AnalysisOutcome, ProgressError> {
        let request = AnalysisRequest::for_exercise(&self.user_id, exercise);
        let response = self.api.request_analysis(&request)?;
        if response.success == Some(false) {
            return Err(ProgressError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "analysis unsuccessful".to_string()),
            ));
        }

        let scores = response.scores();
        let points = calculate_exercise_points(BASE_POINTS, exercise.difficulty, scores.overall);
        let data = ExerciseData::analyzed(exercise, scores, points, response.analysis.clone());

        let recorded = match self.post(data) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(exercise_id = exercise.id, "failed to record analyzed points: {e}");
                false
            }
        };

        Ok(AnalysisOutcome {
            exercise_id: exercise.id,
            scores,
            points,
            suggestions: response.suggested_improvements,
            recorded,
        })
    }

    fn post(&self, exercise_data: ExerciseData) -> Result<(), ProgressError> {
        self.api.post_update(&ProgressUpdate {
            user_id: self.user_id.clone(),
            exercise_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::memory::MemoryProgressApi;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn exercise(difficulty: Difficulty) -> Exercise {
        Exercise {
            id: 7,
            title: "R and L Contrast".to_string(),
            description: String::new(),
            difficulty,
            exercise_type: ExerciseType::Pronunciation,
            duration: 10,
        }
    }

    #[test]
    fn test_status_update_serializes_wire_names() {
        let data = ExerciseData::status_update(3, ExerciseStatus::InProgress);
        let value = serde_json::to_value(ProgressUpdate {
            user_id: "u1".to_string(),
            exercise_data: data,
        })
        .unwrap();

        assert_eq!(value["userId"], "u1");
        assert_eq!(value["exerciseData"]["exerciseId"], 3);
        assert_eq!(value["exerciseData"]["status"], "in-progress");
        assert_eq!(value["exerciseData"]["type"], "exercise");
        assert_eq!(value["exerciseData"]["points"], 10);
        assert!(value["exerciseData"]["completedAt"].is_string());
        assert!(value["exerciseData"].get("analysisResults").is_none());
        assert!(value["exerciseData"].get("score").is_none());
    }

    #[test]
    fn test_status_display_matches_wire() {
        assert_eq!(ExerciseStatus::InProgress.to_string(), "in-progress");
        assert_eq!(ExerciseStatus::Completed.to_string(), "completed");
        assert_eq!(ExerciseStatus::Locked.to_string(), "locked");
    }

    #[test]
    fn test_analysis_request_body() {
        let value =
            serde_json::to_value(AnalysisRequest::for_exercise("u1", &exercise(Difficulty::Advanced)))
                .unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["exerciseId"], 7);
        assert_eq!(value["exerciseType"], "Pronunciation");
        assert_eq!(value["difficulty"], "Advanced");
        assert_eq!(value["duration"], 10);
        assert_eq!(value["analysisType"], "exercise_completion");
    }

    #[test]
    fn test_scores_fall_back_to_mean_and_nested_clarity() {
        let response: AnalysisResponse = serde_json::from_value(json!({
            "success": true,
            "pronunciationScore": 80,
            "fluencyScore": 90,
            "analysis": { "clarity": 70, "speechRate": 2.1 }
        }))
        .unwrap();

        let scores = response.scores();
        assert_eq!(scores.clarity, 70.0);
        assert_eq!(scores.overall, 80.0);
    }

    #[test]
    fn test_scores_prefer_explicit_overall() {
        let response: AnalysisResponse = serde_json::from_value(json!({
            "pronunciationScore": 50,
            "fluencyScore": 50,
            "clarityScore": 50,
            "overallScore": 91
        }))
        .unwrap();
        assert_eq!(response.scores().overall, 91.0);
    }

    #[test]
    fn test_scores_with_nothing_available() {
        assert_eq!(AnalysisResponse::default().scores(), AnalysisScores::default());
    }

    #[test]
    fn test_update_exercise_progress_posts_base_points() {
        let api = MemoryProgressApi::default();
        let service = ProgressService::new(api.clone(), "teen");

        service
            .update_exercise_progress(4, ExerciseStatus::InProgress)
            .unwrap();

        let updates = api.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].user_id, "teen");
        assert_eq!(updates[0].exercise_data.exercise_id, 4);
        assert_eq!(updates[0].exercise_data.status, ExerciseStatus::InProgress);
        assert_eq!(updates[0].exercise_data.points, BASE_POINTS);
    }

    #[test]
    fn test_submit_for_analysis_credits_computed_points() {
        let api = MemoryProgressApi::default();
        api.set_analysis(AnalysisResponse {
            success: Some(true),
            pronunciation_score: Some(92.0),
            fluency_score: Some(88.0),
            clarity_score: Some(95.0),
            overall_score: Some(95.0),
            suggested_improvements: vec!["Slow down slightly".to_string()],
            ..AnalysisResponse::default()
        });
        let service = ProgressService::new(api.clone(), "teen");

        let outcome = service
            .submit_for_analysis(&exercise(Difficulty::Beginner))
            .unwrap();
        assert_eq!(outcome.points, 15);
        assert!(outcome.recorded);
        assert_eq!(outcome.suggestions, vec!["Slow down slightly".to_string()]);

        assert_eq!(api.analysis_requests().len(), 1);
        let updates = api.updates();
        assert_eq!(updates.len(), 1);
        let data = &updates[0].exercise_data;
        assert_eq!(data.status, ExerciseStatus::Completed);
        assert_eq!(data.points, 15);
        assert_eq!(data.analysis_results.unwrap().overall, 95.0);
    }

    #[test]
    fn test_failed_analysis_posts_nothing() {
        let api = MemoryProgressApi::default();
        api.fail_analysis(true);
        let service = ProgressService::new(api.clone(), "teen");

        let result = service.submit_for_analysis(&exercise(Difficulty::Beginner));
        assert_matches!(result, Err(ProgressError::Status { status: 500, .. }));
        assert!(api.updates().is_empty());
    }

    #[test]
    fn test_unsuccessful_analysis_is_rejected() {
        let api = MemoryProgressApi::default();
        api.set_analysis(AnalysisResponse {
            success: Some(false),
            error: Some("no audio".to_string()),
            ..AnalysisResponse::default()
        });
        let service = ProgressService::new(api.clone(), "teen");

        let result = service.submit_for_analysis(&exercise(Difficulty::Beginner));
        assert_matches!(result, Err(ProgressError::Rejected(msg)) if msg == "no audio");
    }

    #[test]
    fn test_analysis_outcome_survives_failed_points_update() {
        let api = MemoryProgressApi::default();
        api.set_analysis(AnalysisResponse {
            overall_score: Some(75.0),
            ..AnalysisResponse::default()
        });
        api.fail_updates(true);
        let service = ProgressService::new(api.clone(), "teen");

        let outcome = service
            .submit_for_analysis(&exercise(Difficulty::Intermediate))
            .unwrap();
        assert_eq!(outcome.points, 15);
        assert!(!outcome.recorded);
    }
}
