//! Remote progress tracking: the wire types, the HTTP transport, the
//! service composing the three progress operations, and the worker thread
//! that runs them off the UI thread.

pub mod api;
pub mod http;
pub mod memory;
pub mod snapshot;
pub mod worker;

pub use api::{
    AnalysisOutcome, AnalysisRequest, AnalysisResponse, AnalysisScores, ExerciseData,
    ExerciseStatus, ProgressApi, ProgressService, ProgressUpdate,
};
pub use http::HttpProgressApi;
pub use memory::MemoryProgressApi;
pub use snapshot::{DailyProgress, HistoryEntry, PlanDay, ProgressSnapshot};
pub use worker::{ProgressClient, ProgressCommand, ProgressEvent};

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("progress worker is not running")]
    WorkerGone,
}
