use std::sync::{Arc, Mutex, MutexGuard};

use super::api::{AnalysisRequest, AnalysisResponse, ProgressApi, ProgressUpdate};
use super::snapshot::ProgressSnapshot;
use super::ProgressError;

#[derive(Debug, Default)]
struct State {
    updates: Vec<ProgressUpdate>,
    fetches: Vec<String>,
    analysis_requests: Vec<AnalysisRequest>,
    snapshot: ProgressSnapshot,
    analysis: AnalysisResponse,
    fail_updates: bool,
    fail_fetch: bool,
    fail_analysis: bool,
}

/// In-memory backend for headless runs and tests.
/// Clones share state, so a copy kept by the caller observes every call.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressApi {
    state: Arc<Mutex<State>>,
}

impl MemoryProgressApi {
    pub fn with_snapshot(snapshot: ProgressSnapshot) -> Self {
        let api = Self::default();
        api.set_snapshot(snapshot);
        api
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_snapshot(&self, snapshot: ProgressSnapshot) {
        self.state().snapshot = snapshot;
    }

    pub fn set_analysis(&self, analysis: AnalysisResponse) {
        self.state().analysis = analysis;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.state().fail_updates = fail;
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.state().fail_fetch = fail;
    }

    pub fn fail_analysis(&self, fail: bool) {
        self.state().fail_analysis = fail;
    }

    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.state().updates.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.state().fetches.len()
    }

    pub fn analysis_requests(&self) -> Vec<AnalysisRequest> {
        self.state().analysis_requests.clone()
    }
}

fn server_error() -> ProgressError {
    ProgressError::Status {
        status: 500,
        body: "internal error".to_string(),
    }
}

impl ProgressApi for MemoryProgressApi {
    fn post_update(&self, update: &ProgressUpdate) -> Result<(), ProgressError> {
        let mut state = self.state();
        if state.fail_updates {
            return Err(server_error());
        }
        state.updates.push(update.clone());
        Ok(())
    }

    fn fetch_progress(&self, user_id: &str) -> Result<ProgressSnapshot, ProgressError> {
        let mut state = self.state();
        state.fetches.push(user_id.to_string());
        if state.fail_fetch {
            return Err(server_error());
        }
        Ok(state.snapshot.clone())
    }

    fn request_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResponse, ProgressError> {
        let mut state = self.state();
        state.analysis_requests.push(request.clone());
        if state.fail_analysis {
            return Err(server_error());
        }
        Ok(state.analysis.clone())
    }
}
