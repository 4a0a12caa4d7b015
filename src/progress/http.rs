use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::api::{AnalysisRequest, AnalysisResponse, ProgressApi, ProgressUpdate};
use super::snapshot::{ProgressEnvelope, ProgressSnapshot};
use super::ProgressError;
use crate::identity::Identity;

const UPDATE_PATH: &str = "/api/progress/update";
const PROGRESS_PATH: &str = "/api/progress";
const ANALYSIS_PATH: &str = "/api/speech-analysis/exercise";

/// Blocking HTTP transport for the progress backend.
///
/// Must not be constructed or used on an async runtime thread.
pub struct HttpProgressApi {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpProgressApi {
    pub fn new(
        base_url: &str,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<Self, ProgressError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: identity.bearer_token().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProgressError> {
        let response = request.bearer_auth(&self.token).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ProgressError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl ProgressApi for HttpProgressApi {
    fn post_update(&self, update: &ProgressUpdate) -> Result<(), ProgressError> {
        tracing::debug!(
            exercise_id = update.exercise_data.exercise_id,
            status = %update.exercise_data.status,
            "posting progress update"
        );
        let _: serde_json::Value = self.send(self.client.post(self.url(UPDATE_PATH)).json(update))?;
        Ok(())
    }

    fn fetch_progress(&self, user_id: &str) -> Result<ProgressSnapshot, ProgressError> {
        let url = self.url(&format!("{PROGRESS_PATH}/{user_id}"));
        let envelope: ProgressEnvelope = self.send(self.client.get(url))?;
        envelope.into_snapshot()
    }

    fn request_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResponse, ProgressError> {
        tracing::debug!(exercise_id = request.exercise_id, "requesting speech analysis");
        self.send(self.client.post(self.url(ANALYSIS_PATH)).json(request))
    }
}
