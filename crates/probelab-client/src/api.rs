//! HTTP client for the interpretability demo backend.
//!
//! Transport failures, non-success statuses, and undecodable bodies all
//! surface as `ProbelabError` — callers treat them uniformly and no endpoint
//! retries on its own.

use std::time::Duration;

use probelab_common::{ProbelabError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::schemas::{
    LoadedModels, LogitLensRequest, LogitLensResponse, RunWithSteeringRequest,
    RunWithSteeringResponse, SteeringVectorRequest, SteeringVectorResponse,
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct InterpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl InterpApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Generation on a cold model can take minutes; the timeout covers the
    /// whole request, so size it to the slowest endpoint you plan to call.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;
        decode_response(resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        decode_response(resp).await
    }

    /// Models currently resident on the backend, with last-load timestamps.
    #[instrument(skip(self))]
    pub async fn loaded_models(&self) -> Result<LoadedModels> {
        let loaded: LoadedModels = self.get_json("loaded_models").await?;
        debug!(count = loaded.len(), "fetched loaded models");
        Ok(loaded)
    }

    /// Model inventory for the logit-lens demo.
    #[instrument(skip(self))]
    pub async fn available_models(&self) -> Result<Vec<String>> {
        self.get_json("available_models").await
    }

    /// Model inventory for the steering demo (a separate, smaller list).
    #[instrument(skip(self))]
    pub async fn steering_available_models(&self) -> Result<Vec<String>> {
        self.get_json("steering/available_models").await
    }

    #[instrument(skip(self, req), fields(model = %req.model_name))]
    pub async fn logit_lens(&self, req: &LogitLensRequest) -> Result<LogitLensResponse> {
        self.post_json("logitlens", req).await
    }

    #[instrument(skip(self, req), fields(model = %req.model_name, pairs = req.user_prompts.len()))]
    pub async fn calculate_steering(
        &self,
        req: &SteeringVectorRequest,
    ) -> Result<SteeringVectorResponse> {
        self.post_json("steering/calculate", req).await
    }

    #[instrument(skip(self, req), fields(model = %req.model_name, layer = req.layer))]
    pub async fn run_with_steering(
        &self,
        req: &RunWithSteeringRequest,
    ) -> Result<RunWithSteeringResponse> {
        self.post_json("steering/run_with_steering", req).await
    }
}

/// Turn a non-2xx response into `ProbelabError::Api`, keeping whatever error
/// text the backend provided (FastAPI puts it under `detail`).
async fn decode_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status().as_u16();
    if status >= 400 {
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v["detail"]
                    .as_str()
                    .or_else(|| v["message"].as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| {
                if text.is_empty() {
                    "unknown API error".to_string()
                } else {
                    text
                }
            });
        return Err(ProbelabError::Api { status, message });
    }
    Ok(resp.json::<T>().await?)
}
