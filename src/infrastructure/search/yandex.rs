// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::YandexSettings;
use crate::domain::models::serp::SerpSnapshot;
use crate::domain::search::provider::{PollOutcome, SearchError, SearchProvider};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Response body of the async submission endpoint
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

/// Status body of the operations endpoint
///
/// The provider omits `response` until the operation finishes,
/// so both fields tolerate absence.
#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(default)]
    done: bool,
    response: Option<OperationPayload>,
}

#[derive(Debug, Deserialize)]
struct OperationPayload {
    #[serde(rename = "rawData", default)]
    raw_data: String,
}

/// Map a region code to the provider's search type marker
///
/// Unknown regions fall back to the international index.
fn search_type_for_region(region: &str) -> &'static str {
    match region.to_uppercase().as_str() {
        "RU" => "SEARCH_TYPE_RU",
        "TR" => "SEARCH_TYPE_TR",
        _ => "SEARCH_TYPE_COM",
    }
}

/// Decode a completed operation payload: base64, then JSON
///
/// Any failure here is permanent for the operation. The payload is
/// what the provider produced, retrying the same handle returns the
/// same bytes.
pub(crate) fn decode_raw_payload(raw: &str) -> Result<SerpSnapshot, SearchError> {
    let bytes = STANDARD
        .decode(raw)
        .map_err(|e| SearchError::Decode(format!("invalid base64 payload: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| SearchError::Decode(format!("invalid JSON payload: {}", e)))
}

/// Yandex Search API client implementing the submit/poll contract
///
/// Talks to the cloud search service in two steps: a POST that
/// returns an operation handle, then GETs against the operations
/// endpoint until `done`. The client holds no retry or pacing
/// logic, single round trips only.
pub struct YandexProvider {
    client: reqwest::Client,
    settings: YandexSettings,
}

impl YandexProvider {
    /// Build a provider client from its settings
    ///
    /// Credentials and endpoints come in through the settings object;
    /// tests point `search_url`/`operations_url` at a local mock.
    pub fn new(settings: YandexSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, settings }
    }

    fn auth_header(&self) -> String {
        format!("Api-Key {}", self.settings.api_key)
    }
}

#[async_trait]
impl SearchProvider for YandexProvider {
    async fn submit(&self, query: &str, region: &str) -> Result<String, SearchError> {
        let payload = json!({
            "query": {
                "searchType": search_type_for_region(region),
                "queryText": query,
            },
            "folderId": self.settings.folder_id,
            "responseFormat": "FORMAT_JSON",
            "userAgent": self.settings.user_agent,
        });

        let response = self
            .client
            .post(&self.settings.search_url)
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SearchError::Submit(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Submit(format!("HTTP {}", status)));
        }

        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Submit(format!("malformed submit response: {}", e)))?;

        debug!(operation_id = %submit.id, "Yandex search submitted");
        Ok(submit.id)
    }

    async fn fetch(&self, operation_id: &str) -> Result<PollOutcome, SearchError> {
        let url = format!(
            "{}/{}",
            self.settings.operations_url.trim_end_matches('/'),
            operation_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| SearchError::Poll(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Poll(format!("HTTP {}", status)));
        }

        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Poll(format!("malformed operation response: {}", e)))?;

        if !operation.done {
            return Ok(PollOutcome::Pending);
        }

        let payload = operation.response.ok_or_else(|| {
            SearchError::Decode("operation done without response body".to_string())
        })?;

        let snapshot = decode_raw_payload(&payload.raw_data)?;
        Ok(PollOutcome::Complete(snapshot))
    }

    fn name(&self) -> &'static str {
        "yandex"
    }
}
