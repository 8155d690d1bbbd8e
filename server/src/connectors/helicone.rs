//! Helicone connector
//!
//! Fetches LLM request logs from Helicone's request-query API and normalizes
//! them. Docs: https://docs.helicone.ai/rest/request/post-v1requestquery

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use super::types::NormalizedEvent;
use super::{
    ConnectorConfig, ConnectorError, ConnectorMetadata, ConnectorResult, ConnectorSource,
};
use crate::connectors::calculate_summary;
use crate::core::constants::DEFAULT_FETCH_LIMIT;

// ============================================================================
// WIRE TYPES
// ============================================================================

/// One request log entry as returned by Helicone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliconeRequest {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub request_path: Option<String>,
    #[serde(default)]
    pub response_status: u16,
    #[serde(default)]
    pub latency_ms: f64,
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub cost_usd: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub request_body: Option<HeliconeRequestBody>,
    #[serde(default)]
    pub response_body: Option<HeliconeResponseBody>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliconeRequestBody {
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliconeResponseBody {
    #[serde(default)]
    pub error: Option<HeliconeErrorBody>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliconeErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HeliconeResponse {
    #[serde(default)]
    data: Vec<JsonValue>,
    #[serde(default)]
    error: Option<String>,
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize one Helicone request log entry.
///
/// Helicone only logs LLM requests, so every record maps to an event.
pub fn normalize_event(req: HeliconeRequest) -> Option<NormalizedEvent> {
    let success = (200..400).contains(&req.response_status);
    let streaming = req
        .request_body
        .as_ref()
        .and_then(|b| b.stream)
        .unwrap_or(false);

    let model = if !req.model.is_empty() {
        req.model.clone()
    } else {
        req.request_body
            .as_ref()
            .and_then(|b| b.model.clone())
            .unwrap_or_else(|| "unknown".to_string())
    };

    let error = if success {
        None
    } else {
        req.response_body
            .as_ref()
            .and_then(|b| b.error.as_ref())
            .and_then(|e| e.message.clone())
    };

    let raw: Option<JsonValue> = serde_json::to_value(&req).ok();

    Some(NormalizedEvent {
        id: req.request_id,
        timestamp: req.created_at,
        model,
        provider: normalize_provider(&req.provider),
        latency_ms: req.latency_ms.max(0.0),
        prompt_tokens: req.prompt_tokens,
        completion_tokens: req.completion_tokens,
        total_tokens: req.total_tokens,
        cost_usd: req.cost_usd,
        success,
        error,
        streaming: Some(streaming),
        request_path: req.request_path,
        user_id: req.user_id,
        raw,
        ..Default::default()
    })
}

/// Map Helicone's provider field to the shared provider vocabulary.
/// Unrecognized values pass through lowercased.
fn normalize_provider(provider: &str) -> String {
    match provider.to_lowercase().as_str() {
        "openai" => "openai",
        "openai-azure" | "azure" => "azure-openai",
        "anthropic" => "anthropic",
        "google" => "google",
        "vertex" => "google-vertex",
        "aws" | "bedrock" => "aws-bedrock",
        "together" => "together",
        "fireworks" => "fireworks",
        "groq" => "groq",
        "deepseek" => "deepseek",
        other => return other.to_string(),
    }
    .to_string()
}

// ============================================================================
// FETCH
// ============================================================================

/// Fetch request logs from Helicone and normalize them
pub async fn fetch_events(
    client: &reqwest::Client,
    base_url: &str,
    config: &ConnectorConfig,
) -> Result<ConnectorResult, ConnectorError> {
    let limit = config.limit.unwrap_or(DEFAULT_FETCH_LIMIT);

    let mut filter = serde_json::Map::new();
    if let Some(start) = &config.start_date {
        filter.insert("created_at".to_string(), json!({ "gte": start }));
    }
    if let Some(model) = &config.filter.model {
        filter.insert("model".to_string(), json!({ "equals": model }));
    }
    if let Some(success) = config.filter.success {
        let range = if success {
            json!({ "gte": 200, "lt": 400 })
        } else {
            json!({ "gte": 400 })
        };
        filter.insert("response_status".to_string(), range);
    }

    let mut body = serde_json::Map::new();
    if !filter.is_empty() {
        body.insert("filter".to_string(), JsonValue::Object(filter));
    }
    body.insert("limit".to_string(), json!(limit));
    body.insert("sort".to_string(), json!({ "created_at": "desc" }));

    let response = client
        .post(format!("{}/v1/request/query", base_url))
        .bearer_auth(&config.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| ConnectorError::transport(ConnectorSource::Helicone, e))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ConnectorError::api(
            ConnectorSource::Helicone,
            status.as_u16(),
            text,
        ));
    }

    let data: HeliconeResponse = response
        .json()
        .await
        .map_err(|e| ConnectorError::transport(ConnectorSource::Helicone, e))?;

    if let Some(error) = data.error {
        return Err(ConnectorError::api(ConnectorSource::Helicone, 200, error));
    }

    // one malformed record never fails the rest of the batch
    let events: Vec<NormalizedEvent> = data
        .data
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<HeliconeRequest>(value) {
            Ok(req) => normalize_event(req),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed Helicone record");
                None
            }
        })
        .collect();
    let summary = calculate_summary(&events);
    let truncated = events.len() >= limit as usize;
    let metadata = ConnectorMetadata::now(ConnectorSource::Helicone, events.len(), truncated);

    Ok(ConnectorResult {
        events,
        summary,
        metadata,
    })
}

// ============================================================================
// TESTS
// ============================================================================
