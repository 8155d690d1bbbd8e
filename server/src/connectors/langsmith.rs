//! LangSmith connector
//!
//! Fetches LLM runs from LangSmith's runs API and normalizes them.
//! Docs: https://docs.smith.langchain.com/reference/api

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::types::{NormalizedEvent, latency_between};
use super::{
    ConnectorConfig, ConnectorError, ConnectorMetadata, ConnectorResult, ConnectorSource,
};
use crate::connectors::calculate_summary;
use crate::core::constants::DEFAULT_FETCH_LIMIT;

// ============================================================================
// WIRE TYPES
// ============================================================================

/// One run as returned by LangSmith
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LangSmithRun {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// "llm", "chain", "tool", ... — only llm runs are inference calls
    #[serde(default)]
    pub run_type: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub parent_run_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub extra: Option<LangSmithExtra>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LangSmithExtra {
    #[serde(default)]
    pub invocation_params: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct LangSmithResponse {
    #[serde(default)]
    runs: Vec<JsonValue>,
    #[serde(default)]
    cursors: Option<LangSmithCursors>,
}

#[derive(Debug, Deserialize)]
struct LangSmithCursors {
    #[serde(default)]
    next: Option<String>,
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize one LangSmith run. Returns None for non-llm runs.
pub fn normalize_run(run: LangSmithRun) -> Option<NormalizedEvent> {
    if run.run_type != "llm" {
        return None;
    }

    let latency_ms = latency_between(&run.start_time, run.end_time.as_deref());

    let invocation_params = run.extra.as_ref().and_then(|e| e.invocation_params.as_ref());
    let model = invocation_params
        .and_then(|p| {
            p.get("model")
                .or_else(|| p.get("model_name"))
                .and_then(|v| v.as_str())
        })
        .unwrap_or("unknown")
        .to_string();
    let streaming = invocation_params
        .and_then(|p| p.get("stream"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let success = matches!(run.status.as_deref(), Some("success") | Some("completed"));
    let provider = normalize_provider(&run.name, invocation_params);

    let raw: Option<JsonValue> = serde_json::to_value(&run).ok();

    Some(NormalizedEvent {
        id: run.id,
        timestamp: run.start_time,
        model,
        provider,
        latency_ms,
        prompt_tokens: run.prompt_tokens,
        completion_tokens: run.completion_tokens,
        total_tokens: run.total_tokens,
        cost_usd: run.total_cost,
        success,
        error: run.error,
        streaming: Some(streaming),
        trace_id: run.trace_id,
        parent_span_id: run.parent_run_id,
        session_id: run.session_id,
        raw,
        ..Default::default()
    })
}

/// Derive the provider from the run name, falling back to the model in the
/// invocation params. First matching rule wins.
fn normalize_provider(run_name: &str, invocation_params: Option<&JsonValue>) -> String {
    let name = run_name.to_lowercase();

    if name.contains("openai") || name.contains("gpt") {
        return "openai".to_string();
    }
    if name.contains("anthropic") || name.contains("claude") {
        return "anthropic".to_string();
    }
    if name.contains("azure") {
        return "azure-openai".to_string();
    }
    if name.contains("bedrock") {
        return "aws-bedrock".to_string();
    }
    if name.contains("vertex") || name.contains("palm") || name.contains("gemini") {
        return "google".to_string();
    }
    if name.contains("together") {
        return "together".to_string();
    }
    if name.contains("fireworks") {
        return "fireworks".to_string();
    }
    if name.contains("groq") {
        return "groq".to_string();
    }

    let model = invocation_params.and_then(|p| {
        p.get("model_name")
            .or_else(|| p.get("model"))
            .and_then(|v| v.as_str())
    });
    if let Some(model) = model {
        if model.contains("gpt") {
            return "openai".to_string();
        }
        if model.contains("claude") {
            return "anthropic".to_string();
        }
        if model.contains("gemini") {
            return "google".to_string();
        }
    }

    "unknown".to_string()
}

// ============================================================================
// FETCH
// ============================================================================

/// Fetch llm runs from LangSmith and normalize them
pub async fn fetch_runs(
    client: &reqwest::Client,
    base_url: &str,
    config: &ConnectorConfig,
) -> Result<ConnectorResult, ConnectorError> {
    let limit = config.limit.unwrap_or(DEFAULT_FETCH_LIMIT);

    let mut params: Vec<(&str, String)> = vec![
        ("limit", limit.to_string()),
        ("run_type", "llm".to_string()),
        // include nested runs, not just trace roots
        ("is_root", "false".to_string()),
    ];
    if let Some(start) = &config.start_date {
        params.push(("start_time", start.clone()));
    }
    if let Some(end) = &config.end_date {
        params.push(("end_time", end.clone()));
    }
    if let Some(success) = config.filter.success {
        params.push(("error", (!success).to_string()));
    }

    let response = client
        .get(format!("{}/runs", base_url))
        .header("X-API-Key", &config.api_key)
        .query(&params)
        .send()
        .await
        .map_err(|e| ConnectorError::transport(ConnectorSource::Langsmith, e))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ConnectorError::api(
            ConnectorSource::Langsmith,
            status.as_u16(),
            text,
        ));
    }

    let data: LangSmithResponse = response
        .json()
        .await
        .map_err(|e| ConnectorError::transport(ConnectorSource::Langsmith, e))?;

    let truncated = data.cursors.as_ref().is_some_and(|c| c.next.is_some());
    // one malformed record never fails the rest of the batch
    let events: Vec<NormalizedEvent> = data
        .runs
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<LangSmithRun>(value) {
            Ok(run) => normalize_run(run),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed LangSmith run");
                None
            }
        })
        .collect();
    let summary = calculate_summary(&events);
    let metadata = ConnectorMetadata::now(ConnectorSource::Langsmith, events.len(), truncated);

    Ok(ConnectorResult {
        events,
        summary,
        metadata,
    })
}

// ============================================================================
// TESTS
// ============================================================================
