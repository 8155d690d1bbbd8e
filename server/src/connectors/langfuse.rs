//! Langfuse connector
//!
//! Fetches generation observations from Langfuse's public API and normalizes
//! them. Docs: https://langfuse.com/docs/api-reference

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::types::{NormalizedEvent, latency_between};
use super::{
    ConnectorConfig, ConnectorError, ConnectorMetadata, ConnectorResult, ConnectorSource,
};
use crate::connectors::calculate_summary;
use crate::core::constants::{DEFAULT_FETCH_LIMIT, ENV_LANGFUSE_SECRET_KEY, LANGFUSE_PAGE_SIZE};

// ============================================================================
// WIRE TYPES
// ============================================================================

/// One observation as returned by Langfuse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LangfuseObservation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// "GENERATION", "SPAN" or "EVENT" — only generations are inference calls
    #[serde(default, rename = "type")]
    pub observation_type: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Set when the first completion token arrived before the end; its
    /// presence is the streaming marker
    #[serde(default)]
    pub completion_start_time: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<LangfuseUsage>,
    /// "DEBUG", "DEFAULT", "WARNING" or "ERROR"
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub parent_observation_id: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LangfuseUsage {
    #[serde(default)]
    pub input: Option<u64>,
    #[serde(default)]
    pub output: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LangfuseResponse {
    #[serde(default)]
    data: Vec<JsonValue>,
    #[serde(default)]
    meta: Option<LangfuseMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LangfuseMeta {
    #[serde(default)]
    total_pages: u32,
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize one Langfuse observation. Returns None for non-generation types.
pub fn normalize_observation(obs: LangfuseObservation) -> Option<NormalizedEvent> {
    if obs.observation_type != "GENERATION" {
        return None;
    }

    let latency_ms = latency_between(&obs.start_time, obs.end_time.as_deref());

    let model = obs.model.clone().unwrap_or_else(|| "unknown".to_string());
    let streaming = obs.completion_start_time.is_some();
    let is_error = obs.level.as_deref() == Some("ERROR");

    let provider = normalize_provider(obs.model.as_deref(), obs.name.as_deref());
    let error = if is_error {
        obs.status_message.clone()
    } else {
        None
    };

    let usage = obs.usage.clone();
    let raw: Option<JsonValue> = serde_json::to_value(&obs).ok();

    Some(NormalizedEvent {
        id: obs.id,
        timestamp: obs.start_time,
        model,
        provider,
        latency_ms,
        prompt_tokens: usage.as_ref().and_then(|u| u.input),
        completion_tokens: usage.as_ref().and_then(|u| u.output),
        total_tokens: usage.as_ref().and_then(|u| u.total),
        cost_usd: usage.as_ref().and_then(|u| u.total_cost),
        success: !is_error,
        error,
        streaming: Some(streaming),
        trace_id: obs.trace_id,
        parent_span_id: obs.parent_observation_id,
        raw,
        ..Default::default()
    })
}

/// Derive the provider from model and observation name keywords.
/// First matching rule wins.
fn normalize_provider(model: Option<&str>, name: Option<&str>) -> String {
    let model = model.unwrap_or_default().to_lowercase();
    let name = name.unwrap_or_default().to_lowercase();

    let provider = if model.contains("gpt") || name.contains("openai") {
        "openai"
    } else if model.contains("claude") || name.contains("anthropic") {
        "anthropic"
    } else if model.contains("gemini") || model.contains("palm") || name.contains("google") {
        "google"
    } else if model.contains("azure") {
        "azure-openai"
    } else if model.contains("bedrock") {
        "aws-bedrock"
    } else if model.contains("together") {
        "together"
    } else if model.contains("fireworks") {
        "fireworks"
    } else if model.contains("groq") {
        "groq"
    } else if model.contains("mistral") {
        "mistral"
    } else if model.contains("llama") {
        "meta"
    } else if model.contains("cohere") || name.contains("cohere") {
        "cohere"
    } else {
        "unknown"
    };
    provider.to_string()
}

// ============================================================================
// FETCH
// ============================================================================

/// Build the Basic auth header from "publicKey:secretKey", falling back to
/// the LANGFUSE_SECRET_KEY env var when only the public key was provided.
fn auth_header(api_key: &str) -> Result<String, ConnectorError> {
    if api_key.contains(':') {
        return Ok(format!("Basic {}", BASE64.encode(api_key)));
    }
    match std::env::var(ENV_LANGFUSE_SECRET_KEY) {
        Ok(secret) if !secret.is_empty() => {
            Ok(format!("Basic {}", BASE64.encode(format!("{}:{}", api_key, secret))))
        }
        _ => Err(ConnectorError::Auth(
            "Langfuse requires both public and secret key. Provide as \
             \"publicKey:secretKey\" or set LANGFUSE_SECRET_KEY."
                .to_string(),
        )),
    }
}

/// Fetch generation observations from Langfuse, paginating up to `limit`
pub async fn fetch_generations(
    client: &reqwest::Client,
    base_url: &str,
    config: &ConnectorConfig,
) -> Result<ConnectorResult, ConnectorError> {
    let limit = config.limit.unwrap_or(DEFAULT_FETCH_LIMIT) as usize;
    let auth = auth_header(&config.api_key)?;

    let mut all_events: Vec<NormalizedEvent> = Vec::new();
    let mut page = 1u32;

    loop {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", LANGFUSE_PAGE_SIZE.min(limit as u32).to_string()),
            ("type", "GENERATION".to_string()),
            ("page", page.to_string()),
        ];
        if let Some(start) = &config.start_date {
            params.push(("fromTimestamp", start.clone()));
        }
        if let Some(end) = &config.end_date {
            params.push(("toTimestamp", end.clone()));
        }

        let response = client
            .get(format!("{}/api/public/observations", base_url))
            .header("Authorization", &auth)
            .query(&params)
            .send()
            .await
            .map_err(|e| ConnectorError::transport(ConnectorSource::Langfuse, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ConnectorError::api(
                ConnectorSource::Langfuse,
                status.as_u16(),
                text,
            ));
        }

        let data: LangfuseResponse = response
            .json()
            .await
            .map_err(|e| ConnectorError::transport(ConnectorSource::Langfuse, e))?;

        // one malformed record never fails the rest of the batch
        all_events.extend(data.data.into_iter().filter_map(|value| {
            match serde_json::from_value::<LangfuseObservation>(value) {
                Ok(obs) => normalize_observation(obs),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed Langfuse observation");
                    None
                }
            }
        }));

        let has_more = match data.meta {
            Some(meta) => page < meta.total_pages,
            None => false,
        };
        if !has_more || all_events.len() >= limit {
            break;
        }
        page += 1;
    }

    let truncated = all_events.len() > limit;
    all_events.truncate(limit);
    let summary = calculate_summary(&all_events);
    let metadata = ConnectorMetadata::now(ConnectorSource::Langfuse, all_events.len(), truncated);

    Ok(ConnectorResult {
        events: all_events,
        summary,
        metadata,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn generation() -> LangfuseObservation {
        LangfuseObservation {
            id: "obs-1".to_string(),
            name: Some("chat-completion".to_string()),
            observation_type: "GENERATION".to_string(),
            start_time: "2025-06-01T12:00:00Z".to_string(),
            end_time: Some("2025-06-01T12:00:01.500Z".to_string()),
            model: Some("claude-3-5-sonnet".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_filters_non_generations() {
        let mut span = generation();
        span.observation_type = "SPAN".to_string();
        assert!(normalize_observation(span).is_none());

        let mut event = generation();
        event.observation_type = "EVENT".to_string();
        assert!(normalize_observation(event).is_none());

        assert!(normalize_observation(generation()).is_some());
    }

    #[test]
    fn test_normalize_latency_and_model() {
        let event = normalize_observation(generation()).unwrap();
        assert_eq!(event.latency_ms, 1500.0);
        assert_eq!(event.model, "claude-3-5-sonnet");
        assert_eq!(event.provider, "anthropic");
    }

    #[test]
    fn test_normalize_streaming_marker() {
        let mut obs = generation();
        obs.completion_start_time = Some("2025-06-01T12:00:00.200Z".to_string());
        assert_eq!(normalize_observation(obs).unwrap().streaming, Some(true));
        assert_eq!(
            normalize_observation(generation()).unwrap().streaming,
            Some(false)
        );
    }

    #[test]
    fn test_normalize_error_level() {
        let mut obs = generation();
        obs.level = Some("ERROR".to_string());
        obs.status_message = Some("context length exceeded".to_string());
        let event = normalize_observation(obs).unwrap();
        assert!(!event.success);
        assert_eq!(event.error.as_deref(), Some("context length exceeded"));

        // WARNING is still a successful completion
        let mut warn = generation();
        warn.level = Some("WARNING".to_string());
        warn.status_message = Some("slow".to_string());
        let event = normalize_observation(warn).unwrap();
        assert!(event.success);
        assert!(event.error.is_none());
    }

    #[test]
    fn test_normalize_usage_and_cost() {
        let mut obs = generation();
        obs.usage = Some(LangfuseUsage {
            input: Some(1200),
            output: Some(340),
            total: Some(1540),
            total_cost: Some(0.0123),
        });
        let event = normalize_observation(obs).unwrap();
        assert_eq!(event.prompt_tokens, Some(1200));
        assert_eq!(event.completion_tokens, Some(340));
        assert_eq!(event.total_tokens, Some(1540));
        assert_eq!(event.cost_usd, Some(0.0123));
    }

    #[test]
    fn test_provider_cascade() {
        assert_eq!(normalize_provider(Some("gpt-4o"), None), "openai");
        assert_eq!(normalize_provider(Some("gemini-2.0-flash"), None), "google");
        assert_eq!(normalize_provider(Some("mistral-large"), None), "mistral");
        assert_eq!(normalize_provider(Some("llama-3.1-70b"), None), "meta");
        assert_eq!(normalize_provider(None, Some("openai-chat")), "openai");
        assert_eq!(normalize_provider(None, Some("cohere-rerank")), "cohere");
        assert_eq!(normalize_provider(Some("my-finetune"), None), "unknown");
    }

    #[test]
    fn test_minimal_record_still_normalizes() {
        let obs: LangfuseObservation =
            serde_json::from_value(serde_json::json!({ "type": "GENERATION" })).unwrap();
        let event = normalize_observation(obs).unwrap();
        assert_eq!(event.model, "unknown");
        assert_eq!(event.latency_ms, 0.0);
        assert!(event.success);
        assert_eq!(event.streaming, Some(false));
    }

    #[test]
    fn test_auth_header_from_composite_key() {
        let header = auth_header("pk-lf-1:sk-lf-2").unwrap();
        assert_eq!(header, format!("Basic {}", BASE64.encode("pk-lf-1:sk-lf-2")));
    }
}
