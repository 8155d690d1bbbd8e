//! Normalized event model and summary statistics
//!
//! Every connector maps its platform-specific records onto [`NormalizedEvent`];
//! [`calculate_summary`] then derives one [`ConnectorSummary`] from a batch of
//! events regardless of where they came from. The summary is recomputed in
//! full on every call and is invariant to event ordering.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ============================================================================
// NORMALIZED EVENT
// ============================================================================

/// One LLM inference call, normalized across sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedEvent {
    // Identity
    pub id: String,
    /// ISO 8601 timestamp as reported by the source
    pub timestamp: String,

    // Classification
    pub model: String,
    /// Normalized provider name (openai, anthropic, aws-bedrock, ...) or "unknown"
    pub provider: String,

    // Performance. Always >= 0; 0 when the source reported no end time.
    pub latency_ms: f64,

    // Usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,

    // Outcome. `error` is only set when `success` is false.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,

    // Trace metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    // Request metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Original source record, for debugging only. Never consulted by
    /// aggregation logic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<JsonValue>,
}

// ============================================================================
// CONNECTOR SUMMARY
// ============================================================================

/// Aggregate statistics over a batch of normalized events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorSummary {
    pub total_requests: usize,
    pub total_cost_usd: f64,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    /// Fraction of events with success == false, in [0, 1]
    pub error_rate: f64,
    /// Fraction of events with streaming evidence, in [0, 1]
    pub streaming_rate: f64,
    pub by_model: BTreeMap<String, ModelStats>,
    pub by_provider: BTreeMap<String, ProviderStats>,
    pub time_range: TimeRange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub count: usize,
    pub cost: f64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub count: usize,
    pub cost: f64,
}

/// Min/max parseable event timestamps. Empty strings when no event carries a
/// parseable timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

// ============================================================================
// TIMESTAMP PARSING
// ============================================================================

/// Parse a source timestamp leniently.
///
/// RFC 3339 first; falls back to a zone-less ISO form interpreted as UTC
/// (LangSmith omits the offset on run times). Returns None rather than
/// erroring so a single bad record never fails a batch.
pub(crate) fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Milliseconds between two source timestamps, clamped to >= 0.
///
/// A missing or unparseable end time degrades to latency 0 (start == end
/// fallback); an end before start clamps to 0 rather than going negative.
pub(crate) fn latency_between(start: &str, end: Option<&str>) -> f64 {
    let Some(start_dt) = parse_timestamp(start) else {
        return 0.0;
    };
    let end_dt = end.and_then(parse_timestamp).unwrap_or(start_dt);
    (end_dt - start_dt).num_milliseconds().max(0) as f64
}

// ============================================================================
// SUMMARY CALCULATION
// ============================================================================

/// Percentile of `values` using the ceil-index rule:
/// `sorted[ceil(p/100 * n) - 1]`, clamped to index 0. Not interpolated.
pub fn calculate_percentile(values: &[f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let index = ((percentile / 100.0 * sorted.len() as f64).ceil() as usize).saturating_sub(1);
    sorted[index.min(sorted.len() - 1)]
}

/// Compute a full [`ConnectorSummary`] from a batch of events.
///
/// Pure and order-independent. Latencies of 0 are treated as missing and
/// excluded from averages and percentiles, but the events still count toward
/// totals and rates. Empty input yields the all-zero summary.
pub fn calculate_summary(events: &[NormalizedEvent]) -> ConnectorSummary {
    if events.is_empty() {
        return ConnectorSummary::default();
    }

    let latencies: Vec<f64> = events
        .iter()
        .map(|e| e.latency_ms)
        .filter(|&l| l > 0.0)
        .collect();
    let total_cost: f64 = events.iter().filter_map(|e| e.cost_usd).sum();
    let errors = events.iter().filter(|e| !e.success).count();
    let streaming = events.iter().filter(|e| e.streaming == Some(true)).count();

    let mut by_model: BTreeMap<String, ModelStats> = BTreeMap::new();
    for event in events {
        let stats = by_model.entry(model_key(event).to_string()).or_default();
        stats.count += 1;
        stats.cost += event.cost_usd.unwrap_or(0.0);
    }

    for (model, stats) in by_model.iter_mut() {
        let model_events: Vec<&NormalizedEvent> = events
            .iter()
            .filter(|e| model_key(e) == model.as_str())
            .collect();
        let model_latencies: Vec<f64> = model_events
            .iter()
            .map(|e| e.latency_ms)
            .filter(|&l| l > 0.0)
            .collect();
        let model_errors = model_events.iter().filter(|e| !e.success).count();

        stats.avg_latency_ms = average(&model_latencies);
        stats.p95_latency_ms = calculate_percentile(&model_latencies, 95.0);
        stats.error_rate = model_errors as f64 / model_events.len() as f64;
    }

    let mut by_provider: BTreeMap<String, ProviderStats> = BTreeMap::new();
    for event in events {
        let key = if event.provider.is_empty() {
            "unknown"
        } else {
            event.provider.as_str()
        };
        let stats = by_provider.entry(key.to_string()).or_default();
        stats.count += 1;
        stats.cost += event.cost_usd.unwrap_or(0.0);
    }

    let timestamps: Vec<DateTime<Utc>> = events
        .iter()
        .filter_map(|e| parse_timestamp(&e.timestamp))
        .collect();
    let time_range = match (timestamps.iter().min(), timestamps.iter().max()) {
        (Some(start), Some(end)) => TimeRange {
            start: start.to_rfc3339_opts(SecondsFormat::Millis, true),
            end: end.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        _ => TimeRange::default(),
    };

    ConnectorSummary {
        total_requests: events.len(),
        total_cost_usd: total_cost,
        avg_latency_ms: average(&latencies),
        p50_latency_ms: calculate_percentile(&latencies, 50.0),
        p95_latency_ms: calculate_percentile(&latencies, 95.0),
        p99_latency_ms: calculate_percentile(&latencies, 99.0),
        error_rate: errors as f64 / events.len() as f64,
        streaming_rate: streaming as f64 / events.len() as f64,
        by_model,
        by_provider,
        time_range,
    }
}

fn model_key(event: &NormalizedEvent) -> &str {
    if event.model.is_empty() {
        "unknown"
    } else {
        event.model.as_str()
    }
}

/// Rounded mean of `values`, 0 for empty input
fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().sum::<f64>() / values.len() as f64).round()
}

// ============================================================================
// TESTS
// ============================================================================
