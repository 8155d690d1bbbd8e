//! Runtime data connectors
//!
//! Each connector fetches request logs from one LLM-observability platform
//! and normalizes them into the shared event schema defined in [`types`].

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod helicone;
pub mod langfuse;
pub mod langsmith;
pub mod types;

pub use types::{ConnectorSummary, NormalizedEvent, calculate_percentile, calculate_summary};

// ============================================================================
// SOURCES
// ============================================================================

/// Supported observability platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorSource {
    Helicone,
    Langsmith,
    Langfuse,
}

impl fmt::Display for ConnectorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorSource::Helicone => write!(f, "helicone"),
            ConnectorSource::Langsmith => write!(f, "langsmith"),
            ConnectorSource::Langfuse => write!(f, "langfuse"),
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("{source_name} API error: {status} {message}")]
    Api {
        source_name: ConnectorSource,
        status: u16,
        message: String,
    },
    #[error("Failed to fetch from {source_name}: {cause}")]
    Transport {
        source_name: ConnectorSource,
        #[source]
        cause: reqwest::Error,
    },
    #[error("{0}")]
    Auth(String),
}

impl ConnectorError {
    pub fn api(source_name: ConnectorSource, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            source_name,
            status,
            message: message.into(),
        }
    }

    pub fn transport(source_name: ConnectorSource, cause: reqwest::Error) -> Self {
        Self::Transport { source_name, cause }
    }
}

// ============================================================================
// FETCH CONFIGURATION
// ============================================================================

/// Parameters for a connector fetch
#[derive(Debug, Clone, Default)]
pub struct ConnectorConfig {
    /// Platform API key. Langfuse expects "publicKey:secretKey".
    pub api_key: String,
    /// Maximum events to return (default applied by each fetcher)
    pub limit: Option<u32>,
    /// ISO 8601 window start
    pub start_date: Option<String>,
    /// ISO 8601 window end
    pub end_date: Option<String>,
    pub filter: EventFilter,
}

/// Optional server-side filters, applied where the platform supports them
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub model: Option<String>,
    pub success: Option<bool>,
}

// ============================================================================
// FETCH RESULT
// ============================================================================

/// Events plus derived summary returned by every fetcher
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorResult {
    pub events: Vec<NormalizedEvent>,
    pub summary: ConnectorSummary,
    pub metadata: ConnectorMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectorMetadata {
    pub source: ConnectorSource,
    pub fetched_at: String,
    pub total_fetched: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl ConnectorMetadata {
    pub(crate) fn now(source: ConnectorSource, total_fetched: usize, truncated: bool) -> Self {
        Self {
            source,
            fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total_fetched,
            truncated,
            api_version: Some("v1".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display() {
        assert_eq!(ConnectorSource::Helicone.to_string(), "helicone");
        assert_eq!(ConnectorSource::Langsmith.to_string(), "langsmith");
        assert_eq!(ConnectorSource::Langfuse.to_string(), "langfuse");
    }

    #[test]
    fn test_source_serializes_lowercase() {
        let json = serde_json::to_string(&ConnectorSource::Langfuse).unwrap();
        assert_eq!(json, "\"langfuse\"");
    }

    #[test]
    fn test_api_error_message() {
        let err = ConnectorError::api(ConnectorSource::Helicone, 429, "too many requests");
        assert_eq!(err.to_string(), "helicone API error: 429 too many requests");
    }
}
