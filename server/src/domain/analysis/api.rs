//! Remote analysis engine invocation
//!
//! POSTs collected code files to the engine API. Two auth modes: an engine
//! token (Bearer) or a caller-supplied Anthropic key (BYOK header).

use std::time::Duration;

use serde_json::json;

use super::AnalysisError;
use super::types::{AnalysisFile, AnalysisOptions, AnalysisResult};
use crate::core::constants::ANALYSIS_TIMEOUT_SECS;

/// Authentication for the remote engine
#[derive(Debug, Clone)]
pub enum EngineAuth {
    /// Engine API token (costs credits)
    Token(String),
    /// Bring-your-own Anthropic key (free mode)
    AnthropicKey(String),
}

impl EngineAuth {
    /// Pick the auth mode from optionally-configured credentials; the engine
    /// token wins when both are set.
    pub fn resolve(
        token: Option<String>,
        anthropic_key: Option<String>,
    ) -> Result<Self, AnalysisError> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            return Ok(Self::Token(token));
        }
        if let Some(key) = anthropic_key.filter(|k| !k.is_empty()) {
            return Ok(Self::AnthropicKey(key));
        }
        Err(AnalysisError::NoAuth)
    }
}

#[derive(Debug, serde::Deserialize, Default)]
struct EngineErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Analyze pre-collected files via the remote engine API
pub async fn analyze_via_api(
    client: &reqwest::Client,
    api_url: &str,
    files: &[AnalysisFile],
    auth: &EngineAuth,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, AnalysisError> {
    let body = json!({
        "files": files,
        "options": {
            "fixes": options.fixes,
            "benchmark": options.benchmark,
            "output_format": "json",
        },
    });

    let mut request = client
        .post(api_url)
        .timeout(Duration::from_secs(ANALYSIS_TIMEOUT_SECS))
        .json(&body);
    request = match auth {
        EngineAuth::Token(token) => request.bearer_auth(token),
        EngineAuth::AnthropicKey(key) => request.header("X-Anthropic-Api-Key", key),
    };

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            AnalysisError::Timeout(ANALYSIS_TIMEOUT_SECS)
        } else {
            AnalysisError::Network(e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body: EngineErrorBody = response.json().await.unwrap_or_default();
        let code = body
            .code
            .unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));

        if status.as_u16() == 401 {
            return Err(AnalysisError::engine(
                "INVALID_TOKEN",
                Some(401),
                "Invalid engine token. Check INFERSCOPE_ENGINE_TOKEN.",
            ));
        }
        if status.as_u16() == 402 || code == "CREDIT_EXHAUSTED" {
            return Err(AnalysisError::engine(
                "CREDIT_EXHAUSTED",
                Some(402),
                "Analysis credits exhausted. Add credits or use BYOK mode with ANTHROPIC_API_KEY.",
            ));
        }
        if status.as_u16() == 429 || code == "RATE_LIMITED" {
            return Err(AnalysisError::engine(
                "RATE_LIMITED",
                Some(429),
                "Rate limited. Wait a moment and try again.",
            ));
        }

        let message = body
            .error
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        return Err(AnalysisError::engine(code, Some(status.as_u16()), message));
    }

    response
        .json::<AnalysisResult>()
        .await
        .map_err(|e| AnalysisError::InvalidOutput(e.to_string()))
}
