use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, SecondsFormat, Utc};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, ToolsCapability,
};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};

use crate::connectors::{ConnectorConfig, ConnectorResult, helicone, langfuse, langsmith};
use crate::core::config::AppConfig;
use crate::core::constants::{
    APP_DOT_FOLDER, DEFAULT_FETCH_DAYS, DEFAULT_FETCH_LIMIT, ENV_ANTHROPIC_API_KEY,
    ENV_ENGINE_TOKEN, ENV_HELICONE_API_KEY, ENV_LANGFUSE_PUBLIC_KEY, ENV_LANGSMITH_API_KEY,
    EVENT_PREVIEW_COUNT,
};
use crate::domain::analysis::api::{EngineAuth, analyze_via_api};
use crate::domain::analysis::cli::analyze_via_cli;
use crate::domain::analysis::types::{AnalysisFile, AnalysisOptions, callsite_count};
use crate::domain::analysis::read_code_files;
use crate::domain::benchmarks::{BenchmarkStore, UserMetrics, format_comparison};
use crate::domain::templates;

use super::types::*;

type McpError = rmcp::model::ErrorData;

#[derive(Clone)]
pub struct McpServer {
    benchmarks: Arc<BenchmarkStore>,
    config: Arc<AppConfig>,
    http: reqwest::Client,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(benchmarks: Arc<BenchmarkStore>, config: Arc<AppConfig>, http: reqwest::Client) -> Self {
        Self {
            benchmarks,
            config,
            http,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "InferScope".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

const INSTRUCTIONS: &str = r#"InferScope - LLM inference analysis and optimization.

WORKFLOW:
1. analyze to scan code for inference issues (latency, cost, reliability)
2. get_helicone_events / get_langsmith_traces / get_langfuse_generations to pull
   runtime data and compare against what the code intends
3. get_benchmark + compare_to_benchmark to measure against InferenceMAX baselines
4. list_templates / get_template for proven fixes to common issues
5. save_analysis to persist a run, compare_to_baseline to diff against it

KEY CONCEPTS:
- Normalized event: one LLM call with model, provider, latency, tokens, cost
- Summary: percentile latencies, error/streaming rates, per-model breakdowns
- Benchmark gap: signed difference vs baseline; positive always means worse

TIPS:
- Runtime summaries exclude zero-latency events from latency percentiles
- Benchmark lookup is fuzzy: "GPT_4o" and "gpt4o" both resolve to gpt-4o
- Pass framework/hardware (vllm, h100, ...) to compare self-hosted serving"#;

#[tool_router]
impl McpServer {
    #[tool(
        description = "Analyze code for LLM inference issues. Returns detailed report on latency, cost, throughput, and reliability with actionable fixes."
    )]
    async fn analyze(
        &self,
        Parameters(input): Parameters<AnalyzeInput>,
    ) -> Result<CallToolResult, McpError> {
        let options = AnalysisOptions {
            fixes: input.fixes.unwrap_or(true),
            benchmark: input.benchmark.unwrap_or(true),
        };

        let files: Vec<AnalysisFile> = match (&input.files, &input.path) {
            (Some(files), _) if !files.is_empty() => files
                .iter()
                .map(|f| AnalysisFile {
                    path: f.path.clone(),
                    content: f.content.clone(),
                })
                .collect(),
            (_, Some(path)) => read_code_files(Path::new(path)).map_err(|e| {
                McpError::invalid_params(
                    format!(
                        "{}. Check that the path exists and contains code files (.py, .ts, .js, ...).",
                        e
                    ),
                    None,
                )
            })?,
            _ => {
                return Err(McpError::invalid_params(
                    "Either path or files must be provided",
                    None,
                ));
            }
        };

        // Local engine first: free and fast
        if let Some(path) = &input.path {
            match analyze_via_cli(Path::new(path), &options).await {
                Ok(Some(result)) => return ok_json(&result),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "Local engine failed, falling back to API");
                }
            }
        }

        // Remote engine fallback, when credentials are configured
        let token = std::env::var(ENV_ENGINE_TOKEN).ok();
        let anthropic_key = std::env::var(ENV_ANTHROPIC_API_KEY).ok();
        match EngineAuth::resolve(token, anthropic_key) {
            Ok(auth) => {
                let result =
                    analyze_via_api(&self.http, &self.config.engine.api_url, &files, &auth, &options)
                        .await
                        .map_err(mcp_err)?;
                ok_json(&result)
            }
            Err(_) => ok_text(setup_instructions(files.len())),
        }
    }

    #[tool(
        description = "Fetch LLM runtime events from Helicone. Returns normalized events with a statistical summary (percentile latencies, cost, error rate, per-model breakdown)."
    )]
    async fn get_helicone_events(
        &self,
        Parameters(input): Parameters<FetchEventsInput>,
    ) -> Result<CallToolResult, McpError> {
        let api_key = require_key(input.api_key, ENV_HELICONE_API_KEY, "Helicone")?;
        let config = fetch_config(api_key, input.days, input.limit);

        let result = helicone::fetch_events(&self.http, &self.config.connectors.helicone_url, &config)
            .await
            .map_err(mcp_err)?;
        ok_json(&fetch_response("events_count", result))
    }

    #[tool(
        description = "Fetch LLM traces from LangSmith. Only llm-type runs are included; returns normalized events with a statistical summary."
    )]
    async fn get_langsmith_traces(
        &self,
        Parameters(input): Parameters<FetchEventsInput>,
    ) -> Result<CallToolResult, McpError> {
        let api_key = require_key(input.api_key, ENV_LANGSMITH_API_KEY, "LangSmith")?;
        let config = fetch_config(api_key, input.days, input.limit);

        let result =
            langsmith::fetch_runs(&self.http, &self.config.connectors.langsmith_url, &config)
                .await
                .map_err(mcp_err)?;
        ok_json(&fetch_response("traces_count", result))
    }

    #[tool(
        description = "Fetch generation observations from Langfuse. Returns normalized events with a statistical summary. API key format: publicKey:secretKey."
    )]
    async fn get_langfuse_generations(
        &self,
        Parameters(input): Parameters<FetchEventsInput>,
    ) -> Result<CallToolResult, McpError> {
        let api_key = require_key(input.api_key, ENV_LANGFUSE_PUBLIC_KEY, "Langfuse")?;
        let config = fetch_config(api_key, input.days, input.limit);

        let result =
            langfuse::fetch_generations(&self.http, &self.config.connectors.langfuse_url, &config)
                .await
                .map_err(mcp_err)?;
        ok_json(&fetch_response("generations_count", result))
    }

    #[tool(
        description = "Get InferenceMAX benchmark data for a model (TTFT, percentile latencies, throughput, cost per 1k tokens)."
    )]
    async fn get_benchmark(
        &self,
        Parameters(input): Parameters<GetBenchmarkInput>,
    ) -> Result<CallToolResult, McpError> {
        let framework = input.framework.as_deref().unwrap_or("api");
        let hardware = input.hardware.as_deref().unwrap_or("api");

        match self.benchmarks.get(&input.model, framework, hardware) {
            Some(entry) => ok_json(entry),
            None => ok_text(format!(
                "No benchmark data found for model: {}. Available models include: \
                 gpt-4o, gpt-4o-mini, claude-3-5-sonnet, claude-3-5-haiku, \
                 gemini-2.0-flash, llama-3.1-70b, mistral-large",
                input.model
            )),
        }
    }

    #[tool(
        description = "Compare your observed metrics (p95 latency, TTFT, throughput) against the InferenceMAX benchmark for a model. Returns signed gaps and an overall verdict."
    )]
    async fn compare_to_benchmark(
        &self,
        Parameters(input): Parameters<CompareBenchmarkInput>,
    ) -> Result<CallToolResult, McpError> {
        let framework = input.framework.as_deref().unwrap_or("api");
        let hardware = input.hardware.as_deref().unwrap_or("api");
        let metrics = UserMetrics {
            p95_latency_ms: input.p95_latency_ms,
            ttft_ms: input.ttft_ms,
            throughput_tps: input.throughput_tps,
        };

        match self
            .benchmarks
            .compare(&input.model, &metrics, framework, hardware)
        {
            Some(comparison) => {
                let formatted = format_comparison(&comparison);
                ok_json(&serde_json::json!({
                    "comparison": comparison,
                    "formatted": formatted,
                }))
            }
            None => ok_text(format!(
                "No benchmark data found for model: {}",
                input.model
            )),
        }
    }

    #[tool(description = "List all available InferenceMAX benchmark entries.")]
    async fn list_benchmarks(&self) -> Result<CallToolResult, McpError> {
        let entries: Vec<_> = self.benchmarks.list().collect();
        ok_json(&serde_json::json!({
            "version": self.benchmarks.version(),
            "count": entries.len(),
            "benchmarks": entries,
        }))
    }

    #[tool(description = "Compare current analysis results to a historical baseline file.")]
    async fn compare_to_baseline(
        &self,
        Parameters(input): Parameters<CompareBaselineInput>,
    ) -> Result<CallToolResult, McpError> {
        let baseline = match &input.baseline_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|_| {
                    McpError::invalid_params(format!("Baseline file not found: {}", path), None)
                })?;
                let parsed: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
                    McpError::invalid_params(format!("Invalid baseline JSON: {}", e), None)
                })?;
                Some(parsed)
            }
            None => None,
        };

        let current_callsites = callsite_count(&input.current_analysis);
        let baseline_callsites = baseline.as_ref().map(callsite_count);

        ok_json(&serde_json::json!({
            "current": { "callsites": current_callsites },
            "baseline": baseline_callsites.map(|c| serde_json::json!({ "callsites": c })),
            "delta": {
                "callsites": current_callsites as i64 - baseline_callsites.unwrap_or(0) as i64,
            },
        }))
    }

    #[tool(description = "List available optimization templates.")]
    async fn list_templates(
        &self,
        Parameters(input): Parameters<ListTemplatesInput>,
    ) -> Result<CallToolResult, McpError> {
        let category = input
            .category
            .as_deref()
            .and_then(templates::parse_category);
        let list = templates::list(category);
        let count = list.len();
        ok_json(&serde_json::json!({
            "templates": list,
            "count": count,
        }))
    }

    #[tool(description = "Get a specific optimization template by name.")]
    async fn get_template(
        &self,
        Parameters(input): Parameters<GetTemplateInput>,
    ) -> Result<CallToolResult, McpError> {
        match templates::get(&input.name) {
            Some(content) => ok_text(content),
            None => Err(McpError::invalid_params(
                format!("Template not found: {}", input.name),
                None,
            )),
        }
    }

    #[tool(description = "Save analysis results to the local run history.")]
    async fn save_analysis(
        &self,
        Parameters(input): Parameters<SaveAnalysisInput>,
    ) -> Result<CallToolResult, McpError> {
        let runs_dir = input
            .path
            .unwrap_or_else(|| format!("{}/runs", APP_DOT_FOLDER));
        std::fs::create_dir_all(&runs_dir).map_err(mcp_err)?;

        let timestamp = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let filepath = Path::new(&runs_dir).join(format!("analysis-{}.json", timestamp));

        let content = serde_json::to_string_pretty(&input.analysis).map_err(mcp_err)?;
        std::fs::write(&filepath, content).map_err(mcp_err)?;

        ok_text(format!("Analysis saved to: {}", filepath.display()))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn fetch_config(api_key: String, days: Option<i64>, limit: Option<u32>) -> ConnectorConfig {
    let days = days.unwrap_or(DEFAULT_FETCH_DAYS).max(0);
    let start = Utc::now() - Duration::days(days);
    ConnectorConfig {
        api_key,
        limit: Some(limit.unwrap_or(DEFAULT_FETCH_LIMIT)),
        start_date: Some(start.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ..Default::default()
    }
}

/// Resolve the platform API key from the tool argument or environment
fn require_key(
    provided: Option<String>,
    env_var: &str,
    platform: &str,
) -> Result<String, McpError> {
    provided
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|k| !k.is_empty()))
        .ok_or_else(|| {
            McpError::invalid_params(
                format!(
                    "{} API key required. Provide via api_key argument or {} env var.",
                    platform, env_var
                ),
                None,
            )
        })
}

/// Full summary plus a bounded event preview; full event lists can be huge
fn fetch_response(count_key: &str, result: ConnectorResult) -> serde_json::Value {
    let preview: Vec<_> = result.events.iter().take(EVENT_PREVIEW_COUNT).collect();
    let mut map = serde_json::Map::new();
    map.insert(
        count_key.to_string(),
        serde_json::json!(result.events.len()),
    );
    map.insert(
        "summary".to_string(),
        serde_json::to_value(&result.summary).unwrap_or_default(),
    );
    map.insert(
        "metadata".to_string(),
        serde_json::to_value(&result.metadata).unwrap_or_default(),
    );
    map.insert(
        "events".to_string(),
        serde_json::to_value(&preview).unwrap_or_default(),
    );
    serde_json::Value::Object(map)
}

fn setup_instructions(files_found: usize) -> String {
    format!(
        "Local analysis engine not found and no API credentials configured.\n\
         \n\
         Option 1: Install the local engine (recommended, free)\n\
         \x20 cargo install inferscope-engine\n\
         \n\
         Option 2: Set up an engine API token (cloud analysis)\n\
         \x20 Set INFERSCOPE_ENGINE_TOKEN in this server's environment.\n\
         \n\
         Option 3: Use BYOK mode (free, no credits needed)\n\
         \x20 Set ANTHROPIC_API_KEY in this server's environment.\n\
         \n\
         Files found: {} code files ready for analysis.",
        files_found
    )
}

fn ok_json(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string(value).map_err(mcp_err)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn ok_text(text: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text.into())]))
}

fn mcp_err(e: impl std::fmt::Display) -> McpError {
    tracing::debug!(error = %e, "MCP tool error");
    McpError::internal_error(e.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_key_prefers_argument() {
        let key = require_key(
            Some("from-arg".to_string()),
            "INFERSCOPE_TEST_NO_SUCH_VAR",
            "Helicone",
        )
        .unwrap();
        assert_eq!(key, "from-arg");
    }

    #[test]
    fn test_require_key_missing_is_invalid_params() {
        let err = require_key(None, "INFERSCOPE_TEST_NO_SUCH_VAR", "Helicone").unwrap_err();
        assert!(err.message.contains("Helicone API key required"));
    }

    #[test]
    fn test_require_key_empty_argument_ignored() {
        let err = require_key(
            Some(String::new()),
            "INFERSCOPE_TEST_NO_SUCH_VAR",
            "LangSmith",
        )
        .unwrap_err();
        assert!(err.message.contains("LangSmith"));
    }

    #[test]
    fn test_fetch_config_window() {
        let config = fetch_config("key".to_string(), Some(3), None);
        assert_eq!(config.limit, Some(DEFAULT_FETCH_LIMIT));
        let start = config.start_date.unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(&start).unwrap();
        let age = Utc::now() - parsed.with_timezone(&Utc);
        assert!(age >= Duration::days(3));
        assert!(age < Duration::days(3) + Duration::minutes(1));
    }

    #[test]
    fn test_fetch_response_preview_bounded() {
        use crate::connectors::{ConnectorMetadata, ConnectorSource, calculate_summary};
        use crate::connectors::types::NormalizedEvent;

        let events: Vec<NormalizedEvent> = (0..25)
            .map(|i| NormalizedEvent {
                id: format!("e{}", i),
                latency_ms: 100.0,
                success: true,
                ..Default::default()
            })
            .collect();
        let summary = calculate_summary(&events);
        let result = ConnectorResult {
            metadata: ConnectorMetadata::now(ConnectorSource::Helicone, events.len(), false),
            events,
            summary,
        };
        let response = fetch_response("events_count", result);
        assert_eq!(response["events_count"], 25);
        assert_eq!(response["events"].as_array().unwrap().len(), EVENT_PREVIEW_COUNT);
        assert_eq!(response["summary"]["total_requests"], 25);
    }

    #[test]
    fn test_ok_json_serializes() {
        let val = serde_json::json!({"key": "value"});
        let result = ok_json(&val);
        assert!(result.is_ok());
        let call_result = result.unwrap();
        assert!(!call_result.content.is_empty());
    }

    #[test]
    fn test_setup_instructions_mention_all_options() {
        let text = setup_instructions(12);
        assert!(text.contains("INFERSCOPE_ENGINE_TOKEN"));
        assert!(text.contains("ANTHROPIC_API_KEY"));
        assert!(text.contains("12 code files"));
    }
}
