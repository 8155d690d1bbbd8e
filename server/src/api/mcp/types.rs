use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Deserialize, JsonSchema)]
pub struct AnalyzeInput {
    /// Path to the code directory or file to analyze
    pub path: Option<String>,
    /// Pre-read files. If provided, skips reading from disk.
    pub files: Option<Vec<FileInput>>,
    /// Include code fix suggestions (default: true)
    pub fixes: Option<bool>,
    /// Include benchmark comparisons (default: true)
    pub benchmark: Option<bool>,
}

#[derive(Deserialize, JsonSchema)]
pub struct FileInput {
    pub path: String,
    pub content: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct FetchEventsInput {
    /// Platform API key (falls back to the matching env var)
    pub api_key: Option<String>,
    /// Days of data to fetch (default: 7)
    pub days: Option<i64>,
    /// Maximum number of events to fetch (default: 1000)
    pub limit: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
pub struct GetBenchmarkInput {
    /// Model name (e.g. gpt-4o, claude-3-5-sonnet, llama-3.1-70b)
    pub model: String,
    /// Framework: api, vllm, tgi, sglang (default: api)
    pub framework: Option<String>,
    /// Hardware: api, h100, a100 (default: api)
    pub hardware: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct CompareBenchmarkInput {
    /// Model name (e.g. gpt-4o, claude-3-5-sonnet)
    pub model: String,
    /// Your observed P95 latency in ms
    pub p95_latency_ms: Option<f64>,
    /// Your observed time-to-first-token in ms
    pub ttft_ms: Option<f64>,
    /// Your observed throughput in tokens/second
    pub throughput_tps: Option<f64>,
    /// Framework: api, vllm, tgi, sglang (default: api)
    pub framework: Option<String>,
    /// Hardware: api, h100, a100 (default: api)
    pub hardware: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct CompareBaselineInput {
    /// Current analysis results (InferenceMap format)
    pub current_analysis: JsonValue,
    /// Path to a baseline JSON file
    pub baseline_path: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct ListTemplatesInput {
    /// Filter by category: insights, optimizations, all (default: all)
    pub category: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct GetTemplateInput {
    /// Template name (e.g. overpowered-model, streaming-drift)
    pub name: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct SaveAnalysisInput {
    /// Analysis results to save (InferenceMap format)
    pub analysis: JsonValue,
    /// Directory to save into (default: .inferscope/runs)
    pub path: Option<String>,
}
