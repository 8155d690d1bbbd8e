//! Analysis engine wire types
//!
//! The engine itself (local binary or remote API) is a black box; these types
//! mirror its JSON result format.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One source file submitted for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFile {
    pub path: String,
    pub content: String,
}

/// Engine invocation options
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    /// Include code fix suggestions
    pub fixes: bool,
    /// Include benchmark comparisons
    pub benchmark: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            fixes: true,
            benchmark: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// One detected LLM call site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferencePoint {
    pub id: String,
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub patterns: PatternFlags,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub confidence: f64,
}

/// Inference patterns detected at a call site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batching: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caching: Option<bool>,
    #[serde(default, rename = "async", skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub affected_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimization {
    pub priority: u32,
    pub issue: String,
    pub fix: String,
    pub impact: String,
    pub effort: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkEstimate {
    pub model: String,
    pub metric: String,
    pub benchmark_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub files_scanned: u32,
    pub total_callsites: u32,
    #[serde(default)]
    pub providers: std::collections::BTreeMap<String, u32>,
    #[serde(default)]
    pub models: std::collections::BTreeMap<String, u32>,
    pub critical_issues: u32,
    pub warnings: u32,
    pub opportunities: u32,
}

/// Full analysis report as returned by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub version: String,
    #[serde(default)]
    pub inference_points: Vec<InferencePoint>,
    #[serde(default)]
    pub summary: AnalysisSummary,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub optimizations: Vec<Optimization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<Vec<BenchmarkEstimate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// Analysis results saved by `save_analysis` / compared by
/// `compare_to_baseline` (InferenceMap format). Kept opaque: only the
/// callsite list is inspected.
pub fn callsite_count(analysis: &JsonValue) -> usize {
    analysis
        .get("callsites")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}
