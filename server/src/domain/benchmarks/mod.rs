//! Benchmark reference data and comparison
//!
//! Resolves free-form model names against the bundled InferenceMAX benchmark
//! table and derives signed, direction-aware gaps between observed metrics and
//! the benchmark baseline.
//!
//! The table is parsed once at construction and is immutable afterwards; to
//! pick up new reference data the process restarts. Lookup is tolerant of
//! naming variance: exact composite key, then alias, then the api/api default
//! key, then a bidirectional substring scan in table load order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Embedded benchmark table (compile-time)
const EMBEDDED_BENCHMARKS_JSON: &str = include_str!("../../../data/inferencemax.json");

/// Default framework/hardware dimension for API-served models
const DEFAULT_DIMENSION: &str = "api";

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Failed to load benchmark data: {0}")]
    Parse(String),
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Baseline metrics for one model/framework/hardware combination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub ttft_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub throughput_tps: f64,
    pub cost_per_1k_input: f64,
    pub cost_per_1k_output: f64,
}

/// One benchmark table row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub model: String,
    pub provider: String,
    pub framework: String,
    pub hardware: String,
    pub metrics: BenchmarkMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_config: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BenchmarkFile {
    version: String,
    last_updated: String,
    #[serde(default)]
    source: String,
    /// serde_json's preserve_order feature keeps these in file order, which
    /// the fuzzy fallback scan depends on
    benchmarks: serde_json::Map<String, JsonValue>,
    #[serde(default)]
    model_aliases: HashMap<String, String>,
}

/// Benchmark table version info
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkVersion {
    pub version: String,
    pub last_updated: String,
}

// ============================================================================
// STORE
// ============================================================================

/// In-memory benchmark table with alias and fuzzy lookup
#[derive(Debug)]
pub struct BenchmarkStore {
    /// Entries in file load order (the fuzzy scan iterates this)
    entries: Vec<(String, BenchmarkEntry)>,
    /// Composite key -> index into entries
    index: HashMap<String, usize>,
    /// Informal model name -> canonical composite key
    aliases: HashMap<String, String>,
    version: String,
    last_updated: String,
    source: String,
}

impl BenchmarkStore {
    /// Build the store from the bundled table. Failure is fatal: lookups
    /// without reference data would silently return nothing.
    pub fn from_embedded() -> Result<Self, BenchmarkError> {
        Self::from_json_str(EMBEDDED_BENCHMARKS_JSON)
    }

    /// Build the store from a JSON document (tests inject fixtures here)
    pub fn from_json_str(json: &str) -> Result<Self, BenchmarkError> {
        let file: BenchmarkFile =
            serde_json::from_str(json).map_err(|e| BenchmarkError::Parse(e.to_string()))?;

        let mut entries = Vec::with_capacity(file.benchmarks.len());
        let mut index = HashMap::with_capacity(file.benchmarks.len());
        for (key, value) in file.benchmarks {
            let entry: BenchmarkEntry = serde_json::from_value(value)
                .map_err(|e| BenchmarkError::Parse(format!("entry {}: {}", key, e)))?;
            index.insert(key.clone(), entries.len());
            entries.push((key, entry));
        }

        Ok(Self {
            entries,
            index,
            aliases: file.model_aliases,
            version: file.version,
            last_updated: file.last_updated,
            source: file.source,
        })
    }

    /// Resolve a model name to a benchmark entry.
    ///
    /// Cascade, first hit wins:
    /// 1. exact `model:framework:hardware` key
    /// 2. alias table
    /// 3. `model:api:api` default key
    /// 4. bidirectional substring match, in table load order
    pub fn get(&self, model: &str, framework: &str, hardware: &str) -> Option<&BenchmarkEntry> {
        let normalized = normalize_model(model);

        let exact_key = format!("{}:{}:{}", normalized, framework, hardware);
        if let Some(&i) = self.index.get(&exact_key) {
            return Some(&self.entries[i].1);
        }

        if let Some(canonical) = self.aliases.get(&normalized)
            && let Some(&i) = self.index.get(canonical)
        {
            return Some(&self.entries[i].1);
        }

        let default_key = format!(
            "{}:{}:{}",
            normalized, DEFAULT_DIMENSION, DEFAULT_DIMENSION
        );
        if let Some(&i) = self.index.get(&default_key) {
            return Some(&self.entries[i].1);
        }

        for (_, entry) in &self.entries {
            let bench_model = normalize_model(&entry.model);
            if bench_model.contains(&normalized) || normalized.contains(&bench_model) {
                return Some(entry);
            }
        }

        None
    }

    /// Whether any benchmark resolves for this model (default dimensions)
    pub fn contains(&self, model: &str) -> bool {
        self.get(model, DEFAULT_DIMENSION, DEFAULT_DIMENSION).is_some()
    }

    /// All entries in load order
    pub fn list(&self) -> impl Iterator<Item = &BenchmarkEntry> {
        self.entries.iter().map(|(_, e)| e)
    }

    pub fn version(&self) -> BenchmarkVersion {
        BenchmarkVersion {
            version: self.version.clone(),
            last_updated: self.last_updated.clone(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    // ========================================================================
    // COMPARISON
    // ========================================================================

    /// Compare observed metrics against the benchmark for `model`.
    /// Returns None when no benchmark entry resolves; absent benchmark data
    /// is an expected condition, not an error.
    pub fn compare(
        &self,
        model: &str,
        user_metrics: &UserMetrics,
        framework: &str,
        hardware: &str,
    ) -> Option<BenchmarkComparison> {
        let benchmark = self.get(model, framework, hardware)?;

        let mut gaps = MetricGaps::default();

        if let Some((user, bench)) =
            comparable(user_metrics.p95_latency_ms, benchmark.metrics.p95_latency_ms)
        {
            gaps.p95_latency = Some(latency_gap(user, bench, "ms"));
        }

        if let Some((user, bench)) = comparable(user_metrics.ttft_ms, benchmark.metrics.ttft_ms) {
            gaps.ttft = Some(latency_gap(user, bench, "ms"));
        }

        if let Some((user, bench)) =
            comparable(user_metrics.throughput_tps, benchmark.metrics.throughput_tps)
        {
            gaps.throughput = Some(throughput_gap(user, bench));
        }

        let overall_gap = overall_gap(&gaps);

        Some(BenchmarkComparison {
            model: benchmark.model.clone(),
            framework: benchmark.framework.clone(),
            hardware: benchmark.hardware.clone(),
            your_metrics: user_metrics.clone(),
            benchmark_metrics: benchmark.metrics.clone(),
            gaps,
            overall_gap,
            optimal_config: benchmark.optimal_config.clone(),
        })
    }
}

// ============================================================================
// MODEL NAME NORMALIZATION
// ============================================================================

/// Canonical model-name form used for every lookup key comparison:
/// lowercase, runs of underscores/whitespace collapsed to a single hyphen,
/// consecutive hyphens collapsed, leading/trailing hyphens stripped.
pub fn normalize_model(model: &str) -> String {
    let mut out = String::with_capacity(model.len());
    for c in model.chars() {
        let c = if c == '_' || c.is_whitespace() { '-' } else { c };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.extend(c.to_lowercase());
    }
    out.trim_matches('-').to_string()
}

// ============================================================================
// GAP COMPUTATION
// ============================================================================

/// Observed metrics supplied by the caller; any subset may be present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p95_latency_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttft_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput_tps: Option<f64>,
}

/// Signed gap for one metric
#[derive(Debug, Clone, Serialize)]
pub struct MetricGap {
    /// Signed difference; positive always means the caller is worse off
    pub value: f64,
    /// Signed percent of the benchmark value, rounded
    pub percent: i64,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricGaps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95_latency: Option<MetricGap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttft: Option<MetricGap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<MetricGap>,
}

impl MetricGaps {
    fn is_empty(&self) -> bool {
        self.p95_latency.is_none() && self.ttft.is_none() && self.throughput.is_none()
    }
}

/// Full gap report for one model
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkComparison {
    pub model: String,
    pub framework: String,
    pub hardware: String,
    pub your_metrics: UserMetrics,
    pub benchmark_metrics: BenchmarkMetrics,
    pub gaps: MetricGaps,
    pub overall_gap: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_config: Option<JsonValue>,
}

/// A metric is comparable only when both sides are present and non-zero;
/// a benchmark value of exactly 0 means "no data", not a real baseline.
fn comparable(user: Option<f64>, benchmark: f64) -> Option<(f64, f64)> {
    match user {
        Some(u) if u != 0.0 && benchmark != 0.0 => Some((u, benchmark)),
        _ => None,
    }
}

/// Gap for a lower-is-better metric: positive diff means slower than baseline
fn latency_gap(user: f64, benchmark: f64, unit: &str) -> MetricGap {
    let diff = user - benchmark;
    let percent = (diff / benchmark * 100.0).round() as i64;
    MetricGap {
        value: diff,
        percent,
        description: describe_gap(diff, percent, unit, "slower", "faster"),
    }
}

/// Gap for throughput (higher-is-better). Internally the diff is inverted
/// (benchmark - user) so the wording logic is shared; the reported value and
/// percent are negated back so that, as with the latency gaps, a positive
/// reported gap always reads "caller is worse".
fn throughput_gap(user: f64, benchmark: f64) -> MetricGap {
    let diff = benchmark - user;
    let percent = (diff / benchmark * 100.0).round() as i64;
    MetricGap {
        value: -diff,
        percent: -percent,
        description: describe_gap(diff, percent, "tps", "below", "above"),
    }
}

/// Human-readable directional description of a gap.
///
/// Over 100% the gap reads as a multiplier ("2.5x slower"); otherwise as a
/// percentage with the explicitly-signed raw difference ("20% faster (-20ms)").
fn describe_gap(diff: f64, percent: i64, unit: &str, worse_word: &str, better_word: &str) -> String {
    if diff == 0.0 || percent == 0 {
        return "On par with benchmark".to_string();
    }

    let word = if diff > 0.0 { worse_word } else { better_word };
    let abs_percent = percent.abs();

    if abs_percent > 100 {
        let multiplier = abs_percent as f64 / 100.0 + 1.0;
        return format!("{:.1}x {}", multiplier, word);
    }

    format!(
        "{}% {} ({}{})",
        abs_percent,
        word,
        format_signed(diff),
        unit
    )
}

/// Signed number rendering: "+20" / "-20", one decimal for fractional diffs
fn format_signed(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:+}", value as i64)
    } else {
        format!("{:+.1}", value)
    }
}

/// Qualitative verdict across the computed gaps.
///
/// Thresholds are strict: a latency or TTFT gap must exceed 50 percent, and
/// the reported throughput percent must fall below -30, to count as an issue.
fn overall_gap(gaps: &MetricGaps) -> String {
    let mut issues: Vec<String> = Vec::new();

    if let Some(gap) = &gaps.p95_latency
        && gap.percent > 50
    {
        issues.push(format!("latency {}", gap.description));
    }

    if let Some(gap) = &gaps.ttft
        && gap.percent > 50
    {
        issues.push(format!("TTFT {}", gap.description));
    }

    if let Some(gap) = &gaps.throughput
        && gap.percent < -30
    {
        issues.push(format!("throughput {}", gap.description));
    }

    if issues.is_empty() {
        if gaps.is_empty() {
            return "No metrics to compare".to_string();
        }
        return "Performing within benchmark range".to_string();
    }

    issues.join(", ")
}

// ============================================================================
// DISPLAY FORMATTING
// ============================================================================

/// Render a comparison for human consumption. Purely presentational.
pub fn format_comparison(comparison: &BenchmarkComparison) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("Model: {}", comparison.model));
    lines.push(format!(
        "Framework: {} | Hardware: {}",
        comparison.framework, comparison.hardware
    ));
    lines.push(String::new());

    if let Some(gap) = &comparison.gaps.p95_latency {
        lines.push(format!(
            "P95 Latency: Your {}ms | Benchmark {}ms | {}",
            fmt_num(comparison.your_metrics.p95_latency_ms.unwrap_or(0.0)),
            fmt_num(comparison.benchmark_metrics.p95_latency_ms),
            gap.description
        ));
    }

    if let Some(gap) = &comparison.gaps.ttft {
        lines.push(format!(
            "TTFT: Your {}ms | Benchmark {}ms | {}",
            fmt_num(comparison.your_metrics.ttft_ms.unwrap_or(0.0)),
            fmt_num(comparison.benchmark_metrics.ttft_ms),
            gap.description
        ));
    }

    if let Some(gap) = &comparison.gaps.throughput {
        lines.push(format!(
            "Throughput: Your {} tps | Benchmark {} tps | {}",
            fmt_num(comparison.your_metrics.throughput_tps.unwrap_or(0.0)),
            fmt_num(comparison.benchmark_metrics.throughput_tps),
            gap.description
        ));
    }

    lines.push(String::new());
    lines.push(format!("Overall: {}", comparison.overall_gap));

    if let Some(JsonValue::Object(config)) = &comparison.optimal_config {
        lines.push(String::new());
        lines.push("Optimal Config:".to_string());
        for (key, value) in config {
            lines.push(format!("  {}: {}", key, display_value(value)));
        }
    }

    lines.join("\n")
}

fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "version": "2025.2",
        "last_updated": "2025-05-20",
        "source": "InferenceMAX",
        "benchmarks": {
            "gpt-4o:api:api": {
                "model": "gpt-4o",
                "provider": "openai",
                "framework": "api",
                "hardware": "api",
                "metrics": {
                    "ttft_ms": 400,
                    "p50_latency_ms": 800,
                    "p95_latency_ms": 100,
                    "p99_latency_ms": 2500,
                    "throughput_tps": 100,
                    "cost_per_1k_input": 0.0025,
                    "cost_per_1k_output": 0.01
                }
            },
            "llama-3:vllm:h100": {
                "model": "llama-3",
                "provider": "meta",
                "framework": "vllm",
                "hardware": "h100",
                "metrics": {
                    "ttft_ms": 120,
                    "p50_latency_ms": 400,
                    "p95_latency_ms": 900,
                    "p99_latency_ms": 1400,
                    "throughput_tps": 950,
                    "cost_per_1k_input": 0.0002,
                    "cost_per_1k_output": 0.0002
                },
                "optimal_config": { "tensor_parallel": 2, "dtype": "bf16" }
            },
            "llama-3.1:vllm:h100": {
                "model": "llama-3.1",
                "provider": "meta",
                "framework": "vllm",
                "hardware": "h100",
                "metrics": {
                    "ttft_ms": 130,
                    "p50_latency_ms": 420,
                    "p95_latency_ms": 950,
                    "p99_latency_ms": 1500,
                    "throughput_tps": 900,
                    "cost_per_1k_input": 0.0002,
                    "cost_per_1k_output": 0.0002
                }
            },
            "no-ttft-model:api:api": {
                "model": "no-ttft-model",
                "provider": "openai",
                "framework": "api",
                "hardware": "api",
                "metrics": {
                    "ttft_ms": 0,
                    "p50_latency_ms": 100,
                    "p95_latency_ms": 200,
                    "p99_latency_ms": 300,
                    "throughput_tps": 50,
                    "cost_per_1k_input": 0.001,
                    "cost_per_1k_output": 0.002
                }
            }
        },
        "model_aliases": {
            "gpt4o": "gpt-4o:api:api"
        }
    }"#;

    fn store() -> BenchmarkStore {
        BenchmarkStore::from_json_str(FIXTURE).unwrap()
    }

    #[test]
    fn test_embedded_table_parses() {
        let store = BenchmarkStore::from_embedded().unwrap();
        assert!(store.list().count() >= 10, "Bundled table should be populated");
        assert!(!store.version().version.is_empty());
        assert!(store.contains("gpt-4o"));
    }

    #[test]
    fn test_parse_failure_surfaces_cause() {
        let err = BenchmarkStore::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Failed to load benchmark data:"));
    }

    #[test]
    fn test_normalize_model() {
        assert_eq!(normalize_model("GPT_4o"), "gpt-4o");
        assert_eq!(normalize_model("Llama 3.1  70B"), "llama-3.1-70b");
        assert_eq!(normalize_model("__mixtral--8x7b__"), "mixtral-8x7b");
        assert_eq!(normalize_model("claude-3-5-sonnet"), "claude-3-5-sonnet");
    }

    #[test]
    fn test_lookup_exact_key() {
        let store = store();
        let entry = store.get("llama-3", "vllm", "h100").unwrap();
        assert_eq!(entry.framework, "vllm");
        assert_eq!(entry.hardware, "h100");
    }

    #[test]
    fn test_lookup_alias_then_default_key() {
        let store = store();
        // alias resolves to the canonical composite key
        let entry = store.get("gpt4o", "vllm", "h100").unwrap();
        assert_eq!(entry.model, "gpt-4o");

        // mixed case + underscore resolves via normalization + default key
        let entry = store.get("GPT_4o", "api", "api").unwrap();
        assert_eq!(entry.model, "gpt-4o");
    }

    #[test]
    fn test_lookup_fuzzy_substring() {
        let store = store();
        // query is a substring extension of a benchmark model name
        let entry = store.get("llama-3-70b-instruct", "api", "api").unwrap();
        assert_eq!(entry.model, "llama-3");
    }

    #[test]
    fn test_lookup_fuzzy_first_in_load_order_wins() {
        let store = store();
        // "llama" is a substring of both llama-3 and llama-3.1;
        // the earlier table entry wins
        let entry = store.get("llama", "api", "api").unwrap();
        assert_eq!(entry.model, "llama-3");
    }

    #[test]
    fn test_lookup_no_match_is_none() {
        let store = store();
        assert!(store.get("totally-unregistered", "api", "api").is_none());
        assert!(!store.contains("totally-unregistered"));
        // comparison on an unresolvable model is the same absence, not an error
        assert!(
            store
                .compare("totally-unregistered", &UserMetrics::default(), "api", "api")
                .is_none()
        );
    }

    #[test]
    fn test_gap_directionality_slower() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(120.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let gap = comparison.gaps.p95_latency.unwrap();
        assert_eq!(gap.value, 20.0);
        assert_eq!(gap.percent, 20);
        assert_eq!(gap.description, "20% slower (+20ms)");
    }

    #[test]
    fn test_gap_directionality_faster() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(80.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let gap = comparison.gaps.p95_latency.unwrap();
        assert_eq!(gap.value, -20.0);
        assert_eq!(gap.percent, -20);
        assert_eq!(gap.description, "20% faster (-20ms)");
    }

    #[test]
    fn test_gap_on_par() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(100.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let gap = comparison.gaps.p95_latency.unwrap();
        assert_eq!(gap.description, "On par with benchmark");
    }

    #[test]
    fn test_gap_multiplier_over_100_percent() {
        let store = store();
        // 250 vs 100 -> diff 150, percent 150 -> 150/100 + 1 = 2.5x
        let metrics = UserMetrics {
            p95_latency_ms: Some(250.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let gap = comparison.gaps.p95_latency.unwrap();
        assert_eq!(gap.percent, 150);
        assert_eq!(gap.description, "2.5x slower");
    }

    #[test]
    fn test_gap_exactly_100_percent_stays_percent_form() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(200.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let gap = comparison.gaps.p95_latency.unwrap();
        assert_eq!(gap.description, "100% slower (+100ms)");
    }

    #[test]
    fn test_throughput_sign_inversion() {
        let store = store();
        // user 50 tps vs benchmark 100 tps: internal diff 50, reported -50
        let metrics = UserMetrics {
            throughput_tps: Some(50.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let gap = comparison.gaps.throughput.unwrap();
        assert_eq!(gap.value, -50.0);
        assert_eq!(gap.percent, -50);
        assert_eq!(gap.description, "50% below (+50tps)");
    }

    #[test]
    fn test_throughput_above_benchmark() {
        let store = store();
        let metrics = UserMetrics {
            throughput_tps: Some(150.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let gap = comparison.gaps.throughput.unwrap();
        assert_eq!(gap.value, 50.0);
        assert_eq!(gap.percent, 50);
        assert_eq!(gap.description, "50% above (-50tps)");
    }

    #[test]
    fn test_zero_benchmark_value_not_comparable() {
        let store = store();
        let metrics = UserMetrics {
            ttft_ms: Some(500.0),
            p95_latency_ms: Some(250.0),
            ..Default::default()
        };
        let comparison = store
            .compare("no-ttft-model", &metrics, "api", "api")
            .unwrap();
        assert!(comparison.gaps.ttft.is_none());
        assert!(comparison.gaps.p95_latency.is_some());
    }

    #[test]
    fn test_overall_no_metrics() {
        let store = store();
        let comparison = store
            .compare("gpt-4o", &UserMetrics::default(), "api", "api")
            .unwrap();
        assert_eq!(comparison.overall_gap, "No metrics to compare");
    }

    #[test]
    fn test_overall_within_range() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(110.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        assert_eq!(comparison.overall_gap, "Performing within benchmark range");
    }

    #[test]
    fn test_overall_latency_threshold_is_strict() {
        let store = store();
        // exactly 50% does not trigger
        let metrics = UserMetrics {
            p95_latency_ms: Some(150.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        assert_eq!(comparison.overall_gap, "Performing within benchmark range");

        // 51% does
        let metrics = UserMetrics {
            p95_latency_ms: Some(151.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        assert_eq!(comparison.overall_gap, "latency 51% slower (+51ms)");
    }

    #[test]
    fn test_overall_throughput_threshold_is_strict() {
        let store = store();
        // reported percent -30 does not trigger
        let metrics = UserMetrics {
            throughput_tps: Some(70.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        assert_eq!(comparison.overall_gap, "Performing within benchmark range");

        // -31 does
        let metrics = UserMetrics {
            throughput_tps: Some(69.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        assert_eq!(comparison.overall_gap, "throughput 31% below (+31tps)");
    }

    #[test]
    fn test_overall_joins_multiple_issues() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(160.0),
            ttft_ms: Some(1000.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        assert_eq!(
            comparison.overall_gap,
            "latency 60% slower (+60ms), TTFT 2.5x slower"
        );
    }

    #[test]
    fn test_format_comparison_rendering() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(120.0),
            throughput_tps: Some(80.0),
            ..Default::default()
        };
        let comparison = store.compare("gpt-4o", &metrics, "api", "api").unwrap();
        let text = format_comparison(&comparison);
        assert!(text.contains("Model: gpt-4o"));
        assert!(text.contains("Framework: api | Hardware: api"));
        assert!(text.contains("P95 Latency: Your 120ms | Benchmark 100ms | 20% slower (+20ms)"));
        assert!(text.contains("Throughput: Your 80 tps | Benchmark 100 tps | 20% below (+20tps)"));
        assert!(text.contains("Overall: Performing within benchmark range"));
        // no TTFT was supplied, so no TTFT line
        assert!(!text.contains("TTFT:"));
    }

    #[test]
    fn test_format_comparison_optimal_config() {
        let store = store();
        let metrics = UserMetrics {
            p95_latency_ms: Some(900.0),
            ..Default::default()
        };
        let comparison = store.compare("llama-3", &metrics, "vllm", "h100").unwrap();
        let text = format_comparison(&comparison);
        assert!(text.contains("Optimal Config:"));
        assert!(text.contains("  tensor_parallel: 2"));
        assert!(text.contains("  dtype: bf16"));
    }
}
