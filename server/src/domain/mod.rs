//! Domain logic: benchmark comparison, analysis engine glue, templates

pub mod analysis;
pub mod benchmarks;
pub mod templates;

pub use benchmarks::{BenchmarkStore, UserMetrics, format_comparison};
