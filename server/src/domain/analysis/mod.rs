//! External analysis engine integration
//!
//! The inference analysis engine is an external collaborator reached either
//! through a local binary ([`cli`]) or a remote HTTP API ([`api`]). This
//! module collects the code files to analyze and calls one of the two; it
//! implements none of the engine's own analysis.

use thiserror::Error;

pub mod api;
pub mod cli;
pub mod files;
pub mod types;

pub use files::read_code_files;
pub use types::{AnalysisFile, AnalysisOptions, AnalysisResult};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("File too large: {path} ({size} bytes, max {max})")]
    FileTooLarge { path: String, size: u64, max: u64 },

    #[error("No code files found in: {0}")]
    NoCodeFiles(String),

    #[error("No authentication configured. Set INFERSCOPE_ENGINE_TOKEN or ANTHROPIC_API_KEY.")]
    NoAuth,

    #[error("Analysis request timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to reach analysis engine: {0}")]
    Network(#[from] reqwest::Error),

    #[error("[{code}] {message}")]
    Engine {
        code: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Engine returned unparseable output: {0}")]
    InvalidOutput(String),
}

impl AnalysisError {
    pub fn engine(code: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Engine {
            code: code.into(),
            status,
            message: message.into(),
        }
    }
}
