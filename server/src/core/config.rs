//! Application configuration
//!
//! Layered configuration: defaults, then an optional JSON config file
//! (`inferscope.json` in the working directory or `--config` path), then
//! environment variables and CLI arguments (handled by clap).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_ENGINE_URL, DEFAULT_HELICONE_URL, DEFAULT_HOST,
    DEFAULT_LANGFUSE_URL, DEFAULT_LANGSMITH_URL, DEFAULT_PORT, ENV_LANGFUSE_HOST,
};

// =============================================================================
// Resolved configuration
// =============================================================================

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mcp: McpConfig,
    pub engine: EngineConfig,
    pub connectors: ConnectorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct McpConfig {
    pub enabled: bool,
}

/// External analysis engine endpoints
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_url: String,
}

/// Base URLs for the observability platform APIs
#[derive(Debug, Clone)]
pub struct ConnectorsConfig {
    pub helicone_url: String,
    pub langsmith_url: String,
    pub langfuse_url: String,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Config file (CLI-specified path or ./inferscope.json)
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let overlay_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match overlay_path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                tracing::debug!(path = %path.display(), "Config file loaded");
                config
            }
            None => FileConfig::default(),
        };

        let server_file = file_config.server.unwrap_or_default();
        let engine_file = file_config.engine.unwrap_or_default();
        let connectors_file = file_config.connectors.unwrap_or_default();

        // LANGFUSE_HOST keeps working for self-hosted deployments
        let langfuse_url = std::env::var(ENV_LANGFUSE_HOST)
            .ok()
            .filter(|v| !v.is_empty())
            .or(connectors_file.langfuse_url)
            .unwrap_or_else(|| DEFAULT_LANGFUSE_URL.to_string());

        Ok(Self {
            server: ServerConfig {
                host: cli
                    .host
                    .clone()
                    .or(server_file.host)
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: cli.port.or(server_file.port).unwrap_or(DEFAULT_PORT),
            },
            mcp: McpConfig {
                enabled: cli
                    .mcp
                    .or(server_file.mcp.and_then(|m| m.enabled))
                    .unwrap_or(true),
            },
            engine: EngineConfig {
                api_url: cli
                    .engine_url
                    .clone()
                    .or(engine_file.api_url)
                    .unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string()),
            },
            connectors: ConnectorsConfig {
                helicone_url: connectors_file
                    .helicone_url
                    .unwrap_or_else(|| DEFAULT_HELICONE_URL.to_string()),
                langsmith_url: connectors_file
                    .langsmith_url
                    .unwrap_or_else(|| DEFAULT_LANGSMITH_URL.to_string()),
                langfuse_url,
            },
        })
    }
}

// =============================================================================
// Config file shape (all fields optional)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerFileConfig>,
    engine: Option<EngineFileConfig>,
    connectors: Option<ConnectorsFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerFileConfig {
    host: Option<String>,
    port: Option<u16>,
    mcp: Option<McpFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct McpFileConfig {
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct EngineFileConfig {
    api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectorsFileConfig {
    helicone_url: Option<String>,
    langsmith_url: Option<String>,
    langfuse_url: Option<String>,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let cli = CliConfig::default();
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.mcp.enabled);
        assert_eq!(config.engine.api_url, DEFAULT_ENGINE_URL);
        assert_eq!(config.connectors.helicone_url, DEFAULT_HELICONE_URL);
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = CliConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            mcp: Some(false),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(!config.mcp.enabled);
    }

    #[test]
    fn test_missing_cli_config_path_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/inferscope.json")),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_config_file_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inferscope.json");
        std::fs::write(
            &path,
            r#"{"server": {"port": 7010, "mcp": {"enabled": false}}, "connectors": {"helicone_url": "http://localhost:8787"}}"#,
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 7010);
        assert!(!config.mcp.enabled);
        assert_eq!(config.connectors.helicone_url, "http://localhost:8787");
        // untouched sections fall back to defaults
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.connectors.langsmith_url, DEFAULT_LANGSMITH_URL);
    }
}
