// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "InferScope";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "inferscope";

/// Unix-style dotfile folder name (analysis run history)
pub const APP_DOT_FOLDER: &str = ".inferscope";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "inferscope.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "INFERSCOPE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "INFERSCOPE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "INFERSCOPE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "INFERSCOPE_LOG";

/// Environment variable for MCP endpoint enabled
pub const ENV_MCP_ENABLED: &str = "INFERSCOPE_MCP_ENABLED";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5397;

/// Default body limit for API requests (4 MB - pre-read file payloads)
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

// =============================================================================
// Environment Variables - Analysis Engine
// =============================================================================

/// Environment variable for the remote analysis engine URL
pub const ENV_ENGINE_URL: &str = "INFERSCOPE_ENGINE_URL";

/// Environment variable for the analysis engine API token
pub const ENV_ENGINE_TOKEN: &str = "INFERSCOPE_ENGINE_TOKEN";

/// Environment variable for BYOK Anthropic key (free analysis mode)
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Default remote analysis engine endpoint
pub const DEFAULT_ENGINE_URL: &str = "https://inferscope.dev/api/analyze";

/// Local analysis engine binary name (searched on PATH)
pub const ENGINE_BINARY_NAME: &str = "inferscope-engine";

/// Analysis request timeout in seconds (CLI and API)
pub const ANALYSIS_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Environment Variables - Connectors
// =============================================================================

/// Environment variable for Helicone API key
pub const ENV_HELICONE_API_KEY: &str = "HELICONE_API_KEY";

/// Environment variable for LangSmith API key
pub const ENV_LANGSMITH_API_KEY: &str = "LANGSMITH_API_KEY";

/// Environment variable for Langfuse public key
pub const ENV_LANGFUSE_PUBLIC_KEY: &str = "LANGFUSE_PUBLIC_KEY";

/// Environment variable for Langfuse secret key
pub const ENV_LANGFUSE_SECRET_KEY: &str = "LANGFUSE_SECRET_KEY";

/// Environment variable for self-hosted Langfuse base URL
pub const ENV_LANGFUSE_HOST: &str = "LANGFUSE_HOST";

// =============================================================================
// Connector Defaults
// =============================================================================

/// Default Helicone API base URL
pub const DEFAULT_HELICONE_URL: &str = "https://api.helicone.ai";

/// Default LangSmith API base URL
pub const DEFAULT_LANGSMITH_URL: &str = "https://api.smith.langchain.com";

/// Default Langfuse base URL (Langfuse Cloud)
pub const DEFAULT_LANGFUSE_URL: &str = "https://cloud.langfuse.com";

/// Default maximum events fetched per connector call
pub const DEFAULT_FETCH_LIMIT: u32 = 1000;

/// Langfuse caps the observations endpoint at 100 items per page
pub const LANGFUSE_PAGE_SIZE: u32 = 100;

/// Connector HTTP timeout in seconds
pub const CONNECTOR_TIMEOUT_SECS: u64 = 30;

/// Default lookback window for connector fetch tools (days)
pub const DEFAULT_FETCH_DAYS: i64 = 7;

/// Number of events included inline in connector tool responses
pub const EVENT_PREVIEW_COUNT: usize = 10;

// =============================================================================
// Code File Collection
// =============================================================================

/// Maximum number of files collected for analysis
pub const MAX_ANALYSIS_FILES: usize = 50;

/// Maximum size per collected file (50 KB)
pub const MAX_ANALYSIS_FILE_SIZE: u64 = 50 * 1024;

/// Maximum total collected size (500 KB)
pub const MAX_ANALYSIS_TOTAL_SIZE: u64 = 500 * 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
