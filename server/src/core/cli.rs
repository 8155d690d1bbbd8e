use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{ENV_CONFIG, ENV_ENGINE_URL, ENV_HOST, ENV_MCP_ENABLED, ENV_PORT};

#[derive(Parser)]
#[command(name = "inferscope")]
#[command(version, about = "LLM Inference Analysis Server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable or disable the MCP endpoint
    #[arg(long, global = true, env = ENV_MCP_ENABLED)]
    pub mcp: Option<bool>,

    /// Remote analysis engine URL
    #[arg(long, global = true, env = ENV_ENGINE_URL)]
    pub engine_url: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Print the bundled benchmark table version and exit
    Benchmarks,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub mcp: Option<bool>,
    pub engine_url: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        mcp: cli.mcp,
        engine_url: cli.engine_url,
    };
    (config, cli.command)
}
