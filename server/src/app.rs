//! Core application

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, CONNECTOR_TIMEOUT_SECS, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::domain::benchmarks::BenchmarkStore;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub benchmarks: Arc<BenchmarkStore>,
    pub http: reqwest::Client,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Benchmarks) => return Self::print_benchmark_info(),
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let benchmarks =
            Arc::new(BenchmarkStore::from_embedded().context("Failed to load benchmark data")?);
        tracing::debug!(
            entries = benchmarks.list().count(),
            version = %benchmarks.version().version,
            "Benchmark table loaded"
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(CONNECTOR_TIMEOUT_SECS))
            .user_agent(concat!("InferScope/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let shutdown = ShutdownService::new();

        Ok(Self {
            shutdown,
            config,
            benchmarks,
            http,
        })
    }

    fn print_benchmark_info() -> Result<()> {
        let store = BenchmarkStore::from_embedded().context("Failed to load benchmark data")?;
        let version = store.version();
        println!(
            "{} ({}, updated {})",
            store.source(),
            version.version,
            version.last_updated
        );
        for entry in store.list() {
            println!(
                "  {:<24} {}:{}  p95 {}ms  {} tps",
                entry.model,
                entry.framework,
                entry.hardware,
                entry.metrics.p95_latency_ms,
                entry.metrics.throughput_tps
            );
        }
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
